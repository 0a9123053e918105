//! Oracle service end to end over a real socket

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use common::{event_on, titles};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use weekfill::config::ServerConfig;
use weekfill::fill::FillScheduler;
use weekfill::models::Weekday;
use weekfill::oracle::{ConflictOracle, HttpConflictOracle, OracleServer, TravelAwareOracle};
use weekfill::planner::Planner;
use weekfill::schedule::{Waitlist, WeeklySchedule};

struct RunningServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl RunningServer {
    async fn start(travel_minutes: u32) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = ServerConfig {
            bind_address: addr,
            default_travel_minutes: travel_minutes,
            enable_cors: true,
            enable_request_logging: false,
        };
        let server = OracleServer::with_oracle(config, TravelAwareOracle::with_fixed_travel(travel_minutes));

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve(listener, async move {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    fn oracle(&self) -> HttpConflictOracle {
        HttpConflictOracle::from_url(format!("http://{}/api/events/conflict", self.addr)).unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_remote_verdicts() {
    let server = RunningServer::start(15).await;
    let oracle = server.oracle();

    let morning = event_on(Weekday::Monday, "Morning", "09:00", "10:00").with_address("Office");
    let overlap = event_on(Weekday::Monday, "Overlap", "09:30", "10:30").with_address("Office");
    let tight = event_on(Weekday::Monday, "Tight", "10:10", "11:00").with_address("Gym");
    let relaxed = event_on(Weekday::Monday, "Relaxed", "10:30", "11:00").with_address("Gym");
    let same_place = event_on(Weekday::Monday, "Same", "10:05", "11:00").with_address("office");

    assert!(oracle.check_conflict(&morning, &overlap).await.unwrap());
    assert!(oracle.check_conflict(&morning, &tight).await.unwrap());
    assert!(!oracle.check_conflict(&morning, &relaxed).await.unwrap());
    assert!(!oracle.check_conflict(&morning, &same_place).await.unwrap());

    let verdict = oracle.verdict(&morning, &tight).await.unwrap();
    assert_eq!(
        verdict.reason.as_deref(),
        Some("Need 15 min travel time, only 10 min available")
    );

    server.stop().await;
}

#[tokio::test]
async fn test_fill_against_running_service() {
    let server = RunningServer::start(30).await;
    let scheduler = FillScheduler::new(Arc::new(server.oracle()));

    let mut planner = Planner::from_parts(
        WeeklySchedule::new(),
        Waitlist::from_events(vec![
            event_on(Weekday::Tuesday, "Standup", "09:00", "09:15").with_address("Office"),
            event_on(Weekday::Tuesday, "Lunch", "12:00", "13:00").with_address("Cafe"),
            event_on(Weekday::Thursday, "Class", "18:00", "19:00").with_address("Campus"),
            event_on(Weekday::Thursday, "Dinner", "19:10", "20:00").with_address("Downtown"),
        ]),
    );

    let report = planner.fill(&scheduler).await;

    assert!(report.has_conflict());
    let conflict = planner.pending_conflict().unwrap();
    assert_eq!(conflict.day(), Weekday::Thursday);
    assert_eq!(titles(planner.schedule(), Weekday::Tuesday), ["Standup", "Lunch"]);

    let resolution = planner.confirm_with(1).unwrap();
    assert_eq!(resolution.day, Weekday::Thursday);
    assert_eq!(titles(planner.schedule(), Weekday::Thursday), ["Dinner"]);
    assert_eq!(resolution.discarded.title, "Class");
    assert!(planner.waitlist().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = RunningServer::start(15).await;

    let body: serde_json::Value = reqwest::get(format!("http://{}/api/health", server.addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");

    server.stop().await;
}
