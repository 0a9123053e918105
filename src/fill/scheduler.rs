//! Fill pass
//!
//! A pass never mutates planner state. It computes a [`FillPlan`] that the
//! caller commits in one step, so a pass abandoned mid-way (for example while
//! awaiting the oracle) leaves nothing half-applied.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::conflict::ConflictState;
use super::placement::placement_day;
use crate::metrics;
use crate::models::{EventRecord, Weekday};
use crate::oracle::{ConflictOracle, OracleError};
use crate::schedule::{Waitlist, WeeklySchedule};

/// Result of a fill pass
#[derive(Debug, Clone)]
pub enum FillPlan {
    /// Every placeable event was placed without conflict
    Committed {
        schedule: WeeklySchedule,
        /// Candidates to remove from the waitlist
        placed: HashSet<Uuid>,
    },

    /// The pass stopped at a conflict
    Conflict {
        /// Provisional schedule with both options removed from the conflict day
        schedule: WeeklySchedule,
        /// Candidates that made it into `schedule`
        placed: HashSet<Uuid>,
        /// Options that were already scheduled before the pass and must go
        /// back to the waitlist
        returned: Vec<EventRecord>,
        conflict: ConflictState,
    },
}

impl FillPlan {
    /// Schedule to commit
    pub fn schedule(&self) -> &WeeklySchedule {
        match self {
            Self::Committed { schedule, .. } | Self::Conflict { schedule, .. } => schedule,
        }
    }

    /// Candidates placed by this pass
    pub fn placed(&self) -> &HashSet<Uuid> {
        match self {
            Self::Committed { placed, .. } | Self::Conflict { placed, .. } => placed,
        }
    }

    /// Conflict raised by this pass, if any
    pub fn conflict(&self) -> Option<&ConflictState> {
        match self {
            Self::Committed { .. } => None,
            Self::Conflict { conflict, .. } => Some(conflict),
        }
    }
}

/// Pull the conflicting pair at `index` out of `day` and build the paused plan
fn halt_at_conflict(
    mut provisional: WeeklySchedule,
    candidates: &HashSet<Uuid>,
    day: Weekday,
    index: usize,
) -> FillPlan {
    let first = provisional.day(day)[index].clone();
    let second = provisional.day(day)[index + 1].clone();
    let pair: HashSet<Uuid> = [first.id, second.id].into_iter().collect();

    provisional.remove_from_day(day, &pair);
    // Later days were never sorted in this pass
    for later in Weekday::ALL.into_iter().filter(|d| *d > day) {
        provisional.sort_day(later);
    }

    let returned: Vec<EventRecord> = [&first, &second]
        .into_iter()
        .filter(|event| !candidates.contains(&event.id))
        .cloned()
        .collect();

    let placed: HashSet<Uuid> = provisional
        .event_ids()
        .intersection(candidates)
        .copied()
        .collect();

    tracing::info!(
        %day,
        first = %first.display_title(),
        second = %second.display_title(),
        placed = placed.len(),
        "Fill pass halted at conflict"
    );
    metrics::record_fill_pass("conflict", placed.len());

    FillPlan::Conflict {
        conflict: ConflictState::new(day, [first, second], provisional.clone()),
        schedule: provisional,
        placed,
        returned,
    }
}

/// Runs fill passes against a conflict oracle
#[derive(Clone)]
pub struct FillScheduler {
    oracle: Arc<dyn ConflictOracle>,
    oracle_timeout: Option<Duration>,
}

impl FillScheduler {
    /// Create a scheduler without a per-call timeout
    pub fn new(oracle: Arc<dyn ConflictOracle>) -> Self {
        Self {
            oracle,
            oracle_timeout: None,
        }
    }

    /// Bound each oracle call; an elapsed call counts as a conflict
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = Some(timeout);
        self
    }

    /// Per-call oracle timeout, if any
    pub fn oracle_timeout(&self) -> Option<Duration> {
        self.oracle_timeout
    }

    /// Run one fill pass over `schedule` and `waitlist`
    pub async fn plan(&self, schedule: &WeeklySchedule, waitlist: &Waitlist) -> FillPlan {
        let mut provisional = schedule.clone();
        let mut candidates = HashSet::new();

        for event in waitlist {
            let Some(day) = placement_day(event) else {
                continue;
            };
            // Already on the grid: only the waitlist copy needs to go
            if !schedule.contains(event.id) {
                provisional.push_unsorted(day, event.clone());
            }
            candidates.insert(event.id);
        }

        tracing::debug!(
            candidates = candidates.len(),
            waitlist = waitlist.len(),
            "Starting fill pass"
        );

        for day in Weekday::ALL {
            provisional.sort_day(day);

            let Some(index) = self.first_conflict(day, provisional.day(day)).await else {
                continue;
            };

            return halt_at_conflict(provisional, &candidates, day, index);
        }

        metrics::record_fill_pass("committed", candidates.len());
        tracing::info!(placed = candidates.len(), "Fill pass committed");

        FillPlan::Committed {
            schedule: provisional,
            placed: candidates,
        }
    }

    /// Index of the first adjacent pair the oracle flags, scanning in order
    async fn first_conflict(&self, day: Weekday, events: &[EventRecord]) -> Option<usize> {
        for (index, pair) in events.windows(2).enumerate() {
            if self.check_pair(day, &pair[0], &pair[1]).await {
                return Some(index);
            }
        }
        None
    }

    /// Ask the oracle about one pair; failures and timeouts count as conflicts
    async fn check_pair(&self, day: Weekday, first: &EventRecord, second: &EventRecord) -> bool {
        let started = Instant::now();

        let result = match self.oracle_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.oracle.check_conflict(first, second)).await {
                    Ok(result) => result,
                    Err(_) => Err(OracleError::Timeout(limit)),
                }
            }
            None => self.oracle.check_conflict(first, second).await,
        };
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(conflict) => {
                metrics::record_oracle_check(if conflict { "conflict" } else { "clear" }, elapsed);
                tracing::debug!(
                    %day,
                    first = %first.display_title(),
                    second = %second.display_title(),
                    conflict,
                    "Oracle verdict"
                );
                conflict
            }
            Err(e) => {
                metrics::record_oracle_check("failed", elapsed);
                tracing::warn!(
                    %day,
                    first = %first.display_title(),
                    second = %second.display_title(),
                    error = %e,
                    "Oracle check failed, treating pair as conflicting"
                );
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventDate;
    use crate::oracle::testing::ScriptedOracle;
    use crate::oracle::OracleResult;
    use async_trait::async_trait;

    // Week of 2024-01-15 (Monday) to 2024-01-19 (Friday)
    fn on(day: u32, title: &str, start: &str, end: &str) -> EventRecord {
        EventRecord::new(title)
            .with_date(EventDate::new(1, i64::from(day), 2024))
            .with_times(start, end)
    }

    fn titles(schedule: &WeeklySchedule, day: Weekday) -> Vec<String> {
        schedule.day(day).iter().map(|e| e.title.clone()).collect()
    }

    struct SlowOracle;

    #[async_trait]
    impl ConflictOracle for SlowOracle {
        async fn check_conflict(&self, _: &EventRecord, _: &EventRecord) -> OracleResult<bool> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_empty_waitlist_commits_unchanged() {
        let scheduler = FillScheduler::new(Arc::new(ScriptedOracle::new()));
        let mut schedule = WeeklySchedule::new();
        schedule.insert(Weekday::Monday, on(15, "A", "09:00", "10:00"));

        let plan = scheduler.plan(&schedule, &Waitlist::new()).await;
        assert!(plan.conflict().is_none());
        assert_eq!(plan.schedule(), &schedule);
        assert!(plan.placed().is_empty());
    }

    #[tokio::test]
    async fn test_commit_places_by_weekday_and_sorts() {
        let oracle = Arc::new(ScriptedOracle::new());
        let scheduler = FillScheduler::new(oracle.clone());
        let waitlist = Waitlist::from_events(vec![
            on(15, "Late", "14:00", "15:00"),
            on(17, "Wed", "09:00", "10:00"),
            on(15, "Early", "08:00", "09:00"),
            EventRecord::new("Someday"),
        ]);

        let plan = scheduler.plan(&WeeklySchedule::new(), &waitlist).await;
        let FillPlan::Committed { schedule, placed } = plan else {
            panic!("expected a committed plan");
        };

        assert_eq!(titles(&schedule, Weekday::Monday), ["Early", "Late"]);
        assert_eq!(titles(&schedule, Weekday::Wednesday), ["Wed"]);
        assert_eq!(placed.len(), 3);
        assert_eq!(oracle.calls(), [("Early".to_string(), "Late".to_string())]);
    }

    #[tokio::test]
    async fn test_halts_at_first_conflict() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .conflicting("B", "C")
                .conflicting("Tue1", "Tue2"),
        );
        let scheduler = FillScheduler::new(oracle.clone());
        let a = on(15, "A", "09:00", "10:00");
        let b = on(15, "B", "10:00", "11:00");
        let c = on(15, "C", "10:30", "11:30");
        let waitlist = Waitlist::from_events(vec![c.clone(), a.clone(), b.clone()]);

        let plan = scheduler.plan(&WeeklySchedule::new(), &waitlist).await;
        let FillPlan::Conflict {
            schedule,
            placed,
            returned,
            conflict,
        } = plan
        else {
            panic!("expected a conflict");
        };

        assert_eq!(titles(&schedule, Weekday::Monday), ["A"]);
        assert_eq!(placed, HashSet::from([a.id]));
        assert!(returned.is_empty());
        assert_eq!(conflict.day(), Weekday::Monday);
        assert_eq!(conflict.options()[0].id, b.id);
        assert_eq!(conflict.options()[1].id, c.id);
        assert_eq!(conflict.schedule_snapshot(), &schedule);
        assert_eq!(oracle.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_later_days_not_checked_after_conflict() {
        let oracle = Arc::new(ScriptedOracle::new().conflicting("M1", "M2"));
        let scheduler = FillScheduler::new(oracle.clone());
        let waitlist = Waitlist::from_events(vec![
            on(15, "M1", "09:00", "10:00"),
            on(15, "M2", "09:30", "10:30"),
            on(19, "F2", "13:00", "14:00"),
            on(19, "F1", "11:00", "12:00"),
        ]);

        let plan = scheduler.plan(&WeeklySchedule::new(), &waitlist).await;

        assert_eq!(oracle.calls(), [("M1".to_string(), "M2".to_string())]);
        // Later buckets are part of the provisional schedule and come back sorted
        assert_eq!(titles(plan.schedule(), Weekday::Friday), ["F1", "F2"]);
        assert_eq!(plan.placed().len(), 2);
        assert!(plan.schedule().is_ordered());
    }

    #[tokio::test]
    async fn test_oracle_failure_is_conflict() {
        let oracle = Arc::new(ScriptedOracle::new().failing("A", "B"));
        let scheduler = FillScheduler::new(oracle);
        let waitlist = Waitlist::from_events(vec![
            on(16, "A", "09:00", "10:00"),
            on(16, "B", "12:00", "13:00"),
        ]);

        let plan = scheduler.plan(&WeeklySchedule::new(), &waitlist).await;
        let conflict = plan.conflict().expect("failure must halt the pass");
        assert_eq!(conflict.day(), Weekday::Tuesday);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oracle_timeout_is_conflict() {
        let scheduler =
            FillScheduler::new(Arc::new(SlowOracle)).with_oracle_timeout(Duration::from_secs(1));
        let waitlist = Waitlist::from_events(vec![
            on(18, "A", "09:00", "10:00"),
            on(18, "B", "12:00", "13:00"),
        ]);

        let plan = scheduler.plan(&WeeklySchedule::new(), &waitlist).await;
        assert_eq!(plan.conflict().map(ConflictState::day), Some(Weekday::Thursday));
    }

    #[tokio::test]
    async fn test_scheduled_option_is_returned_to_waitlist() {
        let oracle = Arc::new(ScriptedOracle::new().conflicting("Existing", "New"));
        let scheduler = FillScheduler::new(oracle);

        let existing = on(15, "Existing", "09:00", "10:00");
        let mut schedule = WeeklySchedule::new();
        schedule.insert(Weekday::Monday, existing.clone());
        let waitlist = Waitlist::from_events(vec![on(15, "New", "09:30", "10:30")]);

        let FillPlan::Conflict {
            schedule, returned, ..
        } = scheduler.plan(&schedule, &waitlist).await
        else {
            panic!("expected a conflict");
        };

        assert!(schedule.day(Weekday::Monday).is_empty());
        assert_eq!(returned.len(), 1);
        assert_eq!(returned[0].id, existing.id);
    }
}
