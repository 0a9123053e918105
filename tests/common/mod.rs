//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use weekfill::models::{EventDate, EventRecord, Weekday};
use weekfill::oracle::{ConflictOracle, OracleError, OracleResult};
use weekfill::schedule::WeeklySchedule;

/// Calendar day in the week of 2024-01-15 (Monday) to 2024-01-19 (Friday)
pub fn date_for(day: Weekday) -> EventDate {
    let offset = Weekday::ALL.iter().position(|d| *d == day).unwrap_or(0) as i64;
    EventDate::new(1, 15 + offset, 2024)
}

/// Create a placeable event on a weekday
pub fn event_on(day: Weekday, title: &str, start: &str, end: &str) -> EventRecord {
    EventRecord::new(title)
        .with_date(date_for(day))
        .with_times(start, end)
}

/// Titles of a day's bucket, in order
pub fn titles(schedule: &WeeklySchedule, day: Weekday) -> Vec<String> {
    schedule.day(day).iter().map(|e| e.title.clone()).collect()
}

/// Oracle answering from a fixed table of title pairs
#[derive(Default)]
pub struct ScriptedOracle {
    conflicts: HashSet<(String, String)>,
    failures: HashSet<(String, String)>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a conflict for `(first, second)`
    pub fn conflicting(mut self, first: &str, second: &str) -> Self {
        self.conflicts.insert((first.to_string(), second.to_string()));
        self
    }

    /// Fail the call for `(first, second)`
    pub fn failing(mut self, first: &str, second: &str) -> Self {
        self.failures.insert((first.to_string(), second.to_string()));
        self
    }

    /// Pairs asked so far, in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConflictOracle for ScriptedOracle {
    async fn check_conflict(&self, first: &EventRecord, second: &EventRecord) -> OracleResult<bool> {
        let key = (first.title.clone(), second.title.clone());
        self.calls.lock().unwrap().push(key.clone());

        if self.failures.contains(&key) {
            return Err(OracleError::HttpStatus {
                status: 503,
                message: "scripted failure".to_string(),
            });
        }
        Ok(self.conflicts.contains(&key))
    }
}
