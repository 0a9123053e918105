//! Planner with save-after-mutate persistence
//!
//! State is loaded once when the session opens. Every command that changes
//! the schedule or the waitlist writes the changed blob back; write failures
//! are logged and counted but never undo the in-memory change.

use uuid::Uuid;

use super::{FillReport, Planner, PlannerError, ResolutionReport};
use crate::fill::{ConflictState, FillScheduler};
use crate::ingest::MergeReport;
use crate::metrics;
use crate::models::{EventRecord, Weekday};
use crate::storage::{self, StateStore, SCHEDULE_KEY, WAITLIST_KEY};

/// A planner bound to a state store
pub struct PlannerSession<S: StateStore> {
    planner: Planner,
    store: S,
}

impl<S: StateStore> PlannerSession<S> {
    /// Open a session, restoring schedule and waitlist from the store
    pub fn open(store: S) -> Self {
        let schedule = storage::load_schedule(&store);
        let waitlist = storage::load_waitlist(&store);

        tracing::info!(
            scheduled = schedule.len(),
            waiting = waitlist.len(),
            "Planner state loaded"
        );

        Self {
            planner: Planner::from_parts(schedule, waitlist),
            store,
        }
    }

    /// Read-only view of the planner
    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending_conflict(&self) -> Option<&ConflictState> {
        self.planner.pending_conflict()
    }

    /// Run a fill pass and persist the result
    pub async fn fill(&mut self, scheduler: &FillScheduler) -> FillReport {
        let report = self.planner.fill(scheduler).await;
        self.persist_all();
        report
    }

    pub fn select_option(&mut self, index: usize) -> Result<(), PlannerError> {
        self.planner.select_option(index)
    }

    /// Confirm the selected option and persist
    pub fn confirm(&mut self) -> Result<ResolutionReport, PlannerError> {
        let report = self.planner.confirm()?;
        self.persist_all();
        Ok(report)
    }

    /// Select an option, confirm it and persist
    pub fn confirm_with(&mut self, index: usize) -> Result<ResolutionReport, PlannerError> {
        let report = self.planner.confirm_with(index)?;
        self.persist_all();
        Ok(report)
    }

    /// Drop the pending conflict; schedule and waitlist are unchanged
    pub fn cancel(&mut self) -> bool {
        self.planner.cancel()
    }

    /// Add a user-entered event and persist the waitlist
    pub fn submit_event(&mut self, event: EventRecord) -> Uuid {
        let id = self.planner.submit_event(event);
        self.persist_waitlist();
        id
    }

    /// Merge fetched events and persist the waitlist
    pub fn merge_fetched(&mut self, events: Vec<EventRecord>) -> MergeReport {
        let report = self.planner.merge_fetched(events);
        if report.added > 0 {
            self.persist_waitlist();
        }
        report
    }

    /// Move a scheduled event back to the waitlist and persist
    pub fn unschedule(&mut self, id: Uuid) -> Result<Weekday, PlannerError> {
        let day = self.planner.unschedule(id)?;
        self.persist_all();
        Ok(day)
    }

    fn persist_all(&self) {
        self.persist_schedule();
        self.persist_waitlist();
    }

    fn persist_schedule(&self) {
        if let Err(e) = storage::save_schedule(&self.store, self.planner.schedule()) {
            tracing::error!(key = SCHEDULE_KEY, error = %e, "Failed to persist schedule");
            metrics::record_persistence_failure(SCHEDULE_KEY);
        }
    }

    fn persist_waitlist(&self) {
        if let Err(e) = storage::save_waitlist(&self.store, self.planner.waitlist()) {
            tracing::error!(key = WAITLIST_KEY, error = %e, "Failed to persist waitlist");
            metrics::record_persistence_failure(WAITLIST_KEY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventDate;
    use crate::oracle::testing::ScriptedOracle;
    use crate::storage::{MemoryStateStore, StorageError};
    use std::sync::Arc;

    struct ReadOnlyStore;

    impl StateStore for ReadOnlyStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    fn tuesday(title: &str) -> EventRecord {
        EventRecord::new(title)
            .with_date(EventDate::new(1, 16, 2024))
            .with_times("09:00", "10:00")
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let mut session = PlannerSession::open(MemoryStateStore::new());
        session.submit_event(tuesday("Planning"));
        session.submit_event(EventRecord::new("Someday"));
        session
            .fill(&FillScheduler::new(Arc::new(ScriptedOracle::new())))
            .await;

        let PlannerSession { store, .. } = session;
        let reopened = PlannerSession::open(store);

        assert_eq!(reopened.planner().schedule().day(Weekday::Tuesday).len(), 1);
        assert_eq!(reopened.planner().waitlist().len(), 1);
        assert!(reopened.pending_conflict().is_none());
    }

    #[tokio::test]
    async fn test_write_failures_are_not_fatal() {
        let mut session = PlannerSession::open(ReadOnlyStore);
        session.submit_event(tuesday("Planning"));
        let report = session
            .fill(&FillScheduler::new(Arc::new(ScriptedOracle::new())))
            .await;

        assert_eq!(report.placed(), 1);
        assert_eq!(session.planner().schedule().len(), 1);
    }
}
