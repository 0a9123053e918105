//! Planner aggregate
//!
//! [`Planner`] owns the schedule, the waitlist and the resolution state, and
//! exposes every mutation as an explicit command. Commands take `&mut self`,
//! so no two of them can overlap on one planner. Persistence is layered on
//! top by [`PlannerSession`].

pub mod error;
pub mod session;

use uuid::Uuid;

use crate::fill::{apply_choice, ConflictState, FillPlan, FillScheduler, Resolution};
use crate::ingest::{merge_into_waitlist_reserving, MergeReport};
use crate::metrics;
use crate::models::{EventRecord, Weekday};
use crate::schedule::{Waitlist, WeeklySchedule};

pub use error::PlannerError;
pub use session::PlannerSession;

/// Outcome of a fill command
#[derive(Debug, Clone, PartialEq)]
pub enum FillReport {
    /// All placeable events were placed
    Committed { placed: usize },

    /// Some events were placed, then the pass stopped at a conflict
    Conflict {
        placed: usize,
        day: Weekday,
        options: [EventRecord; 2],
    },
}

impl FillReport {
    /// Number of waitlist events placed by the pass
    pub fn placed(&self) -> usize {
        match self {
            Self::Committed { placed } | Self::Conflict { placed, .. } => *placed,
        }
    }

    /// Check if the pass stopped at a conflict
    pub fn has_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Outcome of confirming a conflict choice
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionReport {
    pub day: Weekday,
    pub kept: EventRecord,
    pub discarded: EventRecord,
}

/// Schedule, waitlist and pending conflict of one session
#[derive(Debug, Clone, Default)]
pub struct Planner {
    schedule: WeeklySchedule,
    waitlist: Waitlist,
    resolution: Resolution,
}

impl Planner {
    /// Create an empty planner
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a planner from restored state, with no pending conflict
    pub fn from_parts(schedule: WeeklySchedule, waitlist: Waitlist) -> Self {
        Self {
            schedule,
            waitlist,
            resolution: Resolution::Idle,
        }
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn waitlist(&self) -> &Waitlist {
        &self.waitlist
    }

    /// Pending conflict, if any
    pub fn pending_conflict(&self) -> Option<&ConflictState> {
        self.resolution.pending()
    }

    /// Run a fill pass and commit its outcome
    ///
    /// A pass started while a conflict is pending replaces that conflict
    /// (or clears it when the pass finds none).
    pub async fn fill(&mut self, scheduler: &FillScheduler) -> FillReport {
        let plan = scheduler.plan(&self.schedule, &self.waitlist).await;
        self.commit(plan)
    }

    fn commit(&mut self, plan: FillPlan) -> FillReport {
        match plan {
            FillPlan::Committed { schedule, placed } => {
                self.schedule = schedule;
                self.waitlist.remove_ids(&placed);
                self.resolution = Resolution::Idle;
                FillReport::Committed {
                    placed: placed.len(),
                }
            }
            FillPlan::Conflict {
                schedule,
                placed,
                returned,
                conflict,
            } => {
                self.schedule = schedule;
                self.waitlist.remove_ids(&placed);
                self.waitlist.extend(returned);

                let report = FillReport::Conflict {
                    placed: placed.len(),
                    day: conflict.day(),
                    options: conflict.options().clone(),
                };
                self.resolution = Resolution::AwaitingChoice(conflict);
                report
            }
        }
    }

    /// Change the selected option of the pending conflict
    pub fn select_option(&mut self, index: usize) -> Result<(), PlannerError> {
        self.resolution
            .pending_mut()
            .ok_or(PlannerError::NoPendingConflict)?
            .select(index)
    }

    /// Commit the selected option onto the conflict snapshot
    ///
    /// The unselected option is dropped for good and both options leave the
    /// waitlist. Schedule edits made since the conflict was raised are lost.
    pub fn confirm(&mut self) -> Result<ResolutionReport, PlannerError> {
        let conflict = self
            .resolution
            .take()
            .ok_or(PlannerError::NoPendingConflict)?;

        let resolved = apply_choice(conflict, &self.schedule);
        self.waitlist.remove_ids(&resolved.option_ids());
        self.schedule = resolved.schedule;

        metrics::record_resolution("confirm");
        tracing::info!(
            day = %resolved.day,
            kept = %resolved.kept.display_title(),
            discarded = %resolved.discarded.display_title(),
            "Conflict resolved"
        );

        Ok(ResolutionReport {
            day: resolved.day,
            kept: resolved.kept,
            discarded: resolved.discarded,
        })
    }

    /// Select an option and confirm it in one step
    pub fn confirm_with(&mut self, index: usize) -> Result<ResolutionReport, PlannerError> {
        self.select_option(index)?;
        self.confirm()
    }

    /// Drop the pending conflict; both options stay in the waitlist
    ///
    /// Returns whether a conflict was pending.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.resolution.take().is_some();
        if cancelled {
            metrics::record_resolution("cancel");
            tracing::info!("Conflict resolution cancelled");
        }
        cancelled
    }

    /// Add a user-entered event to the waitlist
    pub fn submit_event(&mut self, event: EventRecord) -> Uuid {
        let id = event.id;
        tracing::debug!(title = %event.display_title(), "Event added to waitlist");
        self.waitlist.push(event);
        id
    }

    /// Merge fetched events into the waitlist, dropping known signatures
    ///
    /// Fetched ids already used by the schedule, the pending conflict's
    /// snapshot or the waitlist are replaced, so an id names one event.
    pub fn merge_fetched(&mut self, events: Vec<EventRecord>) -> MergeReport {
        let mut reserved = self.schedule.event_ids();
        if let Some(conflict) = self.resolution.pending() {
            reserved.extend(conflict.schedule_snapshot().event_ids());
        }
        merge_into_waitlist_reserving(&mut self.waitlist, events, &reserved)
    }

    /// Move a scheduled event back to the waitlist
    pub fn unschedule(&mut self, id: Uuid) -> Result<Weekday, PlannerError> {
        let (day, event) = self
            .schedule
            .remove(id)
            .ok_or(PlannerError::EventNotScheduled(id))?;
        self.waitlist.push(event);
        Ok(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventDate;
    use crate::oracle::testing::ScriptedOracle;
    use std::sync::Arc;

    fn monday(title: &str, start: &str, end: &str) -> EventRecord {
        EventRecord::new(title)
            .with_date(EventDate::new(1, 15, 2024))
            .with_times(start, end)
    }

    fn conflicted_planner() -> (Planner, FillScheduler, [EventRecord; 3]) {
        let scheduler = FillScheduler::new(Arc::new(ScriptedOracle::new().conflicting("B", "C")));
        let a = monday("A", "09:00", "10:00");
        let b = monday("B", "10:00", "11:00");
        let c = monday("C", "10:30", "11:30");
        let planner = Planner::from_parts(
            WeeklySchedule::new(),
            Waitlist::from_events(vec![a.clone(), b.clone(), c.clone()]),
        );
        (planner, scheduler, [a, b, c])
    }

    #[tokio::test]
    async fn test_fill_partial_commit() {
        let (mut planner, scheduler, [a, b, c]) = conflicted_planner();

        let report = planner.fill(&scheduler).await;
        assert!(report.has_conflict());
        assert_eq!(report.placed(), 1);

        assert_eq!(planner.schedule().day(Weekday::Monday), &[a]);
        let waiting: Vec<Uuid> = planner.waitlist().iter().map(|e| e.id).collect();
        assert_eq!(waiting, [b.id, c.id]);
        assert!(planner.pending_conflict().is_some());
    }

    #[tokio::test]
    async fn test_confirm_and_cancel_need_pending_conflict() {
        let mut planner = Planner::new();
        assert_eq!(planner.confirm().unwrap_err(), PlannerError::NoPendingConflict);
        assert_eq!(planner.select_option(0), Err(PlannerError::NoPendingConflict));
        assert!(!planner.cancel());
    }

    #[tokio::test]
    async fn test_confirm_second_option() {
        let (mut planner, scheduler, [_, b, c]) = conflicted_planner();
        planner.fill(&scheduler).await;

        let report = planner.confirm_with(1).unwrap();
        assert_eq!(report.kept.id, c.id);
        assert_eq!(report.discarded.id, b.id);

        let titles: Vec<_> = planner
            .schedule()
            .day(Weekday::Monday)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, ["A", "C"]);
        assert!(planner.waitlist().is_empty());
        assert!(planner.pending_conflict().is_none());
    }

    #[tokio::test]
    async fn test_invalid_selection_keeps_conflict() {
        let (mut planner, scheduler, _) = conflicted_planner();
        planner.fill(&scheduler).await;

        assert_eq!(
            planner.confirm_with(5).unwrap_err(),
            PlannerError::InvalidSelection { index: 5 }
        );
        assert!(planner.pending_conflict().is_some());
    }

    #[tokio::test]
    async fn test_cancel_keeps_partial_commit() {
        let (mut planner, scheduler, _) = conflicted_planner();
        planner.fill(&scheduler).await;
        let schedule = planner.schedule().clone();

        assert!(planner.cancel());
        assert_eq!(planner.schedule(), &schedule);
        assert_eq!(planner.waitlist().len(), 2);
    }

    #[tokio::test]
    async fn test_unschedule_moves_back_to_waitlist() {
        let mut planner = Planner::new();
        let event = monday("A", "09:00", "10:00");
        let id = planner.submit_event(event);
        planner
            .fill(&FillScheduler::new(Arc::new(ScriptedOracle::new())))
            .await;
        assert!(planner.waitlist().is_empty());

        assert_eq!(planner.unschedule(id), Ok(Weekday::Monday));
        assert!(planner.waitlist().contains(id));
        assert!(planner.schedule().is_empty());
        assert_eq!(planner.unschedule(id), Err(PlannerError::EventNotScheduled(id)));
    }
}
