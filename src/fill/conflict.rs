//! Pending conflict and its resolution
//!
//! At most one conflict is pending at a time. It carries the schedule as the
//! fill pass left it (both options removed from the conflict day), and a
//! confirmed choice is committed onto that snapshot. Edits made to the live
//! schedule while the conflict was pending are therefore lost on confirm.
//! [`resolution_base`] is the single place that decides the commit base.

use std::collections::HashSet;

use crate::models::{EventRecord, Weekday};
use crate::planner::PlannerError;
use crate::schedule::WeeklySchedule;

/// A conflict awaiting the user's choice
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictState {
    day: Weekday,
    options: [EventRecord; 2],
    schedule_snapshot: WeeklySchedule,
    selected: usize,
}

impl ConflictState {
    /// Create a conflict with the first option selected
    pub fn new(day: Weekday, options: [EventRecord; 2], schedule_snapshot: WeeklySchedule) -> Self {
        Self {
            day,
            options,
            schedule_snapshot,
            selected: 0,
        }
    }

    /// Day the conflict occurred on
    pub fn day(&self) -> Weekday {
        self.day
    }

    /// The conflicting pair, earlier start first
    pub fn options(&self) -> &[EventRecord; 2] {
        &self.options
    }

    /// Schedule captured when the conflict was found
    pub fn schedule_snapshot(&self) -> &WeeklySchedule {
        &self.schedule_snapshot
    }

    /// Index of the currently selected option
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The currently selected option
    pub fn selected_option(&self) -> &EventRecord {
        &self.options[self.selected]
    }

    /// Change the selection
    pub fn select(&mut self, index: usize) -> Result<(), PlannerError> {
        if index >= self.options.len() {
            return Err(PlannerError::InvalidSelection { index });
        }
        self.selected = index;
        Ok(())
    }
}

/// Resolution state machine
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Resolution {
    #[default]
    Idle,
    AwaitingChoice(ConflictState),
}

impl Resolution {
    /// Pending conflict, if any
    pub fn pending(&self) -> Option<&ConflictState> {
        match self {
            Self::Idle => None,
            Self::AwaitingChoice(conflict) => Some(conflict),
        }
    }

    /// Mutable access to the pending conflict
    pub fn pending_mut(&mut self) -> Option<&mut ConflictState> {
        match self {
            Self::Idle => None,
            Self::AwaitingChoice(conflict) => Some(conflict),
        }
    }

    /// Check if a conflict is awaiting a choice
    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    /// Take the pending conflict, leaving the machine idle
    pub fn take(&mut self) -> Option<ConflictState> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::AwaitingChoice(conflict) => Some(conflict),
        }
    }
}

/// Schedule a confirmed choice is committed onto
///
/// Always the snapshot taken when the conflict was raised; `live` is ignored.
pub fn resolution_base(conflict: &ConflictState, _live: &WeeklySchedule) -> WeeklySchedule {
    conflict.schedule_snapshot.clone()
}

/// Outcome of applying a choice
#[derive(Debug, Clone)]
pub struct ResolvedConflict {
    pub day: Weekday,
    pub schedule: WeeklySchedule,
    pub kept: EventRecord,
    pub discarded: EventRecord,
}

impl ResolvedConflict {
    /// Ids of both options, which must leave the waitlist
    pub fn option_ids(&self) -> HashSet<uuid::Uuid> {
        [self.kept.id, self.discarded.id].into_iter().collect()
    }
}

/// Place the selected option on the conflict day of the resolution base
pub fn apply_choice(conflict: ConflictState, live: &WeeklySchedule) -> ResolvedConflict {
    let mut schedule = resolution_base(&conflict, live);
    let ConflictState {
        day,
        options: [first, second],
        selected,
        ..
    } = conflict;

    let (kept, discarded) = if selected == 0 {
        (first, second)
    } else {
        (second, first)
    };

    schedule.insert(day, kept.clone());

    ResolvedConflict {
        day,
        schedule,
        kept,
        discarded,
    }
}
