//! Planner command errors
//!
//! Every variant is a failed precondition; the planner state is left untouched.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("No conflict is awaiting a choice")]
    NoPendingConflict,

    #[error("Option {index} is out of range (expected 0 or 1)")]
    InvalidSelection { index: usize },

    #[error("Event {0} is not scheduled")]
    EventNotScheduled(Uuid),
}
