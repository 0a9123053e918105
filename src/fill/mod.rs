//! Waitlist-to-schedule fill
//!
//! A fill pass tries to place every placeable waitlist event onto the weekly
//! grid. Adjacent events on each day are checked with the conflict oracle in
//! order, Monday first; the pass stops at the first conflict and hands the
//! pair to the user through a [`ConflictState`].
//!
//! - [`placement`] - which events can be placed and on which day
//! - [`scheduler`] - the fill pass itself
//! - [`conflict`] - the pending conflict and how a choice is applied

pub mod conflict;
pub mod placement;
pub mod scheduler;

pub use conflict::{apply_choice, resolution_base, ConflictState, Resolution, ResolvedConflict};
pub use placement::{is_placeable, target_day};
pub use scheduler::{FillPlan, FillScheduler};
