//! Schedule and waitlist stores
//!
//! - [`week`] - the five ordered day buckets of accepted events
//! - [`waitlist`] - events that have not been placed yet
//!
//! Placement is a move: an event lives either in the waitlist or in exactly
//! one day bucket, tracked by [`EventRecord::id`](crate::models::EventRecord).

pub mod waitlist;
pub mod week;

pub use waitlist::Waitlist;
pub use week::{sort_by_start, WeeklySchedule};
