//! weekfill - weekly event planner
//!
//! Places pending events from a waitlist onto a Monday-Friday grid, asking a
//! travel-aware conflict oracle about every adjacent pair and pausing on the
//! first conflict for a human decision.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`] - Event records, dates and weekdays
//! - [`schedule`] - Weekly schedule and waitlist stores
//! - [`fill`] - Fill pass and conflict resolution
//! - [`planner`] - Owned planner state and its commands
//! - [`oracle`] - Conflict oracle client, evaluator and HTTP service
//! - [`ingest`] - Manual, bulk and URL-based event ingestion
//! - [`storage`] - Persisted planner state
//! - [`config`] - Configuration management and settings
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use weekfill::fill::FillScheduler;
//! use weekfill::oracle::HttpConflictOracle;
//! use weekfill::planner::PlannerSession;
//! use weekfill::storage::FileStateStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let oracle = HttpConflictOracle::from_url("http://localhost:8080/api/events/conflict")?;
//!     let scheduler = FillScheduler::new(Arc::new(oracle));
//!     let mut session = PlannerSession::open(FileStateStore::new("data/state")?);
//!
//!     let report = session.fill(&scheduler).await;
//!     if report.has_conflict() {
//!         session.confirm_with(0)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fill;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod oracle;
pub mod planner;
pub mod schedule;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, WeekfillErrorTrait};
    pub use crate::fill::{ConflictState, FillScheduler};
    pub use crate::models::{EventDate, EventRecord, Weekday};
    pub use crate::oracle::{ConflictOracle, HttpConflictOracle, TravelAwareOracle};
    pub use crate::planner::{FillReport, Planner, PlannerSession};
    pub use crate::schedule::{Waitlist, WeeklySchedule};
    pub use crate::storage::{FileStateStore, MemoryStateStore, StateStore};
}

// Direct re-exports for convenience
pub use models::{EventDate, EventRecord, Weekday};
