//! Durable planner state
//!
//! Schedule and waitlist are persisted as two independent JSON blobs under
//! fixed keys. Reads are tolerant: a missing, unreadable or type-mismatched
//! blob yields an empty value and a log line, never an error. Writes are best
//! effort; callers log and count failures but keep their in-memory state.
//!
//! # Example
//!
//! ```no_run
//! use weekfill::storage::{self, FileStateStore};
//!
//! # fn example() -> Result<(), weekfill::storage::StorageError> {
//! let store = FileStateStore::new("data/state")?;
//! let schedule = storage::load_schedule(&store);
//! let waitlist = storage::load_waitlist(&store);
//! storage::save_schedule(&store, &schedule)?;
//! # let _ = waitlist;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod dedup;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

use crate::metrics;
use crate::schedule::{Waitlist, WeeklySchedule};

pub use codec::{decode_schedule, decode_waitlist};
pub use dedup::EventSignature;
pub use state::{FileStateStore, MemoryStateStore};

/// Key of the schedule blob
pub const SCHEDULE_KEY: &str = "schedule-state";

/// Key of the waitlist blob
pub const WAITLIST_KEY: &str = "waitlist-state";

/// Persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid state key: {0}")]
    InvalidKey(String),

    #[error("State store lock poisoned")]
    Poisoned,
}

/// Key-value store for serialized planner state
pub trait StateStore: Send + Sync {
    /// Raw blob under `key`, `None` when nothing was stored yet
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn read_blob(store: &dyn StateStore, key: &str) -> Option<String> {
    match store.read(key) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to read state, starting empty");
            metrics::record_persistence_failure(key);
            None
        }
    }
}

/// Load the schedule, falling back to an empty one
pub fn load_schedule(store: &dyn StateStore) -> WeeklySchedule {
    read_blob(store, SCHEDULE_KEY)
        .map(|raw| decode_schedule(&raw))
        .unwrap_or_default()
}

/// Load the waitlist, falling back to an empty one
pub fn load_waitlist(store: &dyn StateStore) -> Waitlist {
    read_blob(store, WAITLIST_KEY)
        .map(|raw| decode_waitlist(&raw))
        .unwrap_or_default()
}

/// Persist the schedule
pub fn save_schedule(store: &dyn StateStore, schedule: &WeeklySchedule) -> Result<(), StorageError> {
    let blob = serde_json::to_string_pretty(schedule)?;
    store.write(SCHEDULE_KEY, &blob)
}

/// Persist the waitlist
pub fn save_waitlist(store: &dyn StateStore, waitlist: &Waitlist) -> Result<(), StorageError> {
    let blob = serde_json::to_string_pretty(waitlist)?;
    store.write(WAITLIST_KEY, &blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventDate, EventRecord, Weekday};

    #[test]
    fn test_missing_blobs_load_empty() {
        let store = MemoryStateStore::new();
        assert!(load_schedule(&store).is_empty());
        assert!(load_waitlist(&store).is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let store = MemoryStateStore::new();

        let mut schedule = WeeklySchedule::new();
        let event = EventRecord::new("Review")
            .with_date(EventDate::new(1, 16, 2024))
            .with_times("14:00", "15:00");
        schedule.insert(Weekday::Tuesday, event.clone());

        let waitlist = Waitlist::from_events(vec![EventRecord::new("Later")]);

        save_schedule(&store, &schedule).unwrap();
        save_waitlist(&store, &waitlist).unwrap();

        let restored = load_schedule(&store);
        assert_eq!(restored.day(Weekday::Tuesday), &[event]);
        assert_eq!(load_waitlist(&store), waitlist);
    }

    #[test]
    fn test_corrupt_blobs_load_empty() {
        let store = MemoryStateStore::new();
        store.write(SCHEDULE_KEY, "{not json").unwrap();
        store.write(WAITLIST_KEY, r#"{"Monday": []}"#).unwrap();

        assert!(load_schedule(&store).is_empty());
        assert!(load_waitlist(&store).is_empty());
    }
}
