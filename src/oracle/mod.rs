//! Conflict oracle
//!
//! The oracle is the single authority on whether two events can both be
//! attended, taking travel time between their locations into account. The
//! fill scheduler treats it as a fallible async predicate and applies the
//! fail-safe rule itself: any error counts as a conflict.
//!
//! # Modules
//!
//! - [`client`] - HTTP adapter to a remote oracle service
//! - [`local`] - in-process travel-aware evaluator
//! - [`api`] / [`server`] - HTTP service exposing the local evaluator
//!
//! # Wire format
//!
//! ```text
//! POST /api/events/conflict
//! {"first": Event, "second": Event}  ->  {"conflict": bool, "reason"?: string}
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod local;
pub mod server;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::EventRecord;

pub use client::{HttpConflictOracle, OracleClientConfig};
pub use error::{OracleError, OracleResult};
pub use local::{FixedTravelEstimate, TravelAwareOracle, TravelTimeEstimator};
pub use server::{OracleServer, ServerError};

/// Authority on whether two events conflict
#[async_trait]
pub trait ConflictOracle: Send + Sync {
    /// Decide whether `first` and `second` conflict
    ///
    /// `first` starts no later than `second` when called by the fill scheduler.
    async fn check_conflict(&self, first: &EventRecord, second: &EventRecord)
        -> OracleResult<bool>;
}

/// Oracle answer, as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictVerdict {
    pub conflict: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConflictVerdict {
    /// No conflict
    pub fn clear() -> Self {
        Self {
            conflict: false,
            reason: None,
        }
    }

    /// Conflict with an explanation
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self {
            conflict: true,
            reason: Some(reason.into()),
        }
    }
}
