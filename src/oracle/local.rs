//! In-process travel-aware conflict evaluator
//!
//! Two events conflict when their time ranges overlap. When they do not
//! overlap but both have an address, the gap between the earlier event's end
//! and the later event's start must cover the travel time between the two
//! locations. Events missing a parsable time never overlap.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ConflictOracle, ConflictVerdict, OracleError, OracleResult};
use crate::models::EventRecord;

/// Default travel estimate used when no routing data is available
pub const DEFAULT_TRAVEL_MINUTES: u32 = 15;

/// Memoised address pairs kept before the cache is reset
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Source of travel times between two addresses
#[async_trait]
pub trait TravelTimeEstimator: Send + Sync {
    /// Minutes needed to get from `from` to `to`
    async fn travel_minutes(&self, from: &str, to: &str) -> OracleResult<u32>;
}

/// Same estimate for every pair of distinct addresses, memoised per pair
///
/// The memo holds at most `capacity` pairs; inserting into a full memo
/// resets it.
pub struct FixedTravelEstimate {
    minutes: u32,
    capacity: usize,
    cache: RwLock<HashMap<(String, String), u32>>,
}

impl FixedTravelEstimate {
    /// Create an estimator returning `minutes` for distinct addresses
    pub fn new(minutes: u32) -> Self {
        Self::with_capacity(minutes, DEFAULT_CACHE_CAPACITY)
    }

    /// Create an estimator whose memo holds at most `capacity` pairs
    pub fn with_capacity(minutes: u32, capacity: usize) -> Self {
        Self {
            minutes,
            capacity: capacity.max(1),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of memoised address pairs
    pub async fn cached_pairs(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Drop memoised estimates
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        tracing::info!("Travel time cache cleared");
    }
}

impl Default for FixedTravelEstimate {
    fn default() -> Self {
        Self::new(DEFAULT_TRAVEL_MINUTES)
    }
}

#[async_trait]
impl TravelTimeEstimator for FixedTravelEstimate {
    async fn travel_minutes(&self, from: &str, to: &str) -> OracleResult<u32> {
        if from.is_empty() || to.is_empty() {
            return Err(OracleError::TravelTime {
                from: from.to_string(),
                to: to.to_string(),
                reason: "Addresses cannot be empty".to_string(),
            });
        }

        if from.eq_ignore_ascii_case(to) {
            return Ok(0);
        }

        let key = (from.to_string(), to.to_string());
        if let Some(minutes) = self.cache.read().await.get(&key) {
            tracing::debug!(from, to, "Cache hit for travel time");
            return Ok(*minutes);
        }

        let mut cache = self.cache.write().await;
        if cache.len() >= self.capacity && !cache.contains_key(&key) {
            tracing::debug!(capacity = self.capacity, "Travel time cache full, resetting");
            cache.clear();
        }
        cache.insert(key, self.minutes);
        Ok(self.minutes)
    }
}

/// Conflict oracle evaluated in-process
#[derive(Clone)]
pub struct TravelAwareOracle {
    estimator: Arc<dyn TravelTimeEstimator>,
}

impl TravelAwareOracle {
    /// Create an oracle backed by an estimator
    pub fn new(estimator: Arc<dyn TravelTimeEstimator>) -> Self {
        Self { estimator }
    }

    /// Create an oracle with a fixed travel estimate
    pub fn with_fixed_travel(minutes: u32) -> Self {
        Self::new(Arc::new(FixedTravelEstimate::new(minutes)))
    }

    /// Evaluate a pair, explaining any conflict
    pub async fn evaluate(&self, a: &EventRecord, b: &EventRecord) -> ConflictVerdict {
        let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) = (
            a.start_minutes(),
            a.end_minutes(),
            b.start_minutes(),
            b.end_minutes(),
        ) else {
            return ConflictVerdict::clear();
        };

        if a_start < b_end && b_start < a_end {
            return ConflictVerdict::conflict("Time overlap detected");
        }

        let (Some(a_addr), Some(b_addr)) = (a.address(), b.address()) else {
            return ConflictVerdict::clear();
        };

        let (from, to, gap) = if a_start <= b_start {
            (a_addr, b_addr, b_start.saturating_sub(a_end))
        } else {
            (b_addr, a_addr, a_start.saturating_sub(b_end))
        };

        match self.estimator.travel_minutes(from, to).await {
            Ok(travel) if gap < travel => {
                tracing::info!(travel, gap, "Conflict detected: travel exceeds gap");
                ConflictVerdict::conflict(format!(
                    "Need {travel} min travel time, only {gap} min available"
                ))
            }
            Ok(travel) => {
                tracing::debug!(travel, gap, "Gap covers travel time");
                ConflictVerdict::clear()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not estimate travel time, assuming conflict");
                ConflictVerdict::conflict("Could not calculate travel time, assuming conflict")
            }
        }
    }
}

impl Default for TravelAwareOracle {
    fn default() -> Self {
        Self::with_fixed_travel(DEFAULT_TRAVEL_MINUTES)
    }
}

#[async_trait]
impl ConflictOracle for TravelAwareOracle {
    async fn check_conflict(
        &self,
        first: &EventRecord,
        second: &EventRecord,
    ) -> OracleResult<bool> {
        Ok(self.evaluate(first, second).await.conflict)
    }
}
