//! Prometheus metrics for the weekly planner and the oracle service
//!
//! This module provides metrics tracking for:
//! - Planner: fill passes, placed candidates, conflict resolutions, persistence failures
//! - Oracle: conflict checks by verdict, check latency, service requests
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_histogram, register_histogram_vec, Counter,
    CounterVec, Encoder, Histogram, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for planner metrics
struct PlannerMetrics {
    fill_passes: CounterVec,
    candidates_placed: Counter,
    resolutions: CounterVec,
    persistence_failures: CounterVec,
}

/// Container for oracle metrics
struct OracleMetrics {
    checks: CounterVec,
    check_duration: Histogram,
    api_requests: CounterVec,
    api_duration: HistogramVec,
}

/// Global storage for planner metrics
static PLANNER_METRICS: OnceLock<PlannerMetrics> = OnceLock::new();

/// Global storage for oracle metrics
static ORACLE_METRICS: OnceLock<OracleMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, errors are logged and subsequent
/// metric operations become no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = weekfill::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    // Prevent double initialization
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let planner = PlannerMetrics {
        fill_passes: register_counter_vec!(
            "weekfill_fill_passes_total",
            "Total fill passes by outcome",
            &["outcome"]
        )?,
        candidates_placed: register_counter!(
            "weekfill_candidates_placed_total",
            "Total waitlist events placed onto the schedule"
        )?,
        resolutions: register_counter_vec!(
            "weekfill_conflict_resolutions_total",
            "Total conflict resolutions by action",
            &["action"]
        )?,
        persistence_failures: register_counter_vec!(
            "weekfill_persistence_failures_total",
            "Total failed state reads and writes by key",
            &["key"]
        )?,
    };

    let oracle = OracleMetrics {
        checks: register_counter_vec!(
            "weekfill_oracle_checks_total",
            "Total conflict checks by verdict",
            &["verdict"]
        )?,
        check_duration: register_histogram!(
            "weekfill_oracle_check_duration_seconds",
            "Conflict check duration in seconds",
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
        api_requests: register_counter_vec!(
            "weekfill_oracle_api_requests_total",
            "Total oracle service requests by endpoint and status",
            &["endpoint", "status"]
        )?,
        api_duration: register_histogram_vec!(
            "weekfill_oracle_api_request_duration_seconds",
            "Oracle service request duration in seconds",
            &["endpoint"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
        )?,
    };

    PLANNER_METRICS.set(planner).map_err(|_| "Planner metrics already initialized")?;
    ORACLE_METRICS.set(oracle).map_err(|_| "Oracle metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    PLANNER_METRICS.get().is_some() && ORACLE_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a finished fill pass (`committed` or `conflict`) and its placements
pub fn record_fill_pass(outcome: &str, placed: usize) {
    let Some(m) = PLANNER_METRICS.get() else {
        return;
    };

    m.fill_passes.with_label_values(&[outcome]).inc();
    if placed > 0 {
        m.candidates_placed.inc_by(placed as f64);
    }
}

/// Record a conflict resolution (`confirm` or `cancel`)
pub fn record_resolution(action: &str) {
    if let Some(m) = PLANNER_METRICS.get() {
        m.resolutions.with_label_values(&[action]).inc();
    }
}

/// Record a failed state read or write
pub fn record_persistence_failure(key: &str) {
    if let Some(m) = PLANNER_METRICS.get() {
        m.persistence_failures.with_label_values(&[key]).inc();
    }
}

/// Record an oracle check (`clear`, `conflict` or `failed`) and its latency
pub fn record_oracle_check(verdict: &str, duration_secs: f64) {
    let Some(m) = ORACLE_METRICS.get() else {
        return;
    };

    m.checks.with_label_values(&[verdict]).inc();
    m.check_duration.observe(duration_secs);
}

/// Record an oracle service request
pub fn record_api_request(endpoint: &str, status: u16, duration_secs: f64) {
    let Some(m) = ORACLE_METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.api_requests
        .with_label_values(&[endpoint, &status_str])
        .inc();
    m.api_duration
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}
