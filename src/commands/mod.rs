pub mod events;
pub mod planner;
pub mod serve;

use anyhow::{Context, Result};
use std::sync::Arc;

use weekfill::config::Config;
use weekfill::fill::FillScheduler;
use weekfill::oracle::{HttpConflictOracle, OracleClientConfig};
use weekfill::planner::PlannerSession;
use weekfill::storage::FileStateStore;

// Re-export command functions for convenience
pub use events::{extract, sync};
pub use planner::{add, fill, show, unschedule, AddParams, FillChoice};
pub use serve::serve;

/// Open the planner session backed by the configured state directory
pub fn open_session(config: &Config) -> Result<PlannerSession<FileStateStore>> {
    let store = FileStateStore::new(&config.storage.state_dir).with_context(|| {
        format!(
            "Failed to open state directory: {}",
            config.storage.state_dir.display()
        )
    })?;
    Ok(PlannerSession::open(store))
}

/// Build a fill scheduler talking to the configured oracle
pub fn build_scheduler(config: &Config) -> Result<FillScheduler> {
    let mut client_config = OracleClientConfig::new(&config.oracle.url);
    if let Some(timeout) = config.oracle_timeout() {
        client_config = client_config.with_timeout(timeout);
    }
    let oracle = HttpConflictOracle::new(client_config).context("Failed to create oracle client")?;

    let scheduler = FillScheduler::new(Arc::new(oracle));
    Ok(match config.oracle_timeout() {
        Some(timeout) => scheduler.with_oracle_timeout(timeout),
        None => scheduler,
    })
}
