//! Oracle service
//!
//! Serves the in-process [`TravelAwareOracle`] over HTTP so that remote
//! planners can use it through [`super::HttpConflictOracle`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::api::create_router;
use super::local::TravelAwareOracle;
use crate::config::ServerConfig;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Conflict evaluator
    pub oracle: Arc<TravelAwareOracle>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(oracle: TravelAwareOracle) -> Self {
        Self {
            oracle: Arc::new(oracle),
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Oracle Server
// ============================================================================

/// HTTP server for conflict checks
pub struct OracleServer {
    config: ServerConfig,
    state: AppState,
}

impl OracleServer {
    /// Create a server with a fixed travel estimate from the config
    pub fn new(config: ServerConfig) -> Self {
        let oracle = TravelAwareOracle::with_fixed_travel(config.default_travel_minutes);
        Self::with_oracle(config, oracle)
    }

    /// Create a server around a specific evaluator
    pub fn with_oracle(config: ServerConfig, oracle: TravelAwareOracle) -> Self {
        Self {
            config,
            state: AppState::new(oracle),
        }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Bind the configured address and serve until the process ends
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Bind the configured address and serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr,
                reason: e.to_string(),
            })?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!(%local_addr, "Starting oracle server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Oracle server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            default_travel_minutes: self.config.default_travel_minutes,
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub default_travel_minutes: u32,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Conflict Oracle Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Default Travel Time: {} min\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.default_travel_minutes,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },

    #[error("Server error: {0}")]
    Serve(String),
}
