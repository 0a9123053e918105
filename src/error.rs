//! Unified error handling for the weekfill crate
//!
//! This module provides a unified error type that consolidates all
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors usable on their own.
//!
//! # Architecture
//!
//! - [`WeekfillErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Note that oracle errors never reach the user during a fill pass: the fill
//! scheduler turns them into conflicts. They surface here only from direct
//! oracle use, such as the `serve` command or a standalone client.

use std::io;
use thiserror::Error;

pub use crate::ingest::IngestError;
pub use crate::oracle::{OracleError, ServerError};
pub use crate::planner::PlannerError;
pub use crate::storage::StorageError;

/// Common trait for weekfill error types
pub trait WeekfillErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Malformed input or responses
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Planner command preconditions
    Planner,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short user-facing description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Parsing => "parse error",
            Self::Storage => "storage error",
            Self::Config => "configuration error",
            Self::Planner => "planner error",
            Self::Other => "error",
        }
    }
}

/// Unified error type for the weekfill crate
#[derive(Error, Debug)]
pub enum Error {
    /// Conflict oracle errors
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Event ingestion errors
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Planner command errors
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    /// State storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Oracle service errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WeekfillErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Oracle(e) => e.is_recoverable(),
            Self::Ingest(e) => e.is_recoverable(),
            Self::Storage(StorageError::Io { .. }) | Self::Io(_) => true,
            Self::Storage(_) => false,
            Self::Server(ServerError::Bind { .. }) => true,
            Self::Server(_) => false,
            Self::Planner(_) | Self::Json(_) | Self::Config(_) | Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Oracle(OracleError::MalformedResponse(_)) => ErrorCategory::Parsing,
            Self::Oracle(_) | Self::Server(_) => ErrorCategory::Network,
            Self::Ingest(e) => match e {
                IngestError::EmptyForm | IngestError::EmptyUrl => ErrorCategory::Planner,
                IngestError::InvalidResponse(_) => ErrorCategory::Parsing,
                IngestError::InvalidUrl(_) | IngestError::Init(_) => ErrorCategory::Config,
                IngestError::Network(_) | IngestError::HttpStatus { .. } => ErrorCategory::Network,
            },
            Self::Planner(_) => ErrorCategory::Planner,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
