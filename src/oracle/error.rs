//! Error types for the conflict oracle

use std::time::Duration;
use thiserror::Error;

/// Result type for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Reasons an oracle verdict could not be obtained
///
/// Every variant is treated as "conflict" by the fill scheduler.
#[derive(Error, Debug)]
pub enum OracleError {
    /// HTTP client could not be built
    #[error("Failed to initialize oracle client: {0}")]
    Init(String),

    /// Transport failure
    #[error("Oracle request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Oracle answered with a non-success status
    #[error("Oracle returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Response body did not carry a boolean `conflict` field
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    /// Caller-imposed time limit elapsed
    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    /// Travel time between two addresses could not be estimated
    #[error("Travel time unavailable from '{from}' to '{to}': {reason}")]
    TravelTime {
        from: String,
        to: String,
        reason: String,
    },
}

impl OracleError {
    /// Check if retrying the same call could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::TravelTime { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Init(_) | Self::MalformedResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_recoverable() {
        assert!(OracleError::Timeout(Duration::from_secs(1)).is_recoverable());
        assert!(OracleError::HttpStatus {
            status: 503,
            message: String::new()
        }
        .is_recoverable());
        assert!(!OracleError::HttpStatus {
            status: 400,
            message: String::new()
        }
        .is_recoverable());
        assert!(!OracleError::MalformedResponse("x".into()).is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = OracleError::HttpStatus {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Oracle returned HTTP 502: bad gateway");
    }
}
