//! HTTP client for a remote conflict oracle
//!
//! One POST per pair, no retries. A transport failure, a non-2xx status or a
//! body without a boolean `conflict` field is returned as an error, which the
//! fill scheduler turns into a conflict.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{ConflictOracle, ConflictVerdict, OracleError, OracleResult};
use crate::models::EventRecord;

/// Configuration for the oracle client
#[derive(Debug, Clone)]
pub struct OracleClientConfig {
    /// Full URL of the conflict endpoint
    pub url: String,

    /// Transport-level request timeout
    pub timeout: Duration,
}

impl OracleClientConfig {
    /// Create a config for an endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ConflictQuery<'a> {
    first: &'a EventRecord,
    second: &'a EventRecord,
}

/// Conflict oracle reached over HTTP
pub struct HttpConflictOracle {
    config: OracleClientConfig,
    http_client: Client,
}

impl HttpConflictOracle {
    /// Create a new oracle client
    pub fn new(config: OracleClientConfig) -> OracleResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Init(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a client for an endpoint with default settings
    pub fn from_url(url: impl Into<String>) -> OracleResult<Self> {
        Self::new(OracleClientConfig::new(url))
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Ask the oracle and return its full verdict
    pub async fn verdict(
        &self,
        first: &EventRecord,
        second: &EventRecord,
    ) -> OracleResult<ConflictVerdict> {
        let response = self
            .http_client
            .post(&self.config.url)
            .json(&ConflictQuery { first, second })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::HttpStatus {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<ConflictVerdict>(&body)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ConflictOracle for HttpConflictOracle {
    async fn check_conflict(
        &self,
        first: &EventRecord,
        second: &EventRecord,
    ) -> OracleResult<bool> {
        let verdict = self.verdict(first, second).await?;

        if let Some(reason) = &verdict.reason {
            tracing::debug!(
                first = %first.display_title(),
                second = %second.display_title(),
                conflict = verdict.conflict,
                reason = %reason,
                "Oracle verdict"
            );
        }

        Ok(verdict.conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_creation() {
        let config = OracleClientConfig::new("http://localhost:8080/api/events/conflict");
        assert_eq!(config.timeout, Duration::from_secs(10));

        let config = config.with_timeout(Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_client_creation() {
        let client = HttpConflictOracle::from_url("http://localhost:8080/api/events/conflict");
        assert!(client.is_ok());
    }

    #[test]
    fn test_query_shape() {
        let a = EventRecord::new("a");
        let b = EventRecord::new("b");
        let json = serde_json::to_value(ConflictQuery {
            first: &a,
            second: &b,
        })
        .unwrap();

        assert_eq!(json["first"]["title"], "a");
        assert_eq!(json["second"]["title"], "b");
    }
}
