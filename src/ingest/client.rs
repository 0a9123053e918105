//! Remote event sources
//!
//! - `GET <base>/api/events` returns every known event
//! - `POST <base>/api/events/scrape` with `{"url": ...}` extracts events from a page
//!
//! Both return arrays of [`RawEvent`]. Extraction never fails once a URL is
//! given: any failure falls back to [`sample_events`], flagged as such.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{normalize_all, sample_events, IngestError, RawEvent};
use crate::models::EventRecord;

/// Result of a URL extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    pub events: Vec<EventRecord>,

    /// True when `events` are the fixed samples
    pub fallback: bool,

    /// Why extraction fell back, if it did
    pub error: Option<String>,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
}

/// Client for the events API
pub struct EventSourceClient {
    base_url: String,
    http_client: Client,
}

impl EventSourceClient {
    /// Create a client for an API base URL such as `http://localhost:8080`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IngestError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| IngestError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::Init(e.to_string()))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every event from the events API
    pub async fn fetch_events(&self) -> Result<Vec<EventRecord>, IngestError> {
        let endpoint = format!("{}/api/events", self.base_url);
        tracing::debug!(url = %endpoint, "Fetching events");

        let response = self.http_client.get(&endpoint).send().await?;
        let events = Self::read_events(response).await?;

        tracing::info!(count = events.len(), "Fetched events");
        Ok(events)
    }

    /// Extract events from a page, falling back to sample events on failure
    pub async fn extract_from_url(&self, page_url: &str) -> Result<Extraction, IngestError> {
        let page_url = page_url.trim();
        if page_url.is_empty() {
            return Err(IngestError::EmptyUrl);
        }

        match self.scrape(page_url).await {
            Ok(events) => {
                tracing::info!(url = page_url, count = events.len(), "Extracted events");
                Ok(Extraction {
                    events,
                    fallback: false,
                    error: None,
                })
            }
            Err(e) => {
                tracing::warn!(url = page_url, error = %e, "Extraction failed, using sample events");
                Ok(Extraction {
                    events: sample_events(),
                    fallback: true,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    async fn scrape(&self, page_url: &str) -> Result<Vec<EventRecord>, IngestError> {
        let endpoint = format!("{}/api/events/scrape", self.base_url);
        let response = self
            .http_client
            .post(&endpoint)
            .json(&ScrapeRequest { url: page_url })
            .send()
            .await?;

        Self::read_events(response).await
    }

    async fn read_events(response: reqwest::Response) -> Result<Vec<EventRecord>, IngestError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IngestError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let raw: Vec<RawEvent> = serde_json::from_str(&body)
            .map_err(|e| IngestError::InvalidResponse(format!("expected an event array: {e}")))?;

        Ok(normalize_all(raw))
    }
}
