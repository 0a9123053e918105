use anyhow::{Context, Result};

use weekfill::config::Config;
use weekfill::ingest::EventSourceClient;
use weekfill::utils::describe_event;

use super::open_session;

fn event_client(config: &Config) -> Result<EventSourceClient> {
    EventSourceClient::new(&config.events.api_base_url, config.events_timeout())
        .context("Failed to create events client")
}

/// Fetch all events from the events API and merge them into the waitlist
pub async fn sync(config: &Config) -> Result<()> {
    let client = event_client(config)?;
    let events = client
        .fetch_events()
        .await
        .with_context(|| format!("Failed to fetch events from {}", client.base_url()))?;

    let mut session = open_session(config)?;
    let report = session.merge_fetched(events);

    println!(
        "Fetched events: {} added, {} already in the waitlist",
        report.added, report.duplicates
    );
    Ok(())
}

/// Extract events from a page and merge them into the waitlist
pub async fn extract(config: &Config, url: &str) -> Result<()> {
    let client = event_client(config)?;
    let extraction = client.extract_from_url(url).await?;

    if extraction.fallback {
        println!(
            "Extraction failed ({}); using sample events",
            extraction.error.as_deref().unwrap_or("unknown error")
        );
    }
    for event in &extraction.events {
        println!("  {}", describe_event(event));
    }

    let mut session = open_session(config)?;
    let report = session.merge_fetched(extraction.events);

    println!(
        "{} added, {} already in the waitlist",
        report.added, report.duplicates
    );
    Ok(())
}
