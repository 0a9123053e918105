//! Event ingestion
//!
//! Events reach the waitlist from three places: the manual form
//! ([`form`]), a bulk fetch from the events API and URL extraction
//! ([`client`]). Remote sources send loosely typed records ([`RawEvent`])
//! that are normalised here before they become [`EventRecord`]s.

pub mod client;
pub mod form;

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{EventDate, EventRecord};
use crate::schedule::Waitlist;
use crate::storage::EventSignature;
use crate::utils::time::minutes_to_clock;

pub use client::{EventSourceClient, Extraction};
pub use form::ManualEventForm;

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Form is empty")]
    EmptyForm,

    #[error("URL is required")]
    EmptyUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Client initialization failed: {0}")]
    Init(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl IngestError {
    /// Whether the failure is transient
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// A clock value as remote sources send it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    /// Minutes since midnight
    Minutes(i64),
    /// Already formatted text
    Text(String),
}

impl TimeValue {
    /// Normalise to `HH:MM`, non-positive minute counts and blank text are absent
    pub fn normalize(&self) -> Option<String> {
        match self {
            Self::Minutes(minutes) => minutes_to_clock(*minutes),
            Self::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
        }
    }
}

/// Event as delivered by the events API or the extractor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Remote identifier; only UUIDs are kept, anything else gets a fresh id
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub start_time: Option<TimeValue>,
    #[serde(default)]
    pub end_time: Option<TimeValue>,
    #[serde(default)]
    pub time_sensitive: Option<bool>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawEvent {
    /// Normalise into an event record
    pub fn normalize(self) -> EventRecord {
        let mut event = EventRecord::new(self.title.unwrap_or_default());
        if let Some(id) = self.id.as_ref().and_then(parse_remote_id) {
            event.id = id;
        }
        event.date = self.date.as_ref().and_then(parse_date_value);
        event.start_time = self.start_time.as_ref().and_then(TimeValue::normalize);
        event.end_time = self.end_time.as_ref().and_then(TimeValue::normalize);
        event.time_sensitive = self.time_sensitive.unwrap_or(false);
        event.address = non_blank(self.address);
        event.description = non_blank(self.description);
        event.url = non_blank(self.url);
        event
    }
}

fn parse_remote_id(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|text| Uuid::parse_str(text.trim()).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Interpret a date as sent by a source: a component array or `YYYY-MM-DD`
fn parse_date_value(value: &Value) -> Option<EventDate> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(Value::as_i64)
            .collect::<Option<Vec<_>>>()
            .map(EventDate::from_parts),
        Value::String(text) => EventDate::from_iso(text),
        _ => None,
    }
}

/// Normalise a batch of raw events
pub fn normalize_all(raw: Vec<RawEvent>) -> Vec<EventRecord> {
    raw.into_iter().map(RawEvent::normalize).collect()
}

/// Outcome of merging fetched events into the waitlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub duplicates: usize,
    /// Added events whose id was already taken and got a fresh one
    pub reassigned: usize,
}

/// Give a fresh id to every event whose id is in `taken` or repeats an
/// earlier event of the batch, returning how many were changed
pub fn assign_unique_ids(events: &mut [EventRecord], taken: &HashSet<Uuid>) -> usize {
    let mut seen = HashSet::with_capacity(events.len());
    let mut reassigned = 0;

    for event in events.iter_mut() {
        if taken.contains(&event.id) || !seen.insert(event.id) {
            let fresh = Uuid::new_v4();
            tracing::debug!(old = %event.id, new = %fresh, title = %event.display_title(), "Reassigned taken event id");
            event.id = fresh;
            seen.insert(fresh);
            reassigned += 1;
        }
    }

    reassigned
}

/// Merge fetched events into the waitlist
///
/// An empty waitlist takes the batch as-is. Otherwise an event is dropped
/// when its signature matches an entry that was already in the waitlist
/// before this merge; the rest are appended in order. Ids never repeat:
/// an added event whose id is already in the waitlist, in `reserved`, or
/// earlier in the batch gets a fresh one.
pub fn merge_into_waitlist_reserving(
    waitlist: &mut Waitlist,
    fetched: Vec<EventRecord>,
    reserved: &HashSet<Uuid>,
) -> MergeReport {
    let total = fetched.len();
    let mut fresh: Vec<EventRecord> = if waitlist.is_empty() {
        fetched
    } else {
        let existing: HashSet<EventSignature> = EventSignature::collect(waitlist);
        fetched
            .into_iter()
            .filter(|event| !existing.contains(&EventSignature::of(event)))
            .collect()
    };

    let mut taken: HashSet<Uuid> = waitlist.iter().map(|event| event.id).collect();
    taken.extend(reserved.iter().copied());
    let reassigned = assign_unique_ids(&mut fresh, &taken);

    let report = MergeReport {
        added: fresh.len(),
        duplicates: total - fresh.len(),
        reassigned,
    };
    waitlist.extend(fresh);

    tracing::debug!(
        added = report.added,
        duplicates = report.duplicates,
        reassigned = report.reassigned,
        "Merged fetched events"
    );
    report
}

/// Merge fetched events into the waitlist when no other ids are in use
pub fn merge_into_waitlist(waitlist: &mut Waitlist, fetched: Vec<EventRecord>) -> MergeReport {
    merge_into_waitlist_reserving(waitlist, fetched, &HashSet::new())
}

/// Fixed events shown when URL extraction fails
pub fn sample_events() -> Vec<EventRecord> {
    vec![
        EventRecord::new("Community Hack Night")
            .with_date(EventDate::new(3, 20, 2025))
            .with_times("18:00", "21:00")
            .with_address("Innovation Hub, Seattle"),
        EventRecord::new("Design Sprint Workshop")
            .with_date(EventDate::new(3, 22, 2025))
            .with_times("10:00", "16:00")
            .with_address("Downtown Co-working Loft"),
        EventRecord::new("AI for Good Meetup")
            .with_date(EventDate::new(3, 24, 2025))
            .with_times("17:30", "19:00")
            .with_address("Tech Collective, Bellevue"),
        EventRecord::new("Nonprofit Fundraising Webinar")
            .with_date(EventDate::new(3, 26, 2025))
            .with_times("12:00", "13:30")
            .with_address("Virtual"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;

    #[test]
    fn test_raw_event_minutes_normalised() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"title":"Yoga","date":[3,24,2025],"startTime":540,"endTime":605,"timeSensitive":true}"#,
        )
        .unwrap();
        let event = raw.normalize();

        assert_eq!(event.start_time.as_deref(), Some("09:00"));
        assert_eq!(event.end_time.as_deref(), Some("10:05"));
        assert_eq!(event.date.as_ref().and_then(EventDate::weekday), Some(Weekday::Monday));
        assert!(event.time_sensitive);
    }

    #[test]
    fn test_raw_event_defaults() {
        let raw: RawEvent =
            serde_json::from_str(r#"{"title":"Talk","startTime":0,"endTime":null,"address":"  "}"#)
                .unwrap();
        let event = raw.normalize();

        assert_eq!(event.start_time, None);
        assert_eq!(event.end_time, None);
        assert!(!event.time_sensitive);
        assert_eq!(event.address, None);
    }

    #[test]
    fn test_raw_event_string_times_and_iso_date() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"title":"Lunch","date":"2025-03-26","startTime":"12:00","endTime":"13:30"}"#,
        )
        .unwrap();
        let event = raw.normalize();

        assert_eq!(event.date, Some(EventDate::new(3, 26, 2025)));
        assert_eq!(event.start_time.as_deref(), Some("12:00"));
    }

    #[test]
    fn test_raw_event_bad_date_is_absent() {
        let raw: RawEvent = serde_json::from_str(r#"{"date":["3","20","2025"]}"#).unwrap();
        assert_eq!(raw.normalize().date, None);
    }

    #[test]
    fn test_merge_into_empty_takes_all() {
        let mut waitlist = Waitlist::new();
        let a = EventRecord::new("A");
        let report = merge_into_waitlist(&mut waitlist, vec![a.clone(), a.clone()]);

        // Duplicates within the batch are kept when the waitlist was empty,
        // the second copy under a new id
        assert_eq!(
            report,
            MergeReport {
                added: 2,
                duplicates: 0,
                reassigned: 1
            }
        );
        assert_eq!(waitlist.len(), 2);
        assert_eq!(waitlist.events()[0].id, a.id);
        assert_ne!(waitlist.events()[1].id, a.id);
    }

    #[test]
    fn test_merge_drops_known_signatures() {
        let existing = EventRecord::new("A").with_times("09:00", "10:00");
        let mut waitlist = Waitlist::from_events(vec![existing]);

        let dup = EventRecord::new("A").with_times("09:00", "10:00");
        let fresh = EventRecord::new("B").with_times("09:00", "10:00");
        let report = merge_into_waitlist(&mut waitlist, vec![dup, fresh.clone()]);

        assert_eq!(
            report,
            MergeReport {
                added: 1,
                duplicates: 1,
                reassigned: 0
            }
        );
        assert_eq!(waitlist.len(), 2);
        assert!(waitlist.contains(fresh.id));
    }

    #[test]
    fn test_raw_event_non_uuid_id_gets_fresh_id() {
        let raw: Vec<RawEvent> = serde_json::from_str(
            r#"[{"id":"evt-1","title":"A"},{"id":42,"title":"B"},{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","title":"C"}]"#,
        )
        .unwrap();
        let events = normalize_all(raw);

        assert_eq!(events.len(), 3);
        assert_ne!(events[0].id, events[1].id);
        assert_eq!(
            events[2].id,
            Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap()
        );
    }

    #[test]
    fn test_assign_unique_ids() {
        let kept = EventRecord::new("Kept");
        let clash = EventRecord::new("Clash");
        let mut events = vec![kept.clone(), clash.clone(), kept.clone()];
        let taken: HashSet<Uuid> = [clash.id].into_iter().collect();

        assert_eq!(assign_unique_ids(&mut events, &taken), 2);
        assert_eq!(events[0].id, kept.id);
        assert_ne!(events[1].id, clash.id);
        assert_ne!(events[2].id, kept.id);
    }

    #[test]
    fn test_sample_events() {
        let samples = sample_events();
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|e| e.time_sensitive));
        // 2025-03-22 was a Saturday
        assert_eq!(samples[1].date.as_ref().and_then(EventDate::weekday), None);
    }
}
