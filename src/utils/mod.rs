//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod time;

use crate::models::{EventDate, EventRecord};

/// Format an optional date the way listings show it
pub fn format_event_date(date: Option<&EventDate>) -> String {
    date.map_or_else(|| String::from("Date TBD"), ToString::to_string)
}

/// Format a start/end pair the way listings show it
pub fn format_time_range(start: Option<&str>, end: Option<&str>) -> String {
    let start = start.filter(|s| !s.is_empty());
    let end = end.filter(|s| !s.is_empty());

    match (start, end) {
        (None, None) => String::from("No set time"),
        (Some(start), Some(end)) => format!("{start} ~ {end}"),
        (Some(start), None) => format!("{start} starts"),
        (None, Some(end)) => format!("{end} ends"),
    }
}

/// One-line summary of an event: title, date and time range
pub fn describe_event(event: &EventRecord) -> String {
    format!(
        "{} · {} · {}",
        event.display_title(),
        format_event_date(event.date.as_ref()),
        format_time_range(event.start_time.as_deref(), event.end_time.as_deref())
    )
}

/// Truncate text to a maximum length
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
