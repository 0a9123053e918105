//! Tolerant decoding of persisted blobs

use serde_json::Value;

use crate::models::{EventRecord, Weekday};
use crate::schedule::{Waitlist, WeeklySchedule};

/// Decode a schedule blob
///
/// Anything but a JSON object yields an empty schedule. Each weekday key is
/// restored only when its value decodes as an event array; other keys and
/// malformed days are skipped.
pub fn decode_schedule(raw: &str) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::new();

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            tracing::warn!("Schedule state is not an object, using empty schedule");
            return schedule;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Schedule state is not valid JSON, using empty schedule");
            return schedule;
        }
    };

    for day in Weekday::ALL {
        let Some(value) = object.get(day.as_str()) else {
            continue;
        };
        match serde_json::from_value::<Vec<EventRecord>>(value.clone()) {
            Ok(events) => schedule.set_day(day, events),
            Err(e) => tracing::warn!(%day, error = %e, "Skipping malformed day in schedule state"),
        }
    }

    schedule
}

/// Decode a waitlist blob, anything but an event array yields an empty waitlist
pub fn decode_waitlist(raw: &str) -> Waitlist {
    match serde_json::from_str::<Vec<EventRecord>>(raw) {
        Ok(events) => Waitlist::from_events(events),
        Err(e) => {
            tracing::warn!(error = %e, "Waitlist state is malformed, using empty waitlist");
            Waitlist::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_non_object_is_empty() {
        assert!(decode_schedule("[]").is_empty());
        assert!(decode_schedule("42").is_empty());
        assert!(decode_schedule("").is_empty());
    }

    #[test]
    fn test_schedule_restores_valid_days_only() {
        let raw = r#"{
            "Monday": [
                {"title": "Late", "startTime": "15:00", "endTime": "16:00", "timeSensitive": true},
                {"title": "Early", "startTime": "08:00", "endTime": "09:00", "timeSensitive": true}
            ],
            "Tuesday": "oops",
            "Saturday": [{"title": "Ignored"}]
        }"#;

        let schedule = decode_schedule(raw);
        let monday: Vec<&str> = schedule
            .day(Weekday::Monday)
            .iter()
            .map(|e| e.title.as_str())
            .collect();

        assert_eq!(monday, ["Early", "Late"]);
        assert!(schedule.day(Weekday::Tuesday).is_empty());
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn test_waitlist_decoding() {
        let waitlist = decode_waitlist(r#"[{"title": "A"}, {"title": "B", "date": [3, 20, 2025]}]"#);
        assert_eq!(waitlist.len(), 2);

        // Missing ids are assigned on load
        assert_ne!(waitlist.events()[0].id, waitlist.events()[1].id);

        assert!(decode_waitlist(r#"{"title": "A"}"#).is_empty());
        assert!(decode_waitlist("null").is_empty());
    }
}
