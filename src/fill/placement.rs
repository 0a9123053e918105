//! Event placeability

use crate::models::{EventRecord, Weekday};

/// Grid column an event's date falls on
///
/// `None` for undated events, unparsable dates and weekends.
pub fn target_day(event: &EventRecord) -> Option<Weekday> {
    event.date.as_ref().and_then(|date| date.weekday())
}

/// Check if a fill pass may place the event
///
/// The event must be time-sensitive, carry parsable start and end times and
/// fall on Monday through Friday.
pub fn is_placeable(event: &EventRecord) -> bool {
    placement_day(event).is_some()
}

/// Target day of a placeable event, `None` otherwise
pub(crate) fn placement_day(event: &EventRecord) -> Option<Weekday> {
    if !event.time_sensitive || event.start_minutes().is_none() || event.end_minutes().is_none() {
        return None;
    }
    target_day(event)
}
