//! Weekly schedule store
//!
//! Five day buckets, each kept sorted ascending by start time. The sort is
//! stable, so events with equal start times keep their insertion order.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::models::{EventRecord, Weekday};

/// Sort events by start time in minutes from midnight
///
/// Events without a parsable start time sort after all timed events. Fill
/// never places such events, but a hand-edited state file might contain them.
pub fn sort_by_start(events: &mut [EventRecord]) {
    events.sort_by_key(|event| {
        let start = event.start_minutes();
        (start.is_none(), start)
    });
}

/// Accepted events for Monday through Friday
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: BTreeMap<Weekday, Vec<EventRecord>>,
}

impl WeeklySchedule {
    /// Create a schedule with five empty buckets
    pub fn new() -> Self {
        Self {
            days: Weekday::ALL.into_iter().map(|day| (day, Vec::new())).collect(),
        }
    }

    /// Events for a day, in start-time order
    pub fn day(&self, day: Weekday) -> &[EventRecord] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replace a day's bucket, restoring start-time order
    pub fn set_day(&mut self, day: Weekday, mut events: Vec<EventRecord>) {
        sort_by_start(&mut events);
        self.days.insert(day, events);
    }

    /// Append and re-sort the bucket
    pub fn insert(&mut self, day: Weekday, event: EventRecord) {
        let bucket = self.bucket_mut(day);
        bucket.push(event);
        sort_by_start(bucket);
    }

    /// Append without sorting; the caller must call [`Self::sort_day`]
    /// before the bucket is read as ordered
    pub(crate) fn push_unsorted(&mut self, day: Weekday, event: EventRecord) {
        self.bucket_mut(day).push(event);
    }

    /// Restore start-time order for a day
    pub fn sort_day(&mut self, day: Weekday) {
        sort_by_start(self.bucket_mut(day));
    }

    /// Remove the given events from a day, returning them in bucket order
    pub fn remove_from_day(&mut self, day: Weekday, ids: &HashSet<Uuid>) -> Vec<EventRecord> {
        let bucket = self.bucket_mut(day);
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(bucket).into_iter().partition(|e| ids.contains(&e.id));
        *bucket = kept;
        removed
    }

    /// Remove one event from whichever day holds it
    pub fn remove(&mut self, id: Uuid) -> Option<(Weekday, EventRecord)> {
        for (day, bucket) in &mut self.days {
            if let Some(pos) = bucket.iter().position(|e| e.id == id) {
                return Some((*day, bucket.remove(pos)));
            }
        }
        None
    }

    /// Day holding the event, if scheduled
    pub fn find(&self, id: Uuid) -> Option<Weekday> {
        self.iter()
            .find(|(_, events)| events.iter().any(|e| e.id == id))
            .map(|(day, _)| day)
    }

    /// Check if an event is scheduled on any day
    pub fn contains(&self, id: Uuid) -> bool {
        self.find(id).is_some()
    }

    /// Ids of every scheduled event
    pub fn event_ids(&self) -> HashSet<Uuid> {
        self.days.values().flatten().map(|e| e.id).collect()
    }

    /// Iterate days in grid order
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[EventRecord])> {
        self.days.iter().map(|(day, events)| (*day, events.as_slice()))
    }

    /// Total number of scheduled events
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Check if no event is scheduled
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every bucket is in start-time order
    pub fn is_ordered(&self) -> bool {
        self.days.values().all(|events| {
            events.windows(2).all(|pair| {
                match (pair[0].start_minutes(), pair[1].start_minutes()) {
                    (Some(a), Some(b)) => a <= b,
                    (_, None) => true,
                    (None, Some(_)) => false,
                }
            })
        })
    }

    fn bucket_mut(&mut self, day: Weekday) -> &mut Vec<EventRecord> {
        self.days.entry(day).or_default()
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::new()
    }
}
