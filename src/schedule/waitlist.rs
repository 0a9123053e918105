//! Waitlist store
//!
//! Events awaiting placement, in insertion order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::EventRecord;

/// Ordered collection of unplaced events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Waitlist {
    events: Vec<EventRecord>,
}

impl Waitlist {
    /// Create an empty waitlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from events in order
    pub fn from_events(events: Vec<EventRecord>) -> Self {
        Self { events }
    }

    /// Append an event
    pub fn push(&mut self, event: EventRecord) {
        self.events.push(event);
    }

    /// Append events in order
    pub fn extend(&mut self, events: impl IntoIterator<Item = EventRecord>) {
        self.events.extend(events);
    }

    /// Remove the given events, returning how many were removed
    pub fn remove_ids(&mut self, ids: &HashSet<Uuid>) -> usize {
        let before = self.events.len();
        self.events.retain(|event| !ids.contains(&event.id));
        before - self.events.len()
    }

    /// Remove one event
    pub fn remove(&mut self, id: Uuid) -> Option<EventRecord> {
        let pos = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(pos))
    }

    /// Look up an event
    pub fn get(&self, id: Uuid) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Check if an event is waiting
    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.events.iter()
    }

    /// Events in insertion order
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Number of waiting events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a Waitlist {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
