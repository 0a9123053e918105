//! Signature-based deduplication of fetched events

use std::collections::HashSet;

use crate::models::EventRecord;
use crate::schedule::Waitlist;

/// Identity of an event for merge purposes: title, start, end and joined date
///
/// Absent fields compare as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventSignature {
    title: String,
    start_time: String,
    end_time: String,
    date: String,
}

impl EventSignature {
    /// Signature of an event
    pub fn of(event: &EventRecord) -> Self {
        Self {
            title: event.title.clone(),
            start_time: event.start_time.clone().unwrap_or_default(),
            end_time: event.end_time.clone().unwrap_or_default(),
            date: event.date.as_ref().map(|d| d.joined()).unwrap_or_default(),
        }
    }

    /// Signatures of every waitlist entry
    pub fn collect(waitlist: &Waitlist) -> HashSet<Self> {
        waitlist.iter().map(Self::of).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventDate;

    #[test]
    fn test_signature_ignores_id_and_extras() {
        let a = EventRecord::new("Meetup")
            .with_date(EventDate::new(3, 24, 2025))
            .with_times("17:30", "19:00")
            .with_address("Bellevue");
        let b = EventRecord::new("Meetup")
            .with_date(EventDate::new(3, 24, 2025))
            .with_times("17:30", "19:00");

        assert_ne!(a.id, b.id);
        assert_eq!(EventSignature::of(&a), EventSignature::of(&b));
    }

    #[test]
    fn test_signature_depends_on_date_order() {
        let a = EventRecord::new("X").with_date(EventDate::from_parts(vec![2025, 3, 24]));
        let b = EventRecord::new("X").with_date(EventDate::new(3, 24, 2025));
        assert_ne!(EventSignature::of(&a), EventSignature::of(&b));
    }
}
