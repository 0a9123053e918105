//! Manual event entry

use serde::Deserialize;

use super::IngestError;
use crate::models::{EventDate, EventRecord};
use crate::utils::time::parse_clock;

/// Fields of the manual entry form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEventForm {
    #[serde(default)]
    pub title: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_time_sensitive")]
    pub time_sensitive: bool,
}

fn default_time_sensitive() -> bool {
    true
}

impl Default for ManualEventForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            address: String::new(),
            description: String::new(),
            time_sensitive: true,
        }
    }
}

impl ManualEventForm {
    fn is_empty(&self) -> bool {
        [
            &self.title,
            &self.date,
            &self.start_time,
            &self.end_time,
            &self.address,
            &self.description,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Build the event record; times are dropped when the event is not time-sensitive
    pub fn into_event(self) -> Result<EventRecord, IngestError> {
        if self.is_empty() {
            return Err(IngestError::EmptyForm);
        }

        let mut event = EventRecord::new(self.title.trim())
            .with_time_sensitive(self.time_sensitive);
        event.date = EventDate::from_iso(&self.date);

        if self.time_sensitive {
            event.start_time = clock_field(&self.start_time);
            event.end_time = clock_field(&self.end_time);
        }

        let address = self.address.trim();
        if !address.is_empty() {
            event.address = Some(address.to_string());
        }
        let description = self.description.trim();
        if !description.is_empty() {
            event.description = Some(description.to_string());
        }

        Ok(event)
    }
}

fn clock_field(value: &str) -> Option<String> {
    let value = value.trim();
    parse_clock(value).map(|_| value.to_string())
}
