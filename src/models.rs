// Core data structures for the weekly planner

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::time::parse_clock;

/// Components above this value are read as a year when decoding an [`EventDate`]
pub const YEAR_THRESHOLD: i64 = 1900;

/// One of the five columns of the weekly grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// Grid order, also the order a fill pass walks the days in
    pub const ALL: [Weekday; 5] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    /// Map a calendar weekday onto the grid; weekends have no column
    pub fn from_chrono(day: chrono::Weekday) -> Option<Self> {
        match day {
            chrono::Weekday::Mon => Some(Self::Monday),
            chrono::Weekday::Tue => Some(Self::Tuesday),
            chrono::Weekday::Wed => Some(Self::Wednesday),
            chrono::Weekday::Thu => Some(Self::Thursday),
            chrono::Weekday::Fri => Some(Self::Friday),
            chrono::Weekday::Sat | chrono::Weekday::Sun => None,
        }
    }

    /// Get string representation (also the persisted key)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown weekday '{s}'. Valid options: Monday..Friday"))
    }
}

/// Three-component calendar date as stored by the event sources
///
/// Components are normally `[month, day, year]`, but some sources emit
/// `[year, month, day]`. The order is detected by magnitude: a first
/// component above [`YEAR_THRESHOLD`] is the year. Persisted data relies on
/// this rule, so it must not be made smarter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventDate(Vec<i64>);

impl EventDate {
    /// Create a date in the canonical `[month, day, year]` order
    pub fn new(month: i64, day: i64, year: i64) -> Self {
        Self(vec![month, day, year])
    }

    /// Wrap raw components without interpreting them
    pub fn from_parts(parts: Vec<i64>) -> Self {
        Self(parts)
    }

    /// Parse a form value in `YYYY-MM-DD` form
    pub fn from_iso(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.trim().split('-').collect();
        if parts.len() != 3 {
            return None;
        }
        let year = parts[0].parse().ok()?;
        let month = parts[1].parse().ok()?;
        let day = parts[2].parse().ok()?;
        Some(Self::new(month, day, year))
    }

    /// Raw components in stored order
    pub fn parts(&self) -> &[i64] {
        &self.0
    }

    /// Resolve to a calendar date
    ///
    /// Years `0..=99` are read as `1900..=1999`. Months and days are not
    /// rolled over: a component outside its calendar range (day 30 of
    /// February, month 13) is not a date and yields `None`, which keeps the
    /// event off the grid instead of moving it to another day.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let [first, second, third] = <[i64; 3]>::try_from(self.0.as_slice()).ok()?;
        let (year, month, day) = if first > YEAR_THRESHOLD {
            (first, second, third)
        } else {
            (third, first, second)
        };
        let year = if (0..100).contains(&year) { year + 1900 } else { year };

        NaiveDate::from_ymd_opt(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
            u32::try_from(day).ok()?,
        )
    }

    /// Grid column for this date, `None` for weekends and unparsable dates
    pub fn weekday(&self) -> Option<Weekday> {
        self.to_naive_date()
            .and_then(|date| Weekday::from_chrono(date.weekday()))
    }

    /// Components joined by `-`, as used in dedup signatures
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive_date() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => f.write_str("Date TBD"),
        }
    }
}

/// A candidate or scheduled event
///
/// `id` is the identity used for move semantics between the waitlist and the
/// grid; two records with equal content but different ids are different
/// events. Blobs persisted without an id get a fresh one on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub date: Option<EventDate>,

    /// `HH:MM`, 24-hour
    #[serde(default)]
    pub start_time: Option<String>,

    /// `HH:MM`, 24-hour
    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub time_sensitive: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Page the event was extracted from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl EventRecord {
    /// Create an untimed, undated record
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date: None,
            start_time: None,
            end_time: None,
            time_sensitive: false,
            address: None,
            description: None,
            url: None,
        }
    }

    /// Set the date
    pub fn with_date(mut self, date: EventDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set start and end times and mark the event time-sensitive
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self.time_sensitive = true;
        self
    }

    /// Set the address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the time-sensitive flag
    pub fn with_time_sensitive(mut self, time_sensitive: bool) -> Self {
        self.time_sensitive = time_sensitive;
        self
    }

    /// Start time in minutes from midnight
    pub fn start_minutes(&self) -> Option<u32> {
        self.start_time.as_deref().and_then(parse_clock)
    }

    /// End time in minutes from midnight
    pub fn end_minutes(&self) -> Option<u32> {
        self.end_time.as_deref().and_then(parse_clock)
    }

    /// Title for display
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Event"
        } else {
            &self.title
        }
    }

    /// Address, treating blank text as absent
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}
