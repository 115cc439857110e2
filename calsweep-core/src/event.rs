//! Provider-neutral event types.
//!
//! Providers convert whatever they store into [`CalendarEvent`]s; the filter,
//! dispositioner and reports only ever see this read-only view.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A point in time as stored by the calendar, preserving its original form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    /// All-day value (VALUE=DATE)
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    /// Wall-clock time without a zone; interpreted as UTC
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl EventTime {
    /// Resolve to an instant. `None` when the zone is unknown or the local
    /// time does not exist in it.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            EventTime::DateTimeUtc(dt) => Some(*dt),
            EventTime::DateTimeFloating(dt) => Some(dt.and_utc()),
            EventTime::DateTimeZoned { datetime, tzid } => {
                let tz: Tz = tzid.parse().ok()?;
                tz.from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} {}", datetime.format("%Y-%m-%d %H:%M"), tzid)
            }
        }
    }
}

/// An event attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: Option<String>,
    pub email: String,
}

/// Read-only view of a calendar event.
///
/// Deleting it goes through the owning provider, see
/// [`crate::provider::CalendarProvider::delete_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider-specific identifier used to address the event for deletion
    pub id: String,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub attendees: Vec<Attendee>,
    /// Series master or instance of a recurring event
    pub recurring: bool,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    pub fn attendee_emails(&self) -> Vec<&str> {
        self.attendees.iter().map(|a| a.email.as_str()).collect()
    }

    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        self.start.to_utc()
    }

    pub fn end_utc(&self) -> Option<DateTime<Utc>> {
        self.end.to_utc()
    }

    /// Whether the event overlaps `[from, to)`.
    ///
    /// Events whose times cannot be resolved never overlap anything.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        match (self.start_utc(), self.end_utc()) {
            (Some(start), Some(end)) => start < to && end.max(start) >= from,
            _ => false,
        }
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.title)
        }
    }
}
