//! Smart filtering: which candidate events a sweep may touch.

use std::fmt;

use crate::config::FilterConfig;
use crate::event::CalendarEvent;

/// Why an event was kept out of the sweep. Rules are checked in the order
/// of the variants; the first failing rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Times could not be resolved; dropped rather than failing the batch
    Malformed,
    AllDay,
    HasAttendees(usize),
    Recurring,
    ExcludedKeyword(String),
    NoAllowedKeyword,
    TitleTooShort(usize),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::Malformed => write!(f, "malformed event"),
            Rejection::AllDay => write!(f, "all-day event"),
            Rejection::HasAttendees(n) => write!(f, "has {n} attendees"),
            Rejection::Recurring => write!(f, "recurring event"),
            Rejection::ExcludedKeyword(k) => write!(f, "title contains excluded keyword '{k}'"),
            Rejection::NoAllowedKeyword => write!(f, "title matches no allowed keyword"),
            Rejection::TitleTooShort(len) => write!(f, "title too short ({len} chars)"),
        }
    }
}

/// Predicate chain built from [`FilterConfig`]. Keywords are matched as
/// case-insensitive substrings; blank keywords are ignored.
#[derive(Debug, Clone)]
pub struct EventFilter {
    skip_all_day: bool,
    skip_with_attendees: bool,
    delete_recurring: bool,
    exclude_keywords: Vec<String>,
    only_keywords: Vec<String>,
    min_title_length: usize,
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

impl EventFilter {
    pub fn new(config: &FilterConfig) -> Self {
        EventFilter {
            skip_all_day: config.skip_all_day,
            skip_with_attendees: config.skip_with_attendees,
            delete_recurring: config.delete_recurring,
            exclude_keywords: normalize_keywords(&config.exclude_keywords),
            only_keywords: normalize_keywords(&config.only_keywords),
            min_title_length: config.min_title_length,
        }
    }

    /// Keep the events that pass every rule, preserving their order.
    pub fn filter(&self, events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
        events
            .into_iter()
            .filter(|event| match self.check(event) {
                Ok(()) => true,
                Err(rejection) => {
                    tracing::debug!(event = %event, %rejection, "filtered out");
                    false
                }
            })
            .collect()
    }

    pub fn check(&self, event: &CalendarEvent) -> Result<(), Rejection> {
        if event.start_utc().is_none() || event.end_utc().is_none() {
            return Err(Rejection::Malformed);
        }

        if self.skip_all_day && event.is_all_day() {
            return Err(Rejection::AllDay);
        }

        let attendees = event.attendee_count();
        if self.skip_with_attendees && attendees > 0 {
            return Err(Rejection::HasAttendees(attendees));
        }

        if event.recurring && !self.delete_recurring {
            return Err(Rejection::Recurring);
        }

        let title = event.title.to_lowercase();

        if let Some(keyword) = self.exclude_keywords.iter().find(|k| title.contains(k.as_str())) {
            return Err(Rejection::ExcludedKeyword(keyword.clone()));
        }

        if !self.only_keywords.is_empty()
            && !self.only_keywords.iter().any(|k| title.contains(k.as_str()))
        {
            return Err(Rejection::NoAllowedKeyword);
        }

        let length = event.title.chars().count();
        if length < self.min_title_length {
            return Err(Rejection::TitleTooShort(length));
        }

        Ok(())
    }
}
