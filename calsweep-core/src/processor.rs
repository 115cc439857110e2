//! Sweeping a single calendar.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::calendar::CalendarHandle;
use crate::config::SweepConfig;
use crate::date_range::DateRange;
use crate::disposition::{EventDisposition, SkipReason, dispose};
use crate::event::CalendarEvent;
use crate::filter::EventFilter;
use crate::provider::CalendarProvider;

/// An event kept for display in reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSample {
    pub title: String,
    pub date: String,
    pub disposition: EventDisposition,
}

/// Outcome of sweeping one calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarResult {
    pub calendar: String,
    pub processed: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub skip_reasons: BTreeMap<SkipReason, usize>,
    pub samples: Vec<EventSample>,
    pub error_messages: Vec<String>,
}

impl CalendarResult {
    pub fn new(calendar: &CalendarHandle) -> Self {
        CalendarResult {
            calendar: calendar.name.clone(),
            ..Default::default()
        }
    }

    fn skip(&mut self, reason: SkipReason, count: usize) {
        self.skipped += count;
        *self.skip_reasons.entry(reason).or_insert(0) += count;
    }

    fn error(&mut self, message: String) {
        self.errors += 1;
        self.error_messages.push(message);
    }

    fn record(&mut self, event: &CalendarEvent, disposition: EventDisposition, sample_limit: usize) {
        self.processed += 1;

        match &disposition {
            EventDisposition::Deleted => self.deleted += 1,
            EventDisposition::Skipped { reason } => self.skip(reason.clone(), 1),
            EventDisposition::Error { message } => {
                self.error(format!("{}: {}", event, message));
            }
        }

        if self.samples.len() < sample_limit {
            self.samples.push(EventSample {
                title: event.to_string(),
                date: event.start.to_string(),
                disposition,
            });
        }
    }
}

/// Sweep `calendar`: fetch, filter, cap, dispose.
///
/// Failures are contained: a fetch error becomes one calendar-level error,
/// deletion failures become per-event dispositions.
pub async fn process(
    provider: &dyn CalendarProvider,
    calendar: &CalendarHandle,
    range: &DateRange,
    config: &SweepConfig,
) -> CalendarResult {
    let mut result = CalendarResult::new(calendar);

    let events = match provider.events(calendar, range.start, range.cutoff).await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(calendar = %calendar, error = %e, "could not list events");
            result.error(format!("Could not list events for {calendar}: {e}"));
            return result;
        }
    };

    if events.is_empty() {
        tracing::info!(calendar = %calendar, "no events older than cutoff");
        return result;
    }

    let found = events.len();
    let candidates = EventFilter::new(&config.filters).filter(events);

    if candidates.is_empty() {
        tracing::info!(calendar = %calendar, found, "all events filtered out");
        result.skip(SkipReason::FilteredOut, found);
        return result;
    }

    let cap = config.limits.max_deletes_per_run;
    let batch = &candidates[..candidates.len().min(cap)];
    tracing::info!(
        calendar = %calendar,
        found,
        candidates = candidates.len(),
        batch = batch.len(),
        mode = %config.mode,
        "sweeping calendar"
    );

    let pause = config.limits.pause_between_deletes;
    for (i, event) in batch.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        let disposition = dispose(provider, calendar, event, config.mode).await;
        result.record(event, disposition, config.limits.sample_events);
    }

    result
}
