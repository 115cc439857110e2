//! Pre-deletion snapshots of the events a live sweep is about to touch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarHandle;
use crate::config::SweepConfig;
use crate::date_range::DateRange;
use crate::error::SweepResult;
use crate::event::CalendarEvent;
use crate::filter::EventFilter;
use crate::provider::{BackupSink, CalendarProvider};

/// One backed-up event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRow {
    pub calendar_name: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub all_day: bool,
    pub attendee_emails: String,
}

impl BackupRow {
    pub fn new(calendar: &CalendarHandle, event: &CalendarEvent) -> Self {
        BackupRow {
            calendar_name: calendar.name.clone(),
            title: event.title.clone(),
            start_time: event.start.to_string(),
            end_time: event.end.to_string(),
            all_day: event.is_all_day(),
            attendee_emails: event.attendee_emails().join(", "),
        }
    }
}

pub fn table_name(at: DateTime<Utc>) -> String {
    format!("calsweep-backup-{}", at.format("%Y%m%d-%H%M%S"))
}

/// Snapshot every event the filter lets through, across `calendars`, into
/// a new table on `sink`. Returns the table identifier.
///
/// At most `limits.backup_rows` rows are written. A calendar whose events
/// cannot be listed is left out of the snapshot; sink failures are returned.
pub async fn capture(
    provider: &dyn CalendarProvider,
    sink: &dyn BackupSink,
    calendars: &[CalendarHandle],
    range: &DateRange,
    config: &SweepConfig,
) -> SweepResult<String> {
    let filter = EventFilter::new(&config.filters);
    let limit = config.limits.backup_rows;
    let mut rows = Vec::new();

    for calendar in calendars {
        if rows.len() >= limit {
            break;
        }
        let events = match provider.events(calendar, range.start, range.cutoff).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(calendar = %calendar, error = %e, "skipping calendar in backup");
                continue;
            }
        };
        let remaining = limit - rows.len();
        rows.extend(
            filter
                .filter(events)
                .iter()
                .take(remaining)
                .map(|event| BackupRow::new(calendar, event)),
        );
    }

    let table = sink.create_table(&table_name(range.now)).await?;
    sink.append_rows(&table, &rows).await?;

    tracing::info!(table = %table, rows = rows.len(), "backup written");
    Ok(table)
}
