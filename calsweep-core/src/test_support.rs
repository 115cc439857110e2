//! In-memory stand-ins for the external capabilities, for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::backup::BackupRow;
use crate::calendar::CalendarHandle;
use crate::error::{SweepError, SweepResult};
use crate::event::{CalendarEvent, EventTime};
use crate::provider::{BackupSink, CalendarProvider, Notifier};

/// A one-hour event on 2020-06-01.
pub fn event(id: &str, title: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        start: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2020, 6, 1, 10, 0, 0).unwrap()),
        end: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2020, 6, 1, 11, 0, 0).unwrap()),
        attendees: vec![],
        recurring: false,
    }
}

pub fn events(titles: &[&str]) -> Vec<CalendarEvent> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| event(&i.to_string(), title))
        .collect()
}

#[derive(Default)]
pub struct StubProvider {
    calendars: Vec<(CalendarHandle, Vec<CalendarEvent>)>,
    list_error: Option<String>,
    event_errors: HashMap<String, String>,
    delete_errors: HashMap<String, String>,
    list_calls: Mutex<usize>,
    event_calls: Mutex<usize>,
    delete_attempts: Mutex<usize>,
    /// (calendar id, event id) of every successful deletion
    deleted: Mutex<Vec<(String, String)>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(mut self, calendar: &CalendarHandle, events: Vec<CalendarEvent>) -> Self {
        self.calendars.push((calendar.clone(), events));
        self
    }

    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn failing_events(mut self, calendar_id: &str, message: &str) -> Self {
        self.event_errors
            .insert(calendar_id.to_string(), message.to_string());
        self
    }

    pub fn failing_delete(mut self, event_id: &str, message: &str) -> Self {
        self.delete_errors
            .insert(event_id.to_string(), message.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub fn event_calls(&self) -> usize {
        *self.event_calls.lock().unwrap()
    }

    pub fn delete_attempts(&self) -> usize {
        *self.delete_attempts.lock().unwrap()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    fn is_deleted(&self, calendar: &CalendarHandle, event: &CalendarEvent) -> bool {
        self.deleted
            .lock()
            .unwrap()
            .iter()
            .any(|(c, e)| *c == calendar.id && *e == event.id)
    }
}

#[async_trait]
impl CalendarProvider for StubProvider {
    async fn list_calendars(&self) -> SweepResult<Vec<CalendarHandle>> {
        *self.list_calls.lock().unwrap() += 1;
        if let Some(message) = &self.list_error {
            return Err(SweepError::ProviderAccess(message.clone()));
        }
        Ok(self.calendars.iter().map(|(c, _)| c.clone()).collect())
    }

    async fn events(
        &self,
        calendar: &CalendarHandle,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SweepResult<Vec<CalendarEvent>> {
        *self.event_calls.lock().unwrap() += 1;
        if let Some(message) = self.event_errors.get(&calendar.id) {
            return Err(SweepError::ProviderAccess(message.clone()));
        }
        Ok(self
            .calendars
            .iter()
            .filter(|(c, _)| c.id == calendar.id)
            .flat_map(|(_, events)| events.iter())
            .filter(|e| e.overlaps(start, end) && !self.is_deleted(calendar, e))
            .cloned()
            .collect())
    }

    async fn delete_event(
        &self,
        calendar: &CalendarHandle,
        event: &CalendarEvent,
    ) -> SweepResult<()> {
        *self.delete_attempts.lock().unwrap() += 1;
        if let Some(message) = self.delete_errors.get(&event.id) {
            return Err(SweepError::Deletion(message.clone()));
        }
        self.deleted
            .lock()
            .unwrap()
            .push((calendar.id.clone(), event.id.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct StubSink {
    pub fail: bool,
    tables: Mutex<Vec<String>>,
    rows: Mutex<Vec<BackupRow>>,
}

impl StubSink {
    pub fn failing() -> Self {
        StubSink {
            fail: true,
            ..Default::default()
        }
    }

    pub fn tables(&self) -> Vec<String> {
        self.tables.lock().unwrap().clone()
    }

    pub fn rows(&self) -> Vec<BackupRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackupSink for StubSink {
    async fn create_table(&self, name: &str) -> SweepResult<String> {
        if self.fail {
            return Err(SweepError::Backup("sink unavailable".into()));
        }
        self.tables.lock().unwrap().push(name.to_string());
        Ok(format!("stub://{name}"))
    }

    async fn append_rows(&self, _table: &str, rows: &[BackupRow]) -> SweepResult<()> {
        self.rows.lock().unwrap().extend_from_slice(rows);
        Ok(())
    }
}

#[derive(Default)]
pub struct StubNotifier {
    pub fail: bool,
    sent: Mutex<Vec<(String, String, String)>>,
}

impl StubNotifier {
    pub fn failing() -> Self {
        StubNotifier {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> SweepResult<()> {
        if self.fail {
            return Err(SweepError::Notify("smtp down".into()));
        }
        self.sent.lock().unwrap().push((
            recipient.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}
