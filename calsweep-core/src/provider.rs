//! Capabilities the sweep engine consumes but does not implement.
//!
//! Calendar access, backup persistence and report delivery live behind
//! these traits so the engine can run against a local caldir, a remote
//! service, or a test stub alike.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::backup::BackupRow;
use crate::calendar::CalendarHandle;
use crate::error::SweepResult;
use crate::event::CalendarEvent;

/// Calendar enumeration, event listing and event deletion.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_calendars(&self) -> SweepResult<Vec<CalendarHandle>>;

    /// Events of `calendar` overlapping `[start, end)`, in provider order.
    async fn events(
        &self,
        calendar: &CalendarHandle,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SweepResult<Vec<CalendarEvent>>;

    /// Attempt to remove `event`. Failures carry the provider's message,
    /// which is what permission classification inspects.
    async fn delete_event(&self, calendar: &CalendarHandle, event: &CalendarEvent)
    -> SweepResult<()>;
}

/// Tabular storage for pre-deletion snapshots.
#[async_trait]
pub trait BackupSink: Send + Sync {
    /// Create a named table and return an identifier (path, URL) for it.
    async fn create_table(&self, name: &str) -> SweepResult<String>;

    async fn append_rows(&self, table: &str, rows: &[BackupRow]) -> SweepResult<()>;
}

/// Delivers a rendered report.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> SweepResult<()>;
}
