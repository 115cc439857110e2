//! A caldir-style directory as a calendar provider.
//!
//! Each subdirectory of the root is a calendar and each `.ics` file inside
//! it is one event. Deleting an event removes its file.

mod backup;
mod ics;

pub use backup::JsonBackupSink;
pub use ics::parse_event;

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::calendar::CalendarHandle;
use crate::error::{SweepError, SweepResult};
use crate::event::CalendarEvent;
use crate::provider::CalendarProvider;

#[derive(Debug, Clone)]
pub struct LocalCaldir {
    root: PathBuf,
}

impl LocalCaldir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalCaldir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn calendar_path(&self, calendar: &CalendarHandle) -> PathBuf {
        self.root.join(&calendar.id)
    }

    /// Every parseable event file in `dir`, sorted by file name.
    fn read_events(dir: &Path) -> SweepResult<Vec<CalendarEvent>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "ics"))
            .collect();
        paths.sort();

        let events = paths
            .into_iter()
            .filter_map(|path| {
                let id = path.file_name()?.to_str()?.to_string();
                let content = match std::fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "unreadable event file");
                        return None;
                    }
                };
                let event = parse_event(&id, &content);
                if event.is_none() {
                    tracing::warn!(path = %path.display(), "could not parse event file");
                }
                event
            })
            .collect();

        Ok(events)
    }
}

#[async_trait]
impl CalendarProvider for LocalCaldir {
    async fn list_calendars(&self) -> SweepResult<Vec<CalendarHandle>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            SweepError::ProviderAccess(format!(
                "Could not read calendar directory {}: {e}",
                self.root.display()
            ))
        })?;

        let mut calendars: Vec<CalendarHandle> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .map(|name| CalendarHandle::new(name.clone(), name))
            .collect();

        calendars.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(calendars)
    }

    async fn events(
        &self,
        calendar: &CalendarHandle,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SweepResult<Vec<CalendarEvent>> {
        let dir = self.calendar_path(calendar);
        let events = Self::read_events(&dir).map_err(|e| {
            SweepError::ProviderAccess(format!("Could not read {}: {e}", dir.display()))
        })?;

        // Unresolvable times are passed through so the filter can account for them
        Ok(events
            .into_iter()
            .filter(|e| {
                e.start_utc().is_none() || e.end_utc().is_none() || e.overlaps(start, end)
            })
            .collect())
    }

    async fn delete_event(
        &self,
        calendar: &CalendarHandle,
        event: &CalendarEvent,
    ) -> SweepResult<()> {
        let path = self.calendar_path(calendar).join(&event.id);

        std::fs::remove_file(&path).map_err(|e| deletion_error(&path, e))
    }
}

/// OS permission refusals are phrased so they classify as permission denials.
fn deletion_error(path: &Path, e: io::Error) -> SweepError {
    match e.kind() {
        ErrorKind::PermissionDenied => {
            SweepError::Deletion(format!("Action not allowed: {} is read-only", path.display()))
        }
        ErrorKind::NotFound => SweepError::Deletion(format!("Event not found: {}", path.display())),
        _ => SweepError::Deletion(format!("Could not delete {}: {e}", path.display())),
    }
}
