//! Per-event deletion outcome.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::calendar::CalendarHandle;
use crate::config::RunMode;
use crate::event::CalendarEvent;
use crate::provider::CalendarProvider;

/// Provider refusals containing this phrase are treated as permission
/// denials. Provider- and locale-specific.
const PERMISSION_DENIED_PHRASE: &str = "action not allowed";

/// Why an event counted as skipped. Open set: providers may surface
/// reasons beyond the well-known ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    FilteredOut,
    PermissionDenied,
    Unknown,
    Other(String),
}

impl SkipReason {
    pub fn as_str(&self) -> &str {
        match self {
            SkipReason::FilteredOut => "filtered_out",
            SkipReason::PermissionDenied => "permission_denied",
            SkipReason::Unknown => "unknown",
            SkipReason::Other(reason) => reason,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Terminal result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventDisposition {
    /// Removed, or would have been in simulate mode
    Deleted,
    Skipped { reason: SkipReason },
    Error { message: String },
}

impl fmt::Display for EventDisposition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventDisposition::Deleted => write!(f, "deleted"),
            EventDisposition::Skipped { reason } => write!(f, "skipped ({reason})"),
            EventDisposition::Error { message } => write!(f, "error: {message}"),
        }
    }
}

/// Map a failed deletion to a disposition. The only place permission
/// refusals are told apart from other failures.
pub fn classify_failure(message: &str) -> EventDisposition {
    if message.to_lowercase().contains(PERMISSION_DENIED_PHRASE) {
        EventDisposition::Skipped {
            reason: SkipReason::PermissionDenied,
        }
    } else {
        EventDisposition::Error {
            message: message.to_string(),
        }
    }
}

/// Delete `event` (or pretend to, in simulate mode). Never fails: every
/// outcome is a disposition.
pub async fn dispose(
    provider: &dyn CalendarProvider,
    calendar: &CalendarHandle,
    event: &CalendarEvent,
    mode: RunMode,
) -> EventDisposition {
    if mode.is_simulate() {
        tracing::debug!(calendar = %calendar, event = %event, "would delete");
        return EventDisposition::Deleted;
    }

    match provider.delete_event(calendar, event).await {
        Ok(()) => {
            tracing::debug!(calendar = %calendar, event = %event, "deleted");
            EventDisposition::Deleted
        }
        Err(e) => {
            let disposition = classify_failure(&e.to_string());
            tracing::warn!(calendar = %calendar, event = %event, %disposition, "delete failed");
            disposition
        }
    }
}
