//! Core library for calsweep.
//!
//! Deletes old calendar events in bulk, with a simulation mode, per-run
//! deletion caps, optional backups, and run reports:
//! - [`config`] holds the immutable sweep configuration and its loading
//! - [`run::RunCoordinator`] drives a run across every targeted calendar
//! - [`provider`] declares the external capabilities a run talks to
//! - [`local`] implements them on top of a directory of `.ics` files

pub mod backup;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod date_range;
pub mod disposition;
pub mod error;
pub mod event;
pub mod filter;
pub mod local;
pub mod processor;
pub mod provider;
pub mod report;
pub mod run;

#[cfg(test)]
mod test_support;

pub use calendar::CalendarHandle;
pub use config::{ConfigWarning, RunMode, SweepConfig};
pub use error::{SweepError, SweepResult};
pub use event::{Attendee, CalendarEvent, EventTime};
pub use provider::{BackupSink, CalendarProvider, Notifier};
pub use run::{RunCoordinator, RunResult, RunStatus};
