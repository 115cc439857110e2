//! Sweep configuration.
//!
//! A [`SweepConfig`] is an immutable value handed to every entry point.
//! Derived variants (e.g. a forced simulation) are copies, never mutations.

mod file;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    DEFAULT_BACKUP_ROWS, DEFAULT_MAX_DELETES_PER_RUN, DEFAULT_PAUSE_BETWEEN_DELETES,
    DEFAULT_SAMPLE_EVENTS, SOFT_MAX_DELETES_THRESHOLD,
};
use crate::error::{SweepError, SweepResult};

static DEFAULT_CALENDAR_PATH: &str = "~/calendar";

fn default_calendar_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CALENDAR_PATH)
}

/// Whether deletions are simulated or actually performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Simulate,
    Live,
}

impl RunMode {
    pub fn is_simulate(self) -> bool {
        self == RunMode::Simulate
    }

    pub fn label(self) -> &'static str {
        match self {
            RunMode::Simulate => "SIMULATION",
            RunMode::Live => "LIVE",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How far back events are kept. The first field set, in the order
/// days, months, years, determines the cutoff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimeWindow {
    pub days_to_keep: Option<u32>,
    pub months_to_keep: Option<u32>,
    pub years_to_keep: Option<u32>,
}

impl TimeWindow {
    pub fn days(n: u32) -> Self {
        TimeWindow {
            days_to_keep: Some(n),
            ..Default::default()
        }
    }

    pub fn months(n: u32) -> Self {
        TimeWindow {
            months_to_keep: Some(n),
            ..Default::default()
        }
    }

    pub fn years(n: u32) -> Self {
        TimeWindow {
            years_to_keep: Some(n),
            ..Default::default()
        }
    }

    pub fn is_set(&self) -> bool {
        self.days_to_keep.is_some() || self.months_to_keep.is_some() || self.years_to_keep.is_some()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.days_to_keep, self.months_to_keep, self.years_to_keep) {
            (Some(d), _, _) => write!(f, "{d} days"),
            (None, Some(m), _) => write!(f, "{m} months"),
            (None, None, Some(y)) => write!(f, "{y} years"),
            (None, None, None) => write!(f, "(unset)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Per-calendar cap on dispositioned events.
    pub max_deletes_per_run: usize,
    #[serde(deserialize_with = "deserialize_duration")]
    pub pause_between_deletes: Duration,
    pub sample_events: usize,
    pub backup_rows: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_deletes_per_run: DEFAULT_MAX_DELETES_PER_RUN,
            pause_between_deletes: DEFAULT_PAUSE_BETWEEN_DELETES,
            sample_events: DEFAULT_SAMPLE_EVENTS,
            backup_rows: DEFAULT_BACKUP_ROWS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Recurring-instance policy: recurring events are only touched when set.
    pub delete_recurring: bool,
    pub skip_all_day: bool,
    pub skip_with_attendees: bool,
    pub exclude_keywords: Vec<String>,
    pub only_keywords: Vec<String>,
    pub min_title_length: usize,
}

/// Which calendars a run targets. A non-empty `include` wins over `exclude`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarSelection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl CalendarSelection {
    pub fn targets(&self, name: &str) -> bool {
        if !self.include.is_empty() {
            return self.include.iter().any(|n| n == name);
        }
        !self.exclude.iter().any(|n| n == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub build_report: bool,
    pub email_report: bool,
    pub email_recipient: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            build_report: true,
            email_report: false,
            email_recipient: None,
        }
    }
}

impl ReportConfig {
    /// Recipient to email, if emailing is enabled and a recipient is configured.
    pub fn email_target(&self) -> Option<&str> {
        if !self.email_report {
            return None;
        }
        self.email_recipient.as_deref().filter(|r| !r.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub before_delete: bool,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

fn default_smtp_port() -> u16 {
    587
}

/// Configuration for a sweep, read once and never mutated during a run.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_calendar_dir")]
    pub calendar_dir: PathBuf,

    #[serde(default)]
    pub mode: RunMode,

    #[serde(default)]
    pub window: TimeWindow,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub calendars: CalendarSelection,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    pub smtp: Option<SmtpConfig>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            calendar_dir: default_calendar_dir(),
            mode: RunMode::default(),
            window: TimeWindow::default(),
            limits: Limits::default(),
            filters: FilterConfig::default(),
            calendars: CalendarSelection::default(),
            report: ReportConfig::default(),
            backup: BackupConfig::default(),
            smtp: None,
        }
    }
}

/// Non-fatal findings from [`SweepConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    EmailWithoutRecipient,
    EmailWithoutSmtp,
    LiveRecurringDeletion,
    HighDeleteCap(usize),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigWarning::EmailWithoutRecipient => {
                write!(f, "Email report is enabled but no recipient is configured")
            }
            ConfigWarning::EmailWithoutSmtp => {
                write!(f, "Email report is enabled but no [smtp] section is configured")
            }
            ConfigWarning::LiveRecurringDeletion => {
                write!(f, "Live mode will delete instances of recurring events")
            }
            ConfigWarning::HighDeleteCap(cap) => write!(
                f,
                "Live mode may delete up to {cap} events per calendar (above {SOFT_MAX_DELETES_THRESHOLD})"
            ),
        }
    }
}

impl SweepConfig {
    /// Check the configuration before any calendar is touched.
    ///
    /// Fails when no time window is set; everything else is a warning.
    pub fn validate(&self) -> SweepResult<Vec<ConfigWarning>> {
        if !self.window.is_set() {
            return Err(SweepError::Config(
                "One of days_to_keep, months_to_keep or years_to_keep must be set".into(),
            ));
        }

        let mut warnings = Vec::new();

        if self.report.email_report
            && self
                .report
                .email_recipient
                .as_deref()
                .is_none_or(|r| r.trim().is_empty())
        {
            warnings.push(ConfigWarning::EmailWithoutRecipient);
        }

        if self.report.email_target().is_some() && self.smtp.is_none() {
            warnings.push(ConfigWarning::EmailWithoutSmtp);
        }

        if self.mode == RunMode::Live {
            if self.filters.delete_recurring {
                warnings.push(ConfigWarning::LiveRecurringDeletion);
            }
            if self.limits.max_deletes_per_run > SOFT_MAX_DELETES_THRESHOLD {
                warnings.push(ConfigWarning::HighDeleteCap(self.limits.max_deletes_per_run));
            }
        }

        Ok(warnings)
    }

    /// A copy of this configuration that never deletes anything.
    pub fn simulated(&self) -> Self {
        SweepConfig {
            mode: RunMode::Simulate,
            ..self.clone()
        }
    }

    /// Calendar directory with `~` expanded.
    pub fn calendar_path(&self) -> PathBuf {
        expand(&self.calendar_dir)
    }

    /// Where pre-deletion backups are written.
    pub fn backup_path(&self) -> SweepResult<PathBuf> {
        match &self.backup.dir {
            Some(dir) => Ok(expand(dir)),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| SweepError::Config("Could not determine data directory".into()))?
                .join("calsweep")
                .join("backups")),
        }
    }
}

fn expand(path: &std::path::Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}
