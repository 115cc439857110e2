//! Run summaries and email reports.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::RunMode;
use crate::processor::EventSample;
use crate::run::{RunResult, RunStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarSummary {
    pub name: String,
    pub processed: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub skip_reasons: BTreeMap<String, usize>,
    pub samples: Vec<EventSample>,
    pub error_messages: Vec<String>,
}

/// Structured view of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub duration_secs: f64,
    pub mode: RunMode,
    pub status: RunStatus,
    pub processed: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
    /// `deleted / processed`, 0 when nothing was processed
    pub success_rate: f64,
    pub calendars: Vec<CalendarSummary>,
    pub recommendations: Vec<String>,
    pub backup: Option<String>,
    pub error_log: Vec<String>,
}

impl Summary {
    pub fn duration_label(&self) -> String {
        format!("{:.1}s", self.duration_secs)
    }

    pub fn success_rate_label(&self) -> String {
        format!("{:.1}%", self.success_rate * 100.0)
    }
}

pub fn success_rate(deleted: usize, processed: usize) -> f64 {
    if processed == 0 {
        return 0.0;
    }
    deleted as f64 / processed as f64
}

/// Suggestions driven only by the aggregate counts and mode.
pub fn recommendations(result: &RunResult) -> Vec<String> {
    let mut recommendations = Vec::new();

    match result.mode {
        RunMode::Simulate => recommendations.push(
            "This was a simulation. Review the events above, then run with mode = \"live\" to delete them."
                .to_string(),
        ),
        RunMode::Live if result.deleted > 0 => recommendations.push(
            "Consider scheduling calsweep to run periodically (cron or a systemd timer) to keep calendars tidy."
                .to_string(),
        ),
        RunMode::Live => {}
    }

    if result.skipped > 0 {
        recommendations.push(format!(
            "{} events were skipped. Review the filter settings if that is more than expected.",
            result.skipped
        ));
    }

    recommendations
}

pub fn summarize(result: &RunResult) -> Summary {
    let duration_secs = (result.finished_at - result.started_at)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    let calendars = result
        .calendars
        .iter()
        .map(|c| CalendarSummary {
            name: c.calendar.clone(),
            processed: c.processed,
            deleted: c.deleted,
            skipped: c.skipped,
            errors: c.errors,
            skip_reasons: c
                .skip_reasons
                .iter()
                .map(|(reason, count)| (reason.to_string(), *count))
                .collect(),
            samples: c.samples.clone(),
            error_messages: c.error_messages.clone(),
        })
        .collect();

    Summary {
        duration_secs,
        mode: result.mode,
        status: result.status,
        processed: result.processed,
        deleted: result.deleted,
        skipped: result.skipped,
        errors: result.errors,
        success_rate: success_rate(result.deleted, result.processed),
        calendars,
        recommendations: recommendations(result),
        backup: result.backup.clone(),
        error_log: result.error_log.clone(),
    }
}

pub fn email_subject(result: &RunResult) -> String {
    format!(
        "Calendar cleanup report {} ({})",
        result.started_at.format("%Y-%m-%d"),
        result.mode.label()
    )
}

/// Plain-text email body for `result`.
pub fn render_email_body(result: &RunResult) -> String {
    EmailBody {
        result,
        summary: summarize(result),
    }
    .to_string()
}

struct EmailBody<'a> {
    result: &'a RunResult,
    summary: Summary,
}

impl fmt::Display for EmailBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        let verb = match summary.mode {
            RunMode::Simulate => "Would delete:",
            RunMode::Live => "Deleted:",
        };

        writeln!(f, "Calendar cleanup report")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Mode:         {}", summary.mode.label())?;
        writeln!(
            f,
            "Started:      {}",
            self.result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "Duration:     {}", summary.duration_label())?;
        writeln!(f, "Processed:    {}", summary.processed)?;
        writeln!(f, "{verb:<13} {}", summary.deleted)?;
        writeln!(f, "Skipped:      {}", summary.skipped)?;
        writeln!(f, "Errors:       {}", summary.errors)?;
        writeln!(f, "Success rate: {}", summary.success_rate_label())?;

        if summary.status == RunStatus::NoTargetCalendars {
            writeln!(f)?;
            writeln!(f, "No calendars matched the selection; nothing was done.")?;
        }

        if let Some(backup) = &summary.backup {
            writeln!(f)?;
            writeln!(f, "Backup: {backup}")?;
        }

        for calendar in &summary.calendars {
            writeln!(f)?;
            writeln!(f, "{}", calendar.name)?;
            writeln!(
                f,
                "  processed {}, deleted {}, skipped {}, errors {}",
                calendar.processed, calendar.deleted, calendar.skipped, calendar.errors
            )?;
            for (reason, count) in &calendar.skip_reasons {
                writeln!(f, "  skipped ({reason}): {count}")?;
            }
            for sample in &calendar.samples {
                writeln!(f, "  - {} [{}] {}", sample.title, sample.date, sample.disposition)?;
            }
            for message in &calendar.error_messages {
                writeln!(f, "  ! {message}")?;
            }
        }

        if !summary.error_log.is_empty() {
            writeln!(f)?;
            writeln!(f, "Run errors:")?;
            for message in &summary.error_log {
                writeln!(f, "  ! {message}")?;
            }
        }

        if !summary.recommendations.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recommendations:")?;
            for recommendation in &summary.recommendations {
                writeln!(f, "  * {recommendation}")?;
            }
        }

        Ok(())
    }
}
