//! TUI rendering traits for calsweep types.
//!
//! Extension traits that add colored terminal rendering to calsweep-core
//! types using owo_colors.

use calsweep_core::calendar::CalendarHandle;
use calsweep_core::config::RunMode;
use calsweep_core::disposition::EventDisposition;
use calsweep_core::report::{CalendarSummary, Summary};
use calsweep_core::run::RunStatus;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for RunMode {
    fn render(&self) -> String {
        match self {
            RunMode::Simulate => self.label().cyan().bold().to_string(),
            RunMode::Live => self.label().red().bold().to_string(),
        }
    }
}

impl Render for EventDisposition {
    fn render(&self) -> String {
        match self {
            EventDisposition::Deleted => self.to_string().red().to_string(),
            EventDisposition::Skipped { .. } => self.to_string().yellow().to_string(),
            EventDisposition::Error { .. } => self.to_string().red().bold().to_string(),
        }
    }
}

impl Render for CalendarHandle {
    fn render(&self) -> String {
        format!("📅 {}", self.name)
    }
}

impl Render for CalendarSummary {
    fn render(&self) -> String {
        let mut lines = vec![format!("📅 {}", self.name.bold())];

        lines.push(format!(
            "   {} processed, {} deleted, {} skipped, {} errors",
            self.processed,
            self.deleted.green(),
            self.skipped.yellow(),
            if self.errors > 0 {
                self.errors.red().to_string()
            } else {
                self.errors.to_string()
            }
        ));

        for (reason, count) in &self.skip_reasons {
            lines.push(format!("   {}", format!("skipped ({reason}): {count}").dimmed()));
        }

        for sample in &self.samples {
            lines.push(format!(
                "   {} {} {}",
                sample.title,
                sample.date.dimmed(),
                sample.disposition.render()
            ));
        }

        for message in &self.error_messages {
            lines.push(format!("   {}", message.red()));
        }

        lines.join("\n")
    }
}

impl Render for Summary {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        for calendar in &self.calendars {
            lines.push(calendar.render());
            lines.push(String::new());
        }

        match self.status {
            RunStatus::NoTargetCalendars => {
                lines.push("No calendars matched the selection.".dimmed().to_string());
            }
            RunStatus::Aborted => {
                lines.push("Sweep aborted.".red().bold().to_string());
            }
            RunStatus::Completed => {}
        }

        let verb = if self.mode.is_simulate() {
            "would delete"
        } else {
            "deleted"
        };
        lines.push(format!(
            "{} {} processed, {} {}, {} skipped, {} errors in {} ({} success)",
            self.mode.render(),
            self.processed,
            self.deleted,
            verb,
            self.skipped,
            self.errors,
            self.duration_label(),
            self.success_rate_label()
        ));

        if let Some(backup) = &self.backup {
            lines.push(format!("Backup: {}", backup.dimmed()));
        }

        for message in &self.error_log {
            lines.push(format!("{} {}", "error:".red(), message));
        }

        for recommendation in &self.recommendations {
            lines.push(format!("{} {}", "→".cyan(), recommendation));
        }

        lines.join("\n")
    }
}

/// A calendar line for `calsweep calendars`: targeted calendars are marked.
pub fn render_target(calendar: &CalendarHandle, targeted: bool) -> String {
    if targeted {
        format!("{} {}", calendar.render(), "(swept)".green())
    } else {
        format!("{} {}", calendar.render(), "(excluded)".dimmed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsweep_core::disposition::SkipReason;

    #[test]
    fn test_target_marks_selection() {
        let calendar = CalendarHandle::new("work", "work");

        let swept = render_target(&calendar, true);
        assert!(swept.starts_with("📅 work "));
        assert!(swept.contains("(swept)"));
        assert!(render_target(&calendar, false).contains("(excluded)"));
    }

    #[test]
    fn test_disposition_text_survives_coloring() {
        let skipped = EventDisposition::Skipped {
            reason: SkipReason::PermissionDenied,
        };
        assert!(skipped.render().contains(&skipped.to_string()));
    }
}
