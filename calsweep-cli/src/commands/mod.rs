pub mod analyze;
pub mod calendars;
pub mod config;
pub mod run;

use std::time::Duration;

use anyhow::Result;
use calsweep_core::config::{SweepConfig, TimeWindow};
use calsweep_core::local::{JsonBackupSink, LocalCaldir};
use calsweep_core::report;
use calsweep_core::run::{RunCoordinator, RunStatus};
use clap::Args;

use crate::mailer::SmtpNotifier;
use crate::render::Render;
use crate::utils::tui;

/// Flags shared by `run` and `analyze`. Each one overrides the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct SweepArgs {
    /// Keep events from the last N days
    #[arg(long, conflicts_with_all = ["months", "years"])]
    pub days: Option<u32>,

    /// Keep events from the last N months
    #[arg(long, conflicts_with = "years")]
    pub months: Option<u32>,

    /// Keep events from the last N years
    #[arg(long)]
    pub years: Option<u32>,

    /// Delete at most N events per calendar
    #[arg(long)]
    pub max_deletes: Option<usize>,

    /// Pause between deletions (e.g. "500ms", "2s")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub pause: Option<Duration>,

    /// Only sweep this calendar (repeatable)
    #[arg(short, long)]
    pub calendar: Vec<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl SweepArgs {
    /// A copy of `config` with these flags applied.
    pub fn apply(&self, config: &SweepConfig) -> SweepConfig {
        let mut config = config.clone();

        let window = match (self.days, self.months, self.years) {
            (Some(days), _, _) => Some(TimeWindow::days(days)),
            (None, Some(months), _) => Some(TimeWindow::months(months)),
            (None, None, Some(years)) => Some(TimeWindow::years(years)),
            (None, None, None) => None,
        };
        if let Some(window) = window {
            config.window = window;
        }

        if let Some(max) = self.max_deletes {
            config.limits.max_deletes_per_run = max;
        }
        if let Some(pause) = self.pause {
            config.limits.pause_between_deletes = pause;
        }
        if !self.calendar.is_empty() {
            config.calendars.include = self.calendar.clone();
        }

        config
    }
}

/// The spinner shares stderr with log output, so it only runs when
/// neither JSON nor verbose logging is requested.
fn shows_spinner(json: bool, verbose: u8) -> bool {
    !json && verbose == 0
}

/// Run a sweep with the local caldir and print the summary.
pub async fn sweep(config: &SweepConfig, json: bool, verbose: u8) -> Result<()> {
    let provider = LocalCaldir::new(config.calendar_path());

    let sink = if config.backup.before_delete {
        Some(JsonBackupSink::new(config.backup_path()?))
    } else {
        None
    };

    let notifier = match (&config.smtp, config.report.email_target()) {
        (Some(smtp), Some(_)) => Some(SmtpNotifier::new(smtp)?),
        _ => None,
    };

    let mut coordinator = RunCoordinator::new(&provider);
    if let Some(sink) = &sink {
        coordinator = coordinator.with_backup(sink);
    }
    if let Some(notifier) = &notifier {
        coordinator = coordinator.with_notifier(notifier);
    }

    let spinner = shows_spinner(json, verbose).then(|| {
        tui::create_spinner(format!("Sweeping {} ({})", provider.root().display(), config.mode))
    });
    let result = coordinator.run(config).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = result?;

    let summary = report::summarize(&result);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.render());
    }

    if result.status == RunStatus::Aborted {
        anyhow::bail!("Sweep aborted");
    }

    Ok(())
}
