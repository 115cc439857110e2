//! Orchestrating a sweep across calendars.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backup;
use crate::calendar::CalendarHandle;
use crate::config::{RunMode, SweepConfig};
use crate::date_range::DateRange;
use crate::error::SweepResult;
use crate::processor::{self, CalendarResult};
use crate::provider::{BackupSink, CalendarProvider, Notifier};
use crate::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Selection matched no calendars; nothing was touched
    NoTargetCalendars,
    /// A run-level failure stopped the sweep; counts cover what finished
    Aborted,
}

/// Aggregate outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mode: RunMode,
    pub status: RunStatus,
    pub processed: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub calendars: Vec<CalendarResult>,
    /// Identifier of the pre-deletion backup, when one was taken
    pub backup: Option<String>,
    pub error_log: Vec<String>,
}

impl RunResult {
    pub fn new(mode: RunMode, started_at: DateTime<Utc>) -> Self {
        RunResult {
            started_at,
            finished_at: started_at,
            mode,
            status: RunStatus::Completed,
            processed: 0,
            deleted: 0,
            skipped: 0,
            errors: 0,
            calendars: Vec::new(),
            backup: None,
            error_log: Vec::new(),
        }
    }

    fn add(&mut self, calendar: CalendarResult) {
        self.processed += calendar.processed;
        self.deleted += calendar.deleted;
        self.skipped += calendar.skipped;
        self.errors += calendar.errors;
        self.calendars.push(calendar);
    }

    fn abort(&mut self, message: String) {
        tracing::error!("{message}");
        self.status = RunStatus::Aborted;
        self.error_log.push(message);
    }
}

/// Runs a sweep against a provider, with optional backup and notification.
pub struct RunCoordinator<'a> {
    provider: &'a dyn CalendarProvider,
    backup: Option<&'a dyn BackupSink>,
    notifier: Option<&'a dyn Notifier>,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(provider: &'a dyn CalendarProvider) -> Self {
        RunCoordinator {
            provider,
            backup: None,
            notifier: None,
        }
    }

    pub fn with_backup(mut self, sink: &'a dyn BackupSink) -> Self {
        self.backup = Some(sink);
        self
    }

    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Calendars the selection targets, in provider order.
    pub async fn target_calendars(&self, config: &SweepConfig) -> SweepResult<Vec<CalendarHandle>> {
        let calendars = self.provider.list_calendars().await?;
        Ok(calendars
            .into_iter()
            .filter(|c| config.calendars.targets(&c.name))
            .collect())
    }

    /// Run a sweep.
    ///
    /// Only an invalid configuration is an `Err`, and it is returned before
    /// the provider is touched. Every other failure is recorded in the
    /// returned result.
    pub async fn run(&self, config: &SweepConfig) -> SweepResult<RunResult> {
        let warnings = config.validate()?;
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let mut result = RunResult::new(config.mode, Utc::now());
        tracing::info!(mode = %config.mode, window = %config.window, "starting sweep");

        self.sweep(config, &mut result).await;

        result.finished_at = Utc::now();
        tracing::info!(
            processed = result.processed,
            deleted = result.deleted,
            skipped = result.skipped,
            errors = result.errors,
            "sweep finished"
        );

        if config.report.build_report {
            log_summary(&result);
        }

        self.notify(config, &mut result).await;

        Ok(result)
    }

    async fn sweep(&self, config: &SweepConfig, result: &mut RunResult) {
        let calendars = match self.target_calendars(config).await {
            Ok(calendars) => calendars,
            Err(e) => {
                result.abort(format!("Could not list calendars: {e}"));
                return;
            }
        };

        if calendars.is_empty() {
            tracing::warn!("no calendars match the selection");
            result.status = RunStatus::NoTargetCalendars;
            return;
        }

        let range = DateRange::compute(config, result.started_at);
        tracing::info!(cutoff = %range.cutoff, calendars = calendars.len(), "scanning");

        if config.backup.before_delete && config.mode == RunMode::Live {
            match self.backup {
                Some(sink) => {
                    match backup::capture(self.provider, sink, &calendars, &range, config).await {
                        Ok(table) => result.backup = Some(table),
                        Err(e) => {
                            result.abort(format!("Backup failed, nothing was deleted: {e}"));
                            return;
                        }
                    }
                }
                None => {
                    result.abort("Backup requested but no backup sink is available".into());
                    return;
                }
            }
        }

        for calendar in &calendars {
            let calendar_result = processor::process(self.provider, calendar, &range, config).await;
            result.add(calendar_result);
        }
    }

    async fn notify(&self, config: &SweepConfig, result: &mut RunResult) {
        let Some(recipient) = config.report.email_target() else {
            return;
        };
        let Some(notifier) = self.notifier else {
            tracing::warn!("email report requested but no notifier is configured");
            return;
        };

        let subject = report::email_subject(result);
        let body = report::render_email_body(result);
        match notifier.send(recipient, &subject, &body).await {
            Ok(()) => tracing::info!(recipient, "report sent"),
            Err(e) => {
                let message = format!("Could not send report to {recipient}: {e}");
                tracing::warn!("{message}");
                result.error_log.push(message);
            }
        }
    }
}

fn log_summary(result: &RunResult) {
    let summary = report::summarize(result);
    for calendar in &summary.calendars {
        tracing::info!(
            calendar = %calendar.name,
            processed = calendar.processed,
            deleted = calendar.deleted,
            skipped = calendar.skipped,
            errors = calendar.errors,
            "calendar summary"
        );
    }
    tracing::info!(
        duration = %summary.duration_label(),
        success_rate = %summary.success_rate_label(),
        "run summary"
    );
    for recommendation in &summary.recommendations {
        tracing::info!("{recommendation}");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::TimeWindow;
    use crate::disposition::SkipReason;
    use crate::error::SweepError;
    use crate::test_support::{StubNotifier, StubProvider, StubSink, events};

    fn config() -> SweepConfig {
        let mut config = SweepConfig {
            window: TimeWindow::days(30),
            ..Default::default()
        };
        config.limits.pause_between_deletes = Duration::ZERO;
        config
    }

    #[tokio::test]
    async fn test_missing_window_rejected_before_provider_call() {
        let provider = StubProvider::new()
            .with_calendar(&CalendarHandle::new("work", "Work"), events(&["A"]));
        let config = SweepConfig::default();

        let err = RunCoordinator::new(&provider).run(&config).await.unwrap_err();

        assert!(matches!(err, SweepError::Config(_)));
        assert_eq!(provider.list_calls(), 0);
        assert_eq!(provider.event_calls(), 0);
    }

    #[tokio::test]
    async fn test_simulated_run_with_excluded_keywords() {
        let calendar = CalendarHandle::new("personal", "Personal");
        let provider = StubProvider::new().with_calendar(
            &calendar,
            events(&["Dentist", "Birthday: Ann", "Gym", "Team birthday", "Haircut"]),
        );
        let mut config = config();
        config.filters.exclude_keywords = vec!["birthday".into()];
        config.limits.max_deletes_per_run = 10;

        let result = RunCoordinator::new(&provider).run(&config).await.unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.processed, 3);
        assert_eq!(result.deleted, 3);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.calendars.len(), 1);
        assert_eq!(provider.delete_attempts(), 0);
        assert!(result.finished_at >= result.started_at);
    }

    #[tokio::test]
    async fn test_results_are_summed_in_provider_order() {
        let work = CalendarHandle::new("work", "Work");
        let home = CalendarHandle::new("home", "Home");
        let provider = StubProvider::new()
            .with_calendar(&work, events(&["A", "B"]))
            .with_calendar(&home, events(&["Birthday"]));
        let mut config = config();
        config.mode = RunMode::Live;
        config.filters.exclude_keywords = vec!["birthday".into()];

        let result = RunCoordinator::new(&provider).run(&config).await.unwrap();

        let names: Vec<_> = result.calendars.iter().map(|c| c.calendar.as_str()).collect();
        assert_eq!(names, vec!["Work", "Home"]);
        assert_eq!(result.deleted, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(
            result.calendars[1].skip_reasons.get(&SkipReason::FilteredOut),
            Some(&1)
        );
    }

    #[tokio::test]
    async fn test_include_list_wins_over_exclude_list() {
        let work = CalendarHandle::new("work", "Work");
        let home = CalendarHandle::new("home", "Home");
        let provider = StubProvider::new()
            .with_calendar(&work, events(&["A"]))
            .with_calendar(&home, events(&["B"]));
        let mut config = config();
        config.calendars.include = vec!["Home".into()];
        config.calendars.exclude = vec!["Home".into()];

        let result = RunCoordinator::new(&provider).run(&config).await.unwrap();

        assert_eq!(result.calendars.len(), 1);
        assert_eq!(result.calendars[0].calendar, "Home");
    }

    #[tokio::test]
    async fn test_no_target_calendars_is_a_noop() {
        let provider = StubProvider::new()
            .with_calendar(&CalendarHandle::new("work", "Work"), events(&["A"]));
        let mut config = config();
        config.calendars.include = vec!["Nope".into()];

        let result = RunCoordinator::new(&provider).run(&config).await.unwrap();

        assert_eq!(result.status, RunStatus::NoTargetCalendars);
        assert!(result.calendars.is_empty());
        assert_eq!(provider.event_calls(), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_returns_partial_result() {
        let provider = StubProvider::new().failing_list("offline");

        let result = RunCoordinator::new(&provider).run(&config()).await.unwrap();

        assert_eq!(result.status, RunStatus::Aborted);
        assert_eq!(result.error_log.len(), 1);
        assert!(result.error_log[0].contains("offline"));
    }

    #[tokio::test]
    async fn test_one_broken_calendar_does_not_stop_others() {
        let broken = CalendarHandle::new("broken", "Broken");
        let work = CalendarHandle::new("work", "Work");
        let provider = StubProvider::new()
            .with_calendar(&broken, events(&["A"]))
            .with_calendar(&work, events(&["B"]))
            .failing_events("broken", "boom");

        let result = RunCoordinator::new(&provider).run(&config()).await.unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.errors, 1);
        assert_eq!(result.deleted, 1);
    }

    #[tokio::test]
    async fn test_backup_taken_before_live_deletion() {
        let work = CalendarHandle::new("work", "Work");
        let provider = StubProvider::new().with_calendar(&work, events(&["A", "B"]));
        let sink = StubSink::default();
        let mut config = config();
        config.mode = RunMode::Live;
        config.backup.before_delete = true;

        let result = RunCoordinator::new(&provider)
            .with_backup(&sink)
            .run(&config)
            .await
            .unwrap();

        assert_eq!(sink.rows().len(), 2);
        assert_eq!(result.backup, Some(format!("stub://{}", sink.tables()[0])));
        assert_eq!(result.deleted, 2);
    }

    #[tokio::test]
    async fn test_no_backup_in_simulation() {
        let work = CalendarHandle::new("work", "Work");
        let provider = StubProvider::new().with_calendar(&work, events(&["A"]));
        let sink = StubSink::default();
        let mut config = config();
        config.backup.before_delete = true;

        let result = RunCoordinator::new(&provider)
            .with_backup(&sink)
            .run(&config)
            .await
            .unwrap();

        assert!(sink.tables().is_empty());
        assert_eq!(result.backup, None);
    }

    #[tokio::test]
    async fn test_failed_backup_prevents_deletion() {
        let work = CalendarHandle::new("work", "Work");
        let provider = StubProvider::new().with_calendar(&work, events(&["A"]));
        let sink = StubSink::failing();
        let mut config = config();
        config.mode = RunMode::Live;
        config.backup.before_delete = true;

        let result = RunCoordinator::new(&provider)
            .with_backup(&sink)
            .run(&config)
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Aborted);
        assert_eq!(provider.delete_attempts(), 0);
        assert!(result.calendars.is_empty());
    }

    #[tokio::test]
    async fn test_backup_without_sink_prevents_deletion() {
        let work = CalendarHandle::new("work", "Work");
        let provider = StubProvider::new().with_calendar(&work, events(&["A"]));
        let mut config = config();
        config.mode = RunMode::Live;
        config.backup.before_delete = true;

        let result = RunCoordinator::new(&provider).run(&config).await.unwrap();

        assert_eq!(result.status, RunStatus::Aborted);
        assert_eq!(provider.delete_attempts(), 0);
        assert!(result.error_log[0].contains("no backup sink"));
    }

    #[tokio::test]
    async fn test_report_emailed_only_when_configured() {
        let work = CalendarHandle::new("work", "Work");
        let provider = StubProvider::new().with_calendar(&work, events(&["A"]));
        let notifier = StubNotifier::default();

        let mut config = config();
        config.report.email_recipient = Some("me@example.com".into());
        RunCoordinator::new(&provider)
            .with_notifier(&notifier)
            .run(&config)
            .await
            .unwrap();
        assert!(notifier.sent().is_empty());

        config.report.email_report = true;
        RunCoordinator::new(&provider)
            .with_notifier(&notifier)
            .run(&config)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "me@example.com");
        assert!(sent[0].1.contains("SIMULATION"));
    }

    #[tokio::test]
    async fn test_notifier_failure_is_logged_not_fatal() {
        let work = CalendarHandle::new("work", "Work");
        let provider = StubProvider::new().with_calendar(&work, events(&["A"]));
        let notifier = StubNotifier::failing();
        let mut config = config();
        config.report.email_report = true;
        config.report.email_recipient = Some("me@example.com".into());

        let result = RunCoordinator::new(&provider)
            .with_notifier(&notifier)
            .run(&config)
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(result.error_log.len(), 1);
        assert!(result.error_log[0].contains("smtp down"));
    }
}
