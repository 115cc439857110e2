use anyhow::Result;
use calsweep_core::config::SweepConfig;
use calsweep_core::local::LocalCaldir;
use calsweep_core::provider::CalendarProvider;
use owo_colors::OwoColorize;

use crate::render::render_target;

pub async fn run(config: &SweepConfig) -> Result<()> {
    let provider = LocalCaldir::new(config.calendar_path());
    let calendars = provider.list_calendars().await?;

    if calendars.is_empty() {
        println!(
            "{}",
            format!("No calendars found in {}", provider.root().display()).dimmed()
        );
        return Ok(());
    }

    for calendar in &calendars {
        println!("{}", render_target(calendar, config.calendars.targets(&calendar.name)));
    }

    Ok(())
}
