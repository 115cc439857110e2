use anyhow::Result;
use calsweep_core::config::{RunMode, SweepConfig};
use calsweep_core::date_range::DateRange;
use chrono::Utc;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::SweepArgs;

pub async fn run(
    config: &SweepConfig,
    args: &SweepArgs,
    live: bool,
    yes: bool,
    verbose: u8,
) -> Result<()> {
    let mut config = args.apply(config);
    if live {
        config.mode = RunMode::Live;
    }

    // Configuration errors stop here, before anything is prompted or touched
    config.validate()?;

    if config.mode == RunMode::Live && !yes {
        let range = DateRange::compute(&config, Utc::now());
        println!(
            "{} events before {} will be deleted from {}",
            "LIVE".red().bold(),
            range.cutoff.format("%Y-%m-%d"),
            config.calendar_path().display()
        );
        println!(
            "  at most {} per calendar, {}",
            config.limits.max_deletes_per_run,
            if config.backup.before_delete {
                "with a backup first"
            } else {
                "without a backup"
            }
        );
        println!();

        let confirmed = Confirm::new()
            .with_prompt("Continue?")
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    super::sweep(&config, args.json, verbose).await
}
