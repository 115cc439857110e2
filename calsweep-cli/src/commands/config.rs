use std::path::Path;

use anyhow::Result;
use calsweep_core::config::SweepConfig;
use owo_colors::OwoColorize;

pub fn run(config_path: &Path, init: bool) -> Result<()> {
    if init {
        if config_path.exists() {
            anyhow::bail!("Config file already exists at {}", config_path.display());
        }
        SweepConfig::create_default_config(config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let config = SweepConfig::load(config_path)?;

    println!("{}", "Paths".bold());
    println!(
        "  Config:     {}{}",
        config_path.display(),
        if config_path.exists() { "" } else { " (missing)" }
    );
    println!("  Calendars:  {}", config.calendar_path().display());
    match config.backup_path() {
        Ok(path) => println!("  Backups:    {}", path.display()),
        Err(e) => println!("  Backups:    {}", e.to_string().red()),
    }

    println!();
    println!("{}", "Sweep".bold());
    println!("  Mode:       {}", config.mode);
    println!("  Keep:       {}", config.window);
    println!("  Max/cal:    {}", config.limits.max_deletes_per_run);
    println!(
        "  Pause:      {}",
        humantime::format_duration(config.limits.pause_between_deletes)
    );

    println!();
    match config.validate() {
        Ok(warnings) if warnings.is_empty() => println!("{}", "Configuration OK".green()),
        Ok(warnings) => {
            for warning in warnings {
                println!("{} {}", "warning:".yellow(), warning);
            }
        }
        Err(e) => println!("{} {}", "error:".red(), e),
    }

    Ok(())
}
