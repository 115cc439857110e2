use anyhow::Result;
use calsweep_core::config::SweepConfig;

use super::SweepArgs;

/// Sweep in simulation regardless of the configured mode.
pub async fn run(config: &SweepConfig, args: &SweepArgs, verbose: u8) -> Result<()> {
    let config = args.apply(config).simulated();
    super::sweep(&config, args.json, verbose).await
}
