use std::time::Duration;

/// Lower bound of every scan. Events before this are never considered.
pub const SCAN_EPOCH: &str = "1970-01-01T00:00:00Z";

pub const DEFAULT_MAX_DELETES_PER_RUN: usize = 50;

pub const DEFAULT_PAUSE_BETWEEN_DELETES: Duration = Duration::from_secs(1);

/// How many events per calendar are kept as samples for reports.
pub const DEFAULT_SAMPLE_EVENTS: usize = 5;

/// Upper bound on rows written to a pre-deletion backup.
pub const DEFAULT_BACKUP_ROWS: usize = 1000;

/// Live runs above this cap get a warning at validation time. Not enforced.
pub const SOFT_MAX_DELETES_THRESHOLD: usize = 100;
