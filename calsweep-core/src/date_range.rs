//! Date range scanned by a sweep.

use chrono::{DateTime, Duration, Months, Utc};

use crate::config::SweepConfig;
use crate::constants::SCAN_EPOCH;

/// The interval `[start, cutoff)` a sweep scans, plus the instant it was computed at.
///
/// `start` is a fixed far-past epoch so "everything older than cutoff" is a
/// bounded query. Always `start < cutoff <= now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

pub fn scan_epoch() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(SCAN_EPOCH)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

impl DateRange {
    /// Compute the scan range for `config` as of `now`.
    ///
    /// Assumes the configuration was validated; with no window set the
    /// cutoff is `now`.
    pub fn compute(config: &SweepConfig, now: DateTime<Utc>) -> Self {
        let start = scan_epoch();
        let window = &config.window;

        let cutoff = if let Some(days) = window.days_to_keep {
            now.checked_sub_signed(Duration::days(i64::from(days)))
        } else if let Some(months) = window.months_to_keep {
            now.checked_sub_months(Months::new(months))
        } else if let Some(years) = window.years_to_keep {
            years
                .checked_mul(12)
                .and_then(|m| now.checked_sub_months(Months::new(m)))
        } else {
            Some(now)
        };

        let cutoff = match cutoff {
            Some(c) if c > start => c,
            _ => start + Duration::seconds(1),
        };

        DateRange { start, cutoff, now }
    }
}
