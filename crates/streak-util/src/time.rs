//! Time utilities for streakd
//!
//! Provides the wall-clock used to decide what "today" is, monotonic
//! instants for cache ages, and strict ISO date parsing.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `STREAK_MOCK_TIME` environment variable can be set
//! to override the system time. This is useful for checking how the streak
//! looks on a given day without touching the system clock.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-08-30 21:00:00`)
//!
//! Example:
//! ```bash
//! STREAK_MOCK_TIME="2025-08-30 21:00:00" cargo run -p streakd
//! ```

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::TrackerError;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "STREAK_MOCK_TIME";

/// Wire and storage format for calendar dates
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                if let Ok(naive_dt) =
                    NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S")
                {
                    if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                        let offset = mock_dt.signed_duration_since(chrono::Local::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        "Failed to convert mock time to local timezone"
                    );
                } else {
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        expected_format = "%Y-%m-%d %H:%M:%S",
                        "Invalid mock time format"
                    );
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// The logical "today" for streak math
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// chrono accepts unpadded fields (`2025-8-1`), so the length and separator
/// positions are checked before parsing.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, TrackerError> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shaped {
        return Err(TrackerError::validation(format!(
            "Invalid date format '{}'. Use YYYY-MM-DD",
            input
        )));
    }

    NaiveDate::parse_from_str(input, ISO_DATE_FORMAT).map_err(|e| {
        TrackerError::validation(format!("Invalid date '{}': {}", input, e))
    })
}

/// Format a date the way it is stored and sent over the wire
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Represents a point in monotonic time for cache ages.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        let date = parse_iso_date("2025-08-26").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 26).unwrap());
    }

    #[test]
    fn test_parse_iso_date_rejects_malformed() {
        for input in [
            "",
            "2025-8-26",
            "2025/08/26",
            "26-08-2025",
            "2025-13-01",
            "2025-02-30",
            "not-a-date",
            "2025-08-26T00:00:00",
        ] {
            let err = parse_iso_date(input).unwrap_err();
            assert!(err.is_validation(), "expected validation error for {input:?}");
        }
    }

    #[test]
    fn test_parse_iso_date_leap_day() {
        assert!(parse_iso_date("2024-02-29").is_ok());
        assert!(parse_iso_date("2025-02-29").is_err());
    }

    #[test]
    fn test_format_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(format_iso_date(date), "2025-09-01");
    }

    #[test]
    fn test_monotonic_instant() {
        let t1 = MonotonicInstant::now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = MonotonicInstant::now();

        assert!(t2 > t1);
        assert!(t1.elapsed() >= Duration::from_millis(10));
    }
}
