//! Validated settings structures

use crate::schema::{RawCacheConfig, RawConfig, RawServiceConfig};
use crate::validation::{parse_start_date, ValidationError};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Default snapshot time-to-live
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(30);

/// Default number of cached calendar projections
pub const DEFAULT_CALENDAR_CAPACITY: usize = 32;

/// Default bound on a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Validated settings ready for use by the service
#[derive(Debug, Clone)]
pub struct Settings {
    /// First day that counts towards the streak
    pub start_date: NaiveDate,

    pub cache: CacheSettings,

    pub service: ServiceConfig,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Result<Self, ValidationError> {
        let value = raw
            .tracker
            .start_date
            .ok_or(ValidationError::MissingStartDate)?;
        let start_date = parse_start_date(&value)
            .map_err(|message| ValidationError::InvalidStartDate { value, message })?;

        Ok(Self {
            start_date,
            cache: CacheSettings::from_raw(raw.cache),
            service: ServiceConfig::from_raw(raw.service),
        })
    }

    /// Settings with defaults for everything but the start date
    pub fn with_start_date(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            cache: CacheSettings::default(),
            service: ServiceConfig::from_raw(RawServiceConfig::default()),
        }
    }
}

/// Cache tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub snapshot_ttl: Duration,
    pub calendar_capacity: usize,
    pub store_timeout: Duration,
}

impl CacheSettings {
    fn from_raw(raw: RawCacheConfig) -> Self {
        Self {
            snapshot_ttl: raw
                .snapshot_ttl_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SNAPSHOT_TTL),
            calendar_capacity: raw.calendar_capacity.unwrap_or(DEFAULT_CALENDAR_CAPACITY),
            store_timeout: raw
                .store_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_STORE_TIMEOUT),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            snapshot_ttl: DEFAULT_SNAPSHOT_TTL,
            calendar_capacity: DEFAULT_CALENDAR_CAPACITY,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub socket_path: PathBuf,
    pub data_dir: PathBuf,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            socket_path: raw
                .socket_path
                .unwrap_or_else(streak_util::default_socket_path),
            data_dir: raw.data_dir.unwrap_or_else(streak_util::default_data_dir),
        }
    }
}
