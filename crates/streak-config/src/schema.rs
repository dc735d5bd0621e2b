//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// What is being tracked
    #[serde(default)]
    pub tracker: RawTrackerConfig,

    /// Snapshot and calendar cache tuning
    #[serde(default)]
    pub cache: RawCacheConfig,

    /// Service paths
    #[serde(default)]
    pub service: RawServiceConfig,
}

/// Tracker settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTrackerConfig {
    /// First day of the streak (YYYY-MM-DD). Required.
    pub start_date: Option<String>,
}

/// Cache settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCacheConfig {
    /// Maximum age of a served snapshot (default: 30)
    pub snapshot_ttl_seconds: Option<u64>,

    /// Number of distinct "today" keys kept by the calendar cache (default: 32)
    pub calendar_capacity: Option<usize>,

    /// Upper bound on a single store call (default: 2000)
    pub store_timeout_ms: Option<u64>,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// IPC socket path
    pub socket_path: Option<PathBuf>,

    /// Data directory for the store
    pub data_dir: Option<PathBuf>,
}
