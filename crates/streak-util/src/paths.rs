//! Default paths for streakd components
//!
//! Paths are user-writable by default (no root required):
//! - Socket: `$XDG_RUNTIME_DIR/streakd/streakd.sock` or `/tmp/streakd-$USER/streakd.sock`
//! - Data: `$XDG_DATA_HOME/streakd` or `~/.local/share/streakd`
//! - Config: `$XDG_CONFIG_HOME/streakd/config.toml` or `~/.config/streakd/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const STREAK_SOCKET_ENV: &str = "STREAK_SOCKET";

/// Environment variable for overriding the data directory
pub const STREAK_DATA_DIR_ENV: &str = "STREAK_DATA_DIR";

/// Environment variable for overriding the config file
pub const STREAK_CONFIG_ENV: &str = "STREAK_CONFIG";

/// Socket filename within the socket directory
const SOCKET_FILENAME: &str = "streakd.sock";

/// Database filename within the data directory
pub const DATABASE_FILENAME: &str = "streakd.db";

/// Application subdirectory name
const APP_DIR: &str = "streakd";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$STREAK_SOCKET` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/streakd/streakd.sock` (if XDG_RUNTIME_DIR is set)
/// 3. `/tmp/streakd-$USER/streakd.sock` (fallback)
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(STREAK_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the socket path without checking STREAK_SOCKET env var.
/// Used for default values in configs where the env var is checked separately.
pub fn socket_path_without_env() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$STREAK_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/streakd` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/streakd` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(STREAK_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking STREAK_DATA_DIR env var.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$STREAK_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/streakd/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/streakd/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(STREAK_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}

/// Path of the SQLite database inside a data directory
pub fn database_path(data_dir: impl Into<PathBuf>) -> PathBuf {
    data_dir.into().join(DATABASE_FILENAME)
}
