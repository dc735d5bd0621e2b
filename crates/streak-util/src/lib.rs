//! Shared utilities for streakd
//!
//! This crate provides:
//! - Client ID type for IPC connections
//! - Time utilities (mock-aware clock, monotonic instants, ISO date parsing)
//! - Error types
//! - Default paths for socket, data, and config files

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
