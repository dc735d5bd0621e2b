//! Protocol types for streakd IPC
//!
//! This crate defines the stable API between streakd and clients:
//! - Day status enums and their wire strings
//! - Commands (requests from clients)
//! - Responses and the views they carry
//! - Versioning

mod commands;
mod types;

pub use commands::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
