//! Persistence layer for streakd
//!
//! Provides:
//! - The `DayStatusStore` adapter trait (fetch all / upsert / delete)
//! - SQLite-backed implementation
//! - In-memory mock with failure injection for tests

mod mock;
mod sqlite;
mod traits;

pub use mock::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
