//! Core streak engine for streakd
//!
//! This crate is the heart of streakd, containing:
//! - The snapshot cache (single-slot, TTL-bounded, read-through over the store)
//! - Streak and success-rate derivation over a snapshot
//! - Month calendar projection with a bounded per-day cache
//! - The day-status toggle state machine (Unmarked -> Successful -> Unsuccessful -> Unmarked)
//! - `StreakService`, which ties the above together for the IPC layer

mod backend;
mod calendar;
mod derive;
mod service;
mod snapshot;
mod transition;

pub use calendar::*;
pub use derive::*;
pub use service::*;
pub use snapshot::*;
pub use transition::*;
