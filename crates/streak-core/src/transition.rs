//! Day-status toggle state machine
//!
//! Unmarked -> Successful -> Unsuccessful -> Unmarked -> ...
//!
//! The caller supplies what it believes the current state is. An absent value
//! means unmarked; an unrecognized value restarts the cycle at Successful.

use streak_api::{DayStatus, MarkState};

/// State a day moves to when toggled from `current`.
/// `None` stands for an unrecognized current state.
pub fn next_state(current: Option<MarkState>) -> MarkState {
    match current {
        Some(MarkState::Unmarked) => MarkState::Successful,
        Some(MarkState::Successful) => MarkState::Unsuccessful,
        Some(MarkState::Unsuccessful) => MarkState::Unmarked,
        None => MarkState::Successful,
    }
}

/// Interpret the caller-supplied current status
pub fn parse_current_status(raw: Option<&str>) -> Option<MarkState> {
    match raw {
        None => Some(MarkState::Unmarked),
        Some(value) => value.parse().ok(),
    }
}

/// Store mutation needed to enter a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    Upsert(DayStatus),
    Delete,
}

impl TransitionEffect {
    pub fn entering(state: MarkState) -> Self {
        match state.stored() {
            Some(status) => TransitionEffect::Upsert(status),
            None => TransitionEffect::Delete,
        }
    }
}
