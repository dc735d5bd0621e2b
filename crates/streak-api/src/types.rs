//! Shared types for the streakd API

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Stored outcome of a day. Unmarked days have no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Successful,
    Unsuccessful,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Successful => "successful",
            DayStatus::Unsuccessful => "unsuccessful",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a wire string is not a known status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown day status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for DayStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "successful" => Ok(DayStatus::Successful),
            "unsuccessful" => Ok(DayStatus::Unsuccessful),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Status of a day as seen by callers, including the implicit unmarked state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkState {
    Unmarked,
    Successful,
    Unsuccessful,
}

impl MarkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkState::Unmarked => "unmarked",
            MarkState::Successful => "successful",
            MarkState::Unsuccessful => "unsuccessful",
        }
    }

    /// The stored status for this state, or None when it maps to "no record"
    pub fn stored(&self) -> Option<DayStatus> {
        match self {
            MarkState::Unmarked => None,
            MarkState::Successful => Some(DayStatus::Successful),
            MarkState::Unsuccessful => Some(DayStatus::Unsuccessful),
        }
    }
}

impl From<Option<DayStatus>> for MarkState {
    fn from(status: Option<DayStatus>) -> Self {
        match status {
            None => MarkState::Unmarked,
            Some(DayStatus::Successful) => MarkState::Successful,
            Some(DayStatus::Unsuccessful) => MarkState::Unsuccessful,
        }
    }
}

impl fmt::Display for MarkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkState {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unmarked" => Ok(MarkState::Unmarked),
            "successful" => Ok(MarkState::Successful),
            "unsuccessful" => Ok(MarkState::Unsuccessful),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One month of the calendar view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarPage {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
    pub month_name: String,
    /// Monday-first weeks; `None` pads days belonging to adjacent months
    pub week_grid: Vec<[Option<u32>; 7]>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Full streak view returned by `get_streak`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakView {
    pub start_date: NaiveDate,
    pub current_streak: u32,
    /// Negative when today is before the start date
    pub days_since_start: i64,
    pub success_rate: f64,
    pub successful_days: u32,
    pub unsuccessful_days: u32,
    pub total_marked_days: u32,
    /// Shared with the calendar cache
    pub months_data: Arc<Vec<CalendarPage>>,
    pub today: NaiveDate,
    pub marked_days: BTreeMap<String, DayStatus>,
    /// Set when the store could not be reached and no earlier snapshot existed
    #[serde(default)]
    pub degraded: bool,
}

/// Result of a toggle request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub date: NaiveDate,
    pub new_status: MarkState,
    pub message: String,
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub store_healthy: bool,
    pub timestamp: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&DayStatus::Successful).unwrap(),
            "\"successful\""
        );
        assert_eq!(
            "unsuccessful".parse::<DayStatus>().unwrap(),
            DayStatus::Unsuccessful
        );
        assert!("unmarked".parse::<DayStatus>().is_err());
    }

    #[test]
    fn mark_state_round_trips_through_stored() {
        for state in [
            MarkState::Unmarked,
            MarkState::Successful,
            MarkState::Unsuccessful,
        ] {
            assert_eq!(MarkState::from(state.stored()), state);
        }
    }

    #[test]
    fn mark_state_rejects_unknown() {
        let err = "maybe".parse::<MarkState>().unwrap_err();
        assert_eq!(err, UnknownStatus("maybe".into()));
    }

    #[test]
    fn calendar_page_serializes_blanks_as_null() {
        let page = CalendarPage {
            year: 2025,
            month: 8,
            month_name: "August".into(),
            week_grid: vec![[None, None, None, None, Some(1), Some(2), Some(3)]],
            start_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
        };

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["week_grid"][0][0], serde_json::Value::Null);
        assert_eq!(json["week_grid"][0][4], 1);
        assert_eq!(json["start_date"], "2025-08-01");
    }
}
