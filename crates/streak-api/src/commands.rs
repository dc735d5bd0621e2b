//! Command types for the streakd protocol

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{DayStatus, HealthStatus, StreakView, ToggleOutcome, API_VERSION};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    ValidationFailed,
    BackendUnavailable,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Current streak, statistics and calendar pages
    GetStreak {
        /// Evaluate as of this date instead of the service clock
        #[serde(default)]
        today: Option<NaiveDate>,
    },

    /// All marked days
    GetMarkedDays,

    /// Advance a day to its next status
    ToggleDay {
        date: String,
        /// Caller's view of the current status; missing means "unmarked"
        #[serde(default)]
        current_status: Option<String>,
    },

    /// Get health status
    GetHealth,

    /// Ping for keepalive
    Ping,
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResponsePayload {
    Streak(StreakView),
    MarkedDays(BTreeMap<String, DayStatus>),
    Toggled(ToggleOutcome),
    Health(HealthStatus),
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = Request::new(
            1,
            Command::ToggleDay {
                date: "2025-08-26".into(),
                current_status: Some("unmarked".into()),
            },
        );
        let json = serde_json::to_string(&req).unwrap();
        let parsed: Request = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 1);
        assert!(matches!(
            parsed.command,
            Command::ToggleDay { ref date, .. } if date == "2025-08-26"
        ));
    }

    #[test]
    fn toggle_without_current_status() {
        let json = r#"{"request_id":7,"api_version":1,"command":{"type":"toggle_day","date":"2025-08-27"}}"#;
        let parsed: Request = serde_json::from_str(json).unwrap();

        assert!(matches!(
            parsed.command,
            Command::ToggleDay { current_status: None, .. }
        ));
    }

    #[test]
    fn get_streak_today_is_optional() {
        let json = r#"{"type":"get_streak"}"#;
        let parsed: Command = serde_json::from_str(json).unwrap();
        assert!(matches!(parsed, Command::GetStreak { today: None }));
    }

    #[test]
    fn response_serialization() {
        let mut days = BTreeMap::new();
        days.insert("2025-08-26".to_string(), DayStatus::Successful);
        let resp = Response::success(3, ResponsePayload::MarkedDays(days));

        let json = serde_json::to_string(&resp).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 3);
        match parsed.result {
            ResponseResult::Ok(ResponsePayload::MarkedDays(days)) => {
                assert_eq!(days.get("2025-08-26"), Some(&DayStatus::Successful));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
