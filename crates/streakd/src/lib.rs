//! Request handling for streakd
//!
//! Maps protocol commands onto `StreakService` and service errors onto
//! protocol error codes. The binary owns sockets and signals; everything
//! here is usable without either.

use chrono::NaiveDate;
use std::sync::Arc;
use streak_api::{Command, ErrorCode, ErrorInfo, Request, Response, ResponsePayload, API_VERSION};
use streak_core::StreakService;
use streak_ipc::{IpcServer, ServerMessage};
use streak_util::TrackerError;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How far past the service clock a client-supplied `today` may be
pub const MAX_DAYS_AHEAD: i64 = 1;

/// Handle a single request
pub async fn handle_request(service: &StreakService, request: Request) -> Response {
    let request_id = request.request_id;

    if request.api_version != API_VERSION {
        return Response::error(
            request_id,
            ErrorInfo::new(
                ErrorCode::InvalidRequest,
                format!(
                    "Unsupported API version {} (expected {})",
                    request.api_version, API_VERSION
                ),
            ),
        );
    }

    match handle_command(service, request.command).await {
        Ok(payload) => Response::success(request_id, payload),
        Err(e) => Response::error(request_id, error_info(&e)),
    }
}

async fn handle_command(
    service: &StreakService,
    command: Command,
) -> streak_util::Result<ResponsePayload> {
    match command {
        Command::GetStreak { today } => {
            let today = requested_today(today, streak_util::today())?;
            Ok(ResponsePayload::Streak(service.get_streak(today).await))
        }

        Command::GetMarkedDays => Ok(ResponsePayload::MarkedDays(
            service.get_marked_days().await,
        )),

        Command::ToggleDay {
            date,
            current_status,
        } => {
            let outcome = service
                .toggle_day(&date, current_status.as_deref())
                .await?;
            Ok(ResponsePayload::Toggled(outcome))
        }

        Command::GetHealth => Ok(ResponsePayload::Health(service.health().await)),

        Command::Ping => Ok(ResponsePayload::Pong),
    }
}

/// The day to evaluate a streak on. Defaults to the service clock; dates more
/// than `MAX_DAYS_AHEAD` past it are rejected.
pub fn requested_today(
    requested: Option<NaiveDate>,
    clock_today: NaiveDate,
) -> streak_util::Result<NaiveDate> {
    let Some(today) = requested else {
        return Ok(clock_today);
    };

    if (today - clock_today).num_days() > MAX_DAYS_AHEAD {
        return Err(TrackerError::validation(format!(
            "Date {} is too far ahead of the service date {}",
            today, clock_today
        )));
    }

    Ok(today)
}

/// Protocol error for a service error
pub fn error_info(error: &TrackerError) -> ErrorInfo {
    let code = match error {
        TrackerError::ValidationError(_) => ErrorCode::ValidationFailed,
        TrackerError::BackendUnavailable(_) => ErrorCode::BackendUnavailable,
        TrackerError::IpcError(_) | TrackerError::Internal(_) => ErrorCode::InternalError,
    };
    ErrorInfo::new(code, error.to_string())
}

/// Dispatch IPC messages until the channel closes. Each request runs on its
/// own task so a slow store call never blocks other clients.
pub async fn serve(
    service: Arc<StreakService>,
    ipc: Arc<IpcServer>,
    mut messages: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(message) = messages.recv().await {
        match message {
            ServerMessage::Request { client_id, request } => {
                let service = service.clone();
                let ipc = ipc.clone();

                tokio::spawn(async move {
                    debug!(
                        client_id = %client_id,
                        request_id = request.request_id,
                        command = ?request.command,
                        "Handling request"
                    );

                    let response = handle_request(&service, request).await;
                    if let Err(e) = ipc.send_response(&client_id, response).await {
                        warn!(client_id = %client_id, error = %e, "Failed to send response");
                    }
                });
            }

            ServerMessage::ClientConnected { client_id } => {
                debug!(client_id = %client_id, "Client registered");
            }

            ServerMessage::ClientDisconnected { client_id } => {
                info!(client_id = %client_id, "Client disconnected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_requested_today() {
        let clock = date(2025, 8, 30);

        assert_eq!(requested_today(None, clock).unwrap(), clock);
        assert_eq!(
            requested_today(Some(date(2025, 8, 1)), clock).unwrap(),
            date(2025, 8, 1)
        );
        assert_eq!(
            requested_today(Some(date(2025, 8, 31)), clock).unwrap(),
            date(2025, 8, 31)
        );

        let err = requested_today(Some(date(2025, 9, 1)), clock).unwrap_err();
        assert!(err.is_validation());
        assert!(requested_today(Some(date(200000, 1, 1)), clock).is_err());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_info(&TrackerError::validation("bad date")).code,
            ErrorCode::ValidationFailed
        );
        assert_eq!(
            error_info(&TrackerError::backend("down")).code,
            ErrorCode::BackendUnavailable
        );
        assert_eq!(
            error_info(&TrackerError::internal("oops")).code,
            ErrorCode::InternalError
        );
    }
}
