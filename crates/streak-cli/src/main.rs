//! streak - command-line companion for streakd
//!
//! `mark`, `show` and `status` work on the SQLite store directly and do not
//! need a running service. `toggle` goes through the service so its cache
//! sees the change immediately.

mod report;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use streak_api::{Command, DayStatus, ResponsePayload};
use streak_config::load_config;
use streak_core::{derive, Snapshot};
use streak_ipc::IpcClient;
use streak_store::{DayRecord, DayStatusStore, SqliteStore, StoreError};
use streak_util::{
    database_path, default_config_path, default_data_dir, default_socket_path, parse_iso_date,
    STREAK_CONFIG_ENV, STREAK_DATA_DIR_ENV, STREAK_SOCKET_ENV,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// streak - mark and inspect tracked days
#[derive(Parser, Debug)]
#[command(name = "streak")]
#[command(about = "Mark and inspect tracked days", long_about = None)]
struct Args {
    /// Configuration file path (or set STREAK_CONFIG env var)
    #[arg(short, long, env = STREAK_CONFIG_ENV, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory holding the store (or set STREAK_DATA_DIR env var)
    #[arg(short, long, env = STREAK_DATA_DIR_ENV, default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Socket path for streakd (or set STREAK_SOCKET env var)
    #[arg(short, long, env = STREAK_SOCKET_ENV, default_value_os_t = default_socket_path())]
    socket: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Set a day's status directly in the store
    Mark {
        /// Date in YYYY-MM-DD format
        date: String,
        status: MarkArg,
    },

    /// List marked days grouped by month
    Show,

    /// Show counts, current streak and last successful day
    Status {
        /// Start date override (default: from the configuration file)
        #[arg(long)]
        start_date: Option<String>,
    },

    /// Advance a day to its next status through the running service
    Toggle {
        /// Date in YYYY-MM-DD format
        date: String,

        /// Current status of the day as the caller sees it
        #[arg(long)]
        current: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MarkArg {
    Successful,
    Unsuccessful,
    Unset,
}

impl MarkArg {
    fn stored(self) -> Option<DayStatus> {
        match self {
            MarkArg::Successful => Some(DayStatus::Successful),
            MarkArg::Unsuccessful => Some(DayStatus::Unsuccessful),
            MarkArg::Unset => None,
        }
    }
}

fn open_store(data_dir: &Path) -> Result<SqliteStore> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = database_path(data_dir);
    debug!(db_path = %db_path.display(), "Opening store");
    SqliteStore::open(&db_path).with_context(|| format!("Failed to open database {:?}", db_path))
}

fn mark(data_dir: &Path, date: &str, status: MarkArg) -> Result<()> {
    let date = parse_iso_date(date)?;
    let store = open_store(data_dir)?;

    match status.stored() {
        Some(status) => {
            store.write(&DayRecord::new(date, status))?;
            info!(date = %date, status = %status, "Day marked");
            println!("Marked {} as {}", date, status);
        }
        None => {
            match store.delete(date) {
                Ok(()) | Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
            info!(date = %date, "Day unmarked");
            println!("Removed marking for {}", date);
        }
    }

    Ok(())
}

fn show(data_dir: &Path) -> Result<()> {
    let store = open_store(data_dir)?;
    let days = store.fetch_all()?;
    print!("{}", report::render_marked_days(&days));
    Ok(())
}

fn status(config: &Path, data_dir: &Path, start_date: Option<&str>) -> Result<()> {
    let start_date: NaiveDate = match start_date {
        Some(value) => parse_iso_date(value)?,
        None => {
            load_config(config)
                .with_context(|| format!("Failed to load config from {:?}", config))?
                .start_date
        }
    };

    let store = open_store(data_dir)?;
    let snapshot = Snapshot::new(store.fetch_all()?, streak_util::now());
    let today = streak_util::today();

    let result = derive(&snapshot, start_date, today);
    let last_success = report::last_success(snapshot.days(), today);
    print!("{}", report::render_status(&result, last_success, today));
    Ok(())
}

async fn toggle(socket: &Path, date: &str, current: Option<String>) -> Result<()> {
    // Reject bad input locally before connecting
    parse_iso_date(date)?;

    let mut client = IpcClient::connect(socket)
        .await
        .with_context(|| format!("Failed to connect to streakd at {:?}", socket))?;

    let payload = client
        .call(Command::ToggleDay {
            date: date.to_string(),
            current_status: current,
        })
        .await?;

    match payload {
        ResponsePayload::Toggled(outcome) => {
            println!("{}", outcome.message);
            Ok(())
        }
        other => bail!("Unexpected response from streakd: {:?}", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        CliCommand::Mark { date, status } => mark(&args.data_dir, &date, status),
        CliCommand::Show => show(&args.data_dir),
        CliCommand::Status { start_date } => {
            status(&args.config, &args.data_dir, start_date.as_deref())
        }
        CliCommand::Toggle { date, current } => toggle(&args.socket, &date, current).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["streak", "mark", "2025-08-26", "unsuccessful"]).unwrap();
        match args.command {
            CliCommand::Mark { date, status } => {
                assert_eq!(date, "2025-08-26");
                assert_eq!(status, MarkArg::Unsuccessful);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Args::try_parse_from(["streak", "mark", "2025-08-26", "maybe"]).is_err());
    }

    #[test]
    fn test_mark_and_unset() {
        let dir = tempdir().unwrap();

        mark(dir.path(), "2025-08-26", MarkArg::Successful).unwrap();
        mark(dir.path(), "2025-08-27", MarkArg::Unsuccessful).unwrap();

        let store = open_store(dir.path()).unwrap();
        let days = store.fetch_all().unwrap();
        assert_eq!(days.get(&date(26)), Some(&DayStatus::Successful));
        assert_eq!(days.get(&date(27)), Some(&DayStatus::Unsuccessful));

        mark(dir.path(), "2025-08-26", MarkArg::Unset).unwrap();
        // Unsetting an unmarked day is not an error
        mark(dir.path(), "2025-08-28", MarkArg::Unset).unwrap();

        let days = store.fetch_all().unwrap();
        assert!(!days.contains_key(&date(26)));
        assert_eq!(days.len(), 1);
    }

    #[test]
    fn test_mark_rejects_bad_date_before_opening_store() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");

        assert!(mark(&data_dir, "26/08/2025", MarkArg::Successful).is_err());
        assert!(!data_dir.exists());
    }

    #[test]
    fn test_status_with_start_override() {
        let dir = tempdir().unwrap();
        mark(dir.path(), "2025-08-26", MarkArg::Successful).unwrap();

        let missing_config = dir.path().join("missing.toml");
        status(&missing_config, dir.path(), Some("2025-08-26")).unwrap();
        assert!(status(&missing_config, dir.path(), None).is_err());
    }

    #[tokio::test]
    async fn test_toggle_rejects_bad_date_without_connecting() {
        let dir = tempdir().unwrap();
        let err = toggle(&dir.path().join("none.sock"), "2025-13-01", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Validation"));
    }
}
