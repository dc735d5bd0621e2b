//! streakd - The streak tracking background service
//!
//! Wires together:
//! - Configuration loading
//! - Store initialization
//! - The streak service and its caches
//! - IPC server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use streak_config::load_config;
use streak_core::StreakService;
use streak_ipc::IpcServer;
use streak_store::{DayStatusStore, SqliteStore};
use streak_util::{database_path, default_config_path, STREAK_DATA_DIR_ENV, STREAK_SOCKET_ENV};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// streakd - Daily streak tracking service
#[derive(Parser, Debug)]
#[command(name = "streakd")]
#[command(about = "Daily streak tracking service", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/streakd/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set STREAK_SOCKET env var)
    #[arg(short, long, env = STREAK_SOCKET_ENV)]
    socket: Option<PathBuf>,

    /// Data directory override (or set STREAK_DATA_DIR env var)
    #[arg(short, long, env = STREAK_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Daemon {
    service: Arc<StreakService>,
    ipc: Arc<IpcServer>,
}

impl Daemon {
    async fn new(args: &Args) -> Result<Self> {
        let settings = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            start_date = %settings.start_date,
            "Configuration loaded"
        );

        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| settings.service.socket_path.clone());

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| settings.service.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = database_path(&data_dir);
        let store: Arc<dyn DayStatusStore> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        info!(db_path = %db_path.display(), "Store initialized");

        if streak_util::is_mock_time_active() {
            warn!(today = %streak_util::today(), "Mock time is active");
        }

        let service = Arc::new(StreakService::new(&settings, store));

        let mut ipc = IpcServer::new(&socket_path);
        ipc.start()
            .await
            .with_context(|| format!("Failed to bind socket {:?}", socket_path))?;

        Ok(Self {
            service,
            ipc: Arc::new(ipc),
        })
    }

    async fn run(self) -> Result<()> {
        let messages = self
            .ipc
            .take_message_receiver()
            .await
            .context("IPC message receiver already taken")?;

        let ipc_accept = self.ipc.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        let dispatcher = tokio::spawn(streakd::serve(
            self.service.clone(),
            self.ipc.clone(),
            messages,
        ));

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        info!("Service running");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
            }
        }

        dispatcher.abort();
        self.ipc.shutdown();

        info!("Shutdown complete");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "streakd starting");

    let daemon = Daemon::new(&args).await?;
    daemon.run().await
}
