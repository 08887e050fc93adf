//! Simple Server - Main Entry Point
//! Hosts one shutdownable worker until Ctrl+C

mod config;
mod server;

use anyhow::Result;
use config::{Config, LogFormat, DEFAULT_LOG_FILTER};
use server::{Server, SimpleServer};
use shutdownable_core::ExitProcess;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()?;
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init()?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = Config::from_env();

    // 2. Initialize logging
    init_logging(config.log_format)?;
    info!("Simple Server v{} starting...", VERSION);
    info!(
        name = %config.server_name,
        work_interval_ms = config.work_interval.as_millis() as u64,
        interruptible = config.interruptible,
        "Configuration loaded"
    );

    // 3. Wire the worker: an unrecovered work failure terminates the process
    let server = SimpleServer::new(&config, Arc::new(ExitProcess::default()));
    server.start()?;

    info!("Press Ctrl+C to shutdown");

    // 4. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 5. Graceful shutdown, bounded by the timeout; a second Ctrl+C abandons the wait
    let interrupt = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => warn!("Second interrupt received, abandoning graceful shutdown"),
            _ = tokio::time::sleep(config.shutdown_timeout) => warn!(
                timeout_ms = config.shutdown_timeout.as_millis() as u64,
                "Graceful shutdown timed out"
            ),
        }
    };
    if let Err(e) = server.shutdown_until(interrupt).await {
        warn!(error = ?e, "Shutdown did not complete");
    }

    let status = serde_json::json!({
        "server": server.name(),
        "status": server.status(),
        "iterations": server.iterations(),
    });
    info!(final_status = %status, "Shutdown complete.");

    Ok(())
}
