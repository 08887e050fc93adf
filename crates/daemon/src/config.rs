//! Daemon configuration (environment variables with defaults)

use std::time::Duration;

pub const DEFAULT_SERVER_NAME: &str = "SimpleServer";
pub const DEFAULT_WORK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// Filter used when `RUST_LOG` is unset: the core library and this binary
pub const DEFAULT_LOG_FILTER: &str = "shutdownable=info,simple_server=info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Development: pretty formatting with colors
    Pretty,
    /// Production: JSON structured logging
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Runtime configuration for the simple server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_format: LogFormat,
    pub server_name: String,
    pub work_interval: Duration,
    pub interruptible: bool,
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            server_name: DEFAULT_SERVER_NAME.to_string(),
            work_interval: Duration::from_millis(DEFAULT_WORK_INTERVAL_MS),
            interruptible: true,
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Environment Variables
    ///
    /// - `SHUTDOWNABLE_LOG_FORMAT`: `pretty` (default) or `json`
    /// - `SHUTDOWNABLE_SERVER_NAME`: worker name (default: SimpleServer)
    /// - `SHUTDOWNABLE_WORK_INTERVAL_MS`: pause between iterations (default: 1000)
    /// - `SHUTDOWNABLE_INTERRUPTIBLE`: `true` (default) or `false`
    /// - `SHUTDOWNABLE_SHUTDOWN_TIMEOUT_MS`: graceful shutdown bound (default: 5000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (tests use a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_format = lookup("SHUTDOWNABLE_LOG_FORMAT")
            .map(|s| LogFormat::parse(&s))
            .unwrap_or(defaults.log_format);

        let server_name = lookup("SHUTDOWNABLE_SERVER_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.server_name);

        let work_interval = lookup("SHUTDOWNABLE_WORK_INTERVAL_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.work_interval);

        let interruptible = lookup("SHUTDOWNABLE_INTERRUPTIBLE")
            .and_then(|s| parse_bool(&s))
            .unwrap_or(defaults.interruptible);

        let shutdown_timeout = lookup("SHUTDOWNABLE_SHUTDOWN_TIMEOUT_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.shutdown_timeout);

        Self {
            log_format,
            server_name,
            work_interval,
            interruptible,
            shutdown_timeout,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
