use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::models::StoreBackend;

/// Application-level constants
pub const APP_NAME: &str = "VaxDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SEARCH_DELAY_MS: u64 = 1000;
const DEFAULT_RATE_PER_MINUTE: u32 = 100;
const DEFAULT_RATE_PER_HOUR: u32 = 1000;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "vaxdesk_lib=info,vaxdesk=info,tower_http=info"
}

/// Get the application data directory
/// ~/VaxDesk/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite file for the `sqlite` store backend.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("appointments.db")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key} ({value:?}): {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration, read from `VAXDESK_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub db_path: PathBuf,
    /// Presentation delay before a verification lookup.
    pub search_latency: Duration,
    pub rate_per_minute: u32,
    pub rate_per_hour: u32,
    /// Peers whose `X-Forwarded-For` header is believed. Empty by default.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            store_backend: StoreBackend::Memory,
            db_path: default_db_path(),
            search_latency: Duration::from_millis(DEFAULT_SEARCH_DELAY_MS),
            rate_per_minute: DEFAULT_RATE_PER_MINUTE,
            rate_per_hour: DEFAULT_RATE_PER_HOUR,
            trusted_proxies: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delay_ms: u64 = load(
            &lookup,
            "VAXDESK_SEARCH_DELAY_MS",
            &DEFAULT_SEARCH_DELAY_MS.to_string(),
        )?;
        let db_path = lookup("VAXDESK_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let config = Self {
            bind_addr: load(&lookup, "VAXDESK_ADDR", DEFAULT_ADDR)?,
            store_backend: load(&lookup, "VAXDESK_STORE", StoreBackend::Memory.as_str())?,
            db_path,
            search_latency: Duration::from_millis(delay_ms),
            rate_per_minute: load(
                &lookup,
                "VAXDESK_RATE_PER_MINUTE",
                &DEFAULT_RATE_PER_MINUTE.to_string(),
            )?,
            rate_per_hour: load(
                &lookup,
                "VAXDESK_RATE_PER_HOUR",
                &DEFAULT_RATE_PER_HOUR.to_string(),
            )?,
            trusted_proxies: parse_ip_list(
                "VAXDESK_TRUSTED_PROXIES",
                lookup("VAXDESK_TRUSTED_PROXIES").unwrap_or_default(),
            )?,
        };

        if config.rate_per_minute == 0 || config.rate_per_hour == 0 {
            return Err(ConfigError::Invalid {
                key: "VAXDESK_RATE_PER_MINUTE/VAXDESK_RATE_PER_HOUR",
                value: format!("{}/{}", config.rate_per_minute, config.rate_per_hour),
                reason: "rate limits must be positive".into(),
            });
        }

        Ok(config)
    }
}

/// Comma-separated IP addresses; blank entries are skipped.
fn parse_ip_list(key: &'static str, raw: String) -> Result<Vec<IpAddr>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key,
                value: entry.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
