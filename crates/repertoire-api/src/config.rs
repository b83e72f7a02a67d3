//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Tokens are dropped from the cache this long before they expire.
const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub search_url: String,
    pub search_api_key: Option<String>,
    pub search_index: String,
    pub webhook_secret: String,
    pub task_ttl: Duration,
    pub realtime_url: String,
    pub realtime_token_secret: String,
    pub realtime_token_ttl: Duration,
    pub storage_root: String,
    pub bus_workers: usize,
    pub bus_max_deliveries: u32,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse("PORT", &or_default("PORT", "3000"))?,
            search_url: required("SEARCH_URL")?,
            search_api_key: lookup("SEARCH_API_KEY").filter(|key| !key.is_empty()),
            search_index: or_default("SEARCH_INDEX", "search"),
            webhook_secret: required("SEARCH_WEBHOOK_SECRET")?,
            task_ttl: Duration::from_secs(parse(
                "TASK_TRACKER_TTL_SECS",
                &or_default("TASK_TRACKER_TTL_SECS", "300"),
            )?),
            realtime_url: required("REALTIME_URL")?,
            realtime_token_secret: required("REALTIME_TOKEN_SECRET")?,
            realtime_token_ttl: Duration::from_secs(parse(
                "REALTIME_TOKEN_TTL_SECS",
                &or_default("REALTIME_TOKEN_TTL_SECS", "3600"),
            )?),
            storage_root: or_default("STORAGE_ROOT", ""),
            bus_workers: parse("BUS_WORKERS", &or_default("BUS_WORKERS", "4"))?,
            bus_max_deliveries: parse("BUS_MAX_DELIVERIES", &or_default("BUS_MAX_DELIVERIES", "5"))?,
        })
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// How long an issued broker token may be reused.
    #[must_use]
    pub fn token_cache_ttl(&self) -> Duration {
        self.realtime_token_ttl
            .checked_sub(TOKEN_SAFETY_MARGIN)
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.realtime_token_ttl / 2)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| AppError::Config(format!("{key} must be valid: {e}")))
}
