use std::{env, path::PathBuf, time::Duration};

use crate::storage::{d1::D1Config, d1::DEFAULT_API_URL, Runtime, SelectionSignal};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Execution environment (default: native)
    pub runtime: Runtime,
    /// Path to SQLite database file (default: "data/database.db")
    pub sqlite_path: PathBuf,
    /// D1 connection settings, present only when all required variables are set
    pub d1: Option<D1Config>,
    /// Log output format (default: pretty)
    pub log_format: LogFormat,
    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUNTIME` - `cloudflare` to prefer D1, anything else runs natively
    /// - `SQLITE_PATH` - SQLite database path (default: "data/database.db")
    /// - `D1_ACCOUNT_ID`, `D1_DATABASE_ID`, `D1_API_TOKEN` - D1 credentials
    /// - `D1_API_URL` - Cloudflare API base URL (default: "https://api.cloudflare.com/client/v4")
    /// - `LOG_FORMAT` - `pretty` or `json` (default: pretty)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let d1 = match (
            non_empty("D1_ACCOUNT_ID"),
            non_empty("D1_DATABASE_ID"),
            non_empty("D1_API_TOKEN"),
        ) {
            (Some(account_id), Some(database_id), Some(api_token)) => Some(D1Config {
                account_id,
                database_id,
                api_token,
                api_url: non_empty("D1_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            }),
            _ => None,
        };

        Self {
            runtime: Runtime::from_name(lookup("RUNTIME").as_deref()),
            sqlite_path: non_empty("SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/database.db")),
            d1,
            log_format: match lookup("LOG_FORMAT").as_deref().map(str::trim) {
                Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            request_timeout_seconds: lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(10),
        }
    }

    /// Get request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// The adapter selection hint derived from this configuration.
    pub fn selection_signal(&self) -> SelectionSignal {
        SelectionSignal {
            runtime: self.runtime,
            sqlite_path: self.sqlite_path.clone(),
            d1: self.d1.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
