//! Runtime settings read from the environment (after `.env` is loaded).

use std::time::Duration;

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/blacklist_stats.log";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Rolling JSON log file; the directory is created by the appender.
    pub log_file_path: String,
    /// Sample dataset fetched by the `sample` command.
    pub sample_url: Option<String>,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
            sample_url: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Reads `LOG_FILE_PATH`, `BLACKLIST_SAMPLE_URL` and `HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as
    /// unset and an unparsable timeout falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            log_file_path: get("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
            sample_url: get("BLACKLIST_SAMPLE_URL"),
            http_timeout: get("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }
}
