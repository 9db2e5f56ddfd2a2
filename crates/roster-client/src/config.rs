//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client runs with zero configuration
//! against the public JSONPlaceholder API.

use std::path::PathBuf;
use std::time::Duration;

use roster_shared::constants::{
    DEFAULT_API_URL, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_SAVE_DELAY_MS,
    DEFAULT_SAVE_FAILURE_RATE, PAGE_LIMIT,
};

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the users API.
    /// Env: `ROSTER_API_URL`
    /// Default: `https://jsonplaceholder.typicode.com`
    pub api_url: String,

    /// Records revealed per page.
    /// Env: `ROSTER_PAGE_LIMIT`
    /// Default: `4`
    pub page_limit: usize,

    /// Database file holding the persisted state.
    /// Env: `ROSTER_DB_PATH`
    /// Default: platform data directory.
    pub db_path: Option<PathBuf>,

    /// HTTP request timeout.
    /// Env: `ROSTER_FETCH_TIMEOUT_SECS`
    /// Default: `30`
    pub fetch_timeout: Duration,

    /// Latency of the simulated save.
    /// Env: `ROSTER_SAVE_DELAY_MS`
    /// Default: `600`
    pub save_delay: Duration,

    /// Failure probability of the simulated save (0.0 - 1.0).
    /// Env: `ROSTER_SAVE_FAILURE_RATE`
    /// Default: `0.05`
    pub save_failure_rate: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_limit: PAGE_LIMIT,
            db_path: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            save_delay: Duration::from_millis(DEFAULT_SAVE_DELAY_MS),
            save_failure_rate: DEFAULT_SAVE_FAILURE_RATE,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("ROSTER_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }

        if let Some(val) = lookup("ROSTER_PAGE_LIMIT") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.page_limit = n,
                _ => tracing::warn!(value = %val, "Invalid ROSTER_PAGE_LIMIT, using default"),
            }
        }

        if let Some(path) = lookup("ROSTER_DB_PATH") {
            if !path.trim().is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("ROSTER_FETCH_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.fetch_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid ROSTER_FETCH_TIMEOUT_SECS, using default"
                ),
            }
        }

        if let Some(val) = lookup("ROSTER_SAVE_DELAY_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) => config.save_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %val, "Invalid ROSTER_SAVE_DELAY_MS, using default"),
            }
        }

        if let Some(val) = lookup("ROSTER_SAVE_FAILURE_RATE") {
            match val.trim().parse::<f64>() {
                Ok(rate) if (0.0..=1.0).contains(&rate) => config.save_failure_rate = rate,
                _ => tracing::warn!(
                    value = %val,
                    "Invalid ROSTER_SAVE_FAILURE_RATE, using default"
                ),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ClientConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "https://jsonplaceholder.typicode.com");
        assert_eq!(config.page_limit, 4);
        assert_eq!(config.db_path, None);
        assert_eq!(config.save_delay, Duration::from_millis(600));
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("ROSTER_API_URL", "http://localhost:3000"),
            ("ROSTER_PAGE_LIMIT", "10"),
            ("ROSTER_DB_PATH", "/tmp/roster.db"),
            ("ROSTER_FETCH_TIMEOUT_SECS", "5"),
            ("ROSTER_SAVE_DELAY_MS", "0"),
            ("ROSTER_SAVE_FAILURE_RATE", "0.5"),
        ]);
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.page_limit, 10);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/roster.db")));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.save_delay, Duration::ZERO);
        assert_eq!(config.save_failure_rate, 0.5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_pairs(&[
            ("ROSTER_PAGE_LIMIT", "0"),
            ("ROSTER_FETCH_TIMEOUT_SECS", "soon"),
            ("ROSTER_SAVE_FAILURE_RATE", "1.5"),
            ("ROSTER_API_URL", "  "),
        ]);
        assert_eq!(config, ClientConfig::default());
    }
}
