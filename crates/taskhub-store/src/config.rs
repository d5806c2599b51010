//! Store configuration loaded from environment variables.
//!
//! Every setting has a default so tests and local runs need no setup.

use std::path::PathBuf;
use std::time::Duration;

use taskhub_shared::constants::DEFAULT_QUERY_TIMEOUT_SECS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database file. `None` means the platform data directory.
    /// Env: `TASKHUB_DB_PATH`
    pub db_path: Option<PathBuf>,

    /// Deadline applied to every store call.
    /// Env: `TASKHUB_QUERY_TIMEOUT_SECS`
    /// Default: `5`
    pub query_timeout: Duration,

    /// How long SQLite waits on a locked database before giving up.
    /// Env: `TASKHUB_BUSY_TIMEOUT_MS`
    /// Default: `5000`
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            busy_timeout: Duration::from_millis(5_000),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("TASKHUB_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("TASKHUB_QUERY_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.query_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid TASKHUB_QUERY_TIMEOUT_SECS, using default"
                ),
            }
        }

        if let Some(val) = lookup("TASKHUB_BUSY_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) => config.busy_timeout = Duration::from_millis(ms),
                Err(_) => tracing::warn!(
                    value = %val,
                    "Invalid TASKHUB_BUSY_TIMEOUT_MS, using default"
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::from_lookup(lookup(&[]));
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.query_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("TASKHUB_DB_PATH", "/tmp/tasks.db"),
            ("TASKHUB_QUERY_TIMEOUT_SECS", "2"),
            ("TASKHUB_BUSY_TIMEOUT_MS", "250"),
        ]));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/tasks.db")));
        assert_eq!(config.query_timeout, Duration::from_secs(2));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("TASKHUB_QUERY_TIMEOUT_SECS", "0"),
            ("TASKHUB_BUSY_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config, StoreConfig::default());
    }
}
