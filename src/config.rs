//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXPORT_DIR: &str = "reports";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the diagnostic service, without trailing slash
    pub base_url: String,
    /// Upper bound for a single request
    pub request_timeout: Duration,
    /// Where exported HTML reports are written
    pub export_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
        }
    }
}

impl ClientConfig {
    /// Read `MEDSCAN_API_URL`, `MEDSCAN_TIMEOUT_SECS` and
    /// `MEDSCAN_EXPORT_DIR`, falling back to defaults for unset variables.
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("MEDSCAN_API_URL") {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: "MEDSCAN_API_URL",
                    value: url,
                });
            }
            config.base_url = url;
        }

        if let Some(raw) = lookup("MEDSCAN_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&s| s > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    var: "MEDSCAN_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(dir) = lookup("MEDSCAN_EXPORT_DIR").filter(|d| !d.trim().is_empty()) {
            config.export_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("MEDSCAN_API_URL", "https://diag.example.org/"),
            ("MEDSCAN_TIMEOUT_SECS", "5"),
            ("MEDSCAN_EXPORT_DIR", "/tmp/out"),
        ]))
        .expect("valid");

        assert_eq!(config.base_url, "https://diag.example.org");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("MEDSCAN_API_URL", "localhost:5000")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("MEDSCAN_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("MEDSCAN_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
    }
}
