// src/config.rs

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::logging::get_data_dir;

pub const API_URL_ENV: &str = "VULNSCOUT_API_URL";
pub const POLL_SECS_ENV: &str = "VULNSCOUT_POLL_SECS";
pub const TIMEOUT_SECS_ENV: &str = "VULNSCOUT_TIMEOUT_SECS";
pub const EXPORT_DIR_ENV: &str = "VULNSCOUT_EXPORT_DIR";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_POLL_SECS: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{var} must use http or https, got '{scheme}'")]
    UnsupportedScheme { var: &'static str, scheme: String },
    #[error("{var} must be a whole number of seconds >= 1, got '{value}'")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the scan service. Always ends with a `/`.
    pub api_url: Url,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    /// Where exported reports are written.
    pub export_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&raw_url)?;

        let poll_interval = parse_seconds(POLL_SECS_ENV, lookup(POLL_SECS_ENV), DEFAULT_POLL_SECS)?;
        let request_timeout = parse_seconds(TIMEOUT_SECS_ENV, lookup(TIMEOUT_SECS_ENV), DEFAULT_TIMEOUT_SECS)?;

        let export_dir = lookup(EXPORT_DIR_ENV)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| get_data_dir().join("reports"));

        Ok(Self { api_url, poll_interval, request_timeout, export_dir })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { var: API_URL_ENV, source })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme { var: API_URL_ENV, scheme: url.scheme().to_string() });
    }
    // `Url::join` drops the last segment unless the base ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_seconds(var: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs >= 1 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidSeconds { var, value: raw }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/api/");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.export_dir.ends_with("reports"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let config = config_from(&[(API_URL_ENV, "https://scanner.internal/v1")]).unwrap();
        assert_eq!(config.api_url.join("scans").unwrap().as_str(), "https://scanner.internal/v1/scans");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(config_from(&[(API_URL_ENV, "not a url")]), Err(ConfigError::InvalidUrl { .. })));
        assert!(matches!(
            config_from(&[(API_URL_ENV, "ftp://scanner")]),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
        assert!(matches!(config_from(&[(POLL_SECS_ENV, "0")]), Err(ConfigError::InvalidSeconds { .. })));
        assert!(matches!(config_from(&[(TIMEOUT_SECS_ENV, "soon")]), Err(ConfigError::InvalidSeconds { .. })));
    }

    #[test]
    fn export_dir_override() {
        let config = config_from(&[(EXPORT_DIR_ENV, "/tmp/vulnscout")]).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("/tmp/vulnscout"));
    }
}
