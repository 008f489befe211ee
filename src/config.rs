use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("timeout must be at least one second")]
    ZeroTimeout,
}

/// Runtime settings shared by the TUI and the one-shot `ask` command.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    pub timeout: Duration,
    pub log_file: PathBuf,
}

impl Config {
    pub fn new(endpoint: &str, timeout_secs: u64, log_file: PathBuf) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(endpoint)?;
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            log_file,
        })
    }
}

/// Accepts only absolute http(s) URLs.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    #[test]
    fn test_default_endpoint_parses() {
        let config = Config::new(
            constants::DEFAULT_ENDPOINT,
            constants::DEFAULT_TIMEOUT.as_secs(),
            PathBuf::from(constants::DEFAULT_LOG_FILE),
        )
        .unwrap();
        assert_eq!(config.endpoint.as_str(), constants::DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, constants::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_rejects_relative_endpoint() {
        let err = parse_endpoint("/api/v1/analysis").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = parse_endpoint("ftp://example.com/upload").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = Config::new("http://localhost:8080/analyze", 0, PathBuf::from("x.log")).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));
    }
}
