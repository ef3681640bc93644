//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! reported at once rather than stopping at the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port `{0}` is not a valid TCP port")]
    InvalidPort(String),
    #[error("upstreams.{field} `{value}` is not a valid http(s) URL: {reason}")]
    InvalidUpstream {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("rewrite.needle must not be empty")]
    EmptyNeedle,
    #[error("rewrite.host `{0}` must not contain whitespace")]
    InvalidRewriteHost(String),
}

/// Check a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port.parse::<u16>().is_err() {
        errors.push(ValidationError::InvalidPort(config.listener.port.clone()));
    }

    for (field, value) in [
        ("cdn", &config.upstreams.cdn),
        ("tracking_api", &config.upstreams.tracking_api),
    ] {
        if let Err(reason) = check_upstream(value) {
            errors.push(ValidationError::InvalidUpstream {
                field,
                value: value.clone(),
                reason,
            });
        }
    }

    if config.rewrite.needle.is_empty() {
        errors.push(ValidationError::EmptyNeedle);
    }
    if config.rewrite.host.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidRewriteHost(config.rewrite.host.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.port = "http".into();
        config.upstreams.cdn = "ftp://cdn.segment.com".into();
        config.upstreams.tracking_api = "not a url".into();
        config.rewrite.needle = String::new();
        config.rewrite.host = "proxy example.com".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], ValidationError::InvalidPort("http".into()));
        assert!(matches!(errors[1], ValidationError::InvalidUpstream { field: "cdn", .. }));
        assert!(matches!(
            errors[2],
            ValidationError::InvalidUpstream { field: "tracking_api", .. }
        ));
        assert_eq!(errors[3], ValidationError::EmptyNeedle);
    }

    #[test]
    fn test_plain_http_upstream_is_allowed() {
        let mut config = ProxyConfig::default();
        config.upstreams.cdn = "http://127.0.0.1:9000".into();
        assert!(validate_config(&config).is_ok());
    }
}
