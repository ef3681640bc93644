//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Canonical origin serving the SDK script assets.
pub const DEFAULT_CDN_URL: &str = "https://cdn.segment.com";

/// Canonical origin receiving tracking events.
pub const DEFAULT_TRACKING_API_URL: &str = "https://api.segment.io";

/// Hostname rewritten inside CDN script bodies.
pub const DEFAULT_REWRITE_NEEDLE: &str = "api.segment.io";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// The two upstream origins.
    pub upstreams: UpstreamConfig,

    /// Body rewriting for CDN responses.
    pub rewrite: RewriteConfig,

    /// Log every request and response.
    pub debug: bool,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// TCP port, kept as a string the way it arrives from flags.
    pub port: String,
}

impl ListenerConfig {
    /// The `host:port` pair handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: "8080".to_string(),
        }
    }
}

/// Upstream base URLs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin for SDK scripts and project settings.
    pub cdn: String,

    /// Origin for everything else.
    pub tracking_api: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            cdn: DEFAULT_CDN_URL.to_string(),
            tracking_api: DEFAULT_TRACKING_API_URL.to_string(),
        }
    }
}

/// Response body rewriting.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RewriteConfig {
    /// Replacement host. Empty disables rewriting.
    pub host: String,

    /// Literal searched for in CDN bodies.
    pub needle: String,
}

impl RewriteConfig {
    pub fn is_enabled(&self) -> bool {
        !self.host.is_empty()
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            needle: DEFAULT_REWRITE_NEEDLE.to_string(),
        }
    }
}
