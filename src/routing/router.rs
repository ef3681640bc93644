//! Upstream selection and outbound target construction.
//!
//! # Responsibilities
//! - Hold the two upstream origins, resolved once at startup
//! - Pick an origin from the request path
//! - Build the outbound URI and Host header for that origin
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Total: every path resolves to an upstream, the tracking API being the fallback
//! - Pure: `direct` returns a new descriptor instead of mutating the request

use std::fmt;

use axum::http::Uri;
use url::{Position, Url};

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::routing::matcher::{AnyMatcher, Matcher};
use crate::routing::path::{merge_query, rewrite_path_aliases, single_joining_slash};

/// Path prefixes served by the CDN origin. Everything else goes to the tracking API.
pub const CDN_PATH_PREFIXES: [&str; 3] = ["/v1/projects", "/a.js/v1", "/analytics.js/v1"];

/// Which of the two origins a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    Cdn,
    TrackingApi,
}

impl fmt::Display for UpstreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamKind::Cdn => write!(f, "cdn"),
            UpstreamKind::TrackingApi => write!(f, "tracking_api"),
        }
    }
}

/// A parsed upstream base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    scheme: String,
    authority: String,
    base_path: String,
    query: String,
}

impl Upstream {
    /// Parse a base URL such as `https://cdn.segment.com`.
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let invalid = |reason: String| ProxyError::InvalidUpstream {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority: url[Position::BeforeHost..Position::AfterPort].to_string(),
            base_path: url.path().to_string(),
            query: url.query().unwrap_or_default().to_string(),
        })
    }

    /// `host[:port]`, also used as the outbound Host header.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

/// Where a single request is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTarget {
    pub kind: UpstreamKind,
    pub scheme: String,
    pub authority: String,
    pub path: String,
    /// Merged query, empty when neither side had one.
    pub query: String,
}

impl OutboundTarget {
    /// Value for the outbound Host header.
    pub fn host_header(&self) -> &str {
        &self.authority
    }

    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    /// Absolute URI for the upstream client.
    pub fn uri(&self) -> Result<Uri, ProxyError> {
        Ok(Uri::builder()
            .scheme(self.scheme.as_str())
            .authority(self.authority.as_str())
            .path_and_query(self.path_and_query())
            .build()?)
    }
}

/// Chooses an upstream per request and rewrites the target.
#[derive(Debug)]
pub struct Director {
    cdn_routes: AnyMatcher,
    cdn: Upstream,
    tracking_api: Upstream,
}

impl Director {
    pub fn new(cdn: Upstream, tracking_api: Upstream) -> Self {
        Self {
            cdn_routes: AnyMatcher::prefixes(CDN_PATH_PREFIXES),
            cdn,
            tracking_api,
        }
    }

    /// Resolve both upstream URLs from configuration.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ProxyError> {
        Ok(Self::new(
            Upstream::parse(&config.cdn)?,
            Upstream::parse(&config.tracking_api)?,
        ))
    }

    /// First match wins; the tracking API is the default.
    pub fn select(&self, path: &str) -> UpstreamKind {
        if self.cdn_routes.matches(path) {
            UpstreamKind::Cdn
        } else {
            UpstreamKind::TrackingApi
        }
    }

    pub fn upstream(&self, kind: UpstreamKind) -> &Upstream {
        match kind {
            UpstreamKind::Cdn => &self.cdn,
            UpstreamKind::TrackingApi => &self.tracking_api,
        }
    }

    /// Build the outbound target for a request path and optional raw query.
    pub fn direct(&self, path: &str, query: Option<&str>) -> OutboundTarget {
        let kind = self.select(path);
        let upstream = self.upstream(kind);

        let joined = single_joining_slash(&upstream.base_path, path);

        OutboundTarget {
            kind,
            scheme: upstream.scheme.clone(),
            authority: upstream.authority.clone(),
            path: rewrite_path_aliases(&joined),
            query: merge_query(&upstream.query, query.unwrap_or_default()),
        }
    }
}
