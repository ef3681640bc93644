//! Reverse proxy for Segment analytics SDK traffic.
//!
//! Routes SDK script and settings requests to the CDN origin and everything
//! else to the tracking API, optionally rewriting the API hostname inside
//! served scripts so the SDK keeps talking to the proxy.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ProxyConfig;
pub use error::{ProxyError, TransformError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
