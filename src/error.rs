//! Error types shared across the proxy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure while rewriting a response body.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to read upstream body: {0}")]
    Read(#[source] axum::Error),
    #[error("failed to decompress upstream body: {0}")]
    Decompress(#[source] std::io::Error),
    #[error("failed to recompress rewritten body: {0}")]
    Compress(#[source] std::io::Error),
    #[error("cannot rewrite body with content-encoding `{0}`")]
    UnsupportedEncoding(String),
}

/// Errors surfaced by the proxy, at startup or per request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream URL `{url}`: {reason}")]
    InvalidUpstream { url: String, reason: String },
    #[error("failed to build outbound URI: {0}")]
    InvalidTarget(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
    #[error("response transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("http server stopped with error: {0}")]
    Serve(#[source] std::io::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) | ProxyError::Transform(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = %status, "Proxy error");
        (status, status.canonical_reason().unwrap_or("Proxy error")).into_response()
    }
}
