//! TCP listener setup.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Turn bind failures into a fatal startup error

use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::error::ProxyError;

/// Bind the listener described by `config`.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ProxyError> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ProxyError::Bind { addr, source })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listener bound");
    }

    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = ListenerConfig {
            bind_host: "127.0.0.1".into(),
            port: "0".into(),
        };
        let listener = bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_an_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ListenerConfig {
            bind_host: "127.0.0.1".into(),
            port: taken.local_addr().unwrap().port().to_string(),
        };

        let err = bind(&config).await.unwrap_err();
        assert!(matches!(err, ProxyError::Bind { .. }));
    }
}
