//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing for structured events, printed to stdout
//! - Level comes from `RUST_LOG`, with a default that shows startup and
//!   the debug-mode request log

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "segment_proxy=info,tower_http=info";

/// Install the global subscriber. Call once, at startup.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();
}
