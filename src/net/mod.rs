//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (host, port)
//!     → listener.rs (bind, fatal on failure)
//!     → Hand off to HTTP layer (axum::serve)
//! ```
//!
//! # Design Decisions
//! - No TLS termination; the proxy sits behind one or speaks plain HTTP
//! - Per-connection concurrency is left to the HTTP server

pub mod listener;
