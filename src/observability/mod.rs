//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (startup, upstream errors, rewrites)
//!     → TraceLayer request/response spans when debug is on
//! Consumer:
//!     → logging.rs subscriber (stdout)
//! ```

pub mod logging;
