//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → cli.rs (flags and environment override file values)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All fields have defaults so the proxy runs with no file at all
//! - The value is passed into constructors, never read from globals

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, ProxyConfig, RewriteConfig, UpstreamConfig};
pub use validation::{validate_config, ValidationError};
