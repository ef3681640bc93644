//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path + query
//!     → matcher.rs (CDN prefixes, first match wins)
//!     → router.rs (pick upstream, build OutboundTarget)
//!     → path.rs (join base path, expand SDK aliases, merge query)
//! ```
//!
//! # Design Decisions
//! - Upstreams resolved at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always selects the same upstream

pub mod matcher;
pub mod path;
pub mod router;

pub use router::{Director, OutboundTarget, Upstream, UpstreamKind};
