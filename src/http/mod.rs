//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (Axum catch-all handler)
//!     → [routing::Director picks upstream]
//!     → request.rs (strip hop-by-hop, set URI and Host)
//!     → upstream client (hyper-util + rustls)
//!     → response.rs (rewrite qualifying CDN bodies)
//!     → Send to caller
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use response::ResponseTransformer;
pub use server::HttpServer;
