//! External route acquisition: HTTP client, retry/backoff, and fallback.
//!
//! Split one concern per file (client, error, response, fallback) with an
//! async client built around a retry-with-credential-rotation state
//! machine, since a single blocking request can't cover provider outages
//! or credential exhaustion gracefully.

mod backoff;
mod client;
mod error;
mod fallback;
mod response;

pub use backoff::BackoffPolicy;
pub use client::RoutingClient;
pub use error::RoutingError;
pub use fallback::build_fallback_route;
