//! Byte transport used by the failover loop.
//!
//! The coordinator never sees transport errors in detail; any failure simply
//! triggers the next mirror decision.

mod error;
mod http;

use std::time::Duration;

pub use error::TransportError;
pub use http::CurlTransport;

/// Fetches the body at a URL within a timeout.
///
/// Implementations are blocking; run them from `spawn_blocking` when called
/// from async code.
pub trait Transport: Send + Sync {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, TransportError>;
}

