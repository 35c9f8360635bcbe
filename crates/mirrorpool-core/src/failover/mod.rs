//! Caller-side retry loop driving a transport through the coordinator.
//!
//! The coordinator only decides; this module owns the loop: fetch with the
//! current tier's timeout, ask the coordinator for the next URL on failure,
//! and record the serving mirror on success.

mod batch;
mod error;
mod run;

pub use batch::{fetch_all, FetchOutcome, FetchRequest};
pub use error::FetchError;
pub use run::{fetch_with_failover, Fetched};
