//! CLI command handlers, one per file.

mod checksum;
mod fetch;
mod inspect_index;
mod mirrors;

pub use checksum::run_checksum;
pub use fetch::{run_fetch, FetchArgs};
pub use inspect_index::run_inspect_index;
pub use mirrors::run_mirrors;
