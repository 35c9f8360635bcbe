//! Repository descriptors.
//!
//! A repository publishes one canonical address plus any number of mirrors
//! serving identical content (index files, APKs, icons, screenshots). This
//! module only describes the candidate set; choosing between candidates lives
//! in [`crate::pool`].

mod descriptor;
mod id;
mod index;

pub use descriptor::{is_onion, normalize_base, Repo};
pub use id::RepoId;

#[cfg(test)]
mod tests;
