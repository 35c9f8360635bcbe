//! Last-working-mirror tracking and mirror substitution.
//!
//! The pool remembers, per repository, which mirror was most recently
//! switched to. That mirror is the prefix that gets replaced on the next
//! substitution and the one excluded from the next random pick. Entries live
//! for the lifetime of the pool and are never persisted.

mod rewrite;
mod select;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use rand::Rng;

use crate::coordinator::MirrorError;
use crate::repo::{Repo, RepoId};

pub use rewrite::replace_mirror_prefix;
pub use select::pick_random_mirror;

/// Per-repository last-working-mirror map.
#[derive(Debug, Default)]
pub struct MirrorPool {
    last_working: RwLock<HashMap<RepoId, String>>,
}

impl MirrorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last mirror recorded for `repo`, or its canonical address.
    pub fn get_last_working_mirror(&self, repo: &Repo) -> String {
        self.last_working
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&repo.id)
            .cloned()
            .unwrap_or_else(|| repo.address.clone())
    }

    /// Store `url` as the last-working mirror for `repo`, replacing any prior entry.
    pub fn record_working_mirror(&self, repo: &Repo, url: &str) {
        self.last_working
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(repo.id, url.to_string());
    }

    /// Point `original_url` at a different mirror of `repo`.
    ///
    /// The new mirror is recorded as last-working before returning. When
    /// `original_url` does not start with the previous last-working mirror the
    /// URL comes back unchanged; callers treat that as a failed substitution.
    pub fn substitute_mirror<R: Rng + ?Sized>(
        &self,
        original_url: &str,
        repo: &Repo,
        rng: &mut R,
    ) -> Result<String, MirrorError> {
        let last_working = self.get_last_working_mirror(repo);
        let mirror = pick_random_mirror(&repo.mirror_list(), &last_working, rng)?;
        self.record_working_mirror(repo, &mirror);

        match replace_mirror_prefix(original_url, &last_working, &mirror) {
            Some(rewritten) => {
                tracing::debug!(
                    repo = %repo.id,
                    from = %last_working,
                    to = %mirror,
                    "switched mirror"
                );
                Ok(rewritten)
            }
            None => {
                tracing::warn!(
                    repo = %repo.id,
                    url = %original_url,
                    expected_prefix = %last_working,
                    "url does not start with last working mirror; not rewritten"
                );
                Ok(original_url.to_string())
            }
        }
    }

    /// Forget every recorded mirror.
    pub fn clear(&self) {
        self.last_working
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Recorded entries sorted by repo id.
    pub fn entries(&self) -> Vec<(RepoId, String)> {
        let mut entries: Vec<_> = self
            .last_working
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, url)| (*id, url.clone()))
            .collect();
        entries.sort();
        entries
    }

    /// The candidate of `repo` that `url` is served from (longest prefix match).
    pub fn mirror_for_url(repo: &Repo, url: &str) -> Option<String> {
        repo.mirror_list()
            .into_iter()
            .filter(|m| url.starts_with(m.as_str()))
            .max_by_key(|m| m.len())
    }
}

#[cfg(test)]
mod tests;
