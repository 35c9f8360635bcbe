//! Mirror failover coordinator.
//!
//! A decision function called once per observed transport failure: it either
//! hands back the URL rewritten onto another mirror or reports that retrying
//! is pointless. Attempts are budgeted per timeout tier; when a tier's budget
//! (one attempt per mirror) is spent the next, longer tier starts, and after
//! the longest tier the coordinator gives up until [`reset`] is called.
//!
//! The budget belongs to the coordinator, not to a repo or a download. Every
//! caller sharing an instance (typically through an `Arc`) draws from the
//! same counter, so failures against one repository can escalate the tier
//! seen by downloads from another. The retry loop itself lives in the caller
//! (see [`crate::failover`]).
//!
//! [`reset`]: MirrorFailoverCoordinator::reset

mod error;
mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::pool::MirrorPool;
use crate::repo::{Repo, RepoId};

pub use error::MirrorError;
pub use state::{Phase, RetryBudget, TierTimeouts, TimeoutTier};

struct Inner<R> {
    budget: RetryBudget,
    rng: R,
}

/// Shared retry/backoff state machine over a repository's mirror pool.
pub struct MirrorFailoverCoordinator<R = StdRng> {
    pool: MirrorPool,
    timeouts: TierTimeouts,
    inner: Mutex<Inner<R>>,
}

impl MirrorFailoverCoordinator<StdRng> {
    pub fn new(timeouts: TierTimeouts) -> Self {
        Self::with_rng(timeouts, StdRng::from_entropy())
    }
}

impl Default for MirrorFailoverCoordinator<StdRng> {
    fn default() -> Self {
        Self::new(TierTimeouts::default())
    }
}

impl<R: Rng> MirrorFailoverCoordinator<R> {
    /// Build a coordinator with an explicit random source (seeded in tests).
    pub fn with_rng(timeouts: TierTimeouts, rng: R) -> Self {
        Self {
            pool: MirrorPool::new(),
            timeouts,
            inner: Mutex::new(Inner {
                budget: RetryBudget::new(),
                rng,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pool(&self) -> &MirrorPool {
        &self.pool
    }

    pub fn timeouts(&self) -> TierTimeouts {
        self.timeouts
    }

    /// Decide what to do after a failed fetch of `url` from `repo`.
    ///
    /// Returns the URL to try next, or a terminal [`MirrorError`]. A repo
    /// without mirrors fails before any state is touched.
    pub fn on_error(&self, url: &str, repo: &Repo) -> Result<String, MirrorError> {
        if !repo.has_mirrors() {
            tracing::debug!(repo = %repo.id, "no mirrors to fail over to");
            return Err(MirrorError::NoMirrorsAvailable);
        }

        let mut inner = self.lock();
        match inner.budget.consume(repo.mirror_count()) {
            Ok(Some(tier)) => {
                tracing::info!(
                    repo = %repo.id,
                    tier = %tier,
                    timeout_secs = self.timeouts.for_tier(tier).as_secs(),
                    "mirror attempts exhausted at previous tier; escalating timeout"
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(repo = %repo.id, url = %url, "mirrors: giving up");
                return Err(e);
            }
        }

        let Inner { rng, .. } = &mut *inner;
        self.pool.substitute_mirror(url, repo, rng)
    }

    /// Rewrite `url` onto a different mirror without touching the budget.
    pub fn substitute_mirror(&self, url: &str, repo: &Repo) -> Result<String, MirrorError> {
        let mut inner = self.lock();
        let Inner { rng, .. } = &mut *inner;
        self.pool.substitute_mirror(url, repo, rng)
    }

    /// Pick a random mirror of `repo` other than `exclude`, using the shared rng.
    pub fn random_mirror(&self, repo: &Repo, exclude: &str) -> Result<String, MirrorError> {
        let mut inner = self.lock();
        repo.get_random_mirror(exclude, &mut inner.rng)
    }

    /// Remember the mirror a successful fetch came from.
    pub fn record_working_mirror(&self, repo: &Repo, mirror: &str) {
        self.pool.record_working_mirror(repo, mirror);
    }

    /// Timeout the transport should use for its next attempt.
    pub fn get_current_timeout_tier(&self) -> Duration {
        self.timeouts.for_tier(self.current_tier())
    }

    pub fn current_tier(&self) -> TimeoutTier {
        self.lock().budget.tier()
    }

    pub fn phase(&self) -> Phase {
        self.lock().budget.phase()
    }

    /// Attempts left in the current tier; `None` until the first failure.
    pub fn remaining_attempts(&self) -> Option<usize> {
        self.lock().budget.remaining()
    }

    /// Start a new download session: forget last-working mirrors and return
    /// the budget to its fresh state.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.budget = RetryBudget::new();
        self.pool.clear();
        tracing::debug!("mirror failover state reset");
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let inner = self.lock();
        let tier = inner.budget.tier();
        CoordinatorSnapshot {
            phase: inner.budget.phase(),
            tier,
            timeout_secs: self.timeouts.for_tier(tier).as_secs(),
            remaining_attempts: inner.budget.remaining(),
            last_working: self
                .pool
                .entries()
                .into_iter()
                .map(|(repo, mirror)| LastWorking { repo, mirror })
                .collect(),
        }
    }
}

/// Point-in-time view of the coordinator for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSnapshot {
    pub phase: Phase,
    pub tier: TimeoutTier,
    pub timeout_secs: u64,
    pub remaining_attempts: Option<usize>,
    pub last_working: Vec<LastWorking>,
}

impl CoordinatorSnapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastWorking {
    pub repo: RepoId,
    pub mirror: String,
}
