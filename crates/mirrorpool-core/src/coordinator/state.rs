//! Timeout tiers and the shared attempt budget.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::MirrorError;

/// Escalating timeout settings applied to transport attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutTier {
    Default,
    Second,
    Longest,
}

impl TimeoutTier {
    /// The tier after this one, or `None` from `Longest`.
    pub fn next(self) -> Option<Self> {
        match self {
            TimeoutTier::Default => Some(TimeoutTier::Second),
            TimeoutTier::Second => Some(TimeoutTier::Longest),
            TimeoutTier::Longest => None,
        }
    }
}

impl fmt::Display for TimeoutTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeoutTier::Default => "default",
            TimeoutTier::Second => "second",
            TimeoutTier::Longest => "longest",
        };
        f.write_str(s)
    }
}

/// Durations for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTimeouts {
    pub default: Duration,
    pub second: Duration,
    pub longest: Duration,
}

impl Default for TierTimeouts {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(10),
            second: Duration::from_secs(60),
            longest: Duration::from_secs(600),
        }
    }
}

impl TierTimeouts {
    pub fn for_tier(&self, tier: TimeoutTier) -> Duration {
        match tier {
            TimeoutTier::Default => self.default,
            TimeoutTier::Second => self.second,
            TimeoutTier::Longest => self.longest,
        }
    }
}

/// Observable state of the failover machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "tier")]
pub enum Phase {
    /// No attempt consumed since construction or the last reset.
    Fresh,
    /// Attempts are being consumed at this tier.
    Tier(TimeoutTier),
    /// Every tier used up; terminal until reset.
    Exhausted,
}

/// Attempt counter for the current tier.
///
/// `remaining == None` means the counter must be initialised from the mirror
/// count of the next repo that fails. Tiers only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    tier: TimeoutTier,
    remaining: Option<usize>,
    exhausted: bool,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            tier: TimeoutTier::Default,
            remaining: None,
            exhausted: false,
        }
    }
}

impl RetryBudget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> TimeoutTier {
        self.tier
    }

    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn phase(&self) -> Phase {
        if self.exhausted {
            Phase::Exhausted
        } else if self.tier == TimeoutTier::Default && self.remaining.is_none() {
            Phase::Fresh
        } else {
            Phase::Tier(self.tier)
        }
    }

    /// Spend one attempt, escalating to the next tier first when the current
    /// one is used up. `mirror_count` seeds the counter when it needs init.
    ///
    /// Returns the tier escalated to, if this call escalated.
    pub fn consume(&mut self, mirror_count: usize) -> Result<Option<TimeoutTier>, MirrorError> {
        let mut escalated = None;
        if self.remaining == Some(0) {
            match self.tier.next() {
                Some(next) => {
                    self.tier = next;
                    self.remaining = None;
                    escalated = Some(next);
                }
                None => {
                    self.exhausted = true;
                    return Err(MirrorError::MirrorsExhausted);
                }
            }
        }
        let available = self.remaining.unwrap_or(mirror_count);
        self.remaining = Some(available.saturating_sub(1));
        Ok(escalated)
    }
}
