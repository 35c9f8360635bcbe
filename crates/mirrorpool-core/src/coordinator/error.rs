//! Terminal failures surfaced by mirror failover.

/// Why no further mirror can be tried. Neither variant is retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    /// The repository has no mirrors besides its canonical address.
    #[error("no mirrors available")]
    NoMirrorsAvailable,
    /// Every timeout tier has been used up against the mirror pool.
    #[error("ran out of mirrors")]
    MirrorsExhausted,
}
