use crate::coordinator::MirrorError;
use crate::transport::TransportError;

/// Terminal failure of a fetch with failover.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The coordinator gave up; carries the last transport failure.
    #[error("{url}: {source} (last error: {last_error})")]
    Mirror {
        source: MirrorError,
        url: String,
        last_error: TransportError,
    },
    /// The body arrived but did not match the expected SHA-256.
    #[error("{url}: sha256 mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },
}

impl FetchError {
    /// The mirror-level reason, when the failure came from the coordinator.
    pub fn mirror_error(&self) -> Option<MirrorError> {
        match self {
            FetchError::Mirror { source, .. } => Some(*source),
            FetchError::ChecksumMismatch { .. } => None,
        }
    }
}
