use rand::seq::SliceRandom;
use rand::Rng;

use crate::coordinator::MirrorError;

/// Choose a candidate uniformly at random, skipping `exclude` whenever at
/// least one other candidate exists. With `exclude` as the only candidate it
/// is returned as-is.
pub fn pick_random_mirror<R: Rng + ?Sized>(
    candidates: &[String],
    exclude: &str,
    rng: &mut R,
) -> Result<String, MirrorError> {
    if candidates.is_empty() {
        return Err(MirrorError::NoMirrorsAvailable);
    }
    let others: Vec<&String> = candidates.iter().filter(|c| *c != exclude).collect();
    let picked = if others.is_empty() {
        candidates.choose(rng)
    } else {
        others.choose(rng).copied()
    };
    picked.cloned().ok_or(MirrorError::NoMirrorsAvailable)
}
