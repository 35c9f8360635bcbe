//! Single-resource fetch with mirror failover.

use rand::Rng;

use crate::checksum;
use crate::coordinator::MirrorFailoverCoordinator;
use crate::pool::{replace_mirror_prefix, MirrorPool};
use crate::repo::Repo;
use crate::transport::Transport;

use super::FetchError;

/// A successfully fetched resource.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// URL that finally served the body.
    pub url: String,
    /// Mirror base URL `url` belongs to, when it matches a known candidate.
    pub mirror: Option<String>,
    pub body: Vec<u8>,
    /// Transport attempts made, including the successful one.
    pub attempts: u32,
}

/// Fetch `url` from `repo`, failing over between mirrors until the
/// coordinator gives up. A non-matching `expected_sha256` is terminal.
pub fn fetch_with_failover<R, T>(
    coordinator: &MirrorFailoverCoordinator<R>,
    transport: &T,
    repo: &Repo,
    url: &str,
    expected_sha256: Option<&str>,
) -> Result<Fetched, FetchError>
where
    R: Rng,
    T: Transport + ?Sized,
{
    let mut current = url.to_string();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let timeout = coordinator.get_current_timeout_tier();
        match transport.fetch(&current, timeout) {
            Ok(body) => {
                if let Some(expected) = expected_sha256 {
                    let actual = checksum::sha256_bytes(&body);
                    if !actual.eq_ignore_ascii_case(expected.trim()) {
                        return Err(FetchError::ChecksumMismatch {
                            url: current,
                            expected: expected.trim().to_lowercase(),
                            actual,
                        });
                    }
                }
                let mirror = MirrorPool::mirror_for_url(repo, &current);
                if let Some(m) = &mirror {
                    coordinator.record_working_mirror(repo, m);
                }
                tracing::debug!(url = %current, attempts, bytes = body.len(), "fetched");
                return Ok(Fetched {
                    url: current,
                    mirror,
                    body,
                    attempts,
                });
            }
            Err(e) => {
                tracing::debug!(
                    url = %current,
                    attempt = attempts,
                    timeout_secs = timeout.as_secs(),
                    error = %e,
                    "fetch attempt failed"
                );
                match coordinator.on_error(&current, repo) {
                    Ok(next) if next != current => current = next,
                    Ok(_) => {
                        let rebased = rebase_onto_last_working(coordinator, repo, &current);
                        if rebased == current {
                            tracing::debug!(
                                url = %current,
                                "last-working mirror is the one that just failed; retrying same url"
                            );
                        }
                        current = rebased;
                    }
                    Err(source) => {
                        return Err(FetchError::Mirror {
                            source,
                            url: current,
                            last_error: e,
                        })
                    }
                }
            }
        }
    }
}

/// Another download moved the repo's last-working mirror, so the coordinator
/// could not rewrite `url`. Move it onto whatever mirror was just chosen.
pub(super) fn rebase_onto_last_working<R: Rng>(
    coordinator: &MirrorFailoverCoordinator<R>,
    repo: &Repo,
    url: &str,
) -> String {
    let Some(serving) = MirrorPool::mirror_for_url(repo, url) else {
        return url.to_string();
    };
    let target = coordinator.pool().get_last_working_mirror(repo);
    replace_mirror_prefix(url, &serving, &target).unwrap_or_else(|| url.to_string())
}
