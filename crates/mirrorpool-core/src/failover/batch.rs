//! Concurrent fetches sharing one coordinator.
//!
//! Keeps up to `max_concurrent` fetches in flight; when one finishes the next
//! queued request starts. Every fetch draws on the same retry budget.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use rand::Rng;

use crate::coordinator::MirrorFailoverCoordinator;
use crate::repo::Repo;
use crate::transport::Transport;

use super::{fetch_with_failover, FetchError, Fetched};

/// One resource to fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub repo: Arc<Repo>,
    pub url: String,
    pub expected_sha256: Option<String>,
}

impl FetchRequest {
    pub fn new(repo: Arc<Repo>, url: impl Into<String>) -> Self {
        Self {
            repo,
            url: url.into(),
            expected_sha256: None,
        }
    }
}

/// Result for one request, in submission order.
#[derive(Debug)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: Result<Fetched, FetchError>,
}

/// Run all `requests` with at most `max_concurrent` in flight.
///
/// Transport calls block, so each runs on the blocking pool. Per-request
/// failures are reported in the outcome; only a panicked task is an `Err`.
pub async fn fetch_all<R, T>(
    coordinator: Arc<MirrorFailoverCoordinator<R>>,
    transport: Arc<T>,
    requests: Vec<FetchRequest>,
    max_concurrent: usize,
) -> Result<Vec<FetchOutcome>>
where
    R: Rng + Send + 'static,
    T: Transport + ?Sized + 'static,
{
    let max_concurrent = max_concurrent.max(1);
    let total = requests.len();
    let mut queue: VecDeque<(usize, FetchRequest)> = requests.into_iter().enumerate().collect();
    let mut done: Vec<Option<FetchOutcome>> = (0..total).map(|_| None).collect();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some((index, request)) = queue.pop_front() else {
                break;
            };
            let coordinator = Arc::clone(&coordinator);
            let transport = Arc::clone(&transport);
            join_set.spawn_blocking(move || {
                let result = fetch_with_failover(
                    coordinator.as_ref(),
                    transport.as_ref(),
                    &request.repo,
                    &request.url,
                    request.expected_sha256.as_deref(),
                );
                (index, FetchOutcome { request, result })
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let (index, outcome) = res.map_err(|e| anyhow::anyhow!("fetch task join: {}", e))?;
        if let Err(e) = &outcome.result {
            tracing::warn!(url = %outcome.request.url, "fetch failed: {}", e);
        }
        done[index] = Some(outcome);
    }

    Ok(done.into_iter().flatten().collect())
}
