//! `mirrorpool fetch` – fetch files from a repository with mirror failover.

use anyhow::{Context, Result};
use mirrorpool_core::config::MirrorConfig;
use mirrorpool_core::coordinator::MirrorFailoverCoordinator;
use mirrorpool_core::failover::{fetch_all, FetchRequest};
use mirrorpool_core::pool::MirrorPool;
use mirrorpool_core::repo::Repo;
use mirrorpool_core::transport::CurlTransport;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub repo: String,
    pub paths: Vec<String>,
    pub output: PathBuf,
    pub jobs: Option<usize>,
    pub sha256: Option<String>,
    pub show_state: bool,
}

pub(super) fn lookup_repo<'a>(cfg: &'a MirrorConfig, key: &str) -> Result<&'a Repo> {
    cfg.find_repo(key)
        .ok_or_else(|| anyhow::anyhow!("no repo {:?} in config", key))
}

/// Output path for a fetched URL, relative to the output directory.
///
/// URLs under one of the repo's candidates keep their repo-relative path, so
/// `icons-320/a.png` and `icons-640/a.png` land in different files. Other
/// URLs keep their path below the host. `..` components are rejected.
pub(crate) fn relative_path_for(repo: &Repo, url: &str) -> Result<PathBuf> {
    let no_query = url.split(['?', '#']).next().unwrap_or(url);
    let under_repo = MirrorPool::mirror_for_url(repo, no_query)
        .map(|base| &no_query[base.len()..])
        .filter(|rest| rest.is_empty() || rest.starts_with('/'));
    let rel = match under_repo {
        Some(rest) => rest,
        None => match no_query.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
            None => no_query,
        },
    };

    let mut out = PathBuf::new();
    for part in rel.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if part == ".." {
            anyhow::bail!("refusing to write outside the output directory: {}", url);
        }
        out.push(part);
    }
    if out.as_os_str().is_empty() {
        out.push("download.bin");
    }
    Ok(out)
}

/// Destination of each request under `dir`, failing when two share one.
pub(crate) fn destinations(dir: &Path, repo: &Repo, urls: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(urls.len());
    for url in urls {
        let dest = dir.join(relative_path_for(repo, url)?);
        if !seen.insert(dest.clone()) {
            anyhow::bail!("two paths would be written to {}", dest.display());
        }
        out.push(dest);
    }
    Ok(out)
}

pub async fn run_fetch(cfg: &MirrorConfig, args: FetchArgs) -> Result<()> {
    if args.sha256.is_some() && args.paths.len() != 1 {
        anyhow::bail!("--sha256 needs exactly one path");
    }
    let repo = Arc::new(lookup_repo(cfg, &args.repo)?.clone());
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("create {}", args.output.display()))?;

    // One coordinator per invocation: a fresh download session whose retry
    // budget is shared by every file fetched below.
    let coordinator = Arc::new(MirrorFailoverCoordinator::new(
        cfg.timeouts.to_tier_timeouts(),
    ));
    let mut transport = CurlTransport::new();
    if let Some(ua) = &cfg.user_agent {
        transport = transport.with_user_agent(ua.clone());
    }

    let urls: Vec<String> = args.paths.iter().map(|p| repo.resolve(p)).collect();
    let dests = destinations(&args.output, &repo, &urls)?;
    let requests: Vec<FetchRequest> = urls
        .into_iter()
        .map(|url| FetchRequest {
            repo: Arc::clone(&repo),
            url,
            expected_sha256: args.sha256.clone(),
        })
        .collect();
    let jobs = args.jobs.unwrap_or(cfg.max_concurrent_fetches);
    tracing::info!(
        repo = %repo.id,
        files = requests.len(),
        jobs,
        "starting fetch session"
    );

    let outcomes = fetch_all(
        Arc::clone(&coordinator),
        Arc::new(transport),
        requests,
        jobs,
    )
    .await?;

    let mut failed = 0usize;
    for (outcome, dest) in outcomes.into_iter().zip(dests) {
        match outcome.result {
            Ok(fetched) => {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
                std::fs::write(&dest, &fetched.body)
                    .with_context(|| format!("write {}", dest.display()))?;
                println!(
                    "{}  {} bytes  via {}  ({} attempt(s))",
                    dest.display(),
                    fetched.body.len(),
                    fetched.mirror.as_deref().unwrap_or(&fetched.url),
                    fetched.attempts
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("failed: {:#}", anyhow::Error::new(e));
            }
        }
    }

    if args.show_state {
        println!("{}", coordinator.snapshot().to_json_pretty()?);
    }
    if failed > 0 {
        anyhow::bail!("{} of {} file(s) could not be fetched", failed, args.paths.len());
    }
    Ok(())
}
