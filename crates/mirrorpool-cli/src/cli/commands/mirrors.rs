//! `mirrorpool mirrors` – list a repository's mirror candidates.

use anyhow::Result;
use mirrorpool_core::config::MirrorConfig;
use mirrorpool_core::repo::is_onion;

use super::fetch::lookup_repo;

pub fn run_mirrors(cfg: &MirrorConfig, key: &str) -> Result<()> {
    let repo = lookup_repo(cfg, key)?;
    let candidates = repo.mirror_list();
    println!("{} (id {})", repo.display_name(), repo.id);
    for m in &candidates {
        let role = if *m == repo.address { "address" } else { "mirror" };
        println!("  {:<8} {}", role, m);
    }
    let skipped = repo
        .mirrors
        .iter()
        .chain(repo.user_mirrors.iter())
        .filter(|m| !repo.tor_enabled && is_onion(m))
        .count();
    if skipped > 0 {
        println!("  ({} onion mirror(s) skipped; set use_tor = true to use them)", skipped);
    }
    println!("mirror count: {}", repo.mirror_count());
    Ok(())
}
