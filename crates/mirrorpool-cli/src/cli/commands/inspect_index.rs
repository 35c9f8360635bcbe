//! `mirrorpool inspect-index` – show the repo section of an index file.

use anyhow::{Context, Result};
use mirrorpool_core::config;
use mirrorpool_core::repo::Repo;
use std::path::Path;

pub fn run_inspect_index(path: &Path, id: i64) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let repo = Repo::from_index_json(id, &data)?;
    print!("{}", config::repos_to_toml(std::slice::from_ref(&repo))?);
    Ok(())
}
