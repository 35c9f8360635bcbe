//! Repo descriptors from `index-v1.json`.
//!
//! Only the `repo` object is read; packages and apps are ignored.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::Repo;

#[derive(Debug, Deserialize)]
struct IndexV1 {
    repo: IndexRepo,
}

#[derive(Debug, Deserialize)]
struct IndexRepo {
    address: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mirrors: Vec<String>,
}

impl Repo {
    /// Build a descriptor from the `repo` section of an index file.
    pub fn from_index_json(id: i64, data: &[u8]) -> Result<Self> {
        let index: IndexV1 =
            serde_json::from_slice(data).context("parse index-v1.json repo section")?;
        let mut repo = Repo::new(id, &index.repo.address, index.repo.mirrors);
        repo.name = index.repo.name;
        repo.validate()?;
        Ok(repo)
    }
}
