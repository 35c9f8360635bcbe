use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::coordinator::MirrorError;
use crate::pool::pick_random_mirror;

use super::RepoId;

/// A repository and the base URLs that serve its content.
///
/// `mirrors` are the ones published by the repository itself; `user_mirrors`
/// are added locally and are treated exactly the same for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub id: RepoId,
    #[serde(default)]
    pub name: Option<String>,
    /// Canonical base URL; the implicit last-working mirror before any failover.
    pub address: String,
    #[serde(default)]
    pub mirrors: Vec<String>,
    #[serde(default)]
    pub user_mirrors: Vec<String>,
    /// Whether `.onion` mirrors may be selected (requests are routed over Tor).
    #[serde(skip)]
    pub tor_enabled: bool,
}

impl Repo {
    /// Build a descriptor with normalised base URLs and no user mirrors.
    pub fn new<I, S>(id: i64, address: &str, mirrors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: RepoId(id),
            name: None,
            address: normalize_base(address),
            mirrors: mirrors
                .into_iter()
                .map(|m| normalize_base(m.as_ref()))
                .collect(),
            user_mirrors: Vec::new(),
            tor_enabled: false,
        }
    }

    pub fn with_user_mirrors<I, S>(mut self, mirrors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.user_mirrors = mirrors
            .into_iter()
            .map(|m| normalize_base(m.as_ref()))
            .collect();
        self
    }

    pub fn with_tor(mut self, enabled: bool) -> Self {
        self.tor_enabled = enabled;
        self
    }

    /// Strip trailing slashes from every base URL so prefix rewriting lines up
    /// with URLs built by [`Repo::resolve`]. Used after deserialisation.
    pub fn normalized(mut self) -> Self {
        self.address = normalize_base(&self.address);
        for m in self.mirrors.iter_mut().chain(self.user_mirrors.iter_mut()) {
            *m = normalize_base(m);
        }
        self
    }

    /// Display name, falling back to the address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }

    /// Ordered, deduplicated candidate list: address first, then published
    /// mirrors, then user mirrors. Onion mirrors are dropped unless Tor is on.
    pub fn mirror_list(&self) -> Vec<String> {
        let mut list = vec![self.address.clone()];
        for m in self.mirrors.iter().chain(self.user_mirrors.iter()) {
            if !self.tor_enabled && is_onion(m) {
                continue;
            }
            if !list.contains(m) {
                list.push(m.clone());
            }
        }
        list
    }

    /// Number of usable mirrors other than the canonical address.
    pub fn mirror_count(&self) -> usize {
        self.mirror_list()
            .iter()
            .filter(|m| **m != self.address)
            .count()
    }

    pub fn has_mirrors(&self) -> bool {
        self.mirror_count() > 0
    }

    /// Pick a random candidate other than `exclude` when an alternative exists.
    pub fn get_random_mirror<R: Rng + ?Sized>(
        &self,
        exclude: &str,
        rng: &mut R,
    ) -> Result<String, MirrorError> {
        pick_random_mirror(&self.mirror_list(), exclude, rng)
    }

    /// Turn a repo-relative path into a URL under the canonical address.
    /// Absolute URLs are returned unchanged.
    pub fn resolve(&self, path_or_url: &str) -> String {
        if path_or_url.contains("://") {
            return path_or_url.to_string();
        }
        format!("{}/{}", self.address, path_or_url.trim_start_matches('/'))
    }

    /// Check that the address and every mirror are absolute http(s) URLs.
    pub fn validate(&self) -> Result<()> {
        for base in std::iter::once(&self.address)
            .chain(self.mirrors.iter())
            .chain(self.user_mirrors.iter())
        {
            let parsed = url::Url::parse(base)
                .with_context(|| format!("repo {}: invalid mirror URL: {base}", self.id))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                anyhow::bail!(
                    "repo {}: unsupported scheme {:?} in {base}",
                    self.id,
                    parsed.scheme()
                );
            }
            if parsed.host_str().is_none() {
                anyhow::bail!("repo {}: mirror URL missing host: {base}", self.id);
            }
        }
        Ok(())
    }
}

/// Trim surrounding whitespace and trailing slashes from a base URL.
pub fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// True when the URL's host is a Tor hidden service.
pub fn is_onion(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|h| h.ends_with(".onion"))
            .unwrap_or(false),
        Err(_) => url.contains(".onion/") || url.ends_with(".onion"),
    }
}
