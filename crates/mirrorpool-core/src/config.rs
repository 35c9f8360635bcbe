use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coordinator::TierTimeouts;
use crate::repo::Repo;

/// Per-tier transport timeouts (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// First pass through the mirrors.
    pub default_secs: u64,
    /// Second pass, after every mirror failed once.
    pub second_secs: u64,
    /// Last pass before giving up.
    pub longest_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_secs: 10,
            second_secs: 60,
            longest_secs: 600,
        }
    }
}

impl TimeoutConfig {
    /// Tier durations; a later tier is never shorter than an earlier one.
    pub fn to_tier_timeouts(&self) -> TierTimeouts {
        let default = self.default_secs.max(1);
        let second = self.second_secs.max(default);
        let longest = self.longest_secs.max(second);
        TierTimeouts {
            default: Duration::from_secs(default),
            second: Duration::from_secs(second),
            longest: Duration::from_secs(longest),
        }
    }
}

/// Global configuration loaded from `~/.config/mirrorpool/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Maximum fetches in flight for one `fetch` invocation.
    pub max_concurrent_fetches: usize,
    /// Allow `.onion` mirrors (requests are expected to be routed over Tor).
    #[serde(default)]
    pub use_tor: bool,
    /// Optional User-Agent header for every request.
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub repos: Vec<Repo>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            use_tor: false,
            user_agent: None,
            timeouts: TimeoutConfig::default(),
            repos: vec![Repo {
                name: Some("F-Droid".to_string()),
                ..Repo::new(
                    1,
                    "https://f-droid.org/repo",
                    [
                        "https://ftp.fau.de/fdroid/repo",
                        "https://mirror.cyberbits.eu/fdroid/repo",
                        "https://fdroid.tetaneutral.net/fdroid/repo",
                    ],
                )
            }],
        }
    }
}

impl MirrorConfig {
    /// Normalise and validate every repo, applying the Tor setting.
    fn prepare(mut self) -> Result<Self> {
        let use_tor = self.use_tor;
        self.repos = self
            .repos
            .into_iter()
            .map(|r| r.normalized().with_tor(use_tor))
            .collect();
        for (i, r) in self.repos.iter().enumerate() {
            r.validate()?;
            if self.repos[..i].iter().any(|other| other.id == r.id) {
                anyhow::bail!("duplicate repo id {} in config", r.id);
            }
        }
        Ok(self)
    }

    /// Find a repo by numeric id or by name (case-insensitive).
    pub fn find_repo(&self, key: &str) -> Option<&Repo> {
        if let Ok(id) = key.parse::<i64>() {
            if let Some(r) = self.repos.iter().find(|r| r.id.0 == id) {
                return Some(r);
            }
        }
        self.repos.iter().find(|r| {
            r.name
                .as_deref()
                .map(|n| n.eq_ignore_ascii_case(key))
                .unwrap_or(false)
        })
    }
}

#[derive(Serialize)]
struct ReposSection<'a> {
    repos: &'a [Repo],
}

/// Render repos as `[[repos]]` entries ready to paste into config.toml.
pub fn repos_to_toml(repos: &[Repo]) -> Result<String> {
    Ok(toml::to_string_pretty(&ReposSection { repos })?)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mirrorpool")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Parse and validate a config file at `path`.
pub fn load_from_path(path: &Path) -> Result<MirrorConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MirrorConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.prepare()
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return default_cfg.prepare();
    }
    load_from_path(&path)
}
