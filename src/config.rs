//! Optional user configuration.
//!
//! Everything has a sensible default; the config file exists for users
//! pointing the installer at a fork or relocating the cache.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the cache root.
pub const CACHE_ENV: &str = "NYARCHUP_CACHE";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache root override; defaults to `~/.cache/nyarchup`.
    pub cache_root: Option<String>,
    /// Asset repository to resolve releases from.
    pub repo: RepoConfig,
    /// Name of the bundle archive asset attached to each release.
    pub archive: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub owner: String,
    pub name: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            owner: "NyarchLinux".to_string(),
            name: "NyarchLinux".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_root: None,
            repo: RepoConfig::default(),
            archive: "NyarchLinux.tar.gz".to_string(),
        }
    }
}

impl Config {
    /// Load `~/.config/nyarchup/config.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(".config").join("nyarchup").join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config at {}", path.display()))
    }

    /// The cache root, honoring the `NYARCHUP_CACHE` environment
    /// variable, then the config file, then the default.
    pub fn cache_root(&self, home: &Path) -> PathBuf {
        self.cache_root_with(home, std::env::var(CACHE_ENV).ok().as_deref())
    }

    fn cache_root_with(&self, home: &Path, env_override: Option<&str>) -> PathBuf {
        if let Some(env) = env_override {
            if !env.is_empty() {
                return crate::paths::expand(env, home);
            }
        }
        if let Some(configured) = &self.cache_root {
            return crate::paths::expand(configured, home);
        }
        home.join(".cache").join("nyarchup")
    }
}
