//! Hub home resolution.
//!
//! The hub home is resolved once, from the environment or explicitly, and the
//! resulting [`HubPaths`] is handed to every component that touches disk.
//!
//! # Resolution order
//! 1. `$PUMAS_HOME`
//! 2. `$XDG_CACHE_HOME/pumas`
//! 3. `~/.cache/pumas`
//!
//! A leading `~` is expanded with the platform home directory.

use crate::config::{EnvConfig, PathsConfig};
use crate::error::{HubError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolved directory layout of the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubPaths {
    home: PathBuf,
}

impl HubPaths {
    /// Use an explicit home directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve the home directory from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve the home directory with a custom variable lookup.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if lookup(EnvConfig::DEPRECATED_HUB_VAR).is_some_and(|v| !v.is_empty()) {
            warn!(
                "{} is deprecated, please use env {} instead",
                EnvConfig::DEPRECATED_HUB_VAR,
                EnvConfig::HOME_VAR
            );
        }

        let raw = match lookup(EnvConfig::HOME_VAR).filter(|v| !v.is_empty()) {
            Some(home) => PathBuf::from(home),
            None => {
                let cache = lookup(EnvConfig::XDG_CACHE_HOME_VAR)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| Path::new("~").join(PathsConfig::DEFAULT_CACHE_DIR));
                cache.join(PathsConfig::HOME_DIR_NAME)
            }
        };

        let home = expand_user(&raw)?;
        debug!("Resolved hub home: {}", home.display());
        Ok(Self { home })
    }

    /// Root of all hub state.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding cached repositories: `{home}/hub`.
    pub fn hub_dir(&self) -> PathBuf {
        self.home.join(PathsConfig::HUB_DIR_NAME)
    }

    /// Default directory for weight files: `{home}/hub/checkpoints`.
    pub fn checkpoints_dir(&self) -> PathBuf {
        self.hub_dir().join(PathsConfig::CHECKPOINTS_DIR_NAME)
    }

    /// Create the hub directory if it does not exist yet.
    pub fn ensure_hub_dir(&self) -> Result<PathBuf> {
        let hub_dir = self.hub_dir();
        make_dirs(&hub_dir)?;
        Ok(hub_dir)
    }
}

/// Create a directory and its parents.
///
/// An already existing directory is success; any other failure is returned.
pub fn make_dirs(dir: &Path) -> Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(HubError::io_with_path(e, dir)),
    }
}

fn expand_user(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or_else(|| HubError::Config {
        message: "Could not determine home directory".to_string(),
    })?;
    Ok(home.join(rest))
}
