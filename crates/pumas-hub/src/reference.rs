//! Repository references and cache keys.
//!
//! A reference has the form `owner/name[:branch]`. Parsing never touches the
//! network or the filesystem.
//!
//! Branch names may contain `/`, which is replaced by `_` in the cache key.
//! A branch spelled `release_1` therefore shares its cache directory with
//! `release/1`; the collision is accepted.

use crate::config::SourceConfig;
use crate::error::{HubError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where a reference is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Source {
    #[default]
    GitHub,
    Gitee,
    /// The reference is a path to a repository already on disk.
    Local,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GitHub => "github",
            Source::Gitee => "gitee",
            Source::Local => "local",
        }
    }

    /// Branch used when a reference does not name one.
    pub fn default_branch(&self) -> &'static str {
        match self {
            Source::GitHub => SourceConfig::GITHUB_DEFAULT_BRANCH,
            Source::Gitee | Source::Local => SourceConfig::GITEE_DEFAULT_BRANCH,
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, Source::Local)
    }
}

impl FromStr for Source {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "github" => Ok(Source::GitHub),
            "gitee" => Ok(Source::Gitee),
            "local" => Ok(Source::Local),
            other => Err(HubError::UnsupportedSource(other.to_string())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `owner/name[:branch]` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoReference {
    owner: String,
    name: String,
    branch: String,
}

impl RepoReference {
    /// Parse a raw reference for the given source.
    pub fn parse(raw: &str, source: Source) -> Result<Self> {
        let mut parts = raw.split(':');
        let repo_info = parts.next().unwrap_or_default();
        let branch = parts.next();
        if parts.next().is_some() {
            return Err(HubError::malformed(raw, "expected at most one ':'"));
        }

        let branch = match branch {
            Some("") => return Err(HubError::malformed(raw, "empty branch after ':'")),
            Some(branch) => branch.to_string(),
            None => source.default_branch().to_string(),
        };

        let segments: Vec<&str> = repo_info.split('/').collect();
        let [owner, name] = segments.as_slice() else {
            return Err(HubError::malformed(
                raw,
                "expected exactly one '/' between owner and name",
            ));
        };
        if owner.is_empty() || name.is_empty() {
            return Err(HubError::malformed(raw, "owner and name must be non-empty"));
        }
        if owner.contains('\\') || name.contains('\\') {
            return Err(HubError::malformed(raw, "owner and name must not contain '\\'"));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            branch,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Branch with `/` replaced by `_`.
    pub fn normalized_branch(&self) -> String {
        normalize_branch(&self.branch)
    }

    /// Filesystem-safe cache directory name for this reference.
    pub fn cache_key(&self) -> String {
        cache_key(&self.owner, &self.name, &self.branch)
    }

    /// Cache directory for this reference under `hub_dir`.
    pub fn cache_dir(&self, hub_dir: &Path) -> PathBuf {
        hub_dir.join(self.cache_key())
    }
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.name, self.branch)
    }
}

/// Replace `/` with `_` so a branch can be used as a path component.
pub fn normalize_branch(branch: &str) -> String {
    branch.replace('/', "_")
}

/// `owner_name_branch`, with the branch normalized.
pub fn cache_key(owner: &str, name: &str, branch: &str) -> String {
    [owner, name, &normalize_branch(branch)].join("_")
}
