//! Repository cache.
//!
//! Resolves a reference to a directory under the hub dir, downloading and
//! installing the repository archive when it is missing or a reload is
//! forced.

mod fetcher;
mod installer;

pub use fetcher::{fetch_archive, git_archive_link};
pub use installer::AtomicInstaller;

use crate::archive::remove_if_exists;
use crate::error::Result;
use crate::network::Downloader;
use crate::paths::{make_dirs, HubPaths};
use crate::reference::{RepoReference, Source};
use std::path::{Path, PathBuf};
use tracing::info;

/// A resolved repository on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Directory holding the repository contents.
    pub root_dir: PathBuf,
    pub source: Source,
    /// Directory name under the hub dir; empty for local repositories.
    pub normalized_key: String,
}

impl CacheEntry {
    /// Wrap a repository directory that is already on disk.
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: dir.into(),
            source: Source::Local,
            normalized_key: String::new(),
        }
    }

    /// Whether the entry's directory is present.
    pub fn is_cached(&self) -> bool {
        self.root_dir.is_dir()
    }
}

/// Resolves repository references against the hub directory.
pub struct RepoCache<'a> {
    paths: &'a HubPaths,
    downloader: &'a dyn Downloader,
}

impl<'a> RepoCache<'a> {
    pub fn new(paths: &'a HubPaths, downloader: &'a dyn Downloader) -> Self {
        Self { paths, downloader }
    }

    /// Resolve `repo` for `source`, reusing the cache unless `force_reload`.
    ///
    /// For [`Source::Local`], `repo` is a directory path and is returned as is.
    pub fn resolve(&self, repo: &str, source: Source, force_reload: bool) -> Result<CacheEntry> {
        if !source.is_remote() {
            return Ok(CacheEntry::local(repo));
        }

        let hub_dir = self.paths.hub_dir();
        make_dirs(&hub_dir)?;

        let reference = RepoReference::parse(repo, source)?;
        let entry = CacheEntry {
            root_dir: reference.cache_dir(&hub_dir),
            source,
            normalized_key: reference.cache_key(),
        };

        if !force_reload && entry.is_cached() {
            info!("Using cache found in {}", entry.root_dir.display());
            return Ok(entry);
        }

        self.reload(&reference, source, &hub_dir, &entry.root_dir)?;
        Ok(entry)
    }

    fn reload(
        &self,
        reference: &RepoReference,
        source: Source,
        hub_dir: &Path,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        let normalized_branch = reference.normalized_branch();
        let installer = AtomicInstaller::new(hub_dir);
        remove_if_exists(&installer.temp_archive_path(&normalized_branch))?;

        info!("Fetching {} from {}", reference, source);
        let downloaded = fetch_archive(self.downloader, reference, source, hub_dir)?;
        installer.install(&downloaded, &normalized_branch, target_dir)
    }
}
