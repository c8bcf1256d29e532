//! Atomic replacement of a cached repository.
//!
//! The canonical cache directory is only touched by the last two steps
//! (delete stale entry, rename fresh root into place), so a crash at any point
//! leaves either the previous entry or nothing under the canonical path, never
//! a half-extracted tree. Every cleanup step tolerates a missing target, which
//! makes the whole sequence safe to re-run.
//!
//! There is no locking: two installs of the same key racing each other can
//! corrupt the result.

use crate::archive::{extract_all, open_zip, remove_if_exists, root_folder_name};
use crate::error::{HubError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Installs downloaded repository archives into a hub directory.
pub struct AtomicInstaller<'a> {
    hub_dir: &'a Path,
}

impl<'a> AtomicInstaller<'a> {
    pub fn new(hub_dir: &'a Path) -> Self {
        Self { hub_dir }
    }

    /// Well-known temporary archive path for a normalized branch.
    pub fn temp_archive_path(&self, normalized_branch: &str) -> PathBuf {
        self.hub_dir.join(format!(
            "{}.{}",
            normalized_branch,
            crate::config::HubConfig::ARCHIVE_EXTENSION
        ))
    }

    /// Replace `target_dir` with the single root folder of `downloaded`.
    ///
    /// Returns `target_dir` on success. On failure the temp archive and any
    /// extracted root are removed before returning; `target_dir` is only
    /// touched once extraction has succeeded.
    pub fn install(
        &self,
        downloaded: &Path,
        normalized_branch: &str,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        let temp_archive = self.temp_archive_path(normalized_branch);
        let mut extracted_root = None;

        match self.install_steps(downloaded, &temp_archive, target_dir, &mut extracted_root) {
            Ok(()) => {
                info!("Installed repository into {}", target_dir.display());
                Ok(target_dir.to_path_buf())
            }
            Err(e) => {
                self.discard(&temp_archive, extracted_root.as_deref());
                Err(e)
            }
        }
    }

    fn install_steps(
        &self,
        downloaded: &Path,
        temp_archive: &Path,
        target_dir: &Path,
        extracted_root: &mut Option<PathBuf>,
    ) -> Result<()> {
        // 1. Park the download under the well-known temp name.
        if downloaded != temp_archive {
            remove_if_exists(temp_archive)?;
            move_path(downloaded, temp_archive)?;
        }

        // 2-4. Discover the root folder, clear leftovers, extract.
        let root = {
            let mut archive = open_zip(temp_archive)?;
            let root_name = root_folder_name(&mut archive, temp_archive)?;
            let root = self.hub_dir.join(&root_name);
            debug!(
                "Archive {} has root folder '{}'",
                temp_archive.display(),
                root_name
            );

            remove_if_exists(&root)?;
            *extracted_root = Some(root.clone());
            extract_all(&mut archive, temp_archive, self.hub_dir)?;
            root
        };

        // 5. Drop the archive.
        remove_if_exists(temp_archive)?;

        // 6-7. Swap the fresh tree in.
        remove_if_exists(target_dir)?;
        move_path(&root, target_dir)
    }

    /// Best-effort removal of install leftovers after a failed step.
    fn discard(&self, temp_archive: &Path, extracted_root: Option<&Path>) {
        let leftovers = std::iter::once(temp_archive).chain(extracted_root);
        for path in leftovers {
            if let Err(e) = remove_if_exists(path) {
                warn!("Failed to clean up {}: {}", path.display(), e);
            }
        }
    }
}

/// Rename, falling back to copy-and-delete for single files on another
/// filesystem.
fn move_path(from: &Path, to: &Path) -> Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) if from.is_file() => {
            debug!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                rename_err
            );
            std::fs::copy(from, to)
                .map_err(|e| HubError::install(e, to, "Failed to copy"))?;
            std::fs::remove_file(from)
                .map_err(|e| HubError::install(e, from, "Failed to remove after copy"))
        }
        Err(e) => Err(HubError::Install {
            message: format!("Failed to move {} into place: {}", from.display(), e),
            path: to.to_path_buf(),
            source: Some(e),
        }),
    }
}
