//! Weight file encodings.
//!
//! Legacy weight files are zip archives wrapping exactly one file. Anything
//! else, including archives with directories or several members, is loaded
//! as is.

use crate::archive::{extract_all, open_zip, remove_if_exists};
use crate::error::{HubError, Result};
use crate::paths::make_dirs;
use std::path::{Path, PathBuf};
use tracing::warn;
use zip::ZipArchive;

/// Detected encoding of a weight file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightEncoding {
    /// Zip with a single non-directory member; extracted before loading.
    LegacySingleFileZip,
    /// Loaded directly.
    Current,
}

/// Detect the encoding of the file at `path`.
pub fn detect_encoding(path: &Path) -> Result<WeightEncoding> {
    let file = std::fs::File::open(path).map_err(|e| HubError::io_with_path(e, path))?;
    let Ok(mut archive) = ZipArchive::new(file) else {
        return Ok(WeightEncoding::Current);
    };

    let single_file = archive.len() == 1
        && archive
            .by_index_raw(0)
            .map(|entry| !entry.is_dir())
            .unwrap_or(false);

    Ok(if single_file {
        WeightEncoding::LegacySingleFileZip
    } else {
        WeightEncoding::Current
    })
}

/// Extract the single member of a legacy archive into `model_dir`.
///
/// The member is written into a staging directory first and renamed into
/// place once the archive is closed, so a member named like the archive
/// itself replaces it instead of truncating it mid-read.
///
/// Returns the path of the extracted file.
pub fn extract_legacy(path: &Path, model_dir: &Path) -> Result<PathBuf> {
    let staging = model_dir.join(format!(
        ".{}.{}.extract",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        std::process::id()
    ));
    remove_if_exists(&staging)?;

    let result = extract_staged(path, &staging).and_then(|relative| {
        let dest = model_dir.join(&relative);
        if let Some(parent) = dest.parent() {
            make_dirs(parent)?;
        }
        std::fs::rename(staging.join(&relative), &dest)
            .map_err(|e| HubError::install(e, &dest, "Failed to move extracted weights"))?;
        Ok(dest)
    });

    if let Err(e) = remove_if_exists(&staging) {
        warn!("Failed to clean up {}: {}", staging.display(), e);
    }
    result
}

/// Extract the single member of `path` under `staging`, returning the
/// member's path relative to `staging`.
fn extract_staged(path: &Path, staging: &Path) -> Result<PathBuf> {
    let mut archive = open_zip(path)?;

    let single_file = archive.len() == 1
        && archive
            .by_index_raw(0)
            .map(|entry| !entry.is_dir())
            .map_err(|e| HubError::archive(e, path))?;
    if !single_file {
        return Err(HubError::CorruptArchive {
            path: path.to_path_buf(),
            message: "Only one file (not dir) is allowed in the zipfile".to_string(),
        });
    }

    make_dirs(staging)?;
    let extracted = extract_all(&mut archive, path, staging)?
        .pop()
        .ok_or_else(|| HubError::CorruptArchive {
            path: path.to_path_buf(),
            message: "member name escapes the target directory".to_string(),
        })?;

    extracted
        .strip_prefix(staging)
        .map(Path::to_path_buf)
        .map_err(|_| HubError::CorruptArchive {
            path: path.to_path_buf(),
            message: format!("unexpected member path {}", extracted.display()),
        })
}
