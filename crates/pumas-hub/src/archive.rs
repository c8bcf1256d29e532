//! Zip archive helpers shared by the repository installer and the weight
//! resolver.
//!
//! Archive format problems map to [`HubError::Archive`]; filesystem problems
//! while writing extracted files map to [`HubError::Install`].

use crate::error::{HubError, Result};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

/// Open a zip archive from disk.
pub fn open_zip(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| HubError::Io {
        message: format!("Failed to open zip archive: {}", e),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })?;
    ZipArchive::new(file).map_err(|e| HubError::archive(e, path))
}

/// Name of the archive's top-level folder, taken from its first entry.
pub fn root_folder_name<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &Path) -> Result<String> {
    if archive.len() == 0 {
        return Err(HubError::Archive {
            path: path.to_path_buf(),
            message: "archive is empty".to_string(),
            source: None,
        });
    }

    let first = archive.by_index(0).map_err(|e| HubError::archive(e, path))?;
    let root = first
        .enclosed_name()
        .and_then(|name| match name.components().next() {
            Some(Component::Normal(root)) => root.to_str().map(str::to_string),
            _ => None,
        });

    root.ok_or_else(|| HubError::Archive {
        path: path.to_path_buf(),
        message: format!("first entry '{}' does not name a root folder", first.name()),
        source: None,
    })
}

/// Extract every entry of `archive` under `dest_dir`.
///
/// Entries whose names would escape `dest_dir` are skipped.
pub fn extract_all<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut extracted = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| HubError::archive(e, archive_path))?;

        let outpath = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| HubError::install(e, &outpath, "Failed to create directory"))?;
        } else {
            if let Some(parent) = outpath.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        HubError::install(e, parent, "Failed to create parent directory")
                    })?;
                }
            }

            let mut outfile = File::create(&outpath)
                .map_err(|e| HubError::install(e, &outpath, "Failed to create file"))?;

            std::io::copy(&mut entry, &mut outfile).map_err(|e| {
                // Decompression failures surface as io errors from the entry reader.
                if e.kind() == std::io::ErrorKind::InvalidData {
                    HubError::Archive {
                        path: archive_path.to_path_buf(),
                        message: format!("Failed to decompress '{}': {}", entry.name(), e),
                        source: None,
                    }
                } else {
                    HubError::install(e, &outpath, "Failed to extract file")
                }
            })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }

        extracted.push(outpath);
    }

    Ok(extracted)
}

/// Remove a file or directory tree; a missing path is success.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(HubError::install(e, path, "Failed to inspect path")),
    };

    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HubError::install(e, path, "Failed to remove")),
    }
}
