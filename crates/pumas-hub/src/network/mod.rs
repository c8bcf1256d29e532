//! Artifact transport.
//!
//! The hub never talks HTTP directly: every transfer goes through a
//! [`Downloader`]. [`HttpDownloader`] is the default blocking implementation.

mod download;

pub use download::HttpDownloader;

use crate::error::{HubError, Result};
use std::path::{Path, PathBuf};

/// Fetches a URL to a file on disk.
pub trait Downloader: Send + Sync {
    /// Download `url` into `dest_dir`, naming the file after the last URL path
    /// segment, and return the path of the downloaded file.
    ///
    /// When `hash_prefix` is given the downloaded content must have a SHA256
    /// starting with it.
    fn download(&self, url: &str, dest_dir: &Path, hash_prefix: Option<&str>) -> Result<PathBuf>;
}

impl<D: Downloader + ?Sized> Downloader for std::sync::Arc<D> {
    fn download(&self, url: &str, dest_dir: &Path, hash_prefix: Option<&str>) -> Result<PathBuf> {
        (**self).download(url, dest_dir, hash_prefix)
    }
}

/// Last path segment of a URL, ignoring query and fragment.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).map_err(|e| HubError::Config {
        message: format!("Invalid URL '{}': {}", url, e),
    })?;
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| HubError::Config {
            message: format!("URL '{}' has no file name", url),
        })
}
