//! Blocking HTTP downloader.
//!
//! Downloads stream into a `.part` file next to the destination and are
//! renamed into place only after the transfer (and optional hash check)
//! succeeds, so an interrupted download never leaves a file under the final
//! name.

use super::{file_name_from_url, Downloader};
use crate::config::NetworkConfig;
use crate::hashing::verify_sha256_prefix;
use crate::paths::make_dirs;
use crate::{HubError, Result};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Downloader backed by a blocking `reqwest` client.
pub struct HttpDownloader {
    client: Client,
    temp_suffix: String,
}

impl HttpDownloader {
    /// Create a downloader with the default timeouts.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::DOWNLOAD_REQUEST_TIMEOUT)
    }

    /// Create a downloader with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| HubError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            client,
            temp_suffix: NetworkConfig::DOWNLOAD_TEMP_SUFFIX.to_string(),
        })
    }

    fn do_download(&self, url: &str, temp_path: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().map_err(|e| HubError::Network {
            message: format!("GET {} failed: {}", url, e),
            source: Some(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HubError::DownloadFailed {
                url: url.to_string(),
                message: format!("Download failed with status {}", status),
            });
        }

        let mut file = File::create(temp_path).map_err(|e| HubError::Io {
            message: format!("Failed to create temp file: {}", e),
            path: Some(temp_path.to_path_buf()),
            source: Some(e),
        })?;

        let bytes = response.copy_to(&mut file).map_err(|e| HubError::Network {
            message: format!("Error reading download stream: {}", e),
            source: Some(e),
        })?;

        file.flush().map_err(|e| HubError::Io {
            message: format!("Failed to flush temp file: {}", e),
            path: Some(temp_path.to_path_buf()),
            source: Some(e),
        })?;

        Ok(bytes)
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest_dir: &Path, hash_prefix: Option<&str>) -> Result<PathBuf> {
        make_dirs(dest_dir)?;
        let destination = dest_dir.join(file_name_from_url(url)?);
        let temp_path = PathBuf::from(format!("{}{}", destination.display(), self.temp_suffix));

        debug!("Downloading {} to {}", url, temp_path.display());
        let result = self.do_download(url, &temp_path).and_then(|bytes| {
            if let Some(prefix) = hash_prefix {
                verify_sha256_prefix(&temp_path, prefix)?;
            }
            Ok(bytes)
        });

        match result {
            Ok(bytes) => {
                std::fs::rename(&temp_path, &destination).map_err(|e| {
                    let _ = std::fs::remove_file(&temp_path);
                    HubError::Io {
                        message: format!("Failed to move download to final destination: {}", e),
                        path: Some(destination.clone()),
                        source: Some(e),
                    }
                })?;

                info!("Downloaded {} bytes to {}", bytes, destination.display());
                Ok(destination)
            }
            Err(e) => {
                let _ = std::fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}
