//! Weight file resolution and loading.
//!
//! A weight URL resolves to a file under the checkpoints directory (or a
//! caller-chosen directory). The file is downloaded only when absent. Legacy
//! single-file zips are extracted next to it before loading.

mod device;
mod format;

pub use device::{DeviceGuard, DeviceScope};
pub use format::{detect_encoding, extract_legacy, WeightEncoding};

use crate::error::{HubError, Result};
use crate::hashing::hash_prefix_from_filename;
use crate::network::{file_name_from_url, Downloader};
use crate::paths::{make_dirs, HubPaths};
use crate::runtime::Runtime;
use std::path::PathBuf;
use tracing::{debug, info};

/// Options for [`WeightResolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct WeightOptions {
    /// Target directory; defaults to `{hub}/checkpoints`.
    pub model_dir: Option<PathBuf>,
    /// Verify the download against the `-<sha256 prefix>` in its file name.
    pub check_hash: bool,
    /// File name to store under instead of the URL's last path segment.
    pub file_name: Option<String>,
    pub device_scope: Option<DeviceScope>,
}

impl WeightOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(dir.into());
        self
    }

    pub fn check_hash(mut self, enable: bool) -> Self {
        self.check_hash = enable;
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn device_scope(mut self, scope: DeviceScope) -> Self {
        self.device_scope = Some(scope);
        self
    }
}

/// A weight file ready to be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightArtifact {
    /// The cached (downloaded) file.
    pub file_path: PathBuf,
    /// The file handed to the runtime; the extracted member for legacy zips.
    pub load_path: PathBuf,
    pub encoding: WeightEncoding,
    pub device_scope: Option<DeviceScope>,
}

impl WeightArtifact {
    /// Load through `runtime`, inside the requested device scope.
    pub fn load<R: Runtime + ?Sized>(&self, runtime: &R) -> Result<R::Weights> {
        match self.device_scope {
            None => runtime.load_weights(&self.load_path, false),
            Some(DeviceScope::Numpy) => runtime.load_weights(&self.load_path, true),
            Some(scope) => {
                let device = scope.device().unwrap_or_else(|| scope.to_string());
                let _guard = DeviceGuard::enter(runtime, &device)?;
                runtime.load_weights(&self.load_path, false)
            }
        }
    }
}

/// Resolves weight URLs to local files.
pub struct WeightResolver<'a> {
    paths: &'a HubPaths,
    downloader: &'a dyn Downloader,
}

impl<'a> WeightResolver<'a> {
    pub fn new(paths: &'a HubPaths, downloader: &'a dyn Downloader) -> Self {
        Self { paths, downloader }
    }

    /// Download `url` if needed and prepare it for loading.
    pub fn resolve(&self, url: &str, options: &WeightOptions) -> Result<WeightArtifact> {
        let model_dir = options
            .model_dir
            .clone()
            .unwrap_or_else(|| self.paths.checkpoints_dir());
        make_dirs(&model_dir)?;

        let url_file_name = file_name_from_url(url)?;
        let file_name = options.file_name.clone().unwrap_or_else(|| url_file_name.clone());
        let cached_file = model_dir.join(&file_name);

        if cached_file.exists() {
            debug!("Using cached weights {}", cached_file.display());
        } else {
            info!("Downloading: \"{}\" to {}", url, cached_file.display());
            let hash_prefix = if options.check_hash {
                Some(hash_prefix_from_filename(&url_file_name).ok_or_else(|| {
                    HubError::Config {
                        message: format!(
                            "Cannot verify '{}': file name must look like name-<sha256>.ext",
                            url_file_name
                        ),
                    }
                })?)
            } else {
                None
            };

            let downloaded = self
                .downloader
                .download(url, &model_dir, hash_prefix.as_deref())?;
            if downloaded != cached_file {
                std::fs::rename(&downloaded, &cached_file)
                    .map_err(|e| HubError::io_with_path(e, &cached_file))?;
            }
        }

        let encoding = detect_encoding(&cached_file)?;
        let load_path = match encoding {
            WeightEncoding::LegacySingleFileZip => extract_legacy(&cached_file, &model_dir)?,
            WeightEncoding::Current => cached_file.clone(),
        };

        Ok(WeightArtifact {
            file_path: cached_file,
            load_path,
            encoding,
            device_scope: options.device_scope,
        })
    }
}
