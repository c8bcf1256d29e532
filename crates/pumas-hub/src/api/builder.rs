//! Builder for configuring Hub initialization.

use std::path::PathBuf;

use crate::error::Result;
use crate::network::{Downloader, HttpDownloader};
use crate::paths::HubPaths;
use crate::runtime::Runtime;
use crate::Hub;
use tracing::info;

/// Builder for configuring [`Hub`] initialization.
///
/// # Example
///
/// ```rust,ignore
/// use pumas_hub::HubBuilder;
///
/// let hub = HubBuilder::new()
///     .home("./pumas-home")
///     .auto_create_dirs(true)
///     .build(runtime)?;
/// ```
#[derive(Default)]
pub struct HubBuilder {
    home: Option<PathBuf>,
    downloader: Option<Box<dyn Downloader>>,
    auto_create_dirs: bool,
}

impl HubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit home directory instead of resolving it from the
    /// environment.
    pub fn home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Replace the default HTTP downloader.
    pub fn downloader(mut self, downloader: impl Downloader + 'static) -> Self {
        self.downloader = Some(Box::new(downloader));
        self
    }

    /// Create `{home}/hub` at build time rather than on first use.
    ///
    /// Default: `false`
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Build the hub around `runtime`.
    pub fn build<R: Runtime>(self, runtime: R) -> Result<Hub<R>> {
        let paths = match self.home {
            Some(home) => HubPaths::new(home),
            None => HubPaths::from_env()?,
        };

        if self.auto_create_dirs {
            paths.ensure_hub_dir()?;
        }

        let downloader = match self.downloader {
            Some(downloader) => downloader,
            None => Box::new(HttpDownloader::new()?),
        };

        info!("Hub home: {}", paths.home().display());
        Ok(Hub::from_parts(paths, downloader, runtime))
    }
}
