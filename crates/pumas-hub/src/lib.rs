//! Pumas Hub - remote repository and weight artifact cache.
//!
//! Resolves `owner/name[:branch]` references on GitHub or Gitee to cached
//! directories under the hub home, exposes the entry points declared by each
//! repository's `hubconf.json`, and downloads weight files, unwrapping legacy
//! single-file zips before handing them to the model runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use pumas_hub::{HubBuilder, Source, WeightOptions};
//!
//! fn main() -> pumas_hub::Result<()> {
//!     let hub = HubBuilder::new().build(MyRuntime::default())?;
//!
//!     for name in hub.list("alice/models:main", Source::GitHub, false)? {
//!         println!("{name}");
//!     }
//!
//!     let weights = hub.load_state_dict_from_url(
//!         "https://example.com/models/resnet18.pdparams",
//!         &WeightOptions::new(),
//!     )?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod hashing;
pub mod hubconf;
pub mod network;
pub mod paths;
pub mod reference;
pub mod repo_cache;
pub mod runtime;
pub mod weights;

mod api;

// Re-export commonly used types
pub use api::{Hub, HubBuilder};
pub use error::{HubError, Result};
pub use hubconf::{EntryPoint, HubModule, ModuleEnv};
pub use network::{Downloader, HttpDownloader};
pub use paths::HubPaths;
pub use reference::{RepoReference, Source};
pub use repo_cache::CacheEntry;
pub use runtime::{Kwargs, Runtime};
pub use weights::{DeviceGuard, DeviceScope, WeightArtifact, WeightEncoding, WeightOptions};
