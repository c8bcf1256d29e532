//! Hub manifests: the entry points a cached repository exposes.
//!
//! Repositories describe their callables in a `hubconf.json` manifest instead
//! of executable code. Each callable names a builder that the
//! [`Runtime`](crate::Runtime) knows how to run.

mod loader;
mod module;
mod schema;

pub use loader::ModuleEnv;
pub use module::{EntryPoint, HubModule};
pub use schema::{Attribute, AttributeKind, EntrySpec, HubManifest};

use crate::config::HubConfig;
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Module name of the well-known manifest (`hubconf`).
pub fn hubconf_module_name() -> &'static str {
    HubConfig::MODULE_HUBCONF
        .split('.')
        .next()
        .unwrap_or(HubConfig::MODULE_HUBCONF)
}

/// Load the `hubconf` module of a repository directory.
pub fn import_hubconf(env: &ModuleEnv, repo_dir: &Path) -> Result<Arc<HubModule>> {
    env.import_from(hubconf_module_name(), repo_dir)
}
