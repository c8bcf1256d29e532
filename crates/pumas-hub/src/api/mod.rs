//! The public hub API.

mod builder;

pub use builder::HubBuilder;

use crate::error::Result;
use crate::hubconf::{import_hubconf, HubModule, ModuleEnv};
use crate::network::Downloader;
use crate::paths::HubPaths;
use crate::reference::Source;
use crate::repo_cache::{CacheEntry, RepoCache};
use crate::runtime::{Kwargs, Runtime};
use crate::weights::{WeightArtifact, WeightOptions, WeightResolver};
use std::path::Path;
use std::sync::Arc;

/// Entry point for resolving hub repositories and weight files.
///
/// # Example
///
/// ```rust,ignore
/// use pumas_hub::{HubBuilder, Kwargs, Source};
///
/// let hub = HubBuilder::new().build(my_runtime)?;
/// let names = hub.list("alice/models:main", Source::GitHub, false)?;
/// let model = hub.load("alice/models", "MM", Source::GitHub, false, &Kwargs::new())?;
/// ```
pub struct Hub<R: Runtime> {
    paths: HubPaths,
    downloader: Box<dyn Downloader>,
    runtime: R,
    modules: ModuleEnv,
}

impl<R: Runtime> Hub<R> {
    pub(crate) fn from_parts(paths: HubPaths, downloader: Box<dyn Downloader>, runtime: R) -> Self {
        Self {
            paths,
            downloader,
            runtime,
            modules: ModuleEnv::new(),
        }
    }

    pub fn paths(&self) -> &HubPaths {
        &self.paths
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Module search path and registry used for hub manifests.
    pub fn module_env(&self) -> &ModuleEnv {
        &self.modules
    }

    /// Resolve a repository to a directory, fetching it when needed.
    pub fn resolve_repo(&self, repo: &str, source: Source, force_reload: bool) -> Result<CacheEntry> {
        RepoCache::new(&self.paths, self.downloader.as_ref()).resolve(repo, source, force_reload)
    }

    /// Load the hub manifest of a repository.
    pub fn load_module(
        &self,
        repo: &str,
        source: Source,
        force_reload: bool,
    ) -> Result<Arc<HubModule>> {
        let entry = self.resolve_repo(repo, source, force_reload)?;
        self.load_module_from(&entry.root_dir)
    }

    /// Load the hub manifest found in `repo_dir`.
    pub fn load_module_from(&self, repo_dir: &Path) -> Result<Arc<HubModule>> {
        import_hubconf(&self.modules, repo_dir)
    }

    /// Names of all public entry points of a repository.
    pub fn list(&self, repo: &str, source: Source, force_reload: bool) -> Result<Vec<String>> {
        Ok(self.load_module(repo, source, force_reload)?.list_entry_points())
    }

    /// Documentation of an entry point, if it has any.
    pub fn help(
        &self,
        repo: &str,
        entry: &str,
        source: Source,
        force_reload: bool,
    ) -> Result<Option<String>> {
        let module = self.load_module(repo, source, force_reload)?;
        let doc = module.get_entry(entry)?.doc().map(str::to_string);
        Ok(doc)
    }

    /// Build a model through an entry point after checking dependencies.
    pub fn load(
        &self,
        repo: &str,
        entry: &str,
        source: Source,
        force_reload: bool,
        kwargs: &Kwargs,
    ) -> Result<R::Model> {
        let module = self.load_module(repo, source, force_reload)?;
        module.check_dependencies(&self.runtime)?;
        module.get_entry(entry)?.invoke(&self.runtime, kwargs)
    }

    /// Download (or reuse) a weight file and prepare it without loading.
    pub fn resolve_weights(&self, url: &str, options: &WeightOptions) -> Result<WeightArtifact> {
        WeightResolver::new(&self.paths, self.downloader.as_ref()).resolve(url, options)
    }

    /// Download (or reuse) a weight file and load it through the runtime.
    pub fn load_state_dict_from_url(&self, url: &str, options: &WeightOptions) -> Result<R::Weights> {
        self.resolve_weights(url, options)?.load(&self.runtime)
    }
}
