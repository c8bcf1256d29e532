//! Scoped loading of hub modules.
//!
//! A [`ModuleEnv`] holds an ordered module search path and a registry of
//! loaded modules. [`ModuleEnv::import_from`] prepends a repository directory
//! to the search path, imports a module by name, and removes both the
//! search-path entry and the registry entry before returning, whether the
//! import succeeded or not. Repeated loads therefore always read the manifest
//! from disk again.

use super::module::HubModule;
use super::schema::HubManifest;
use crate::error::{HubError, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const MANIFEST_EXTENSION: &str = "json";

#[derive(Debug, Default)]
struct EnvState {
    search_path: Vec<PathBuf>,
    modules: HashMap<String, Arc<HubModule>>,
}

/// Module search path and registry.
#[derive(Debug, Default)]
pub struct ModuleEnv {
    state: Mutex<EnvState>,
}

impl ModuleEnv {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, EnvState> {
        // The state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current search path.
    pub fn search_path(&self) -> Vec<PathBuf> {
        self.state().search_path.clone()
    }

    /// Whether a module is currently registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.state().modules.contains_key(name)
    }

    /// Import `name` with `dir` temporarily at the front of the search path.
    pub fn import_from(&self, name: &str, dir: &Path) -> Result<Arc<HubModule>> {
        let _guard = SearchPathGuard::acquire(self, name, dir);
        self.import(name).map_err(|e| match e {
            HubError::ImportFailure { .. } => e,
            other => HubError::ImportFailure {
                module: name.to_string(),
                dir: dir.to_path_buf(),
                message: other.to_string(),
            },
        })
    }

    /// Resolve `name` through the search path and register the result.
    ///
    /// The registry is never consulted: an overlapping import may have
    /// registered the same name from another directory.
    fn import(&self, name: &str) -> Result<Arc<HubModule>> {
        let search_path = self.search_path();

        let file_name = format!("{}.{}", name, MANIFEST_EXTENSION);
        let origin = search_path
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| HubError::ImportFailure {
                module: name.to_string(),
                dir: search_path.first().cloned().unwrap_or_default(),
                message: format!(
                    "No module named '{}'. Please make sure {} exists in the repository",
                    name, file_name
                ),
            })?;

        let module = Arc::new(load_manifest(name, &origin)?);
        debug!("Imported module '{}' from {}", name, origin.display());
        self.state()
            .modules
            .insert(name.to_string(), Arc::clone(&module));
        Ok(module)
    }
}

fn load_manifest(name: &str, origin: &Path) -> Result<HubModule> {
    let content =
        std::fs::read_to_string(origin).map_err(|e| HubError::io_with_path(e, origin))?;
    let manifest: HubManifest = serde_json::from_str(&content).map_err(|e| HubError::Json {
        message: format!("Failed to parse {}: {}", origin.display(), e),
        source: Some(e),
    })?;

    let duplicate = {
        let mut seen = HashSet::new();
        manifest
            .namespace
            .iter()
            .find(|attr| !seen.insert(attr.name.as_str()))
            .map(|attr| attr.name.clone())
    };
    if let Some(duplicate) = duplicate {
        return Err(HubError::Config {
            message: format!(
                "Attribute '{}' declared twice in {}",
                duplicate,
                origin.display()
            ),
        });
    }

    Ok(HubModule::new(name, origin.to_path_buf(), manifest))
}

/// Search-path entry held for the duration of one import.
struct SearchPathGuard<'a> {
    env: &'a ModuleEnv,
    module: String,
    dir: PathBuf,
}

impl<'a> SearchPathGuard<'a> {
    fn acquire(env: &'a ModuleEnv, module: &str, dir: &Path) -> Self {
        env.state().search_path.insert(0, dir.to_path_buf());
        Self {
            env,
            module: module.to_string(),
            dir: dir.to_path_buf(),
        }
    }
}

impl Drop for SearchPathGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.env.state();
        if let Some(pos) = state.search_path.iter().position(|p| *p == self.dir) {
            state.search_path.remove(pos);
        }
        state.modules.remove(&self.module);
    }
}
