//! Loaded hub modules and their entry points.

use super::schema::{AttributeKind, EntrySpec, HubManifest};
use crate::error::{HubError, Result};
use crate::runtime::{Kwargs, Runtime};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A hub module loaded from a repository directory.
///
/// The module is a mapping from names to attributes, kept in declaration
/// order.
#[derive(Debug, Clone)]
pub struct HubModule {
    name: String,
    origin: PathBuf,
    manifest: HubManifest,
}

impl HubModule {
    pub(crate) fn new(name: impl Into<String>, origin: PathBuf, manifest: HubManifest) -> Self {
        Self {
            name: name.into(),
            origin,
            manifest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the module was loaded from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Declared required packages, if any.
    pub fn dependencies(&self) -> Option<&[String]> {
        self.manifest.dependencies.as_deref()
    }

    /// Names of public callable attributes, in declaration order.
    pub fn list_entry_points(&self) -> Vec<String> {
        self.manifest
            .namespace
            .iter()
            .filter(|attr| matches!(attr.kind, AttributeKind::Entry(_)))
            .filter(|attr| !attr.name.starts_with('_'))
            .map(|attr| attr.name.clone())
            .collect()
    }

    /// Look up a callable attribute.
    pub fn get_entry(&self, name: &str) -> Result<EntryPoint<'_>> {
        self.manifest
            .namespace
            .iter()
            .find(|attr| attr.name == name)
            .and_then(|attr| match &attr.kind {
                AttributeKind::Entry(spec) => Some(EntryPoint {
                    name: &attr.name,
                    spec,
                }),
                AttributeKind::Value(_) => None,
            })
            .ok_or_else(|| HubError::EntryNotFound(name.to_string()))
    }

    /// Probe every declared dependency and fail naming all missing ones.
    pub fn check_dependencies<R: Runtime + ?Sized>(&self, runtime: &R) -> Result<()> {
        let Some(dependencies) = self.dependencies() else {
            return Ok(());
        };

        let missing: Vec<String> = dependencies
            .iter()
            .filter(|pkg| !runtime.has_package(pkg))
            .cloned()
            .collect();

        if missing.is_empty() {
            debug!("All {} dependencies of {} available", dependencies.len(), self.name);
            Ok(())
        } else {
            Err(HubError::MissingDependency { missing })
        }
    }
}

/// A callable attribute of a [`HubModule`].
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint<'m> {
    name: &'m str,
    spec: &'m EntrySpec,
}

impl<'m> EntryPoint<'m> {
    pub fn name(&self) -> &'m str {
        self.name
    }

    pub fn builder(&self) -> &'m str {
        &self.spec.builder
    }

    pub fn doc(&self) -> Option<&'m str> {
        self.spec.doc.as_deref()
    }

    /// Declared defaults overlaid with `kwargs`.
    pub fn merged_kwargs(&self, kwargs: &Kwargs) -> Kwargs {
        let mut merged = self.spec.defaults.clone();
        for (key, value) in kwargs {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Call the entry point through the runtime.
    pub fn invoke<R: Runtime + ?Sized>(&self, runtime: &R, kwargs: &Kwargs) -> Result<R::Model> {
        let merged = self.merged_kwargs(kwargs);
        debug!("Invoking entry '{}' via builder '{}'", self.name, self.spec.builder);
        runtime.build(&self.spec.builder, &merged)
    }
}
