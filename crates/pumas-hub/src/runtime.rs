//! The model runtime seen by the hub.
//!
//! Building models, loading weight files and selecting the compute device all
//! belong to the runtime. The hub only decides *what* to build or load and in
//! which device scope.

use crate::error::Result;
use std::path::Path;

/// Keyword arguments passed to an entry point.
pub type Kwargs = serde_json::Map<String, serde_json::Value>;

/// Tensor/model runtime used by [`crate::Hub`].
pub trait Runtime {
    /// Object produced by invoking an entry point.
    type Model;
    /// Object produced by loading a weight file.
    type Weights;

    /// Side-effect-free check that a package the hub code depends on is
    /// available.
    fn has_package(&self, name: &str) -> bool;

    /// Invoke the builder named by an entry point.
    fn build(&self, builder: &str, kwargs: &Kwargs) -> Result<Self::Model>;

    /// Device currently selected, e.g. `cpu` or `gpu:0`.
    fn current_device(&self) -> String;

    /// Select the device used by subsequent loads.
    fn set_device(&self, device: &str) -> Result<()>;

    /// Load a weight file. With `return_numpy` no device binding applies.
    fn load_weights(&self, path: &Path, return_numpy: bool) -> Result<Self::Weights>;
}
