//! Hub manifest schema.
//!
//! A hub repository exposes its entry points through a `hubconf.json` file at
//! its root:
//!
//! ```json
//! {
//!   "doc": "Demo models",
//!   "dependencies": ["vision"],
//!   "namespace": [
//!     { "name": "resnet18", "entry": { "builder": "vision.resnet18", "doc": "ResNet-18" } },
//!     { "name": "_helper", "entry": { "builder": "vision.helper" } },
//!     { "name": "VERSION", "value": "1.0" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Parsed contents of a hub manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubManifest {
    /// Module-level documentation.
    #[serde(default)]
    pub doc: Option<String>,
    /// Packages that must be available before any entry point is invoked.
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
    /// Attributes in declaration order.
    #[serde(default)]
    pub namespace: Vec<Attribute>,
}

/// One named attribute of a hub module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(flatten)]
    pub kind: AttributeKind,
}

/// What an attribute holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// A callable entry point.
    Entry(EntrySpec),
    /// Any other value; never callable.
    Value(serde_json::Value),
}

/// Declaration of a callable entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySpec {
    /// Runtime builder invoked by this entry point.
    pub builder: String,
    #[serde(default)]
    pub doc: Option<String>,
    /// Keyword arguments applied before the caller's.
    #[serde(default)]
    pub defaults: serde_json::Map<String, serde_json::Value>,
}
