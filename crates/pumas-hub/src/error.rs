//! Error types for the Pumas hub.
//!
//! Every failure of reference parsing, repository caching, hub manifest loading
//! and weight resolution surfaces as a variant of [`HubError`]. Nothing is
//! retried or silently swallowed here; the only automatic recovery is the
//! idempotent cleanup performed by the installer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the hub.
#[derive(Debug, Error)]
pub enum HubError {
    // Input errors
    #[error("Malformed repository reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("Unknown source: \"{0}\". Allowed values: \"github\" | \"gitee\" | \"local\"")]
    UnsupportedSource(String),

    #[error("Unsupported device scope: \"{0}\". Allowed values: cpu | gpu | xpu | npu | numpy")]
    UnsupportedDevice(String),

    // Archive errors
    #[error("Archive error for {path}: {message}")]
    Archive {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<zip::result::ZipError>,
    },

    #[error("Corrupt weight archive {path}: {message}")]
    CorruptArchive { path: PathBuf, message: String },

    #[error("Install failed at {path}: {message}")]
    Install {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // Hub manifest errors
    #[error("Failed to import module '{module}' from {dir}: {message}")]
    ImportFailure {
        module: String,
        dir: PathBuf,
        message: String,
    },

    #[error("Cannot find callable {0} in hubconf")]
    EntryNotFound(String),

    #[error("Missing dependencies: {}", .missing.join(", "))]
    MissingDependency { missing: Vec<String> },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    #[error("Hash mismatch: expected prefix {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Errors raised by the model runtime while building or loading
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;

impl From<std::io::Error> for HubError {
    fn from(err: std::io::Error) -> Self {
        HubError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        HubError::Network {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl HubError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        HubError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create an install error with path context.
    pub fn install(err: std::io::Error, path: impl Into<PathBuf>, what: &str) -> Self {
        HubError::Install {
            message: format!("{}: {}", what, err),
            path: path.into(),
            source: Some(err),
        }
    }

    /// Create an archive error with path context.
    pub fn archive(err: zip::result::ZipError, path: impl Into<PathBuf>) -> Self {
        HubError::Archive {
            message: err.to_string(),
            path: path.into(),
            source: Some(err),
        }
    }

    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        HubError::MalformedReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}
