//! Centralized configuration for the Pumas hub.
//!
//! Constants for the on-disk layout, environment variable names, remote hosts
//! and network behavior.

use std::time::Duration;

/// Hub-level configuration.
pub struct HubConfig;

impl HubConfig {
    /// Well-known manifest file exposed by hub repositories.
    pub const MODULE_HUBCONF: &'static str = "hubconf.json";
    /// Archive extension used for repository downloads.
    pub const ARCHIVE_EXTENSION: &'static str = "zip";
    /// Device index bound by accelerator scopes.
    pub const DEFAULT_DEVICE_ID: u32 = 0;
}

/// Environment variables consulted when resolving the hub home.
pub struct EnvConfig;

impl EnvConfig {
    pub const HOME_VAR: &'static str = "PUMAS_HOME";
    /// Deprecated: a warning is logged, the value is ignored.
    pub const DEPRECATED_HUB_VAR: &'static str = "PUMAS_HUB";
    pub const XDG_CACHE_HOME_VAR: &'static str = "XDG_CACHE_HOME";
}

/// Directory names for the hub cache layout.
pub struct PathsConfig;

impl PathsConfig {
    pub const DEFAULT_CACHE_DIR: &'static str = ".cache";
    pub const HOME_DIR_NAME: &'static str = "pumas";
    pub const HUB_DIR_NAME: &'static str = "hub";
    pub const CHECKPOINTS_DIR_NAME: &'static str = "checkpoints";
}

/// Remote archive hosts.
pub struct SourceConfig;

impl SourceConfig {
    pub const GITHUB_BASE: &'static str = "https://github.com";
    pub const GITEE_BASE: &'static str = "https://gitee.com";
    pub const GITHUB_DEFAULT_BRANCH: &'static str = "main";
    pub const GITEE_DEFAULT_BRANCH: &'static str = "master";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const DOWNLOAD_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
    pub const DOWNLOAD_TEMP_SUFFIX: &'static str = ".part";
    pub const USER_AGENT: &'static str = "Pumas-Hub/1.0";
}
