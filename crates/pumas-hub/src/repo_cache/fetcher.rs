//! Archive URL construction and retrieval.

use crate::config::SourceConfig;
use crate::error::{HubError, Result};
use crate::network::Downloader;
use crate::reference::{RepoReference, Source};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Archive download link for a reference on a remote source.
pub fn git_archive_link(reference: &RepoReference, source: Source) -> Result<String> {
    let (owner, name, branch) = (reference.owner(), reference.name(), reference.branch());
    match source {
        Source::GitHub => Ok(format!(
            "{}/{}/{}/archive/{}.zip",
            SourceConfig::GITHUB_BASE,
            owner,
            name,
            branch
        )),
        Source::Gitee => Ok(format!(
            "{}/{}/{}/repository/archive/{}.zip",
            SourceConfig::GITEE_BASE,
            owner,
            name,
            branch
        )),
        Source::Local => Err(HubError::UnsupportedSource(source.to_string())),
    }
}

/// Download the archive for `reference` into `hub_dir`.
///
/// Always downloads: a file already sitting under the download name may
/// belong to another reference whose branch ends in the same segment.
pub fn fetch_archive(
    downloader: &dyn Downloader,
    reference: &RepoReference,
    source: Source,
    hub_dir: &Path,
) -> Result<PathBuf> {
    let url = git_archive_link(reference, source)?;
    debug!("Downloading archive {}", url);
    downloader.download(&url, hub_dir, None)
}
