//! SHA256 hashing for downloaded artifacts.
//!
//! Weight files may carry a hash prefix in their name
//! (`name-<sha256 prefix>.ext`); downloads requested with verification are
//! checked against that prefix before they are moved into place.

use crate::error::{HubError, Result};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

/// Chunk size for reading files.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Compute the SHA256 of a file as a lowercase hex string.
pub fn compute_sha256(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path).map_err(|e| HubError::io_with_path(e, path))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| HubError::io_with_path(e, path))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check that the file's SHA256 starts with `expected_prefix`.
pub fn verify_sha256_prefix(path: impl AsRef<Path>, expected_prefix: &str) -> Result<()> {
    let actual = compute_sha256(path)?;
    let expected = expected_prefix.to_lowercase();
    if actual.starts_with(&expected) {
        Ok(())
    } else {
        Err(HubError::HashMismatch {
            expected,
            actual,
        })
    }
}

/// Extract the hash prefix from a file name of the form `name-<hex>.ext`.
///
/// The prefix must be at least eight hex digits.
pub fn hash_prefix_from_filename(filename: &str) -> Option<String> {
    static HASH_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = HASH_REGEX.get_or_init(|| {
        Regex::new(r"-([a-fA-F0-9]{8,})\.").expect("hash prefix pattern is valid")
    });
    re.captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}
