//! Asset store - read-only byte storage addressed by logical path
//!
//! Posts live under `posts/<slug>.md`, résumé data in `data.yaml` and theme
//! files under `themes/<name>/`. The store backing can be the bundle compiled
//! into the binary, a directory on disk, or an in-memory map.

mod dir;
mod embedded;
mod memory;

use std::borrow::Cow;
use thiserror::Error;

pub use dir::DirAssets;
pub use embedded::EmbeddedAssets;
pub use memory::MemoryAssets;

/// Errors returned by an asset store
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("invalid asset path: {0}")]
    InvalidPath(String),

    #[error("failed to read asset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A read-only store of files addressed by slash-separated logical paths
pub trait AssetStore: Send + Sync {
    /// Read the full contents of the file at `path`
    fn read(&self, path: &str) -> Result<Cow<'static, [u8]>, AssetError>;

    /// List the files directly under the logical directory `dir`, sorted
    fn list(&self, dir: &str) -> Vec<String>;

    /// Whether a file exists at `path`
    fn exists(&self, path: &str) -> bool {
        self.read(path).is_ok()
    }
}

/// Validate a logical path and return it without a leading slash
///
/// Empty paths, `..` and `.` components and backslashes are rejected so that a
/// path can never escape the root of a directory-backed store.
pub(crate) fn normalize_path(path: &str) -> Result<&str, AssetError> {
    let trimmed = path.trim_start_matches('/');
    let invalid = trimmed.is_empty()
        || trimmed.contains('\\')
        || trimmed
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");

    if invalid {
        return Err(AssetError::InvalidPath(path.to_string()));
    }
    Ok(trimmed)
}

/// Whether `path` sits directly inside `dir` (not in a subdirectory of it)
pub(crate) fn is_direct_child(dir: &str, path: &str) -> bool {
    let dir = dir.trim_matches('/');
    let rest = if dir.is_empty() {
        Some(path)
    } else {
        path.strip_prefix(dir).and_then(|r| r.strip_prefix('/'))
    };
    matches!(rest, Some(name) if !name.is_empty() && !name.contains('/'))
}
