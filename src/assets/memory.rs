//! In-memory asset store

use std::borrow::Cow;
use std::collections::BTreeMap;

use super::{is_direct_child, normalize_path, AssetError, AssetStore};

/// Asset store backed by a map, handy for tests and for embedders that
/// assemble content at runtime
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, builder style
    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files
            .insert(path.trim_start_matches('/').to_string(), contents.into());
    }
}

impl AssetStore for MemoryAssets {
    fn read(&self, path: &str) -> Result<Cow<'static, [u8]>, AssetError> {
        let path = normalize_path(path)?;
        self.files
            .get(path)
            .map(|bytes| Cow::Owned(bytes.clone()))
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn list(&self, dir: &str) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| is_direct_child(dir, path))
            .cloned()
            .collect()
    }
}
