//! Directory-backed asset store, used while editing content locally

use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{normalize_path, AssetError, AssetStore};

/// Serves assets from a directory laid out like the embedded bundle
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for DirAssets {
    fn read(&self, path: &str) -> Result<Cow<'static, [u8]>, AssetError> {
        let logical = normalize_path(path)?;
        let full = self.root.join(logical);

        match fs::read(&full) {
            Ok(bytes) => Ok(Cow::Owned(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AssetError::NotFound(logical.to_string()))
            }
            // Reading a directory is a miss, not a fault
            Err(_) if full.is_dir() => Err(AssetError::NotFound(logical.to_string())),
            Err(e) => Err(AssetError::Io {
                path: logical.to_string(),
                source: e,
            }),
        }
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let dir = dir.trim_matches('/');
        let base = if dir.is_empty() {
            self.root.clone()
        } else {
            match normalize_path(dir) {
                Ok(dir) => self.root.join(dir),
                Err(_) => return Vec::new(),
            }
        };

        let mut files: Vec<String> = WalkDir::new(&base)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .map(|name| {
                if dir.is_empty() {
                    name
                } else {
                    format!("{}/{}", dir, name)
                }
            })
            .collect();
        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_assets() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("posts/nested")).unwrap();
        fs::write(tmp.path().join("posts/hello.md"), "# Hello").unwrap();
        fs::write(tmp.path().join("posts/nested/deep.md"), "deep").unwrap();
        fs::write(tmp.path().join("data.yaml"), "name: Test").unwrap();

        let store = DirAssets::new(tmp.path());
        assert_eq!(&*store.read("posts/hello.md").unwrap(), b"# Hello");
        assert_eq!(store.list("posts"), vec!["posts/hello.md"]);
        assert_eq!(store.list(""), vec!["data.yaml"]);
        assert!(matches!(
            store.read("posts/none.md"),
            Err(AssetError::NotFound(_))
        ));
        assert!(matches!(
            store.read("posts"),
            Err(AssetError::NotFound(_))
        ));
        assert!(matches!(
            store.read("../outside"),
            Err(AssetError::InvalidPath(_))
        ));
    }
}
