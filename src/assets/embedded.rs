//! Asset bundle compiled into the binary
//!
//! Every file under `assets/` that the site serves is listed here; adding a
//! post means adding a line to `BUNDLE`.

use std::borrow::Cow;

use super::{is_direct_child, normalize_path, AssetError, AssetStore};

macro_rules! bundle {
    ($($path:literal),* $(,)?) => {
        &[$(
            ($path, include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/", $path)) as &[u8]),
        )*]
    };
}

static BUNDLE: &[(&str, &[u8])] = bundle![
    "data.yaml",
    "posts/first-post.md",
    "posts/rust-rewrite.md",
    "posts/htmx-notes.md",
    "themes/green-nebula-terminal/templates/base.html",
    "themes/green-nebula-terminal/templates/index.html",
    "themes/green-nebula-terminal/templates/posts.html",
    "themes/green-nebula-terminal/templates/post.html",
    "themes/green-nebula-terminal/templates/not_found.html",
    "themes/green-nebula-terminal/templates/partials/posts.html",
    "themes/green-nebula-terminal/templates/partials/experience.html",
    "themes/green-nebula-terminal/templates/partials/skills.html",
    "themes/green-nebula-terminal/static/css/style.css",
    "themes/green-nebula-terminal/static/js/terminal.js",
    "themes/paper/templates/base.html",
    "themes/paper/static/css/style.css",
];

/// The asset bundle shipped inside the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl EmbeddedAssets {
    pub fn new() -> Self {
        Self
    }

    /// All embedded paths, in bundle order
    pub fn paths(&self) -> impl Iterator<Item = &'static str> {
        BUNDLE.iter().map(|(path, _)| *path)
    }
}

impl AssetStore for EmbeddedAssets {
    fn read(&self, path: &str) -> Result<Cow<'static, [u8]>, AssetError> {
        let path = normalize_path(path)?;
        BUNDLE
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, bytes)| Cow::Borrowed(*bytes))
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let mut files: Vec<String> = self
            .paths()
            .filter(|path| is_direct_child(dir, path))
            .map(str::to_string)
            .collect();
        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_posts_listed() {
        let store = EmbeddedAssets::new();
        let posts = store.list("posts");
        assert!(posts.contains(&"posts/first-post.md".to_string()));
        assert!(posts.iter().all(|p| p.ends_with(".md")));
    }

    #[test]
    fn test_embedded_read() {
        let store = EmbeddedAssets::new();
        let data = store.read("data.yaml").unwrap();
        assert!(!data.is_empty());
        assert!(matches!(
            store.read("posts/.md"),
            Err(AssetError::NotFound(_))
        ));
    }
}
