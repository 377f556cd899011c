//! Content loader - assembles posts and résumé data from an asset store

use std::sync::Arc;

use super::{frontmatter, MarkdownRenderer, Post};
use crate::assets::AssetStore;
use crate::data::Data;
use crate::error::{Error, Result};

/// Directory holding `<slug>.md` posts
const POSTS_DIR: &str = "posts";
/// Résumé data file
const DATA_FILE: &str = "data.yaml";

/// Loads posts and site data from an asset store
///
/// Holds no mutable state; every call reads and renders afresh, so one
/// manager can be shared across request handlers.
#[derive(Clone)]
pub struct AssetManager {
    store: Arc<dyn AssetStore>,
    renderer: &'static MarkdownRenderer,
}

impl AssetManager {
    /// Create a manager over `store` using the shared markdown renderer
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self {
            store,
            renderer: MarkdownRenderer::global(),
        }
    }

    /// The underlying asset store
    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// Load, split and render the post stored at `posts/<slug>.md`
    pub fn get_post(&self, slug: &str) -> Result<Post> {
        if !is_valid_slug(slug) {
            return Err(Error::NotFound(slug.to_string()));
        }

        let path = format!("{}/{}.md", POSTS_DIR, slug);
        let raw = self.store.read(&path).map_err(|e| match Error::from(e) {
            Error::NotFound(_) => Error::NotFound(slug.to_string()),
            other => other,
        })?;
        let raw = String::from_utf8_lossy(&raw);

        let (metadata, body) = frontmatter::extract(&raw)?;
        let content = self.renderer.render(body)?;

        tracing::debug!(slug, fields = metadata.len(), "Loaded post");

        Ok(Post::new(
            slug.to_string(),
            body.to_string(),
            content,
            metadata,
        ))
    }

    /// Slugs of every post in the store, in path order
    pub fn post_slugs(&self) -> Vec<String> {
        self.store
            .list(POSTS_DIR)
            .iter()
            .filter_map(|path| {
                path.strip_prefix(POSTS_DIR)
                    .and_then(|p| p.strip_prefix('/'))
                    .and_then(|name| name.strip_suffix(".md"))
                    .map(str::to_string)
            })
            .collect()
    }

    /// Load all posts, newest first; posts that fail to load are skipped
    pub fn list_posts(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .post_slugs()
            .iter()
            .filter_map(|slug| match self.get_post(slug) {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", slug, e);
                    None
                }
            })
            .collect();

        // Sort by date descending (newest first)
        posts.sort_by_key(|post| std::cmp::Reverse(post.date()));

        posts
    }

    /// Read and decode `data.yaml`
    pub fn get_data(&self) -> Result<Data> {
        let raw = self.store.read(DATA_FILE)?;
        Data::from_yaml(&raw)
    }
}

/// A slug names a single file directly under `posts/`
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\']) && !slug.starts_with('.')
}
