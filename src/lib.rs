//! portfolio: a personal portfolio and blog server
//!
//! Markdown posts with YAML frontmatter and a résumé in `data.yaml` are read
//! from an asset store (embedded in the binary by default), rendered to HTML
//! and served through swappable Tera themes.

pub mod assets;
pub mod commands;
pub mod config;
pub mod content;
pub mod data;
pub mod error;
pub mod helpers;
pub mod ping;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::sync::Arc;

use assets::{AssetStore, DirAssets, EmbeddedAssets};
use content::AssetManager;

/// The main portfolio application
#[derive(Clone)]
pub struct Portfolio {
    /// Site configuration
    pub config: config::SiteConfig,
    store: Arc<dyn AssetStore>,
}

impl Portfolio {
    /// Create a portfolio reading assets from `config.assets_dir`, or the
    /// embedded bundle when none is set
    pub fn new(config: config::SiteConfig) -> Self {
        let store: Arc<dyn AssetStore> = match &config.assets_dir {
            Some(dir) => {
                tracing::info!("Serving assets from {:?}", dir);
                Arc::new(DirAssets::new(dir))
            }
            None => Arc::new(EmbeddedAssets::new()),
        };
        Self::with_store(config, store)
    }

    /// Create a portfolio over an explicit asset store
    pub fn with_store(config: config::SiteConfig, store: Arc<dyn AssetStore>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> Arc<dyn AssetStore> {
        Arc::clone(&self.store)
    }

    /// Post and data loader over this portfolio's store
    pub fn assets(&self) -> AssetManager {
        AssetManager::new(self.store())
    }

    /// Run the web server until Ctrl+C
    pub async fn serve(&self) -> anyhow::Result<()> {
        server::start(self).await
    }
}
