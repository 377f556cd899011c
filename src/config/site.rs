//! Site configuration (portfolio.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Theme used when none is configured
pub const DEFAULT_THEME: &str = "green-nebula-terminal";

/// Main site configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Server
    pub addr: String,
    pub request_timeout_secs: u64,

    // Content
    /// Serve assets from this directory instead of the embedded bundle
    pub assets_dir: Option<PathBuf>,
    /// Number of posts shown on the home page
    pub recent_posts: usize,

    // Themes
    pub default_theme: String,
    /// Themes a visitor may switch to; the default theme is always allowed
    pub themes: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 15,

            assets_dir: None,
            recent_posts: 5,

            default_theme: DEFAULT_THEME.to_string(),
            themes: vec![DEFAULT_THEME.to_string(), "paper".to_string()],
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.default_theme.is_empty() {
            return Err(Error::Config("default_theme must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Every valid theme name, default first, without duplicates
    pub fn valid_themes(&self) -> Vec<String> {
        let mut themes = vec![self.default_theme.clone()];
        for theme in &self.themes {
            if !themes.contains(theme) {
                themes.push(theme.clone());
            }
        }
        themes
    }
}
