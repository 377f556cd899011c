//! Theme templates using the Tera template engine
//!
//! Each theme ships `themes/<name>/templates/*.html` in the asset store. A
//! theme only needs to override the templates it changes; anything missing
//! is taken from the default theme.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::assets::AssetStore;
use crate::content::Post;
use crate::error::{Error, Result};
use crate::helpers;

/// Templates every theme set is built from
pub const TEMPLATE_NAMES: &[&str] = &[
    "base.html",
    "index.html",
    "posts.html",
    "post.html",
    "not_found.html",
    "partials/posts.html",
    "partials/experience.html",
    "partials/skills.html",
];

/// Loaded themes, keyed by name
pub struct ThemeManager {
    default_theme: String,
    themes: HashMap<String, Tera>,
}

impl ThemeManager {
    /// Build a Tera instance for the default theme and every other theme
    /// that has files in the store
    pub fn load(store: &dyn AssetStore, default_theme: &str, themes: &[String]) -> Result<Self> {
        let mut loaded = HashMap::new();
        loaded.insert(
            default_theme.to_string(),
            build_theme(store, default_theme, default_theme)?,
        );

        for theme in themes.iter().filter(|t| t.as_str() != default_theme) {
            let has_files = !store.list(&format!("themes/{}/templates", theme)).is_empty()
                || !store.list(&format!("themes/{}/static/css", theme)).is_empty();
            if !has_files {
                tracing::warn!("Theme {:?} has no files, skipping", theme);
                continue;
            }
            loaded.insert(theme.clone(), build_theme(store, theme, default_theme)?);
            tracing::debug!("Loaded theme {:?}", theme);
        }

        Ok(Self {
            default_theme: default_theme.to_string(),
            themes: loaded,
        })
    }

    pub fn default_theme(&self) -> &str {
        &self.default_theme
    }

    pub fn is_valid(&self, theme: &str) -> bool {
        self.themes.contains_key(theme)
    }

    /// Theme names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.themes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The requested theme if it is known, else the default
    pub fn resolve<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(theme) if self.is_valid(theme) => theme,
            _ => &self.default_theme,
        }
    }

    /// Render `template` with the given theme
    pub fn render(&self, theme: &str, template: &str, context: &Context) -> Result<String> {
        let tera = self
            .themes
            .get(theme)
            .or_else(|| self.themes.get(&self.default_theme))
            .ok_or_else(|| Error::NotFound(format!("theme {}", theme)))?;
        Ok(tera.render(template, context)?)
    }
}

fn build_theme(store: &dyn AssetStore, theme: &str, fallback: &str) -> Result<Tera> {
    let mut sources = Vec::with_capacity(TEMPLATE_NAMES.len());
    for name in TEMPLATE_NAMES {
        let own = format!("themes/{}/templates/{}", theme, name);
        let raw = match store.read(&own) {
            Ok(raw) => raw,
            Err(_) => store.read(&format!("themes/{}/templates/{}", fallback, name))?,
        };
        sources.push((*name, String::from_utf8_lossy(&raw).into_owned()));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(sources)?;
    register_filters(&mut tera);
    Ok(tera)
}

fn register_filters(tera: &mut Tera) {
    tera.register_filter("truncate_chars", truncate_chars_filter);
    tera.register_filter("format_date", format_date_filter);
    tera.register_filter("time_ago", time_ago_filter);
    tera.register_filter("humanize", humanize_filter);
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    Ok(tera::Value::String(helpers::truncate(&s, length)))
}

/// Tera filter: "2025-11-17" -> "Nov 17, 2025"
fn format_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("format_date", "value", String, value);
    Ok(tera::Value::String(helpers::format_date(&s)))
}

/// Tera filter: "2025-11-17" -> "3 months ago"
fn time_ago_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("time_ago", "value", String, value);
    Ok(tera::Value::String(helpers::time_ago(&s)))
}

/// Tera filter: "cloud_devops" -> "Cloud Devops"
fn humanize_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("humanize", "value", String, value);
    Ok(tera::Value::String(helpers::humanize(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    pub path: String,
}

impl From<&Post> for PostData {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title(),
            date: post.date().format("%Y-%m-%d").to_string(),
            description: post.description(),
            tags: post.tags(),
            path: format!("/posts/{}", post.slug),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub theme: String,
    pub themes: Vec<String>,
    pub title: String,
}
