//! Content module - front-matter, markdown rendering and post assembly

pub mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{MetaValue, Metadata};
pub use loader::AssetManager;
pub use markdown::MarkdownRenderer;
pub use post::{Clock, FixedClock, Post, SystemClock};
