//! Helper functions for templates
//!
//! Plain functions used by the Tera filters registered in `templates`, kept
//! free of Tera types so they can be tested and reused directly.

mod date;
mod text;

pub use date::*;
pub use text::*;
