//! Print a single post

use anyhow::{Context, Result};
use std::io::Write;

use crate::Portfolio;

pub fn run(portfolio: &Portfolio, slug: &str, raw: bool) -> Result<()> {
    let stdout = std::io::stdout();
    write_post(portfolio, slug, raw, &mut stdout.lock())
}

/// Write the post's fields followed by its HTML (or markdown with `raw`)
pub fn write_post<W: Write>(portfolio: &Portfolio, slug: &str, raw: bool, out: &mut W) -> Result<()> {
    let post = portfolio
        .assets()
        .get_post(slug)
        .with_context(|| format!("Failed to load post {:?}", slug))?;

    writeln!(out, "Title:       {}", post.title())?;
    writeln!(out, "Date:        {}", post.date().format("%Y-%m-%d"))?;
    writeln!(out, "Description: {}", post.description())?;
    writeln!(out, "Tags:        {}", post.tags().join(", "))?;
    writeln!(out)?;
    if raw {
        writeln!(out, "{}", post.source())?;
    } else {
        writeln!(out, "{}", post.content)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::config::SiteConfig;
    use std::sync::Arc;

    fn portfolio() -> Portfolio {
        let store = MemoryAssets::new().with_file(
            "posts/hello.md",
            "---\ndate: 2024-05-06\ntags: [a, b]\n---\n# Hello\n\nFirst paragraph.",
        );
        Portfolio::with_store(SiteConfig::default(), Arc::new(store))
    }

    #[test]
    fn test_show_post() {
        let mut out = Vec::new();
        write_post(&portfolio(), "hello", false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("Title:       Hello\nDate:        2024-05-06\n"));
        assert!(out.contains("Description: First paragraph.\n"));
        assert!(out.contains("Tags:        a, b\n"));
        assert!(out.contains("<p>First paragraph.</p>"));
    }

    #[test]
    fn test_show_raw() {
        let mut out = Vec::new();
        write_post(&portfolio(), "hello", true, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("# Hello\n\nFirst paragraph."));
        assert!(!out.contains("<p>"));
    }

    #[test]
    fn test_show_missing_post() {
        let mut out = Vec::new();
        let err = write_post(&portfolio(), "nope", false, &mut out).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
