//! List site content

use anyhow::Result;
use std::collections::HashMap;
use std::io::Write;

use crate::Portfolio;

/// List site content by type
pub fn run(portfolio: &Portfolio, content_type: &str) -> Result<()> {
    let stdout = std::io::stdout();
    write_list(portfolio, content_type, &mut stdout.lock())
}

pub fn write_list<W: Write>(portfolio: &Portfolio, content_type: &str, out: &mut W) -> Result<()> {
    let assets = portfolio.assets();

    match content_type {
        "post" | "posts" => {
            let posts = assets.list_posts();
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    post.date().format("%Y-%m-%d"),
                    post.title(),
                    post.slug
                )?;
            }
        }
        "tag" | "tags" => {
            let mut tags: HashMap<String, usize> = HashMap::new();
            for post in assets.list_posts() {
                for tag in post.tags() {
                    *tags.entry(tag).or_insert(0) += 1;
                }
            }
            writeln!(out, "Tags ({}):", tags.len())?;
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        "theme" | "themes" => {
            let themes = portfolio.config.valid_themes();
            writeln!(out, "Themes ({}):", themes.len())?;
            for theme in themes {
                let marker = if theme == portfolio.config.default_theme {
                    " (default)"
                } else {
                    ""
                };
                writeln!(out, "  {}{}", theme, marker)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, theme",
                content_type
            );
        }
    }

    Ok(())
}
