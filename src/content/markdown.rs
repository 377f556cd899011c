//! Markdown rendering with syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
    TextMergeStream,
};
use regex::Regex;
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::error::{Error, Result};

lazy_static! {
    /// Process-wide renderer; built once, shared read-only
    static ref MARKDOWN: MarkdownRenderer = MarkdownRenderer::new();

    /// Bare URLs turned into links by the autolink extension; only at the
    /// start of a text run or after whitespace or `*_~(`
    static ref BARE_URL: Regex =
        Regex::new(r"(?:^|[\s*_~(])((?:https?://|www\.)[^\s<>]+)").unwrap();
}

/// Stands in for raw HTML blocks and inline tags
const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";
const RAW_HTML_OMITTED_BLOCK: &str = "<!-- raw HTML omitted -->\n";

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, highlight: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            highlight,
        }
    }

    /// The shared renderer used by the post pipeline
    pub fn global() -> &'static MarkdownRenderer {
        &MARKDOWN
    }

    /// Parser options for rendering: GFM tables, strikethrough, task lists,
    /// footnotes, blockquote tags and `{#id .class}` heading attributes
    pub fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM
    }

    /// Parse `markdown` into the event stream the renderer writes out:
    /// autolinked, hard-wrapped, raw HTML omitted, with generated heading ids
    pub fn events<'a>(&self, markdown: &'a str) -> Vec<Event<'a>> {
        let parser = Parser::new_ext(markdown, Self::options());
        let mut events = omit_unsafe(autolink(parser));
        assign_heading_ids(&mut events);
        events
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let events = self.events(markdown);
        let events = if self.highlight {
            self.highlight_code_blocks(events)
        } else {
            events
        };

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::write_html_fmt(&mut html_output, events.into_iter())
            .map_err(|e| Error::Render(e.to_string()))?;

        Ok(html_output)
    }

    /// Text of the first level-1 heading, from the same event stream
    /// `render` uses
    ///
    /// Only text directly under the heading counts; text nested in emphasis,
    /// links or code spans is skipped.
    pub fn first_heading_text(&self, markdown: &str) -> String {
        let events = self.events(markdown);
        direct_text(events.into_iter(), |tag| {
            matches!(
                tag,
                Tag::Heading {
                    level: HeadingLevel::H1,
                    ..
                }
            )
        })
    }

    /// Text of the first paragraph, parsed with every extension turned off
    ///
    /// Same direct-children rule as `first_heading_text`.
    pub fn lead_paragraph_text(markdown: &str) -> String {
        let plain = Parser::new_ext(markdown, Options::empty());
        direct_text(plain, |tag| matches!(tag, Tag::Paragraph))
    }

    /// Replace fenced code blocks in a known language with highlighted HTML
    fn highlight_code_blocks<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out: Vec<Event> = Vec::with_capacity(events.len());
        let mut block: Option<FencedBlock<'a>> = None;

        for event in events {
            match block.take() {
                None => match event {
                    Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) if !lang.is_empty() => {
                        let name = lang.split_whitespace().next().unwrap_or("").to_string();
                        block = Some(FencedBlock {
                            lang: name,
                            buffered: vec![Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(
                                lang,
                            )))],
                            code: String::new(),
                        });
                    }
                    event => out.push(event),
                },
                Some(mut current) => match event {
                    Event::End(TagEnd::CodeBlock) => {
                        match self.highlight_code(&current.code, &current.lang) {
                            Some(highlighted) => out.push(Event::Html(CowStr::from(highlighted))),
                            None => {
                                out.append(&mut current.buffered);
                                out.push(Event::End(TagEnd::CodeBlock));
                            }
                        }
                    }
                    event => {
                        if let Event::Text(text) = &event {
                            current.code.push_str(text);
                        }
                        current.buffered.push(event);
                        block = Some(current);
                    }
                },
            }
        }

        // Unterminated block: emit what was buffered as-is
        if let Some(mut current) = block {
            out.append(&mut current.buffered);
        }

        out
    }

    /// Highlight a code block, or `None` when the language is unknown
    fn highlight_code(&self, code: &str, lang: &str) -> Option<String> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))?;

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())?;

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => Some(format!(
                r#"<figure class="highlight language-{}">{}</figure>"#,
                lang, highlighted
            )),
            Err(e) => {
                tracing::debug!("Failed to highlight {} block: {}", lang, e);
                None
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A fenced code block being buffered until its end
struct FencedBlock<'a> {
    lang: String,
    buffered: Vec<Event<'a>>,
    code: String,
}

/// Concatenate the text events directly inside the first element matching
/// `is_target`
fn direct_text<'a, I, F>(events: I, is_target: F) -> String
where
    I: IntoIterator<Item = Event<'a>>,
    F: Fn(&Tag) -> bool,
{
    let mut found = false;
    let mut depth = 0usize;
    let mut text = String::new();

    for event in events {
        match event {
            Event::Start(tag) if !found => {
                if is_target(&tag) {
                    found = true;
                }
            }
            Event::Start(_) if found => depth += 1,
            Event::End(_) if found => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Text(t) if found && depth == 0 => text.push_str(&t),
            _ => {}
        }
    }

    text
}

/// Turn bare `http(s)://` and `www.` URLs in text into links, and render
/// soft line breaks as hard ones
fn autolink<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    // Links, images and code blocks whose text must stay untouched
    let mut opaque = 0usize;

    for event in TextMergeStream::new(parser) {
        match event {
            Event::Start(
                tag @ (Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)),
            ) => {
                opaque += 1;
                events.push(Event::Start(tag));
            }
            Event::End(end @ (TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock)) => {
                opaque = opaque.saturating_sub(1);
                events.push(Event::End(end));
            }
            Event::SoftBreak => events.push(Event::HardBreak),
            Event::Text(text) if opaque == 0 && BARE_URL.is_match(&text) => {
                link_bare_urls(&text, &mut events);
            }
            other => events.push(other),
        }
    }

    events
}

fn link_bare_urls<'a>(text: &str, events: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for caps in BARE_URL.captures_iter(text) {
        let Some(m) = caps.get(1) else {
            continue;
        };
        let url = trim_url(m.as_str());
        if url.is_empty() || url == "www." {
            continue;
        }
        let start = m.start();
        let end = start + url.len();

        if start > last {
            events.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }
        let dest = if url.starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_string())));
        events.push(Event::End(TagEnd::Link));
        last = end;
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Replace raw HTML with a comment and empty out script-capable link and
/// image targets, so rendered posts are safe to embed unescaped
fn omit_unsafe<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut in_html_block = false;

    for event in events {
        match event {
            Event::Start(Tag::HtmlBlock) => {
                in_html_block = true;
                out.push(Event::Html(CowStr::Borrowed(RAW_HTML_OMITTED_BLOCK)));
            }
            Event::End(TagEnd::HtmlBlock) => in_html_block = false,
            Event::Html(_) if in_html_block => {}
            Event::Html(_) => out.push(Event::Html(CowStr::Borrowed(RAW_HTML_OMITTED_BLOCK))),
            Event::InlineHtml(_) => out.push(Event::InlineHtml(CowStr::Borrowed(RAW_HTML_OMITTED))),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => out.push(Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => out.push(Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            other => out.push(other),
        }
    }

    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_dangerous_url(&url) {
        CowStr::Borrowed("")
    } else {
        url
    }
}

/// `javascript:`, `vbscript:`, `file:` and non-image `data:` URLs
fn is_dangerous_url(url: &str) -> bool {
    let url: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if let Some(media) = url.strip_prefix("data:") {
        return !["image/png", "image/gif", "image/jpeg", "image/webp"]
            .iter()
            .any(|allowed| media.starts_with(allowed));
    }
    ["javascript:", "vbscript:", "file:"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

/// Drop trailing punctuation and unbalanced closing parens from a URL match
fn trim_url(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '*', '_', '~', '\'', '"']);
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

/// Give every heading without an explicit `{#id}` one derived from its text
fn assign_heading_ids(events: &mut [Event]) {
    let mut used: HashMap<String, usize> = HashMap::new();

    for i in 0..events.len() {
        let Event::Start(Tag::Heading { id, .. }) = &events[i] else {
            continue;
        };

        if let Some(explicit) = id {
            used.entry(explicit.to_string()).or_insert(0);
            continue;
        }

        let text = heading_text(&events[i + 1..]);
        let mut base = slug::slugify(&text);
        if base.is_empty() {
            base = "heading".to_string();
        }

        let generated = match used.get_mut(&base) {
            Some(count) => {
                *count += 1;
                format!("{}-{}", base, count)
            }
            None => {
                used.insert(base.clone(), 0);
                base
            }
        };

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(generated));
        }
    }
}

/// All text inside a heading, nested spans included
fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> MarkdownRenderer {
        MarkdownRenderer::with_options("base16-ocean.dark", false)
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = plain().render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_gfm() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n- [ ] todo\n";
        let html = plain().render(md).unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains(r#"type="checkbox""#));
    }

    #[test]
    fn test_hard_wraps() {
        let html = plain().render("line one\nline two").unwrap();
        assert!(html.contains("line one<br />"));
    }

    #[test]
    fn test_autolink() {
        let html = plain()
            .render("See https://example.com/path. Or www.rust-lang.org!")
            .unwrap();
        assert!(html.contains(r#"<a href="https://example.com/path">https://example.com/path</a>."#));
        assert!(html.contains(r#"<a href="http://www.rust-lang.org">www.rust-lang.org</a>!"#));
    }

    #[test]
    fn test_autolink_needs_a_boundary() {
        let html = plain()
            .render("awww.example.com and xhttps://a.example\n\n(www.example.com) *www.b.example*")
            .unwrap();
        assert!(!html.contains(r#"href="http://awww"#));
        assert!(!html.contains(r#"href="https://a.example""#));
        assert!(html.contains(r#"(<a href="http://www.example.com">www.example.com</a>)"#));
        assert!(html.contains(r#"<a href="http://www.b.example">www.b.example</a>"#));
    }

    #[test]
    fn test_raw_html_is_omitted() {
        let md = "<script>alert(1)</script>\n\nhi <img src=x onerror=alert(1)> there\n\n<div>\n<b>x</b>\n</div>\n";
        let html = plain().render(md).unwrap();
        assert!(!html.contains("<script"));
        assert!(!html.contains("onerror"));
        assert!(!html.contains("<div>"));
        assert!(html.contains("<p>hi <!-- raw HTML omitted --> there</p>"));
        assert_eq!(html.matches("<!-- raw HTML omitted -->").count(), 3);
    }

    #[test]
    fn test_dangerous_link_targets_are_emptied() {
        let md = "[x](javascript:alert(1)) [y](JavaScript:void) ![i](data:text/html;base64,AAAA) \
                  [ok](https://example.com) ![png](data:image/png;base64,AAAA)";
        let html = plain().render(md).unwrap();
        assert!(html.contains(r#"<a href="">x</a>"#));
        assert!(html.contains(r#"<a href="">y</a>"#));
        assert!(!html.to_ascii_lowercase().contains("javascript:"));
        assert!(html.contains(r#"<img src="" alt="i" />"#));
        assert!(html.contains(r#"<a href="https://example.com">ok</a>"#));
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
    }

    #[test]
    fn test_is_dangerous_url() {
        assert!(is_dangerous_url("javascript:alert(1)"));
        assert!(is_dangerous_url(" VBScript:x"));
        assert!(is_dangerous_url("java\tscript:x"));
        assert!(is_dangerous_url("data:text/html,hi"));
        assert!(!is_dangerous_url("data:image/webp;base64,AA"));
        assert!(!is_dangerous_url("/posts/first-post"));
        assert!(!is_dangerous_url("https://example.com/javascript:"));
    }

    #[test]
    fn test_autolink_skips_existing_links_and_code() {
        let md = "[site](https://a.example)\n\n```\nhttps://b.example\n```\n";
        let html = plain().render(md).unwrap();
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("https://b.example\n</code>"));
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("https://a.com/x)."), "https://a.com/x");
        assert_eq!(trim_url("https://en.wikipedia.org/wiki/Rust_(language)"), "https://en.wikipedia.org/wiki/Rust_(language)");
    }

    #[test]
    fn test_heading_ids_are_unique() {
        let html = plain().render("## Intro\n\n## Intro\n\n## Other {#custom}").unwrap();
        assert!(html.contains(r#"<h2 id="intro">"#));
        assert!(html.contains(r#"<h2 id="intro-1">"#));
        assert!(html.contains(r#"<h2 id="custom">Other</h2>"#));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight"));
    }

    #[test]
    fn test_unknown_language_left_as_code() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\nplain\n```").unwrap();
        assert!(html.contains("<pre><code class=\"language-nosuchlang\">plain\n</code></pre>"));
    }

    #[test]
    fn test_first_heading_text() {
        let r = plain();
        assert_eq!(r.first_heading_text("# Hello\n\nBody"), "Hello");
        assert_eq!(r.first_heading_text("## Not this\n\n# This one"), "This one");
        assert_eq!(r.first_heading_text("no headings"), "");
    }

    #[test]
    fn test_first_heading_drops_nested_text() {
        let r = plain();
        assert_eq!(r.first_heading_text("# Hello *world*"), "Hello ");
        assert_eq!(r.first_heading_text("# Use `cargo` now"), "Use  now");
    }

    #[test]
    fn test_lead_paragraph_text() {
        assert_eq!(
            MarkdownRenderer::lead_paragraph_text("# Title\n\nFirst para.\n\nSecond."),
            "First para."
        );
        assert_eq!(
            MarkdownRenderer::lead_paragraph_text("Plain **bold** end"),
            "Plain  end"
        );
        assert_eq!(MarkdownRenderer::lead_paragraph_text("# Only a title"), "");
    }
}
