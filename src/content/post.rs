//! Post model and its metadata accessors

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};

use super::frontmatter::{MetaValue, Metadata};
use super::markdown::MarkdownRenderer;

/// Source of "now" for the date fallback
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// A rendered blog post
///
/// Built fresh for every lookup. Display fields are derived from the
/// front-matter on each accessor call, falling back to the markdown body
/// when a field is missing or malformed.
#[derive(Debug, Clone)]
pub struct Post {
    /// Lookup key, `posts/<slug>.md`
    pub slug: String,

    /// Rendered HTML content
    pub content: String,

    /// Decoded front-matter, empty when the post has none
    pub metadata: Metadata,

    /// Markdown body with the front-matter removed
    source: String,
}

impl Post {
    pub fn new(slug: String, source: String, content: String, metadata: Metadata) -> Self {
        Self {
            slug,
            content,
            metadata,
            source,
        }
    }

    /// Markdown body the content was rendered from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Title from front-matter, else the text of the first `# heading`
    pub fn title(&self) -> String {
        match self.metadata.non_empty_str("title") {
            Some(title) => title.to_string(),
            None => MarkdownRenderer::global().first_heading_text(&self.source),
        }
    }

    /// Publication date at local midnight, or now when the front-matter has
    /// no usable date. `YYYY-MM-DD` and YAML timestamps are accepted; a
    /// timestamp keeps only its calendar day
    pub fn date(&self) -> DateTime<Local> {
        self.date_with(&SystemClock)
    }

    /// Same as `date`, reading "now" from `clock`
    pub fn date_with<C: Clock + ?Sized>(&self, clock: &C) -> DateTime<Local> {
        self.metadata
            .non_empty_str("date")
            .and_then(|raw| parse_ymd(raw).or_else(|| parse_timestamp_day(raw)))
            .and_then(local_midnight)
            .unwrap_or_else(|| clock.now())
    }

    /// Description from front-matter, else the text of the lead paragraph
    pub fn description(&self) -> String {
        match self.metadata.non_empty_str("description") {
            Some(desc) => desc.to_string(),
            None => MarkdownRenderer::lead_paragraph_text(&self.source),
        }
    }

    /// Tags from front-matter; never fails, empty when absent or unusable
    pub fn tags(&self) -> Vec<String> {
        match self.metadata.get("tags") {
            Some(MetaValue::Strings(tags)) => tags.clone(),
            Some(MetaValue::Sequence(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(MetaValue::Text(raw)) if !raw.is_empty() => {
                serde_yaml::from_str::<Vec<String>>(raw).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    /// Whether the post carries `tag`, compared case-insensitively
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Strict `YYYY-MM-DD`
fn parse_ymd(s: &str) -> Option<NaiveDate> {
    let well_formed = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Calendar day of a YAML timestamp such as `2024-03-05 10:30:00`,
/// `2024-03-05T10:30:00Z` or `2024-03-05 10:30:00.5 +02:00`
fn parse_timestamp_day(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f %:z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.date_naive());
        }
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|dt| dt.date())
}

/// Midnight of `date` in the local zone; when a DST gap swallows midnight,
/// the first valid instant after it
fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..=3).find_map(|hours| {
        Local
            .from_local_datetime(&(midnight + Duration::hours(hours)))
            .earliest()
    })
}
