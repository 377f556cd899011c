//! Front-matter extraction and the loosely-typed metadata it decodes into

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::Serialize;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Opening fence of a front-matter block
const DELIMITER: &str = "---";
/// Fence closing the block and separating it from the content
const SEPARATOR: &str = "\n---\n";

/// A single front-matter value
///
/// YAML decodes into arbitrary trees; the accessors on `Post` only care
/// about a few shapes, so values are sorted into those shapes once at
/// decode time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// A plain string scalar
    Text(String),
    /// A sequence whose items are all strings
    Strings(Vec<String>),
    /// A sequence with at least one non-string item
    Sequence(Vec<Value>),
    /// Anything else: numbers, booleans, null, nested mappings
    Raw(Value),
}

impl MetaValue {
    /// The string value, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for MetaValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => MetaValue::Text(s),
            Value::Sequence(items) => {
                if items.iter().all(Value::is_string) {
                    MetaValue::Strings(
                        items
                            .into_iter()
                            .filter_map(|v| match v {
                                Value::String(s) => Some(s),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    MetaValue::Sequence(items)
                }
            }
            Value::Tagged(tagged) => MetaValue::from(tagged.value),
            other => MetaValue::Raw(other),
        }
    }
}

/// Ordered front-matter mapping; empty when a document has no block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(IndexMap<String, MetaValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// The value under `key` if it is a non-empty string
    pub fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(MetaValue::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.0.iter()
    }

    /// Decode a YAML block into metadata
    ///
    /// A blank or null document is the empty mapping. Any other non-mapping
    /// document, and any non-scalar key, is a decode error.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = serde_yaml::from_str(yaml).map_err(Error::FrontmatterParse)?;
        let mapping = match value {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(Error::FrontmatterParse(serde_yaml::Error::custom(format!(
                    "expected a mapping, found {}",
                    kind_of(&other)
                ))))
            }
        };

        let mut meta = Self::new();
        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(Error::FrontmatterParse(serde_yaml::Error::custom(format!(
                        "unsupported key type {}",
                        kind_of(&other)
                    ))))
                }
            };
            meta.insert(key, MetaValue::from(value));
        }
        Ok(meta)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Split a raw document into its front-matter block and content
///
/// Returns `(None, doc)` when the document does not open with `---` or when
/// the closing fence is missing; only a block that is present but fails to
/// decode is an error.
pub fn split(doc: &str) -> (Option<&str>, &str) {
    if !doc.starts_with(DELIMITER) {
        return (None, doc);
    }

    match doc.split_once(SEPARATOR) {
        Some((head, content)) => {
            let block = head.strip_prefix("---\n").unwrap_or(head);
            (Some(block), content)
        }
        None => (None, doc),
    }
}

/// Extract and decode the front-matter of a document
pub fn extract(doc: &str) -> Result<(Metadata, &str)> {
    match split(doc) {
        (Some(block), content) => Ok((Metadata::from_yaml(block)?, content)),
        (None, content) => Ok((Metadata::new(), content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delimiter_returns_document_unchanged() {
        let docs = [
            "",
            "# Title\n\nBody",
            " ---\ntitle: x\n---\nbody",
            "Some text\n---\nmore",
        ];
        for doc in docs {
            let (meta, content) = extract(doc).unwrap();
            assert!(meta.is_empty());
            assert_eq!(content, doc);
        }
    }

    #[test]
    fn test_missing_closing_fence_is_not_an_error() {
        let doc = "---\ntitle: Unclosed\n\n# Body";
        let (meta, content) = extract(doc).unwrap();
        assert!(meta.is_empty());
        assert_eq!(content, doc);
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let doc = r#"---
title: "Welcome to My Blog"
date: "2025-11-17"
tags:
  - introduction
  - welcome
draft: false
---
# Heading

Body text.
"#;
        let (meta, content) = extract(doc).unwrap();
        assert_eq!(meta.non_empty_str("title"), Some("Welcome to My Blog"));
        assert_eq!(meta.non_empty_str("date"), Some("2025-11-17"));
        assert_eq!(
            meta.get("tags"),
            Some(&MetaValue::Strings(vec![
                "introduction".to_string(),
                "welcome".to_string()
            ]))
        );
        assert_eq!(meta.get("draft"), Some(&MetaValue::Raw(Value::Bool(false))));
        assert_eq!(content, "# Heading\n\nBody text.\n");
    }

    #[test]
    fn test_extract_matches_direct_decode() {
        let block = "title: Hello\ntags: [a, 1, b]\nextra:\n  nested: true";
        let doc = format!("---\n{}\n---\ncontent", block);
        let (meta, content) = extract(&doc).unwrap();
        assert_eq!(meta, Metadata::from_yaml(block).unwrap());
        assert_eq!(content, "content");
        assert!(matches!(meta.get("tags"), Some(MetaValue::Sequence(_))));
    }

    #[test]
    fn test_key_order_preserved() {
        let (meta, _) = extract("---\nzeta: 1\nalpha: 2\nmid: 3\n---\n").unwrap();
        let keys: Vec<_> = meta.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_block() {
        let (meta, content) = extract("---\n\n---\nbody").unwrap();
        assert!(meta.is_empty());
        assert_eq!(content, "body");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = extract("---\ntitle: [unterminated\n---\nbody").unwrap_err();
        assert!(matches!(err, Error::FrontmatterParse(_)));
    }

    #[test]
    fn test_non_mapping_block_is_an_error() {
        let err = extract("---\n- just\n- a list\n---\nbody").unwrap_err();
        assert!(matches!(err, Error::FrontmatterParse(_)));
    }

    #[test]
    fn test_only_first_separator_splits() {
        let (meta, content) = extract("---\ntitle: A\n---\nintro\n---\nmore").unwrap();
        assert_eq!(meta.non_empty_str("title"), Some("A"));
        assert_eq!(content, "intro\n---\nmore");
    }
}
