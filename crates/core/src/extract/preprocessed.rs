//! Input already reduced to labeled fields by an upstream preprocessor:
//!
//! ```text
//! Title: Critical flaw in Example Server
//! Author: Jane Doe
//! Published: 2024-03-15
//! Content:
//! Body text...
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::clean::{clean_author, clean_inline, clean_text};
use crate::parse::Document;

use super::tiers::FieldSet;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*Title:[ \t]*(.+)$").unwrap());
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*Author:[ \t]*(.+)$").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*(?:Date|Published):[ \t]*(.+)$").unwrap());
static CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*Content:[ \t]*").unwrap());

/// Fields read from sentinel labels, plus the raw date string if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    pub fields: FieldSet,
    pub date: Option<String>,
}

/// Reads sentinel labels. Returns `None` unless both `Title:` and
/// `Content:` are present.
pub fn parse_sentinel(input: &str) -> Option<Sentinel> {
    let content_label = CONTENT_RE.find(input)?;
    let head = &input[..content_label.start()];

    let title = TITLE_RE.captures(head).map(|c| clean_inline(&c[1])).filter(|t| !t.is_empty())?;
    let author = AUTHOR_RE.captures(head).and_then(|c| clean_author(&c[1]));
    let date = DATE_RE.captures(head).map(|c| c[1].trim().to_string()).filter(|d| !d.is_empty());

    let raw_content = &input[content_label.end()..];
    let content = if raw_content.contains('<') {
        clean_text(&Document::parse(raw_content).text_content())
    } else {
        clean_text(raw_content)
    };

    Some(Sentinel {
        fields: FieldSet { title: Some(title), content: (!content.is_empty()).then_some(content), author },
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinel() {
        let input = "Title: Patch now\nAuthor: By Jane Doe\nPublished: 2024-03-15\nContent:\nFirst line.\n\nSecond line.";
        let sentinel = parse_sentinel(input).unwrap();

        assert_eq!(sentinel.fields.title.as_deref(), Some("Patch now"));
        assert_eq!(sentinel.fields.author.as_deref(), Some("Jane Doe"));
        assert_eq!(sentinel.fields.content.as_deref(), Some("First line.\n\nSecond line."));
        assert_eq!(sentinel.date.as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_sentinel_content_with_markup() {
        let input = "Title: T\nContent: <p>One</p><p>Two</p>";
        let sentinel = parse_sentinel(input).unwrap();

        assert_eq!(sentinel.fields.content.as_deref(), Some("One\nTwo"));
    }

    #[test]
    fn test_sentinel_requires_title_and_content() {
        assert!(parse_sentinel("Title: Only a title").is_none());
        assert!(parse_sentinel("Content: Only content").is_none());
        assert!(parse_sentinel("<html><body><p>Plain page</p></body></html>").is_none());
    }

    #[test]
    fn test_labels_after_content_are_body_text() {
        let input = "Title: Real\nContent:\nBody mentions Title: fake inside.";
        let sentinel = parse_sentinel(input).unwrap();

        assert_eq!(sentinel.fields.title.as_deref(), Some("Real"));
        assert!(sentinel.fields.content.unwrap().contains("Title: fake"));
    }
}
