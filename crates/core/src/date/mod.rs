//! Publication date extraction.
//!
//! [`DateExtractor`] walks a fixed ladder of [`DateStrategy`] steps over a
//! parsed document and returns the first candidate that [`parse_date_at`]
//! accepts. Extraction never fails: a page with no recognizable date yields
//! `None`.
//!
//! # Example
//!
//! ```rust
//! use chrono::Datelike;
//! use threatscope_core::date::{DateExtractor, DateHints};
//!
//! let html = r#"<html><head>
//!     <meta property="article:published_time" content="2024-05-01T09:00:00Z">
//! </head><body><p>Body</p></body></html>"#;
//!
//! let date = DateExtractor::new().extract(html, &DateHints::default()).unwrap();
//! assert_eq!(date.month(), 5);
//! ```

mod parse;
mod patterns;

pub use parse::{MAX_YEAR, MIN_YEAR, parse_date, parse_date_at};
pub use patterns::{DateShape, candidates, first_match};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::clean::clean_inline;
use crate::parse::{Document, Element};

/// Attributes checked on a matched element before its text.
const DATE_ATTRIBUTES: &[&str] = &[
    "datetime",
    "data-date",
    "data-datetime",
    "data-published",
    "data-publish-date",
    "data-timestamp",
    "data-time",
    "content",
];

/// Metadata tags that carry a publication date in `content`.
const META_SELECTORS: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[property="og:published_time"]"#,
    r#"meta[property="og:article:published_time"]"#,
    r#"meta[name="article:published_time"]"#,
    r#"meta[name="date"]"#,
    r#"meta[name="pubdate"]"#,
    r#"meta[name="publishdate"]"#,
    r#"meta[name="publish-date"]"#,
    r#"meta[name="DC.date.issued"]"#,
    r#"meta[name="dc.date"]"#,
    r#"meta[name="dcterms.created"]"#,
    r#"meta[itemprop="datePublished"]"#,
    r#"meta[name="parsely-pub-date"]"#,
    r#"meta[name="sailthru.date"]"#,
];

/// JSON-LD keys in preference order.
const JSON_LD_DATE_KEYS: &[&str] = &["datePublished", "dateCreated", "dateModified"];

/// Selectors tried after metadata, most specific first.
const BUILTIN_SELECTORS: &[&str] = &[
    "time[datetime]",
    "time[pubdate]",
    r#"[itemprop="datePublished"]"#,
    r#"[property="datePublished"]"#,
    ".published",
    ".pubdate",
    ".publish-date",
    ".published-date",
    ".post-date",
    ".entry-date",
    ".article-date",
    ".article__date",
    ".date-published",
    ".story-date",
    ".timestamp",
    ".dateline",
    ".meta-date",
    ".byline time",
    ".byline-date",
    ".posted-on",
    ".post-meta time",
    ".entry-meta time",
    ".article-meta time",
    r#"[data-testid="timestamp"]"#,
    r#"[class*="publish"]"#,
    r#"[class*="date"]"#,
    r#"[id*="date"]"#,
    "time",
    ".date",
    "span.time",
];

/// Page regions searched for free-text dates.
const TEXT_REGIONS: &[&str] = &[
    "header",
    ".byline",
    ".meta",
    ".post-meta",
    ".entry-meta",
    ".article-meta",
    r#"[class*="byline"]"#,
    r#"[class*="meta"]"#,
];

/// Caller-supplied date selectors for one source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateHints<'a> {
    pub primary: Option<&'a str>,
    pub alternatives: &'a [String],
}

/// One step of the date ladder, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateStrategy {
    PrimarySelector,
    AlternativeSelectors,
    MetaTags,
    JsonLd,
    BuiltinSelectors,
    TextPatterns,
}

impl DateStrategy {
    pub const LADDER: [DateStrategy; 6] = [
        DateStrategy::PrimarySelector,
        DateStrategy::AlternativeSelectors,
        DateStrategy::MetaTags,
        DateStrategy::JsonLd,
        DateStrategy::BuiltinSelectors,
        DateStrategy::TextPatterns,
    ];
}

/// Finds the publication date of a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateExtractor {
    reference_time: Option<DateTime<Utc>>,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative dates ("3 days ago") against a fixed instant.
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self { reference_time: Some(reference_time) }
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Parses `html` and runs the ladder.
    pub fn extract(&self, html: &str, hints: &DateHints<'_>) -> Option<DateTime<Utc>> {
        self.extract_from_document(&Document::parse(html), hints)
    }

    /// Runs the ladder over an already parsed document.
    pub fn extract_from_document(&self, doc: &Document, hints: &DateHints<'_>) -> Option<DateTime<Utc>> {
        let now = self.now();

        DateStrategy::LADDER.iter().find_map(|strategy| {
            let found = self.run(*strategy, doc, hints, now);
            if let Some(date) = found {
                tracing::debug!(strategy = ?strategy, date = %date, "publication date found");
            }
            found
        })
    }

    fn run(
        &self, strategy: DateStrategy, doc: &Document, hints: &DateHints<'_>, now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match strategy {
            DateStrategy::PrimarySelector => hints.primary.and_then(|sel| from_selector(doc, sel, now)),
            DateStrategy::AlternativeSelectors => {
                hints.alternatives.iter().find_map(|sel| from_selector(doc, sel, now))
            }
            DateStrategy::MetaTags => META_SELECTORS.iter().find_map(|sel| {
                let el = doc.select_first(sel).ok().flatten()?;
                parse_date_at(el.attr("content")?, now)
            }),
            DateStrategy::JsonLd => doc
                .json_ld_blocks()
                .iter()
                .flat_map(json_ld_dates)
                .find_map(|value| parse_date_at(&value, now)),
            DateStrategy::BuiltinSelectors => BUILTIN_SELECTORS.iter().find_map(|sel| from_selector(doc, sel, now)),
            DateStrategy::TextPatterns => TEXT_REGIONS.iter().find_map(|sel| {
                let elements = doc.select(sel).ok()?;
                elements.iter().find_map(|el| {
                    let text = clean_inline(&el.text());
                    candidates(&text).find_map(|(_, candidate)| parse_date_at(candidate, now))
                })
            }),
        }
    }
}

fn from_selector(doc: &Document, selector: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match doc.select(selector) {
        Ok(elements) => elements.iter().find_map(|el| from_element(el, now)),
        Err(e) => {
            tracing::debug!(selector, error = %e, "skipping date selector");
            None
        }
    }
}

fn from_element(el: &Element<'_>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    DATE_ATTRIBUTES
        .iter()
        .filter_map(|attr| el.attr(attr))
        .find_map(|value| parse_date_at(value, now))
        .or_else(|| parse_date_at(&clean_inline(&el.text()), now))
}

/// Collects date strings from article-typed JSON-LD nodes, following arrays
/// and `@graph` containers.
fn json_ld_dates(value: &Value) -> Vec<String> {
    let mut dates = Vec::new();
    collect_json_ld_dates(value, &mut dates);
    dates
}

fn collect_json_ld_dates(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_json_ld_dates(item, out)),
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                collect_json_ld_dates(graph, out);
            }

            if map.get("@type").is_some_and(is_article_type) {
                out.extend(
                    JSON_LD_DATE_KEYS
                        .iter()
                        .filter_map(|key| map.get(*key).and_then(Value::as_str))
                        .map(str::to_string),
                );
            }
        }
        _ => {}
    }
}

fn is_article_type(value: &Value) -> bool {
    match value {
        Value::String(t) => t.ends_with("Article") || t == "BlogPosting",
        Value::Array(types) => types.iter().any(is_article_type),
        _ => false,
    }
}
