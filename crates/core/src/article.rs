//! Input and output records for extraction.
//!
//! [`RawDocument`] is the transient input handed over by the fetch layer.
//! [`ExtractedArticle`] is the immutable result of the extraction pipeline:
//! it is created once by the [`Extractor`](crate::Extractor) and read through
//! accessors afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when no strategy found one.
pub const PLACEHOLDER_TITLE: &str = "Untitled Article";

/// Content used when no strategy found any.
pub const PLACEHOLDER_CONTENT: &str = "No content could be extracted from this document.";

/// Extraction method label of the stub article.
pub const FAILED_METHOD: &str = "extraction-failed";

/// Raw HTML plus the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub html: String,
    pub source_url: Option<String>,
}

impl RawDocument {
    pub fn new(html: impl Into<String>, source_url: Option<String>) -> Self {
        Self { html: html.into(), source_url }
    }
}

/// A normalized article record.
///
/// Title and content are never empty, the extraction method is always a
/// non-empty label and confidence always lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ArticleFields")]
pub struct ExtractedArticle {
    title: String,
    content: String,
    author: Option<String>,
    publish_date: Option<DateTime<Utc>>,
    extraction_method: String,
    confidence: f64,
}

impl ExtractedArticle {
    /// Creates an article, substituting placeholders for empty fields and
    /// clamping the confidence.
    pub fn new(
        title: impl Into<String>, content: impl Into<String>, author: Option<String>,
        publish_date: Option<DateTime<Utc>>, extraction_method: impl Into<String>, confidence: f64,
    ) -> Self {
        let title = non_empty_or(title.into(), PLACEHOLDER_TITLE);
        let content = non_empty_or(content.into(), PLACEHOLDER_CONTENT);
        let extraction_method = non_empty_or(extraction_method.into(), FAILED_METHOD);
        let author = author.filter(|a| !a.trim().is_empty());
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };

        Self { title, content, author, publish_date, extraction_method, confidence }
    }

    /// The stub returned when every strategy failed.
    ///
    /// ```rust
    /// use threatscope_core::ExtractedArticle;
    ///
    /// let stub = ExtractedArticle::stub(None);
    /// assert_eq!(stub.title(), "Untitled Article");
    /// assert_eq!(stub.extraction_method(), "extraction-failed");
    /// assert_eq!(stub.confidence(), 0.0);
    /// ```
    pub fn stub(publish_date: Option<DateTime<Utc>>) -> Self {
        Self::new(PLACEHOLDER_TITLE, PLACEHOLDER_CONTENT, None, publish_date, FAILED_METHOD, 0.0)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn publish_date(&self) -> Option<DateTime<Utc>> {
        self.publish_date
    }

    pub fn extraction_method(&self) -> &str {
        &self.extraction_method
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Whether this is the total-failure stub.
    pub fn is_stub(&self) -> bool {
        self.extraction_method == FAILED_METHOD
    }

    /// Word count of the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Wire shape of [`ExtractedArticle`]. Deserialized records go through
/// [`ExtractedArticle::new`].
#[derive(Deserialize)]
struct ArticleFields {
    title: String,
    content: String,
    author: Option<String>,
    publish_date: Option<DateTime<Utc>>,
    extraction_method: String,
    confidence: f64,
}

impl From<ArticleFields> for ExtractedArticle {
    fn from(f: ArticleFields) -> Self {
        Self::new(f.title, f.content, f.author, f.publish_date, f.extraction_method, f.confidence)
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() { fallback.to_string() } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_new_clamps_confidence() {
        let high = ExtractedArticle::new("T", "C", None, None, "primary", 1.7);
        let low = ExtractedArticle::new("T", "C", None, None, "primary", -0.2);
        let nan = ExtractedArticle::new("T", "C", None, None, "primary", f64::NAN);

        assert_eq!(high.confidence(), 1.0);
        assert_eq!(low.confidence(), 0.0);
        assert_eq!(nan.confidence(), 0.0);
    }

    #[test]
    fn test_article_new_fills_placeholders() {
        let article = ExtractedArticle::new("  ", "", Some(" ".into()), None, "", 0.5);

        assert_eq!(article.title(), PLACEHOLDER_TITLE);
        assert_eq!(article.content(), PLACEHOLDER_CONTENT);
        assert_eq!(article.author(), None);
        assert_eq!(article.extraction_method(), FAILED_METHOD);
    }

    #[test]
    fn test_stub_article() {
        let stub = ExtractedArticle::stub(None);
        assert!(stub.is_stub());
        assert_eq!(stub.content(), PLACEHOLDER_CONTENT);
    }

    #[test]
    fn test_article_serializes_snake_case_fields() {
        let article = ExtractedArticle::new("Title", "Body text", Some("Jane".into()), None, "fallback", 0.6);
        let json = serde_json::to_value(&article).unwrap();

        assert_eq!(json["title"], "Title");
        assert_eq!(json["extraction_method"], "fallback");
        assert_eq!(json["confidence"], 0.6);
        assert!(json["publish_date"].is_null());
    }

    #[test]
    fn test_deserialized_article_is_normalized() {
        let json = r#"{"title": "", "content": "Body", "author": "  ", "publish_date": null,
                       "extraction_method": "primary", "confidence": 5.0}"#;
        let article: ExtractedArticle = serde_json::from_str(json).unwrap();

        assert_eq!(article.title(), PLACEHOLDER_TITLE);
        assert_eq!(article.author(), None);
        assert_eq!(article.confidence(), 1.0);
        assert_eq!(article.extraction_method(), "primary");
    }

    #[test]
    fn test_article_json_round_trip() {
        let article = ExtractedArticle::new("Title", "Body text", Some("Jane".into()), None, "fallback", 0.6);
        let json = serde_json::to_string(&article).unwrap();
        assert_eq!(serde_json::from_str::<ExtractedArticle>(&json).unwrap(), article);
    }

    #[test]
    fn test_word_count() {
        let article = ExtractedArticle::new("T", "one two  three\nfour", None, None, "primary", 0.8);
        assert_eq!(article.word_count(), 4);
    }
}
