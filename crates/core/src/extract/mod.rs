//! Article extraction orchestrator.
//!
//! The [`Extractor`] runs the strategies of its [`ConfidenceTable`] in order
//! and stops at the first one whose result is sufficient. A strategy that
//! fails, errors or comes up short is logged and the next one runs. When
//! none succeeds the result is the [`ExtractedArticle::stub`]; extraction
//! itself never returns an error.
//!
//! # Example
//!
//! ```rust
//! use threatscope_core::Extractor;
//!
//! let html = r#"<html><head><title>Fallback title</title></head><body>
//!     <article>
//!         <h1>Researchers detail new exploit chain</h1>
//!         <p>The exploit chain abuses two separate flaws to gain code execution on unpatched hosts.</p>
//!     </article>
//! </body></html>"#;
//!
//! let article = Extractor::new().extract(html, None, None);
//! assert_eq!(article.title(), "Researchers detail new exploit chain");
//! assert_eq!(article.extraction_method(), "fallback");
//! assert_eq!(article.confidence(), 0.6);
//! ```

mod config;
mod preprocessed;
mod tiers;

pub use config::{ConfidenceTable, ExtractConfig, ExtractConfigBuilder, Strategy};
pub use preprocessed::{Sentinel, parse_sentinel};
pub use tiers::{FieldSet, desperate_fields, fallback_fields, primary_fields};

use chrono::{DateTime, Utc};

use crate::ai::FieldExtractor;
use crate::article::{ExtractedArticle, RawDocument};
use crate::clean::{clean_author, clean_inline, clean_text};
use crate::date::{DateExtractor, parse_date_at};
use crate::parse::Document;
use crate::siteconfig::SelectorConfig;

/// A sufficient result of one strategy.
struct Outcome {
    fields: FieldSet,
    method: String,
    confidence: f64,
}

/// Runs the extraction strategies over one document.
pub struct Extractor {
    config: ExtractConfig,
    field_extractor: Option<Box<dyn FieldExtractor>>,
}

impl Extractor {
    /// Creates an extractor with default settings and no AI collaborator.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default(), field_extractor: None }
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config, field_extractor: None }
    }

    /// Attaches an AI field extractor, consulted by [`Strategy::Ai`].
    pub fn with_field_extractor(mut self, extractor: impl FieldExtractor + 'static) -> Self {
        self.field_extractor = Some(Box::new(extractor));
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts an article from a fetched document.
    pub fn extract_document(&self, doc: &RawDocument, selectors: Option<&SelectorConfig>) -> ExtractedArticle {
        self.extract(&doc.html, doc.source_url.as_deref(), selectors)
    }

    /// Extracts an article from raw HTML.
    pub fn extract(&self, html: &str, source_url: Option<&str>, selectors: Option<&SelectorConfig>) -> ExtractedArticle {
        let sentinel = parse_sentinel(html);
        let doc = Document::parse_cleaned(html);
        let now = self.config.reference_time.unwrap_or_else(Utc::now);

        let outcome = self.run_strategies(html, source_url, &doc, sentinel.as_ref(), selectors);

        let publish_date = sentinel
            .as_ref()
            .and_then(|s| s.date.as_deref())
            .and_then(|d| parse_date_at(d, now))
            .or_else(|| self.extract_date(&doc, selectors, now));

        let Some(outcome) = outcome else {
            tracing::info!(source = source_url.unwrap_or("-"), "no strategy produced an article");
            return ExtractedArticle::stub(publish_date);
        };

        let article = ExtractedArticle::new(
            outcome.fields.title.unwrap_or_default(),
            outcome.fields.content.unwrap_or_default(),
            outcome.fields.author,
            publish_date,
            outcome.method,
            outcome.confidence,
        );

        tracing::info!(
            source = source_url.unwrap_or("-"),
            method = article.extraction_method(),
            confidence = article.confidence(),
            words = article.word_count(),
            has_date = article.publish_date().is_some(),
            "article extracted"
        );

        article
    }

    fn run_strategies(
        &self, html: &str, source_url: Option<&str>, doc: &Document, sentinel: Option<&Sentinel>,
        selectors: Option<&SelectorConfig>,
    ) -> Option<Outcome> {
        let table = &self.config.confidence;
        let mut carried = FieldSet::default();

        for strategy in &table.order {
            let strategy = *strategy;
            let attempt = match strategy {
                Strategy::Preprocessed => {
                    sentinel.map(|s| (s.fields.clone(), strategy.label().to_string(), table.preprocessed))
                }
                Strategy::Ai => self.run_field_extractor(html, source_url),
                Strategy::Primary => selectors
                    .filter(|s| s.has_extraction_config())
                    .map(|s| (primary_fields(doc, s), strategy.label().to_string(), table.primary)),
                Strategy::Fallback => Some((
                    fallback_fields(doc, self.config.min_content_chars),
                    strategy.label().to_string(),
                    table.fallback,
                )),
                Strategy::Desperate => Some((
                    desperate_fields(doc, self.config.min_content_chars),
                    strategy.label().to_string(),
                    table.desperate,
                )),
            };

            let Some((fields, method, confidence)) = attempt else {
                tracing::debug!(strategy = strategy.label(), "strategy unavailable");
                continue;
            };

            let merged = fields.clone().with_carried(&carried);
            if self.is_sufficient(strategy, &merged) {
                return Some(Outcome { fields: merged, method, confidence });
            }

            tracing::debug!(
                strategy = strategy.label(),
                has_title = merged.title.is_some(),
                content_chars = merged.content_chars(),
                "strategy insufficient, escalating"
            );
            carried.remember(&fields);
        }

        None
    }

    fn run_field_extractor(&self, html: &str, source_url: Option<&str>) -> Option<(FieldSet, String, f64)> {
        let extractor = self.field_extractor.as_ref()?;
        let threshold = self.config.confidence.ai_threshold;

        match extractor.extract_fields(html, source_url) {
            Ok(ai) if ai.confidence > threshold => {
                let fields = FieldSet {
                    title: ai.title.as_deref().map(clean_inline).filter(|t| !t.is_empty()),
                    content: ai.content.as_deref().map(clean_text).filter(|c| !c.is_empty()),
                    author: ai.author.as_deref().and_then(clean_author),
                };
                Some((fields, ai.method_label(), ai.confidence))
            }
            Ok(ai) => {
                tracing::debug!(
                    extractor = extractor.name(),
                    confidence = ai.confidence,
                    threshold,
                    "field extractor below threshold"
                );
                None
            }
            Err(e) => {
                tracing::warn!(extractor = extractor.name(), error = %e, "field extractor failed");
                None
            }
        }
    }

    fn is_sufficient(&self, strategy: Strategy, fields: &FieldSet) -> bool {
        let has_title = fields.title.is_some();
        let has_content = fields.content.is_some();

        match strategy {
            Strategy::Preprocessed | Strategy::Ai => has_title && has_content,
            Strategy::Primary | Strategy::Fallback => {
                has_title && fields.content_chars() >= self.config.min_content_chars
            }
            Strategy::Desperate => has_title || has_content,
        }
    }

    fn extract_date(
        &self, doc: &Document, selectors: Option<&SelectorConfig>, now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let hints = selectors.map(SelectorConfig::date_hints).unwrap_or_default();
        DateExtractor::at(now).extract_from_document(doc, &hints)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts an article with default settings.
pub fn extract_article(html: &str, source_url: Option<&str>) -> ExtractedArticle {
    Extractor::new().extract(html, source_url, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiFields;
    use crate::{Result, ThreatscopeError};
    use chrono::{Datelike, TimeZone};

    const BODY: &str = "The vendor confirmed the flaw affects every supported release and urged customers to patch.";

    fn fixed_config() -> ExtractConfig {
        ExtractConfig::builder()
            .reference_time(Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap())
            .build()
    }

    struct StaticAi {
        confidence: f64,
        fail: bool,
    }

    impl FieldExtractor for StaticAi {
        fn name(&self) -> &str {
            "static"
        }

        fn extract_fields(&self, _html: &str, _url: Option<&str>) -> Result<AiFields> {
            if self.fail {
                return Err(ThreatscopeError::FieldExtractor {
                    name: "static".to_string(),
                    reason: "model offline".to_string(),
                });
            }
            Ok(AiFields {
                title: Some("AI Title".to_string()),
                content: Some(BODY.to_string()),
                author: None,
                confidence: self.confidence,
                method: "llm".to_string(),
            })
        }
    }

    fn page(body: &str) -> String {
        format!("<html><head><title>Page Title</title></head><body>{}</body></html>", body)
    }

    #[test]
    fn test_sentinel_wins() {
        let input = format!("Title: Labeled\nAuthor: Jane Doe\nDate: 2024-02-02\nContent:\n{}", BODY);
        let article = Extractor::with_config(fixed_config()).extract(&input, None, None);

        assert_eq!(article.extraction_method(), "preprocessed");
        assert_eq!(article.confidence(), 0.9);
        assert_eq!(article.title(), "Labeled");
        assert_eq!(article.author(), Some("Jane Doe"));
        assert_eq!(article.publish_date().map(|d| d.day()), Some(2));
    }

    #[test]
    fn test_ai_above_threshold() {
        let extractor = Extractor::with_config(fixed_config())
            .with_field_extractor(StaticAi { confidence: 0.7, fail: false });
        let article = extractor.extract(&page("<p>short</p>"), None, None);

        assert_eq!(article.extraction_method(), "ai:llm");
        assert_eq!(article.confidence(), 0.7);
        assert_eq!(article.title(), "AI Title");
    }

    #[test]
    fn test_ai_below_threshold_falls_through() {
        let extractor = Extractor::with_config(fixed_config())
            .with_field_extractor(StaticAi { confidence: 0.5, fail: false });
        let html = page(&format!("<article><h1>Selector Title</h1><p>{}</p></article>", BODY));
        let article = extractor.extract(&html, None, None);

        assert_eq!(article.extraction_method(), "fallback");
        assert_eq!(article.title(), "Selector Title");
    }

    #[test]
    fn test_ai_error_falls_through() {
        let extractor = Extractor::with_config(fixed_config())
            .with_field_extractor(StaticAi { confidence: 0.9, fail: true });
        let html = page(&format!("<article><h1>Selector Title</h1><p>{}</p></article>", BODY));

        assert_eq!(extractor.extract(&html, None, None).extraction_method(), "fallback");
    }

    #[test]
    fn test_primary_selectors() {
        let html = page(&format!(
            "<h2 class='hl'>Custom</h2><div class='txt'>{}</div><p class='who'>By Sam</p>",
            BODY
        ));
        let selectors = SelectorConfig {
            title: Some(".hl".to_string()),
            content: Some(".txt".to_string()),
            author: Some(".who".to_string()),
            ..Default::default()
        };
        let article = Extractor::with_config(fixed_config()).extract(&html, None, Some(&selectors));

        assert_eq!(article.extraction_method(), "primary");
        assert_eq!(article.confidence(), 0.8);
        assert_eq!(article.title(), "Custom");
        assert_eq!(article.author(), Some("Sam"));
    }

    #[test]
    fn test_primary_short_content_escalates_and_carries_author() {
        let html = page(&format!(
            "<article><p class='who'>By Sam</p><h1>Generic</h1><div class='txt'>tiny</div><p>{}</p></article>",
            BODY
        ));
        let selectors = SelectorConfig {
            title: Some(".missing".to_string()),
            content: Some(".txt".to_string()),
            author: Some(".who".to_string()),
            ..Default::default()
        };
        let article = Extractor::with_config(fixed_config()).extract(&html, None, Some(&selectors));

        assert_eq!(article.extraction_method(), "fallback");
        assert_eq!(article.title(), "Generic");
        assert_eq!(article.author(), Some("Sam"));
    }

    #[test]
    fn test_desperate() {
        let html = "<html><head><title>Only Title</title></head><body><span>tiny</span></body></html>";
        let article = Extractor::with_config(fixed_config()).extract(html, None, None);

        assert_eq!(article.extraction_method(), "desperate");
        assert_eq!(article.confidence(), 0.3);
        assert_eq!(article.title(), "Only Title");
    }

    #[test]
    fn test_empty_html_gives_stub() {
        let article = Extractor::with_config(fixed_config()).extract("", None, None);

        assert!(article.is_stub());
        assert_eq!(article.confidence(), 0.0);
        assert_eq!(article.title(), "Untitled Article");
    }

    #[test]
    fn test_custom_order_skips_fallback() {
        let config = ExtractConfig::builder().order(vec![Strategy::Desperate]).build();
        let html = page(&format!("<article><h1>Heading</h1><p>{}</p></article>", BODY));

        let article = Extractor::with_config(config).extract(&html, None, None);
        assert_eq!(article.extraction_method(), "desperate");
        assert_eq!(article.title(), "Page Title");
    }

    #[test]
    fn test_date_uses_selector_hints() {
        let html = page(&format!(
            "<article><h1>H</h1><p>{}</p><em class='when'>March 1, 2024</em></article>",
            BODY
        ));
        let selectors = SelectorConfig { date: Some(".when".to_string()), ..Default::default() };

        let article = Extractor::with_config(fixed_config()).extract(&html, None, Some(&selectors));
        assert_eq!(article.publish_date().map(|d| (d.month(), d.day())), Some((3, 1)));
        assert_eq!(article.extraction_method(), "fallback");
    }
}
