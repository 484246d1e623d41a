//! Seam for an optional AI-backed field extractor.
//!
//! The core never talks to a model itself. Callers that have one wrap it in
//! a [`FieldExtractor`] and attach it with
//! [`Extractor::with_field_extractor`](crate::Extractor::with_field_extractor).
//! Its result is used only when the self-reported confidence clears the
//! configured threshold; errors fall through to the selector tiers.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Fields returned by an AI extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    /// Self-reported confidence in `[0, 1]`.
    pub confidence: f64,
    /// Short label for how the fields were produced, e.g. `"llm"`.
    pub method: String,
}

/// An external extractor that reads article fields out of raw HTML.
pub trait FieldExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract_fields(&self, html: &str, url: Option<&str>) -> Result<AiFields>;
}

impl<F: FieldExtractor + ?Sized> FieldExtractor for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract_fields(&self, html: &str, url: Option<&str>) -> Result<AiFields> {
        (**self).extract_fields(html, url)
    }
}

impl AiFields {
    /// Extraction method label recorded on the article.
    pub fn method_label(&self) -> String {
        let method = self.method.trim();
        if method.is_empty() { "ai".to_string() } else { format!("ai:{}", method) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label() {
        let fields = AiFields { method: "llm".to_string(), ..Default::default() };
        assert_eq!(fields.method_label(), "ai:llm");
        assert_eq!(AiFields::default().method_label(), "ai");
    }
}
