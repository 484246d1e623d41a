pub mod json;
pub mod markdown;
pub mod text;

pub use json::{JsonConfig, JsonFormatter, convert_to_json};
pub use markdown::{MarkdownConfig, MarkdownFormatter, convert_to_markdown};
pub use text::{TextConfig, TextFormatter, convert_to_text};

use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::article::ExtractedArticle;

/// An extracted article with its analysis, as handed to the formatters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_url: Option<String>,
    pub article: ExtractedArticle,
    /// Absent when only extraction was requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub analysis: Option<Analysis>,
}

impl Report {
    pub fn new(article: ExtractedArticle, analysis: Option<Analysis>) -> Self {
        Self { source_url: None, article, analysis }
    }

    pub fn with_source_url(mut self, url: Option<String>) -> Self {
        self.source_url = url;
        self
    }
}
