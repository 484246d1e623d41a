pub mod ai;
pub mod analysis;
pub mod article;
pub mod clean;
pub mod date;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod formatters;
pub mod parse;
pub mod registry;
pub mod siteconfig;

pub use ai::{AiFields, FieldExtractor};
pub use analysis::{
    Analysis, Analyzer, OccurrencePolicy, ProductRecord, Severity, ThreatKind, ThreatNamePolicy, ThreatRecord, analyze,
};
pub use article::{ExtractedArticle, RawDocument};
pub use date::{DateExtractor, DateHints, parse_date};
pub use error::{Result, ThreatscopeError};
pub use extract::{ConfidenceTable, ExtractConfig, ExtractConfigBuilder, Extractor, Strategy, extract_article};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, fetch_file, fetch_stdin, fetch_url};
pub use formatters::{JsonConfig, JsonFormatter, MarkdownConfig, MarkdownFormatter, Report, TextConfig, TextFormatter};
pub use formatters::{convert_to_json, convert_to_markdown, convert_to_text};
pub use parse::Document;
pub use registry::{ScanGuard, ScanRegistry};
pub use siteconfig::{ConfigLoader, ConfigLoaderBuilder, ConfigParser, Directive, SelectorConfig};
