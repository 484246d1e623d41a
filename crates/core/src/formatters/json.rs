use crate::Result;
use crate::formatters::Report;

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
    /// Drop the article body, keeping metadata and analysis
    pub omit_content: bool,
}

/// Serializes a report.
pub fn convert_to_json(report: &Report, config: &JsonConfig) -> Result<String> {
    let mut value = serde_json::to_value(report)?;
    if config.omit_content
        && let Some(article) = value.get_mut("article").and_then(|a| a.as_object_mut())
    {
        article.remove("content");
    }

    let json = if config.pretty { serde_json::to_string_pretty(&value)? } else { serde_json::to_string(&value)? };
    Ok(json)
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &Report) -> Result<String> {
        convert_to_json(report, &self.config)
    }
}
