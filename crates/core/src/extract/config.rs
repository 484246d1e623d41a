use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, ThreatscopeError};

/// One extraction strategy of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Explicit `Title:` / `Content:` sentinel labels.
    Preprocessed,
    /// The attached [`FieldExtractor`](crate::FieldExtractor).
    Ai,
    /// Caller-supplied selectors.
    Primary,
    /// The fixed generic selector lists.
    Fallback,
    /// Page title, first heading and bulk text.
    Desperate,
}

impl Strategy {
    /// Label recorded as the extraction method.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Preprocessed => "preprocessed",
            Strategy::Ai => "ai",
            Strategy::Primary => "primary",
            Strategy::Fallback => "fallback",
            Strategy::Desperate => "desperate",
        }
    }
}

/// Per-strategy confidences and the order strategies run in.
///
/// ```rust
/// use threatscope_core::{ConfidenceTable, Strategy};
///
/// let table: ConfidenceTable = serde_json::from_str(r#"{"fallback": 0.65}"#).unwrap();
/// assert_eq!(table.fallback, 0.65);
/// assert_eq!(table.primary, 0.8);
/// assert_eq!(table.order.first(), Some(&Strategy::Preprocessed));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTable {
    pub preprocessed: f64,
    /// An AI result is accepted only when its confidence exceeds this.
    pub ai_threshold: f64,
    pub primary: f64,
    pub fallback: f64,
    pub desperate: f64,
    pub order: Vec<Strategy>,
}

impl Default for ConfidenceTable {
    fn default() -> Self {
        Self {
            preprocessed: 0.9,
            ai_threshold: 0.5,
            primary: 0.8,
            fallback: 0.6,
            desperate: 0.3,
            order: vec![
                Strategy::Preprocessed,
                Strategy::Ai,
                Strategy::Primary,
                Strategy::Fallback,
                Strategy::Desperate,
            ],
        }
    }
}

impl ConfidenceTable {
    /// Fixed confidence of a strategy. `None` for AI, whose results carry
    /// their own confidence.
    pub fn confidence_for(&self, strategy: Strategy) -> Option<f64> {
        match strategy {
            Strategy::Preprocessed => Some(self.preprocessed),
            Strategy::Ai => None,
            Strategy::Primary => Some(self.primary),
            Strategy::Fallback => Some(self.fallback),
            Strategy::Desperate => Some(self.desperate),
        }
    }
}

/// Configuration for the [`Extractor`](crate::Extractor).
///
/// # Example
///
/// ```rust
/// use threatscope_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .min_content_chars(120)
///     .desperate_confidence(0.25)
///     .build();
/// assert_eq!(config.min_content_chars, 120);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub confidence: ConfidenceTable,

    /// Content shorter than this escalates the selector tiers (default: 50).
    pub min_content_chars: usize,

    /// Fixed "now" for relative dates. Defaults to the wall clock.
    #[serde(skip)]
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { confidence: ConfidenceTable::default(), min_content_chars: 50, reference_time: None }
    }
}

impl ExtractConfig {
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }

    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ThreatscopeError::FileNotFound(path.to_path_buf())
            } else {
                ThreatscopeError::WriteError(e)
            }
        })?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ThreatscopeError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every confidence lies in `[0, 1]` and the order is usable.
    pub fn validate(&self) -> Result<()> {
        let table = &self.confidence;
        let values = [
            ("preprocessed", table.preprocessed),
            ("ai_threshold", table.ai_threshold),
            ("primary", table.primary),
            ("fallback", table.fallback),
            ("desperate", table.desperate),
        ];

        for (name, value) in values {
            if !(0.0..=1.0).contains(&value) {
                return Err(ThreatscopeError::ConfigError(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }

        if table.order.is_empty() {
            return Err(ThreatscopeError::ConfigError("strategy order must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Builder for ExtractConfig.
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    pub fn min_content_chars(mut self, value: usize) -> Self {
        self.config.min_content_chars = value;
        self
    }

    pub fn preprocessed_confidence(mut self, value: f64) -> Self {
        self.config.confidence.preprocessed = value;
        self
    }

    pub fn ai_threshold(mut self, value: f64) -> Self {
        self.config.confidence.ai_threshold = value;
        self
    }

    pub fn primary_confidence(mut self, value: f64) -> Self {
        self.config.confidence.primary = value;
        self
    }

    pub fn fallback_confidence(mut self, value: f64) -> Self {
        self.config.confidence.fallback = value;
        self
    }

    pub fn desperate_confidence(mut self, value: f64) -> Self {
        self.config.confidence.desperate = value;
        self
    }

    /// Replaces the strategy order.
    pub fn order(mut self, order: Vec<Strategy>) -> Self {
        self.config.confidence.order = order;
        self
    }

    /// Pins the time relative dates are resolved against.
    pub fn reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.config.reference_time = Some(now);
        self
    }

    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

impl Default for ExtractConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_ordered_by_confidence() {
        let table = ConfidenceTable::default();
        let confidences: Vec<f64> = table.order.iter().filter_map(|s| table.confidence_for(*s)).collect();

        assert_eq!(confidences, vec![0.9, 0.8, 0.6, 0.3]);
    }

    #[test]
    fn test_ai_has_no_fixed_confidence() {
        let table = ConfidenceTable::default();
        assert_eq!(table.confidence_for(Strategy::Ai), None);
        assert_eq!(table.confidence_for(Strategy::Fallback), Some(0.6));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ExtractConfig::builder()
            .primary_confidence(0.75)
            .order(vec![Strategy::Fallback, Strategy::Desperate])
            .build();

        assert_eq!(config.confidence.primary, 0.75);
        assert_eq!(config.confidence.order, vec![Strategy::Fallback, Strategy::Desperate]);
        assert_eq!(config.min_content_chars, 50);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("extract.json");
        std::fs::write(&path, r#"{"min_content_chars": 80, "confidence": {"order": ["primary", "desperate"]}}"#)
            .unwrap();

        let config = ExtractConfig::from_json_file(&path).unwrap();
        assert_eq!(config.min_content_chars, 80);
        assert_eq!(config.confidence.order, vec![Strategy::Primary, Strategy::Desperate]);
        assert_eq!(config.confidence.fallback, 0.6);
    }

    #[test]
    fn test_from_json_file_rejects_out_of_range() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("extract.json");
        std::fs::write(&path, r#"{"confidence": {"primary": 1.5}}"#).unwrap();

        assert!(matches!(ExtractConfig::from_json_file(&path), Err(ThreatscopeError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = ExtractConfig::from_json_file("/nonexistent/threatscope.json");
        assert!(matches!(result, Err(ThreatscopeError::FileNotFound(_))));
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(Strategy::Preprocessed.label(), "preprocessed");
        assert_eq!(Strategy::Desperate.label(), "desperate");
        assert_eq!(serde_json::to_string(&Strategy::Fallback).unwrap(), "\"fallback\"");
    }
}
