use crate::date::DateHints;
use crate::error::{Result, ThreatscopeError};
use serde::{Deserialize, Serialize};

/// A single line of a selector config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Title(String),
    Body(String),
    Author(String),
    Date(String),
    DateAlternative(String),
}

/// Per-source CSS selectors for the primary extraction tier.
///
/// Accepts both the snake_case field names and the camelCase names used by
/// stored source records (`titleSelector`, `contentSelector`, ...).
///
/// ```rust
/// use threatscope_core::SelectorConfig;
///
/// let json = r#"{"titleSelector": "h1.headline", "contentSelector": ".story", "dateAlternatives": [".stamp"]}"#;
/// let config: SelectorConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.title.as_deref(), Some("h1.headline"));
/// assert_eq!(config.date_alternatives, vec![".stamp".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(alias = "titleSelector")]
    pub title: Option<String>,
    #[serde(alias = "contentSelector", alias = "body")]
    pub content: Option<String>,
    #[serde(alias = "authorSelector")]
    pub author: Option<String>,
    #[serde(alias = "dateSelector")]
    pub date: Option<String>,
    #[serde(alias = "dateAlternatives")]
    pub date_alternatives: Vec<String>,
}

impl SelectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directive. The first selector for a field wins; repeated
    /// `date` lines become alternatives.
    pub fn add_directive(&mut self, directive: Directive) {
        match directive {
            Directive::Title(sel) => set_if_empty(&mut self.title, sel),
            Directive::Body(sel) => set_if_empty(&mut self.content, sel),
            Directive::Author(sel) => set_if_empty(&mut self.author, sel),
            Directive::Date(sel) => {
                if self.date.is_none() {
                    self.date = Some(sel);
                } else {
                    self.push_alternative(sel);
                }
            }
            Directive::DateAlternative(sel) => self.push_alternative(sel),
        }
    }

    fn push_alternative(&mut self, sel: String) {
        if self.date.as_deref() != Some(sel.as_str()) && !self.date_alternatives.contains(&sel) {
            self.date_alternatives.push(sel);
        }
    }

    /// Merges a lower-priority config into this one: only fields this config
    /// lacks are taken, alternatives are appended.
    pub fn merge(&mut self, other: &SelectorConfig) {
        if self.title.is_none() {
            self.title = other.title.clone();
        }
        if self.content.is_none() {
            self.content = other.content.clone();
        }
        if self.author.is_none() {
            self.author = other.author.clone();
        }

        match (&self.date, &other.date) {
            (None, Some(date)) => self.date = Some(date.clone()),
            (Some(_), Some(date)) => self.push_alternative(date.clone()),
            _ => {}
        }

        for alt in &other.date_alternatives {
            self.push_alternative(alt.clone());
        }
    }

    /// Date selectors in the shape the date ladder consumes.
    pub fn date_hints(&self) -> DateHints<'_> {
        DateHints { primary: self.date.as_deref(), alternatives: &self.date_alternatives }
    }

    /// Whether the primary tier has anything to run.
    pub fn has_extraction_config(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.author.is_none()
            && self.date.is_none()
            && self.date_alternatives.is_empty()
    }
}

fn set_if_empty(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Parses one `key: selector` line.
pub fn parse_directive(line: &str) -> Result<Directive> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Err(ThreatscopeError::SiteConfigError("Empty or comment line".to_string()));
    }

    let Some((key, value)) = line.split_once(':') else {
        return Err(ThreatscopeError::SiteConfigError(format!("Invalid directive format: {}", line)));
    };

    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ThreatscopeError::SiteConfigError(format!("Missing selector for {}", key.trim())));
    }

    match key.trim() {
        "title" => Ok(Directive::Title(value)),
        "body" | "content" => Ok(Directive::Body(value)),
        "author" => Ok(Directive::Author(value)),
        "date" => Ok(Directive::Date(value)),
        "date_alternative" => Ok(Directive::DateAlternative(value)),
        other => Err(ThreatscopeError::SiteConfigError(format!("Unknown directive: {}", other))),
    }
}
