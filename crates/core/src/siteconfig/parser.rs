use crate::error::{Result, ThreatscopeError};
use crate::siteconfig::directives::{SelectorConfig, parse_directive};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Selector config file parser
#[derive(Debug)]
pub struct ConfigParser;

impl ConfigParser {
    /// Parse a single selector config file. `.json` files are read as a
    /// serialized [`SelectorConfig`]; anything else as directives.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SelectorConfig> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| ThreatscopeError::SiteConfigError(format!("Cannot open file {}: {}", path.display(), e)))?;

        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            return serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                ThreatscopeError::SiteConfigError(format!("Invalid JSON in {}: {}", path.display(), e))
            });
        }

        Self::parse_reader(BufReader::new(file))
    }

    /// Parse directives from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<SelectorConfig> {
        let mut config = SelectorConfig::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line
                .map_err(|e| ThreatscopeError::SiteConfigError(format!("Read error at line {}: {}", line_number, e)))?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let directive = parse_directive(line).map_err(|e| {
                ThreatscopeError::SiteConfigError(format!("Parse error at line {}: {}", line_number, e))
            })?;
            config.add_directive(directive);
        }

        Ok(config)
    }

    /// Parse directives from a string
    pub fn parse_string(content: &str) -> Result<SelectorConfig> {
        Self::parse_reader(content.as_bytes())
    }
}
