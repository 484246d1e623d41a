//! Error types for threatscope operations.
//!
//! Extraction and analysis never surface errors to their caller: a failing
//! strategy falls through to the next one and total failure produces a stub
//! result. [`ThreatscopeError`] is returned only by the collaborator-facing
//! APIs: selector-config parsing and loading, fetching, the AI seam,
//! formatters and the scan registry.
//!
//! # Example
//!
//! ```rust
//! use threatscope_core::{ConfigParser, ThreatscopeError};
//!
//! match ConfigParser::parse_string("not a directive") {
//!     Err(ThreatscopeError::SiteConfigError(msg)) => assert!(msg.contains("line 1")),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for threatscope operations.
#[derive(Error, Debug)]
pub enum ThreatscopeError {
    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A CSS selector supplied by a caller or config file is invalid.
    ///
    /// Inside the extraction pipeline this is a strategy-local failure and
    /// is logged, not returned.
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    WriteError(#[from] std::io::Error),

    /// Extraction configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Selector configuration file errors (directive format).
    #[error("Site configuration error: {0}")]
    SiteConfigError(String),

    /// The attached AI field extractor failed.
    #[error("Field extractor `{name}` failed: {reason}")]
    FieldExtractor { name: String, reason: String },

    /// A scan for this source is already running.
    #[error("A scan is already running for {0}")]
    ScanInProgress(String),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ThreatscopeError.
pub type Result<T> = std::result::Result<T, ThreatscopeError>;
