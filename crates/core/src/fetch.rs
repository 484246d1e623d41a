//! Raw HTML from URLs, files and stdin.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::article::RawDocument;
use crate::{Result, ThreatscopeError};

/// HTTP client settings for page fetches.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: format!("Mozilla/5.0 (compatible; threatscope/{})", env!("CARGO_PKG_VERSION")) }
    }
}

/// Fetches a page over HTTP(S). The final URL after redirects becomes the
/// document's source URL.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<RawDocument> {
    let parsed = Url::parse(url).map_err(|e| ThreatscopeError::InvalidUrl(format!("{url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ThreatscopeError::InvalidUrl(format!("unsupported scheme: {}", parsed.scheme())));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(ThreatscopeError::HttpError)?;

    let response = client
        .get(parsed)
        .header(USER_AGENT, &config.user_agent)
        .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() { ThreatscopeError::Timeout { timeout: config.timeout } } else { ThreatscopeError::HttpError(e) }
        })?
        .error_for_status()?;

    let source_url = response.url().to_string();
    let html = response.text().await?;
    tracing::debug!(url = %source_url, bytes = html.len(), "fetched page");

    Ok(RawDocument::new(html, Some(source_url)))
}

/// Reads a local HTML file. The document has no source URL.
pub fn fetch_file<P: AsRef<Path>>(path: P) -> Result<RawDocument> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ThreatscopeError::FileNotFound(path.to_path_buf()));
    }
    let html = fs::read_to_string(path)?;
    Ok(RawDocument::new(html, None))
}

/// Reads HTML from standard input until EOF.
pub fn fetch_stdin() -> Result<RawDocument> {
    use std::io::{self, Read};

    let mut html = String::new();
    io::stdin().read_to_string(&mut html)?;
    Ok(RawDocument::new(html, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.contains("threatscope"));
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let result = fetch_url("not-a-url", &FetchConfig::default()).await;
        assert!(matches!(result, Err(ThreatscopeError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_url_rejects_other_schemes() {
        let result = fetch_url("ftp://example.com/file.html", &FetchConfig::default()).await;
        assert!(matches!(result, Err(ThreatscopeError::InvalidUrl(msg)) if msg.contains("ftp")));
    }

    #[test]
    fn test_fetch_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><p>Hi</p></body></html>").unwrap();

        let doc = fetch_file(&path).unwrap();
        assert!(doc.html.contains("<p>Hi</p>"));
        assert!(doc.source_url.is_none());
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(ThreatscopeError::FileNotFound(_))));
    }
}
