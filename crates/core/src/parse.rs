//! HTML parsing and DOM querying.
//!
//! This module provides the [`Document`] and [`Element`] types used by every
//! extraction tier. Both are thin wrappers around `scraper` that turn invalid
//! selectors into [`ThreatscopeError::InvalidSelector`] and add the text
//! helpers the tiers need: block-aware text and JSON-LD blocks.
//!
//! # Example
//!
//! ```rust
//! use threatscope_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{Html, Node, Selector};

use crate::clean::strip_markup;
use crate::{Result, ThreatscopeError};

/// Elements that start a new line in [`Element::block_text`].
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article", "blockquote", "pre", "tr",
    "header", "footer", "figcaption", "dd", "dt",
];

/// Elements whose text never counts as readable content.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string as-is.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Parses HTML after stripping non-content markup (scripts, styles,
    /// iframes, comments). JSON-LD blocks are kept for date extraction.
    pub fn parse_cleaned(html: &str) -> Self {
        Self::parse(&strip_markup(html))
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ThreatscopeError::InvalidSelector`] if the selector does not parse.
    ///
    /// # Example
    ///
    /// ```rust
    /// use threatscope_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// Parses every `application/ld+json` script block that holds valid JSON.
    pub fn json_ld_blocks(&self) -> Vec<serde_json::Value> {
        let Ok(elements) = self.select("script[type=\"application/ld+json\"]") else {
            return Vec::new();
        };

        elements
            .iter()
            .filter_map(|el| serde_json::from_str::<serde_json::Value>(el.raw_text().trim()).ok())
            .collect()
    }

    /// Gets block-aware text of the whole document.
    pub fn text_content(&self) -> String {
        Element { element: self.html.root_element() }.block_text()
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ThreatscopeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// A wrapper around scraper's `ElementRef`.
///
/// # Example
///
/// ```rust
/// use threatscope_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl Element<'_> {
    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets text with a line break before every block-level element, skipping
    /// script and style contents.
    pub fn block_text(&self) -> String {
        let mut out = String::new();
        for node in self.element.descendants() {
            match node.value() {
                Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => out.push('\n'),
                Node::Text(text) => {
                    let hidden = node
                        .ancestors()
                        .any(|a| a.value().as_element().is_some_and(|e| SKIP_TAGS.contains(&e.name())));
                    if !hidden {
                        out.push_str(text);
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Gets the unprocessed text of a raw-text element such as `<script>`.
    fn raw_text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }
}
