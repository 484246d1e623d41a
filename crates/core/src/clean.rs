//! Content cleaning: markup stripping and text normalization.
//!
//! Markup stripping runs on raw HTML before DOM parsing and removes every
//! element that never carries readable article text. The text helpers run on
//! every field the extraction tiers produce.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static HORIZONTAL_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}\u{2009}\u{200b}\r\f]+").unwrap());
static BY_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^by\s*:?\s+").unwrap());

/// Elements removed wholesale before parsing. Scripts are handled separately.
const REMOVED_TAGS: &[&str] = &["style", "noscript", "iframe", "svg", "canvas", "template"];

/// Maximum length of an author string before it is rejected as page text.
pub const MAX_AUTHOR_CHARS: usize = 100;

/// Maximum length of a threat or product label.
pub const MAX_LABEL_CHARS: usize = 30;

/// Removes `script`, `style`, `noscript`, `iframe`, `svg`, `canvas` and
/// `template` elements along with HTML comments.
///
/// `application/ld+json` scripts survive so the date ladder can read them.
/// On rewriter failure the input is returned unchanged.
///
/// # Example
///
/// ```rust
/// use threatscope_core::clean::strip_markup;
///
/// let html = "<p>Kept</p><script>alert(1)</script><!-- note -->";
/// let stripped = strip_markup(html);
/// assert!(stripped.contains("Kept"));
/// assert!(!stripped.contains("alert"));
/// assert!(!stripped.contains("note"));
/// ```
pub fn strip_markup(html: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(html, "");

    let mut handlers = vec![lol_html::element!("script", |el| {
        let is_json_ld = el
            .get_attribute("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            el.remove();
        }
        Ok(())
    })];
    for tag in REMOVED_TAGS.iter().copied() {
        handlers.push(lol_html::element!(tag, |el| {
            el.remove();
            Ok(())
        }));
    }

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(without_comments.as_bytes()).is_err() {
        return without_comments.into_owned();
    }

    if rewriter.end().is_err() {
        return without_comments.into_owned();
    }

    output
}

/// Decodes HTML entities (`&amp;`, `&#8217;`, `&nbsp;` ...) in plain text.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let escaped = text.replace('<', "&lt;").replace('>', "&gt;");
    let fragment = Html::parse_fragment(&escaped);
    fragment.root_element().text().collect()
}

/// Normalizes multi-line text.
///
/// Entities are decoded, horizontal whitespace runs collapse to one space,
/// every line is trimmed, blank-line runs collapse to a single paragraph
/// break and the result is trimmed.
///
/// ```rust
/// use threatscope_core::clean::clean_text;
///
/// let text = "  First   line \n\n\n\n  Second&amp;line  ";
/// assert_eq!(clean_text(text), "First line\n\nSecond&line");
/// ```
pub fn clean_text(text: &str) -> String {
    let decoded = decode_entities(text);
    let mut out = String::with_capacity(decoded.len());
    let mut pending_break = false;

    for line in decoded.lines() {
        let line = HORIZONTAL_WS_RE.replace_all(line, " ");
        let line = line.trim();

        if line.is_empty() {
            pending_break = !out.is_empty();
            continue;
        }

        if !out.is_empty() {
            out.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        pending_break = false;
    }

    out
}

/// Normalizes text into a single line. Used for titles and authors.
pub fn clean_inline(text: &str) -> String {
    decode_entities(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans an author string: strips a leading `By` / `by:` and rejects values
/// that are empty or too long to be a name.
pub fn clean_author(text: &str) -> Option<String> {
    let inline = clean_inline(text);
    let author = BY_PREFIX_RE.replace(&inline, "").trim().to_string();

    if author.is_empty() || author.chars().count() > MAX_AUTHOR_CHARS {
        None
    } else {
        Some(author)
    }
}

/// Truncates a label to `max` characters, ending in `...` when cut.
///
/// ```rust
/// use threatscope_core::clean::truncate_label;
///
/// assert_eq!(truncate_label("Short", 30), "Short");
/// let long = "An Extraordinarily Long Threat Name Here";
/// let cut = truncate_label(long, 30);
/// assert_eq!(cut.chars().count(), 30);
/// assert!(cut.ends_with("..."));
/// ```
pub fn truncate_label(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_removes_non_content() {
        let html = r#"
            <html>
                <head><script>alert('test');</script><style>body{color:red;}</style></head>
                <body>
                    <noscript>Enable JavaScript</noscript>
                    <iframe src="https://example.com"></iframe>
                    <svg><rect width="100" height="100"/></svg>
                    <canvas id="chart"></canvas>
                    <template><p>Template text</p></template>
                    <p>Content</p>
                </body>
            </html>
        "#;

        let result = strip_markup(html);
        assert!(result.contains("<p>Content</p>"));
        assert!(!result.contains("alert"), "Script content should be removed");
        assert!(!result.contains("color:red"), "Style content should be removed");
        assert!(!result.contains("Enable JavaScript"));
        assert!(!result.contains("example.com"));
        assert!(!result.contains("rect"));
        assert!(!result.contains("chart"));
        assert!(!result.contains("Template text"));
    }

    #[test]
    fn test_strip_markup_keeps_json_ld() {
        let html = r#"<head><script type="application/ld+json">{"datePublished":"2024-01-01"}</script></head>"#;
        let result = strip_markup(html);
        assert!(result.contains("datePublished"));
    }

    #[test]
    fn test_strip_markup_removes_comments() {
        let html = "<body><!-- This is a\nmultiline comment --><p>Visible content</p></body>";
        let result = strip_markup(html);
        assert!(!result.contains("<!--"));
        assert!(result.contains("Visible content"));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("It&#8217;s"), "It\u{2019}s");
        assert_eq!(decode_entities("a < b &amp; c"), "a < b & c");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let text = "\n\n   Alpha \t beta  \n\n\n gamma\n";
        assert_eq!(clean_text(text), "Alpha beta\n\ngamma");
    }

    #[test]
    fn test_clean_text_keeps_single_breaks() {
        assert_eq!(clean_text("one\ntwo"), "one\ntwo");
    }

    #[test]
    fn test_clean_inline() {
        assert_eq!(clean_inline("  A\n   headline\twith  gaps "), "A headline with gaps");
    }

    #[test]
    fn test_clean_author() {
        assert_eq!(clean_author("By Jane Doe"), Some("Jane Doe".to_string()));
        assert_eq!(clean_author("by: John Smith"), Some("John Smith".to_string()));
        assert_eq!(clean_author("   "), None);
        assert_eq!(clean_author(&"x".repeat(150)), None);
    }

    #[test]
    fn test_truncate_label_is_char_safe() {
        let name = "ÄÖÜ".repeat(20);
        let cut = truncate_label(&name, 30);
        assert_eq!(cut.chars().count(), 30);
        assert!(cut.ends_with("..."));
    }
}
