//! Selector tiers: caller-supplied, generic fallback and desperate.

use crate::clean::{MAX_AUTHOR_CHARS, clean_author, clean_inline, clean_text};
use crate::parse::{Document, Element};
use crate::siteconfig::SelectorConfig;

/// Fields produced by one tier. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

impl FieldSet {
    /// Fills missing title and author from an earlier tier.
    pub fn with_carried(mut self, earlier: &FieldSet) -> Self {
        if self.title.is_none() {
            self.title = earlier.title.clone();
        }
        if self.author.is_none() {
            self.author = earlier.author.clone();
        }
        self
    }

    /// Keeps the first title and author seen across tiers.
    pub fn remember(&mut self, later: &FieldSet) {
        if self.title.is_none() {
            self.title = later.title.clone();
        }
        if self.author.is_none() {
            self.author = later.author.clone();
        }
    }

    pub fn content_chars(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }
}

/// Where a selector's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource {
    Text,
    Attr(&'static str),
}

struct FieldSelector {
    selector: &'static str,
    source: TextSource,
}

const fn text(selector: &'static str) -> FieldSelector {
    FieldSelector { selector, source: TextSource::Text }
}

const fn meta(selector: &'static str) -> FieldSelector {
    FieldSelector { selector, source: TextSource::Attr("content") }
}

const FALLBACK_TITLE: &[FieldSelector] = &[
    text("h1.entry-title"),
    text("h1.article-title"),
    text("h1.post-title"),
    text("h1.headline"),
    text(".article-header h1"),
    text("article h1"),
    text(r#"[itemprop="headline"]"#),
    meta(r#"meta[property="og:title"]"#),
    meta(r#"meta[name="twitter:title"]"#),
    text("h1"),
];

const FALLBACK_CONTENT: &[FieldSelector] = &[
    text(r#"[itemprop="articleBody"]"#),
    text(".article-body"),
    text(".article-content"),
    text(".entry-content"),
    text(".post-content"),
    text(".post-body"),
    text(".story-body"),
    text(".content-body"),
    text("article .content"),
    text("article"),
    text("main"),
    text(r#"[role="main"]"#),
    text("#content"),
    text(".content"),
];

const FALLBACK_AUTHOR: &[FieldSelector] = &[
    text(r#"[rel="author"]"#),
    text(r#"[itemprop="author"] [itemprop="name"]"#),
    text(r#"[itemprop="author"]"#),
    text(".author-name"),
    text(".byline__name"),
    text(".byline a"),
    text(".author a"),
    text(".author"),
    text(".byline"),
    meta(r#"meta[name="author"]"#),
    text(r#"[class*="author"]"#),
];

/// Runs the caller's selectors.
pub fn primary_fields(doc: &Document, selectors: &SelectorConfig) -> FieldSet {
    FieldSet {
        title: selectors.title.as_deref().and_then(|sel| first_title(doc, sel, TextSource::Text)),
        content: selectors.content.as_deref().and_then(|sel| joined_content(doc, sel)),
        author: selectors.author.as_deref().and_then(|sel| first_author(doc, sel, TextSource::Text)),
    }
}

/// Walks the generic selector lists. Content takes the first selector that
/// reaches `min_content_chars`, else the first non-empty one.
pub fn fallback_fields(doc: &Document, min_content_chars: usize) -> FieldSet {
    let title = FALLBACK_TITLE
        .iter()
        .find_map(|fs| first_title(doc, fs.selector, fs.source));

    let mut short_content = None;
    let mut content = None;
    for fs in FALLBACK_CONTENT {
        let Some(found) = joined_content(doc, fs.selector) else {
            continue;
        };
        if found.chars().count() >= min_content_chars {
            content = Some(found);
            break;
        }
        short_content.get_or_insert(found);
    }

    let author = FALLBACK_AUTHOR
        .iter()
        .find_map(|fs| first_author(doc, fs.selector, fs.source));

    FieldSet { title, content: content.or(short_content), author }
}

/// Last resort: page title or first heading, bulk text, a `By ` line.
pub fn desperate_fields(doc: &Document, min_content_chars: usize) -> FieldSet {
    let title = doc
        .title()
        .map(|t| clean_inline(&t))
        .filter(|t| !t.is_empty())
        .or_else(|| ["h1", "h2", "h3"].iter().find_map(|sel| first_title(doc, sel, TextSource::Text)));

    let main = joined_content(doc, "main");
    let paragraphs = joined_content(doc, "p");
    let content = match (main, paragraphs) {
        (Some(m), _) if m.chars().count() >= min_content_chars => Some(m),
        (_, Some(p)) if p.chars().count() >= min_content_chars => Some(p),
        (Some(m), _) => Some(m),
        (None, Some(p)) => Some(p),
        (None, None) => joined_content(doc, "body"),
    };

    let author = doc
        .select("p, span, div, address, a, small")
        .ok()
        .and_then(|elements| elements.iter().find_map(by_line));

    FieldSet { title, content, author }
}

fn by_line(el: &Element<'_>) -> Option<String> {
    let text = clean_text(&el.block_text());
    let line = text.lines().next()?;
    if line.starts_with("By ") && line.chars().count() < MAX_AUTHOR_CHARS {
        clean_author(&line)
    } else {
        None
    }
}

fn select_logged<'a>(doc: &'a Document, selector: &str) -> Vec<Element<'a>> {
    match doc.select(selector) {
        Ok(elements) => elements,
        Err(e) => {
            tracing::debug!(selector, error = %e, "skipping selector");
            Vec::new()
        }
    }
}

fn value_of(el: &Element<'_>, source: TextSource) -> Option<String> {
    match source {
        TextSource::Text => Some(el.text()),
        TextSource::Attr(attr) => el.attr(attr).map(str::to_string),
    }
}

fn first_title(doc: &Document, selector: &str, source: TextSource) -> Option<String> {
    select_logged(doc, selector)
        .iter()
        .filter_map(|el| value_of(el, source))
        .map(|t| clean_inline(&t))
        .find(|t| !t.is_empty())
}

fn first_author(doc: &Document, selector: &str, source: TextSource) -> Option<String> {
    select_logged(doc, selector)
        .iter()
        .filter_map(|el| value_of(el, source))
        .find_map(|a| clean_author(&a))
}

/// Block text of every match, joined as paragraphs. Nested matches are
/// skipped so the same text is not counted twice.
fn joined_content(doc: &Document, selector: &str) -> Option<String> {
    let elements = select_logged(doc, selector);
    let mut parts: Vec<String> = Vec::new();

    for el in &elements {
        let text = clean_text(&el.block_text());
        if text.is_empty() || parts.iter().any(|p| p.contains(&text)) {
            continue;
        }
        parts.push(text);
    }

    let joined = parts.join("\n\n");
    if joined.is_empty() { None } else { Some(joined) }
}
