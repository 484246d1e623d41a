//! Char-boundary-safe slicing and sentence helpers.

use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+[\s]+|\n+").unwrap());

fn floor_boundary(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// The text from `before` bytes ahead of `start` to `after` bytes past `end`,
/// widened to char boundaries.
pub fn window(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let lo = floor_boundary(text, start.saturating_sub(before));
    let hi = ceil_boundary(text, end.saturating_add(after));
    &text[lo..hi]
}

/// Up to `len` bytes starting at `start`, ending on a char boundary.
pub fn after(text: &str, start: usize, len: usize) -> &str {
    window(text, start, start, 0, len)
}

/// Byte ranges of the sentences in `text`, trimmed, in order.
pub fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END_RE.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        push_trimmed(text, start, end, &mut spans);
        start = m.end();
    }
    push_trimmed(text, start, text.len(), &mut spans);

    spans
}

fn push_trimmed(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if !trimmed.is_empty() {
        spans.push((start + lead, start + lead + trimmed.len()));
    }
}

/// The sentences of `text`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_spans(text).into_iter().map(|(s, e)| &text[s..e]).collect()
}

/// The sentence containing byte offset `pos`.
pub fn sentence_around(text: &str, pos: usize) -> Option<&str> {
    sentence_spans(text)
        .into_iter()
        .find(|(s, e)| (*s..*e).contains(&pos))
        .map(|(s, e)| &text[s..e])
}

/// Paragraphs separated by blank lines (single lines when none are blank).
pub fn paragraphs(text: &str) -> Vec<&str> {
    let blocks: Vec<&str> = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).collect();
    if blocks.len() > 1 {
        return blocks;
    }
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_char_safe() {
        let text = "ééééé CVE-2024-0001 ééééé";
        let start = text.find("CVE").unwrap();
        let end = start + "CVE-2024-0001".len();

        let w = window(text, start, end, 3, 3);
        assert!(w.contains("CVE-2024-0001"));
        assert_eq!(window(text, 0, text.len(), 100, 100), text);
    }

    #[test]
    fn test_split_sentences() {
        let text = "First one. Second one!  Third v1.2.3 here?\nFourth";
        assert_eq!(split_sentences(text), vec!["First one.", "Second one!", "Third v1.2.3 here?", "Fourth"]);
    }

    #[test]
    fn test_sentence_around() {
        let text = "Intro text. The flaw CVE-2024-1111 is bad. Outro.";
        let pos = text.find("CVE").unwrap();
        assert_eq!(sentence_around(text, pos), Some("The flaw CVE-2024-1111 is bad."));
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(paragraphs("a\n\nb\n\n\nc"), vec!["a", "b", "c"]);
        assert_eq!(paragraphs("line one\nline two"), vec!["line one", "line two"]);
    }
}
