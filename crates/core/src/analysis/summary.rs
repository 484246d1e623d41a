use std::sync::LazyLock;

use regex::Regex;

use super::model::{ThreatKind, ThreatRecord};
use super::text::paragraphs;
use crate::clean::clean_inline;

pub const MIN_SUMMARY_CHARS: usize = 30;
pub const MAX_SUMMARY_CHARS: usize = 400;

pub const EMPTY_SUMMARY: &str = "No content available to summarize.";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:summary|key\s+takeaways|tl;dr|executive\s+summary|overview)\s*:\s*(.*)$").unwrap()
});

static SECURITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:vulnerab\w*|exploit\w*|attack\w*|malware|ransomware|breach\w*|patch\w*|threat\w*|cve-\d|zero-day|hack\w*|security|compromis\w*|phishing|backdoor)",
    )
    .unwrap()
});

static CONCLUSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:in\s+conclusion|in\s+summary|overall|to\s+summarize|ultimately|bottom\s+line)\b").unwrap()
});

fn within_bounds(paragraph: &str) -> bool {
    (MIN_SUMMARY_CHARS..=MAX_SUMMARY_CHARS).contains(&paragraph.chars().count())
}

/// Passage following an explicit `Summary:` style marker.
fn marker_passage(body: &str) -> Option<String> {
    let mut lines = body.lines();
    while let Some(line) = lines.next() {
        let Some(caps) = MARKER_RE.captures(line) else {
            continue;
        };
        let rest = caps[1].trim();
        if !rest.is_empty() {
            return Some(clean_inline(rest));
        }
        if let Some(next) = lines.by_ref().map(str::trim).find(|l| !l.is_empty()) {
            return Some(clean_inline(next));
        }
    }
    None
}

fn opening_paragraph(body: &str) -> Option<String> {
    let opening = paragraphs(body)
        .into_iter()
        .find(|p| p.chars().count() >= MIN_SUMMARY_CHARS)?;
    (within_bounds(opening) && SECURITY_RE.is_match(opening)).then(|| clean_inline(opening))
}

fn conclusion_paragraph(body: &str) -> Option<String> {
    paragraphs(body)
        .into_iter()
        .find(|p| CONCLUSION_RE.is_match(p) && within_bounds(p))
        .map(clean_inline)
}

fn templated(threats: &[ThreatRecord]) -> String {
    let Some(primary) = threats.first() else {
        return "This article discusses security developments without naming a specific threat. \
                Review the full text for context."
            .to_string();
    };

    let name = &primary.name;
    match primary.kind {
        ThreatKind::ZeroDay => format!(
            "{name} is a zero-day exploited before a fix was broadly available. \
             Apply vendor mitigations immediately and monitor for compromise."
        ),
        ThreatKind::Vulnerability => format!(
            "{name} is a newly disclosed security vulnerability. \
             Affected systems should be patched as soon as updates are available."
        ),
        ThreatKind::Ransomware => format!(
            "{name} ransomware is actively targeting organizations. \
             Attacks encrypt data and may involve data theft for extortion."
        ),
        ThreatKind::Malware => format!(
            "{name} is a malware threat observed in recent activity. \
             Infected systems may give attackers persistent access."
        ),
        ThreatKind::Exploit => format!(
            "{name} describes exploitation activity against exposed systems. \
             Verify exposure and apply available fixes."
        ),
        ThreatKind::Other => format!(
            "{name} is a security threat discussed in this report. \
             Review the details for impact and guidance."
        ),
    }
}

/// Summary of an article: a marked passage, a security-relevant opening
/// paragraph, a conclusion paragraph, or a template for the primary threat.
pub fn summarize(body: &str, threats: &[ThreatRecord]) -> String {
    if body.trim().is_empty() && threats.is_empty() {
        return EMPTY_SUMMARY.to_string();
    }

    marker_passage(body)
        .or_else(|| opening_paragraph(body))
        .or_else(|| conclusion_paragraph(body))
        .unwrap_or_else(|| templated(threats))
}
