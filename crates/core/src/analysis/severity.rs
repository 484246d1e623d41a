use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::model::{Severity, ThreatKind, ThreatRecord};

const CRITICAL_TERMS: &[&str] = &[
    "critical",
    "zero-day",
    "zero day",
    "actively exploited",
    "exploited in the wild",
    "emergency",
    "wormable",
    "unauthenticated",
    "cvss 9",
    "cvss 10",
];

const HIGH_TERMS: &[&str] = &[
    "high",
    "high-severity",
    "severe",
    "remote code execution",
    "arbitrary code",
    "privilege escalation",
    "ransomware",
    "data breach",
    "backdoor",
    "exploited",
];

const MEDIUM_TERMS: &[&str] = &[
    "medium",
    "moderate",
    "denial of service",
    "denial-of-service",
    "information disclosure",
    "cross-site scripting",
    "phishing",
    "malware",
];

const LOW_TERMS: &[&str] = &["low", "minor", "informational", "best practice", "awareness", "hardening"];

fn vocabulary(terms: &[&str]) -> Regex {
    let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
}

static CRITICAL_RE: LazyLock<Regex> = LazyLock::new(|| vocabulary(CRITICAL_TERMS));
static HIGH_RE: LazyLock<Regex> = LazyLock::new(|| vocabulary(HIGH_TERMS));
static MEDIUM_RE: LazyLock<Regex> = LazyLock::new(|| vocabulary(MEDIUM_TERMS));
static LOW_RE: LazyLock<Regex> = LazyLock::new(|| vocabulary(LOW_TERMS));

/// Per-level totals behind a severity verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityScores {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityScores {
    /// Whole-word vocabulary tallies plus threat-type bonuses.
    pub fn tally(text: &str, threats: &[ThreatRecord]) -> Self {
        let mut scores = Self {
            critical: CRITICAL_RE.find_iter(text).count(),
            high: HIGH_RE.find_iter(text).count(),
            medium: MEDIUM_RE.find_iter(text).count(),
            low: LOW_RE.find_iter(text).count(),
        };

        let has = |kind: ThreatKind| threats.iter().any(|t| t.kind == kind);
        if has(ThreatKind::ZeroDay) {
            scores.critical += 3;
        }
        if has(ThreatKind::Ransomware) {
            scores.critical += 2;
            scores.high += 1;
        }
        if has(ThreatKind::Vulnerability) {
            scores.high += 1;
        }

        scores
    }

    /// Highest total wins. Ties go to the more severe level; all zero is low.
    pub fn verdict(&self) -> Severity {
        [
            (Severity::Critical, self.critical),
            (Severity::High, self.high),
            (Severity::Medium, self.medium),
            (Severity::Low, self.low),
        ]
        .into_iter()
        .fold((Severity::Low, 0), |best, (severity, score)| if score > best.1 { (severity, score) } else { best })
        .0
    }
}

/// Severity of an article's text given its detected threats.
pub fn score_severity(text: &str, threats: &[ThreatRecord]) -> Severity {
    let scores = SeverityScores::tally(text, threats);
    tracing::debug!(?scores, "severity scores");
    scores.verdict()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threat(kind: ThreatKind) -> ThreatRecord {
        ThreatRecord { kind, name: "Sample".to_string(), details: String::new(), cve: None }
    }

    #[test]
    fn test_all_zero_is_low() {
        assert_eq!(score_severity("Quarterly earnings were announced.", &[]), Severity::Low);
    }

    #[test]
    fn test_whole_word_counting() {
        let scores = SeverityScores::tally("highly criticality lowered", &[]);
        assert_eq!(scores, SeverityScores::default());
    }

    #[test]
    fn test_ties_prefer_more_severe() {
        assert_eq!(score_severity("critical and high", &[]), Severity::Critical);
        assert_eq!(score_severity("medium and low", &[]), Severity::Medium);
    }

    #[test]
    fn test_highest_total_wins() {
        let text = "A phishing wave spread malware with moderate impact. One critical note.";
        assert_eq!(score_severity(text, &[]), Severity::Medium);
    }

    #[test]
    fn test_threat_bonuses() {
        let zero_day = SeverityScores::tally("", &[threat(ThreatKind::ZeroDay)]);
        assert_eq!(zero_day.critical, 3);

        let ransomware = SeverityScores::tally("", &[threat(ThreatKind::Ransomware)]);
        assert_eq!((ransomware.critical, ransomware.high), (2, 1));

        let vulnerability = SeverityScores::tally("", &[threat(ThreatKind::Vulnerability)]);
        assert_eq!(vulnerability.high, 1);
        assert_eq!(vulnerability.verdict(), Severity::High);
    }

    #[test]
    fn test_adding_zero_day_never_lowers_severity() {
        let texts = [
            "",
            "low risk hardening guidance",
            "a phishing campaign with moderate malware",
            "remote code execution and privilege escalation",
            "critical flaw",
        ];

        for text in texts {
            let before = score_severity(text, &[]);
            let after = score_severity(text, &[threat(ThreatKind::ZeroDay)]);
            assert!(after >= before, "{text}: {before} -> {after}");
        }
    }
}
