//! Threat naming heuristics and the policy that gates candidate names.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One to three capitalized words on a single line.
pub(crate) const NAME: &str = r"[A-Z][\w.-]*(?:[ \t]+[A-Z][\w.-]*){0,2}";

pub(crate) const OPEN_QUOTE: &str = r#"["“'‘]?"#;

/// The shapes a threat name is introduced with in running text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameHeuristic {
    /// `dubbed X`, `named X`, `called X`
    Dubbed,
    /// `X is a remote code execution vulnerability`
    Descriptive,
    /// `X ransomware targets ...`
    NounVerb,
    /// `also known as X`, `aka X`
    AlsoKnownAs,
    /// `"X"`
    Quoted,
    /// `group known as X`, `actor tracked as X`
    ActorAlias,
}

static HEURISTICS: LazyLock<Vec<(NameHeuristic, Regex)>> = LazyLock::new(|| {
    let patterns = [
        (
            NameHeuristic::Dubbed,
            format!(r"\b(?:dubbed|named|called|codenamed)\s+{OPEN_QUOTE}(?P<name>{NAME})"),
        ),
        (
            NameHeuristic::Descriptive,
            format!(
                r"(?P<name>{NAME})\s+is\s+an?\s+(?:[\w-]+\s+){{0,4}}?(?:vulnerability|flaw|bug|zero-day|ransomware|malware|exploit|trojan|backdoor|botnet|loader|stealer)\b"
            ),
        ),
        (
            NameHeuristic::NounVerb,
            format!(
                r"(?P<name>{NAME})\s+(?i:ransomware|malware|trojan|backdoor|botnet|loader|stealer|infostealer|worm|spyware|exploit|vulnerability|flaw|zero-day)\s+(?:\w+\s+){{0,3}}?(?i:targets?|hits?|exploits?|attacks?|uses?|abuses?|infects?|spreads?|steals?|affects?|allows?|enables?|encrypts?|was|has|is)\b"
            ),
        ),
        (
            NameHeuristic::AlsoKnownAs,
            format!(r"\b(?i:also\s+known\s+as|a\.k\.a\.?|aka)\s+{OPEN_QUOTE}(?P<name>{NAME})"),
        ),
        (NameHeuristic::Quoted, format!(r#"["“](?P<name>{NAME})["”]"#)),
        (
            NameHeuristic::ActorAlias,
            format!(
                r"(?i:group|actor|gang|operators?|apt)\s+(?i:known|tracked|identified|referred\s+to)\s+as\s+{OPEN_QUOTE}(?P<name>{NAME})"
            ),
        ),
    ];

    patterns
        .into_iter()
        .map(|(heuristic, pattern)| (heuristic, Regex::new(&pattern).unwrap()))
        .collect()
});

const LEADING_WORDS: &[&str] = &["the", "a", "an", "this", "that", "new", "these"];

const STOPLIST: &[&str] = &[
    "according", "advisory", "after", "also", "apple", "attack", "attackers", "attacks", "cisa", "cisco",
    "company", "critical", "customers", "cve", "cybersecurity", "exploit", "google", "hackers", "however",
    "malware", "microsoft", "patch", "ransomware", "report", "researchers", "security", "severity",
    "threat", "today", "update", "users", "vendor", "vulnerability", "when", "while", "windows", "zero-day",
    "january", "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Shortest accepted name.
pub const MIN_NAME_CHARS: usize = 4;

/// Normalizes a raw capture and rejects names that are obviously not threat names.
pub fn clean_candidate(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c: char| "\"“”'‘’".contains(c));
    let trimmed = trimmed.trim_end_matches(['.', ',', ';', ':', '-']);

    let mut words: Vec<&str> = trimmed.split_whitespace().collect();
    while words.len() > 1 && LEADING_WORDS.contains(&words[0].to_lowercase().as_str()) {
        words.remove(0);
    }
    let name = words.join(" ");
    let lower = name.to_lowercase();
    let first = lower.split(' ').next().unwrap_or_default();

    let rejected = name.chars().count() < MIN_NAME_CHARS
        || lower.starts_with("cve-")
        || STOPLIST.contains(&lower.as_str())
        || STOPLIST.contains(&first)
        || LEADING_WORDS.contains(&lower.as_str())
        || name.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-');

    if rejected { None } else { Some(name) }
}

/// Candidate names in `window`, heuristic by heuristic and in position order
/// within each.
pub fn candidate_names(window: &str) -> Vec<(NameHeuristic, String)> {
    HEURISTICS
        .iter()
        .flat_map(|(heuristic, re)| {
            re.captures_iter(window)
                .filter_map(|c| clean_candidate(&c["name"]))
                .map(move |name| (*heuristic, name))
        })
        .collect()
}

/// Decides which candidate threat names are kept.
pub trait ThreatNamePolicy: Send + Sync {
    /// Whether a pattern-derived candidate is well supported by `body`.
    fn accepts(&self, name: &str, body: &str) -> bool;

    /// Whether a name must be dropped regardless of where it came from.
    fn is_blocked(&self, name: &str) -> bool;
}

impl<P: ThreatNamePolicy + ?Sized> ThreatNamePolicy for Box<P> {
    fn accepts(&self, name: &str, body: &str) -> bool {
        (**self).accepts(name, body)
    }

    fn is_blocked(&self, name: &str) -> bool {
        (**self).is_blocked(name)
    }
}

/// Accepts names that occur at least `min_occurrences` times, spelled exactly,
/// as whole words. Blocks names containing any of `blocked_tokens`
/// (case-insensitive).
///
/// ```rust
/// use threatscope_core::analysis::{OccurrencePolicy, ThreatNamePolicy};
///
/// let policy = OccurrencePolicy::default();
/// assert!(policy.accepts("Akira", "Akira struck again. Akira operators"));
/// assert!(!policy.accepts("Akira", "Akira struck once."));
/// assert!(!policy.accepts("Akira", "Akira struck. akira again."));
/// assert!(policy.is_blocked("Weekly Newsletter"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccurrencePolicy {
    pub min_occurrences: usize,
    pub blocked_tokens: Vec<String>,
}

impl Default for OccurrencePolicy {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            blocked_tokens: vec!["Newsletter".to_string(), "Subscribe".to_string(), "Webinar".to_string()],
        }
    }
}

impl OccurrencePolicy {
    /// Whole-word, case-sensitive occurrences of `name` in `body`.
    pub fn occurrences(name: &str, body: &str) -> usize {
        match Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
            Ok(re) => re.find_iter(body).count(),
            Err(_) => 0,
        }
    }
}

impl ThreatNamePolicy for OccurrencePolicy {
    fn accepts(&self, name: &str, body: &str) -> bool {
        Self::occurrences(name, body) >= self.min_occurrences
    }

    fn is_blocked(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.blocked_tokens
            .iter()
            .any(|token| !token.is_empty() && lower.contains(&token.to_lowercase()))
    }
}
