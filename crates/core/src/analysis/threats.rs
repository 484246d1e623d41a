//! Threat detection: CVE-anchored, pattern-anchored and title-derived.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::model::{ThreatKind, ThreatRecord};
use super::naming::{NAME, OPEN_QUOTE, ThreatNamePolicy, candidate_names, clean_candidate};
use super::text::{sentence_around, window};
use crate::clean::{MAX_LABEL_CHARS, clean_inline, truncate_label};

/// Most threats reported per article.
pub const MAX_THREATS: usize = 3;

const CVE_BEFORE: usize = 150;
const CVE_AFTER: usize = 300;
const PATTERN_BEFORE: usize = 200;
const PATTERN_AFTER: usize = 400;

static CVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bCVE-\d{4}-\d{4,7}\b").unwrap());

static BULLETIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:MS\d{2}-\d{3}|KB\d{6,7}|ADV\d{6}|APSB\d{2}-\d{2}|VMSA-\d{4}-\d{4}|RHSA-\d{4}:\d{4,5}|DSA-\d{4}-\d)\b")
        .unwrap()
});

struct CategorySpec {
    kind: ThreatKind,
    pattern: &'static str,
}

/// Checked in order. The first category whose pattern matches wins.
const CATEGORIES: &[CategorySpec] = &[
    CategorySpec { kind: ThreatKind::ZeroDay, pattern: r"(?i)\bzero[- ]?days?\b|\b0-?days?\b" },
    CategorySpec {
        kind: ThreatKind::Vulnerability,
        pattern: r"(?i)\bvulnerabilit(?:y|ies)\b|\bflaws?\b|\bsecurity\s+(?:bug|issue|hole)s?\b",
    },
    CategorySpec { kind: ThreatKind::Ransomware, pattern: r"(?i)\bransomware\b" },
    CategorySpec {
        kind: ThreatKind::Malware,
        pattern: r"(?i)\b(?:malware|trojan|backdoor|botnet|infostealer|stealer|spyware|rootkit|worm)s?\b",
    },
    CategorySpec { kind: ThreatKind::Exploit, pattern: r"(?i)\bexploit(?:s|ed|ation)?\b|\bproof[- ]of[- ]concept\b" },
];

static CATEGORY_PATTERNS: LazyLock<Vec<(ThreatKind, Regex)>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .map(|spec| (spec.kind, Regex::new(spec.pattern).unwrap()))
        .collect()
});

struct ClassSpec {
    label: &'static str,
    pattern: &'static str,
}

const VULNERABILITY_CLASSES: &[ClassSpec] = &[
    ClassSpec {
        label: "RCE Vulnerability",
        pattern: r"(?i)\bremote\s+code\s+execution\b|\bRCE\b|\barbitrary\s+code\b",
    },
    ClassSpec {
        label: "Privilege Escalation",
        pattern: r"(?i)\bprivilege\s+escalation\b|\belevation\s+of\s+privilege\b|\bEoP\b|\bLPE\b",
    },
    ClassSpec {
        label: "Info Disclosure",
        pattern: r"(?i)\binformation\s+disclosure\b|\binfo(?:rmation)?\s+leak\b|\bdata\s+exposure\b",
    },
    ClassSpec { label: "DoS Vulnerability", pattern: r"(?i)\bdenial[- ]of[- ]service\b|\bDoS\b" },
];

static CLASS_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    VULNERABILITY_CLASSES
        .iter()
        .map(|spec| (spec.label, Regex::new(spec.pattern).unwrap()))
        .collect()
});

const THREAT_NOUNS: &str = "ransomware|malware|botnet|trojan|backdoor|infostealer|stealer|loader|worm|spyware|rootkit|zero-day|vulnerability|flaw|exploit";

static TITLE_NAME_NOUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?P<name>{NAME})\s+(?P<noun>(?i:{THREAT_NOUNS}))\b")).unwrap()
});

static TITLE_NOUN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<noun>(?i:{THREAT_NOUNS}|campaign))\s+(?i:dubbed|named|called)\s+{OPEN_QUOTE}(?P<name>{NAME})"
    ))
    .unwrap()
});

/// Category of the text around a mention. Defaults to vulnerability.
pub fn categorize(context: &str) -> ThreatKind {
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(context))
        .map_or(ThreatKind::Vulnerability, |(kind, _)| *kind)
}

/// Vulnerability-class label for the text around a CVE.
pub fn vulnerability_class(context: &str) -> Option<&'static str> {
    CLASS_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(context))
        .map(|(label, _)| *label)
}

/// Name for a CVE: a bulletin id nearby, else a vulnerability class, else
/// `Security Issue <suffix>`.
pub fn cve_name(cve: &str, context: &str) -> String {
    if let Some(bulletin) = BULLETIN_RE.find(context) {
        return bulletin.as_str().to_string();
    }
    if let Some(label) = vulnerability_class(context) {
        return label.to_string();
    }
    let suffix = cve.rsplit('-').next().unwrap_or(cve);
    format!("Security Issue {suffix}")
}

fn sentence_details(text: &str, pos: usize) -> Option<String> {
    sentence_around(text, pos).map(clean_inline).filter(|s| !s.is_empty())
}

/// One record per distinct CVE identifier, in order of first mention.
pub fn cve_threats(text: &str) -> Vec<ThreatRecord> {
    let mut seen = HashSet::new();
    let mut threats = Vec::new();

    for m in CVE_RE.find_iter(text) {
        let cve = m.as_str().to_uppercase();
        if !seen.insert(cve.clone()) {
            continue;
        }

        let context = window(text, m.start(), m.end(), CVE_BEFORE, CVE_AFTER);
        let kind = categorize(context);
        let details = sentence_details(text, m.start())
            .unwrap_or_else(|| format!("{cve} is a {kind} referenced in this report."));

        threats.push(ThreatRecord { kind, name: cve_name(&cve, context), details, cve: Some(cve) });
    }

    threats
}

/// Named threats found near category keywords and accepted by `policy`.
pub fn pattern_threats(body: &str, policy: &dyn ThreatNamePolicy) -> Vec<ThreatRecord> {
    let mut threats = Vec::new();
    let mut judged: HashSet<String> = HashSet::new();

    for (kind, re) in CATEGORY_PATTERNS.iter() {
        for m in re.find_iter(body) {
            let context = window(body, m.start(), m.end(), PATTERN_BEFORE, PATTERN_AFTER);

            let accepted = candidate_names(context).into_iter().find_map(|(_, name)| {
                if !judged.insert(name.to_lowercase()) {
                    return None;
                }
                policy.accepts(&name, body).then_some(name)
            });

            if let Some(name) = accepted {
                let details = sentence_details(body, m.start()).unwrap_or_else(|| format!("{name} ({kind})."));
                threats.push(ThreatRecord { kind: *kind, name, details, cve: None });
            }
        }
    }

    threats
}

/// The threat the headline is about, if the headline names one.
pub fn title_threat(title: &str, body: &str, policy: &dyn ThreatNamePolicy) -> Option<ThreatRecord> {
    if let Some(m) = CVE_RE.find(title) {
        let cve = m.as_str().to_uppercase();
        let kind = categorize(title);
        let details = CVE_RE
            .find_iter(body)
            .find(|found| found.as_str().eq_ignore_ascii_case(&cve))
            .and_then(|found| sentence_details(body, found.start()))
            .unwrap_or_else(|| clean_inline(title));
        return Some(ThreatRecord { kind, name: cve_name(&cve, title), details, cve: Some(cve) });
    }

    let named = TITLE_NAME_NOUN_RE
        .captures_iter(title)
        .chain(TITLE_NOUN_NAME_RE.captures_iter(title))
        .find_map(|c| {
            let name = clean_candidate(&c["name"])?;
            (!policy.is_blocked(&name)).then(|| (name, ThreatKind::from_noun(&c["noun"])))
        });

    let (name, kind) = named?;
    let details = body
        .to_lowercase()
        .find(&name.to_lowercase())
        .and_then(|pos| sentence_details(body, pos))
        .unwrap_or_else(|| format!("{name} {kind} reported in this article."));

    Some(ThreatRecord { kind, name, details, cve: None })
}

fn represents(existing: &ThreatRecord, primary: &ThreatRecord) -> bool {
    if existing.cve.is_some() && existing.cve == primary.cve {
        return true;
    }
    let a = existing.name.to_lowercase();
    let b = primary.name.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Case-insensitive de-duplication by name, keeping the first record.
fn dedupe_by_name(threats: &mut Vec<ThreatRecord>) {
    let mut seen = HashSet::new();
    threats.retain(|t| seen.insert(t.name.to_lowercase()));
}

/// Detects, merges, ranks and caps the threats of an article.
pub fn detect_threats(title: &str, body: &str, policy: &dyn ThreatNamePolicy) -> Vec<ThreatRecord> {
    let text = if title.is_empty() { body.to_string() } else { format!("{title}\n{body}") };

    let mut threats = cve_threats(&text);
    threats.extend(pattern_threats(body, policy));
    dedupe_by_name(&mut threats);
    threats.retain(|t| !policy.is_blocked(&t.name));

    threats.sort_by(|a, b| {
        b.cve
            .is_some()
            .cmp(&a.cve.is_some())
            .then(a.kind.rank().cmp(&b.kind.rank()))
            .then(b.details.chars().count().cmp(&a.details.chars().count()))
    });

    // A headline threat already in the list keeps its ranked position.
    if let Some(primary) = title_threat(title, body, policy)
        && !threats.iter().any(|t| represents(t, &primary))
    {
        threats.insert(0, primary);
    }

    threats.truncate(MAX_THREATS);
    for threat in &mut threats {
        threat.name = truncate_label(&threat.name, MAX_LABEL_CHARS);
    }

    tracing::debug!(count = threats.len(), "threats detected");
    threats
}
