//! Technical details section and indicator-of-compromise extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::model::ThreatRecord;
use super::text::split_sentences;
use crate::clean::clean_inline;
use crate::date::first_match;

pub const NO_DETAILS: &str = "No technical details available for this article.";

/// Most indicators listed.
pub const MAX_IOCS: usize = 3;

/// Sentences of the description taken from the body.
const MAX_DESCRIPTION_SENTENCES: usize = 3;

/// URLs on these hosts are references, not indicators.
const NEWS_DOMAINS: &[&str] = &[
    "bleepingcomputer.com",
    "thehackernews.com",
    "securityweek.com",
    "krebsonsecurity.com",
    "darkreading.com",
    "theregister.com",
    "therecord.media",
    "zdnet.com",
    "wired.com",
    "arstechnica.com",
    "techcrunch.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "facebook.com",
    "youtube.com",
    "cisa.gov",
    "nist.gov",
    "cve.org",
    "mitre.org",
    "microsoft.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IocKind {
    Sha256,
    Sha1,
    Md5,
    Url,
    WindowsPath,
    RegistryKey,
    Ipv4,
}

const IOC_PATTERNS: &[(IocKind, &str)] = &[
    (IocKind::Sha256, r"\b[a-fA-F0-9]{64}\b"),
    (IocKind::Sha1, r"\b[a-fA-F0-9]{40}\b"),
    (IocKind::Md5, r"\b[a-fA-F0-9]{32}\b"),
    (IocKind::Url, r#"\bhttps?://[^\s"'<>()\[\]]+"#),
    (IocKind::WindowsPath, r#"\b[A-Za-z]:\\(?:[^\\\s/:*?"<>|]+\\)*[^\\\s/:*?"<>|,;]+"#),
    (
        IocKind::RegistryKey,
        r#"\b(?:HKLM|HKCU|HKCR|HKU|HKEY_LOCAL_MACHINE|HKEY_CURRENT_USER|HKEY_CLASSES_ROOT|HKEY_USERS)\\[^\s"',;]+"#,
    ),
    (
        IocKind::Ipv4,
        r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b",
    ),
];

static IOC_RES: LazyLock<Vec<(IocKind, Regex)>> = LazyLock::new(|| {
    IOC_PATTERNS
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(pattern).unwrap()))
        .collect()
});

static AUTHORSHIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:written\s+by|posted\s+by|reported\s+by|published\s+(?:on|by)|updated\s+on|last\s+updated|author)\b|^by\s+[A-Z]",
    )
    .unwrap()
});

/// An indicator of compromise found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ioc {
    pub kind: IocKind,
    pub value: String,
}

fn is_news_host(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return true;
    };
    let Some(host) = parsed.host_str() else {
        return true;
    };
    let host = host.to_lowercase();
    NEWS_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

/// Indicators in order of first appearance, de-duplicated, at most `MAX_IOCS`.
pub fn extract_iocs(text: &str) -> Vec<Ioc> {
    let mut found: Vec<(usize, Ioc)> = Vec::new();

    for (kind, re) in IOC_RES.iter() {
        for m in re.find_iter(text) {
            let value = m.as_str().trim_end_matches(['.', ',', ';', ':']);
            if *kind == IocKind::Url && is_news_host(value) {
                continue;
            }
            found.push((m.start(), Ioc { kind: *kind, value: value.to_string() }));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, ioc)| ioc)
        .filter(|ioc| seen.insert(ioc.value.clone()))
        .filter(|ioc| ioc.kind != IocKind::Ipv4 || !inside_url(text, &ioc.value))
        .take(MAX_IOCS)
        .collect()
}

/// An IPv4 that only appears as a URL host is already covered by the URL.
fn inside_url(text: &str, ip: &str) -> bool {
    text.matches(ip).count() == text.matches(&format!("//{ip}")).count()
}

fn is_byline_sentence(sentence: &str) -> bool {
    if AUTHORSHIP_RE.is_match(sentence) {
        return true;
    }
    first_match(sentence).is_some_and(|(_, date)| sentence.trim_start().starts_with(date))
}

/// Description of the primary threat: body sentences that mention it,
/// falling back to its stored details, with byline sentences removed.
fn description(body: &str, primary: &ThreatRecord) -> String {
    let keys: Vec<String> = std::iter::once(primary.name.to_lowercase())
        .chain(primary.cve.iter().map(|c| c.to_lowercase()))
        .collect();

    let mentions: Vec<&str> = split_sentences(body)
        .into_iter()
        .filter(|s| !is_byline_sentence(s))
        .filter(|s| {
            let lower = s.to_lowercase();
            keys.iter().any(|k| lower.contains(k.as_str()))
        })
        .take(MAX_DESCRIPTION_SENTENCES)
        .collect();

    if mentions.is_empty() {
        let kept: Vec<&str> = split_sentences(&primary.details)
            .into_iter()
            .filter(|s| !is_byline_sentence(s))
            .collect();
        return clean_inline(&kept.join(" "));
    }

    clean_inline(&mentions.join(" "))
}

/// The technical details section for the primary threat.
///
/// ```text
/// EXPLOIT DETAILS:
/// CVE: CVE-2024-1234
/// <description>
///
/// INDICATORS OF COMPROMISE:
/// - <ioc>
/// ```
pub fn technical_details(body: &str, threats: &[ThreatRecord]) -> String {
    let Some(primary) = threats.first() else {
        return NO_DETAILS.to_string();
    };

    let mut out = String::from("EXPLOIT DETAILS:\n");
    if let Some(cve) = &primary.cve {
        out.push_str(&format!("CVE: {cve}\n"));
    }

    let description = description(body, primary);
    if description.is_empty() {
        out.push_str(&format!("{} ({})\n", primary.name, primary.kind));
    } else {
        out.push_str(&description);
        out.push('\n');
    }

    out.push_str("\nINDICATORS OF COMPROMISE:\n");
    let iocs = extract_iocs(body);
    if iocs.is_empty() {
        out.push_str("- None listed in the article");
    } else {
        let lines: Vec<String> = iocs.iter().map(|ioc| format!("- {}", ioc.value)).collect();
        out.push_str(&lines.join("\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::ThreatKind;

    fn threat(name: &str, cve: Option<&str>) -> ThreatRecord {
        ThreatRecord {
            kind: ThreatKind::Vulnerability,
            name: name.to_string(),
            details: format!("{name} was disclosed."),
            cve: cve.map(str::to_string),
        }
    }

    #[test]
    fn test_iocs_in_order_of_appearance() {
        let text = "Beacon to 203.0.113.7 then drop C:\\Users\\Public\\svc.exe. \
                    Hash 44d88612fea8a8f36de82e1278abb02f. Again 203.0.113.7.";
        let values: Vec<String> = extract_iocs(text).into_iter().map(|i| i.value).collect();

        assert_eq!(values, vec!["203.0.113.7", "C:\\Users\\Public\\svc.exe", "44d88612fea8a8f36de82e1278abb02f"]);
    }

    #[test]
    fn test_iocs_skip_news_urls() {
        let text = "Source: https://www.bleepingcomputer.com/news/x. Payload at http://evil.example.net/a.ps1.";
        let iocs = extract_iocs(text);

        assert_eq!(iocs.len(), 1);
        assert_eq!(iocs[0].kind, IocKind::Url);
        assert_eq!(iocs[0].value, "http://evil.example.net/a.ps1");
    }

    #[test]
    fn test_iocs_hash_kinds_do_not_overlap() {
        let sha256 = "a".repeat(64);
        let iocs = extract_iocs(&format!("hash {sha256} seen"));

        assert_eq!(iocs.len(), 1);
        assert_eq!(iocs[0].kind, IocKind::Sha256);
    }

    #[test]
    fn test_iocs_capped() {
        let text = "1.1.1.1 2.2.2.2 3.3.3.3 4.4.4.4";
        assert_eq!(extract_iocs(text).len(), MAX_IOCS);
    }

    #[test]
    fn test_registry_key() {
        let iocs = extract_iocs(r"Persistence via HKCU\Software\Microsoft\Windows\CurrentVersion\Run, then exit.");
        assert_eq!(iocs[0].kind, IocKind::RegistryKey);
        assert_eq!(iocs[0].value, r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run");
    }

    #[test]
    fn test_technical_details_layout() {
        let body = "Written by Jane Doe. CVE-2024-1234 lets attackers run code. Hosts contacted 198.51.100.4.";
        let details = technical_details(body, &[threat("RCE Vulnerability", Some("CVE-2024-1234"))]);

        assert!(details.starts_with("EXPLOIT DETAILS:\nCVE: CVE-2024-1234\n"));
        assert!(details.contains("CVE-2024-1234 lets attackers run code."));
        assert!(!details.contains("Jane Doe"));
        assert!(details.ends_with("INDICATORS OF COMPROMISE:\n- 198.51.100.4"));
    }

    #[test]
    fn test_technical_details_falls_back_to_stored_details() {
        let details = technical_details("Nothing relevant here.", &[threat("Gootkit", None)]);
        assert!(details.contains("Gootkit was disclosed."));
        assert!(!details.contains("CVE:"));
        assert!(details.ends_with("- None listed in the article"));
    }

    #[test]
    fn test_no_threats() {
        assert_eq!(technical_details("anything", &[]), NO_DETAILS);
    }
}
