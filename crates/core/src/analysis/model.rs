use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a detected threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreatKind {
    ZeroDay,
    Vulnerability,
    Ransomware,
    Malware,
    Exploit,
    Other,
}

impl ThreatKind {
    /// Sort rank among threats. Lower ranks sort first.
    pub fn rank(self) -> u8 {
        match self {
            ThreatKind::ZeroDay => 0,
            ThreatKind::Ransomware => 1,
            ThreatKind::Vulnerability => 2,
            ThreatKind::Malware => 3,
            ThreatKind::Exploit => 4,
            ThreatKind::Other => 5,
        }
    }

    /// Serialized type tag.
    pub fn tag(self) -> &'static str {
        match self {
            ThreatKind::ZeroDay => "zero-day",
            ThreatKind::Vulnerability => "vulnerability",
            ThreatKind::Ransomware => "ransomware",
            ThreatKind::Malware => "malware",
            ThreatKind::Exploit => "exploit",
            ThreatKind::Other => "other",
        }
    }

    /// Maps a threat noun found in text ("ransomware", "flaw", "botnet") to a kind.
    pub fn from_noun(noun: &str) -> Self {
        match noun.to_lowercase().as_str() {
            "zero-day" | "zero day" | "0-day" | "0day" => ThreatKind::ZeroDay,
            "vulnerability" | "vulnerabilities" | "flaw" | "flaws" | "bug" => ThreatKind::Vulnerability,
            "ransomware" => ThreatKind::Ransomware,
            "exploit" | "exploits" => ThreatKind::Exploit,
            "malware" | "trojan" | "backdoor" | "botnet" | "stealer" | "infostealer" | "loader" | "worm"
            | "spyware" | "rootkit" => ThreatKind::Malware,
            _ => ThreatKind::Other,
        }
    }
}

impl fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named threat found in an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatRecord {
    #[serde(rename = "type")]
    pub kind: ThreatKind,
    pub name: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cve: Option<String>,
}

/// A product mentioned in an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub versions: Option<String>,
    pub icon: String,
}

/// Overall severity. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the analyzer derives from an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub severity: Severity,
    pub technical_details: String,
    pub recommendations: String,
    pub products: Vec<ProductRecord>,
    pub threats: Vec<ThreatRecord>,
}

impl Analysis {
    /// The first-ranked threat, if any.
    pub fn primary_threat(&self) -> Option<&ThreatRecord> {
        self.threats.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threat_kind_tags() {
        assert_eq!(serde_json::to_string(&ThreatKind::ZeroDay).unwrap(), "\"zero-day\"");
        assert_eq!(serde_json::to_string(&ThreatKind::Other).unwrap(), "\"other\"");
        assert_eq!(ThreatKind::ZeroDay.tag(), "zero-day");
    }

    #[test]
    fn test_threat_record_serializes_kind_as_type() {
        let record = ThreatRecord {
            kind: ThreatKind::Ransomware,
            name: "BlackCat".to_string(),
            details: "d".to_string(),
            cve: None,
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "ransomware");
        assert!(json.get("cve").is_none());
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::High.to_string(), "high");
    }

    #[test]
    fn test_from_noun() {
        assert_eq!(ThreatKind::from_noun("Ransomware"), ThreatKind::Ransomware);
        assert_eq!(ThreatKind::from_noun("botnet"), ThreatKind::Malware);
        assert_eq!(ThreatKind::from_noun("flaw"), ThreatKind::Vulnerability);
        assert_eq!(ThreatKind::from_noun("campaign"), ThreatKind::Other);
    }
}
