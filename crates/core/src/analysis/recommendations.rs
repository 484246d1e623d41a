use super::model::{ProductRecord, Severity, ThreatKind, ThreatRecord};

pub const SOURCES_FOOTER: &str =
    "Sources: vendor security advisories, the CISA Known Exploited Vulnerabilities catalog and NIST NVD.";

/// Products named in the product action line.
const MAX_ACTION_PRODUCTS: usize = 2;

const BACKUP_LINE: &str = "- Verify offline backups are current and test restoration procedures";
const MITIGATION_LINE: &str = "- Apply emergency mitigations or workarounds until an official patch ships";

/// Product names that earn a product action line.
const ACTION_KEYWORDS: &[&str] = &["exchange", "windows", "azure"];

/// One line naming at most [`MAX_ACTION_PRODUCTS`] matched products.
fn product_action(products: &[ProductRecord]) -> Option<String> {
    let named: Vec<&str> = products
        .iter()
        .filter(|p| {
            let name = p.name.to_lowercase();
            ACTION_KEYWORDS.iter().any(|k| name.contains(k))
        })
        .map(|p| p.name.as_str())
        .take(MAX_ACTION_PRODUCTS)
        .collect();

    (!named.is_empty()).then(|| {
        format!(
            "- PRODUCT ACTIONS: install the latest Microsoft security updates for {} and review exposed management interfaces",
            named.join(" and ")
        )
    })
}

const CRITICAL_STEPS: &[&str] = &[
    "- Patch or mitigate affected systems immediately",
    "- Isolate exposed systems until remediation is confirmed",
    "- Hunt for indicators of compromise across the environment",
    "- Engage your incident response team",
];

const HIGH_STEPS: &[&str] = &[
    "- Schedule patching of affected systems within days",
    "- Increase monitoring of exposed services",
    "- Review access logs for suspicious activity",
];

const MEDIUM_STEPS: &[&str] = &[
    "- Apply updates during the next maintenance window",
    "- Confirm security controls cover the described techniques",
];

const LOW_STEPS: &[&str] = &["- Keep systems up to date", "- Share awareness of the issue with relevant teams"];

fn checklist(severity: Severity) -> (&'static str, &'static [&'static str]) {
    match severity {
        Severity::Critical => ("IMMEDIATE ACTION REQUIRED:", CRITICAL_STEPS),
        Severity::High => ("PRIORITY ACTIONS:", HIGH_STEPS),
        Severity::Medium => ("RECOMMENDED ACTIONS:", MEDIUM_STEPS),
        Severity::Low => ("GENERAL GUIDANCE:", LOW_STEPS),
    }
}

/// Checklist for the severity tier, threat-specific bullets, product action
/// lines and the sources footer last.
pub fn recommendations(severity: Severity, threats: &[ThreatRecord], products: &[ProductRecord]) -> String {
    let product_line = product_action(products);
    let (header, bullets) = checklist(severity);
    let mut lines: Vec<&str> = vec![header];
    lines.extend_from_slice(bullets);

    if threats.iter().any(|t| t.kind == ThreatKind::Ransomware) {
        lines.push(BACKUP_LINE);
    }
    if threats.iter().any(|t| t.kind == ThreatKind::ZeroDay) {
        lines.push(MITIGATION_LINE);
    }
    if let Some(line) = &product_line {
        lines.push(line);
    }

    lines.push("");
    lines.push(SOURCES_FOOTER);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str) -> ProductRecord {
        ProductRecord { name: name.to_string(), versions: None, icon: String::new() }
    }

    fn threat(kind: ThreatKind) -> ThreatRecord {
        ThreatRecord { kind, name: "Sample".to_string(), details: String::new(), cve: None }
    }

    #[test]
    fn test_tier_header_and_footer() {
        let text = recommendations(Severity::Critical, &[], &[]);
        assert!(text.starts_with("IMMEDIATE ACTION REQUIRED:"));
        assert!(text.ends_with(SOURCES_FOOTER));

        assert!(recommendations(Severity::Low, &[], &[]).starts_with("GENERAL GUIDANCE:"));
    }

    #[test]
    fn test_threat_specific_bullets() {
        let text = recommendations(Severity::High, &[threat(ThreatKind::Ransomware), threat(ThreatKind::ZeroDay)], &[]);
        assert!(text.contains(BACKUP_LINE));
        assert!(text.contains(MITIGATION_LINE));

        let plain = recommendations(Severity::High, &[threat(ThreatKind::Malware)], &[]);
        assert!(!plain.contains(BACKUP_LINE));
        assert!(!plain.contains(MITIGATION_LINE));
    }

    #[test]
    fn test_single_product_line_names_two_products() {
        let products = [product("Azure"), product("Chrome"), product("Windows"), product("Exchange Server")];
        let text = recommendations(Severity::Medium, &[], &products);

        let action_lines: Vec<&str> = text.lines().filter(|l| l.contains("PRODUCT ACTIONS")).collect();
        assert_eq!(action_lines.len(), 1);
        assert!(action_lines[0].contains("Azure and Windows"));
        assert!(!action_lines[0].contains("Exchange Server"));
        assert!(!action_lines[0].contains("Chrome"));
        assert!(text.ends_with(SOURCES_FOOTER));
    }

    #[test]
    fn test_no_product_line_without_matching_products() {
        let text = recommendations(Severity::Medium, &[], &[product("Chrome")]);
        assert!(!text.contains("PRODUCT ACTIONS"));
    }
}
