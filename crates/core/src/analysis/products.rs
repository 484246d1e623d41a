//! Product detection over a declarative pattern table.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::model::ProductRecord;
use super::text::after;
use crate::clean::{MAX_LABEL_CHARS, truncate_label};

/// Bytes after a product mention searched for a version.
const VERSION_WINDOW: usize = 200;

struct ProductSpec {
    name: &'static str,
    pattern: &'static str,
    icon: &'static str,
}

const PRODUCTS: &[ProductSpec] = &[
    ProductSpec {
        name: "Exchange Server",
        pattern: r"(?i)\b(?:microsoft\s+exchange|exchange\s+server|exchange\s+online)\b",
        icon: "📧",
    },
    ProductSpec { name: "SharePoint", pattern: r"(?i)\bsharepoint\b", icon: "🗂️" },
    ProductSpec { name: "Azure", pattern: r"\b(?:Microsoft\s+)?(?:Azure|Entra\s+ID)\b", icon: "☁️" },
    ProductSpec {
        name: "Microsoft Office",
        pattern: r"\b(?:Microsoft\s+Office|Office\s+365|Microsoft\s+365)\b",
        icon: "📄",
    },
    ProductSpec { name: "Outlook", pattern: r"\bOutlook\b", icon: "✉️" },
    ProductSpec { name: "Windows", pattern: r"\bWindows\b", icon: "🪟" },
    ProductSpec { name: "Google Chrome", pattern: r"(?i)\b(?:google\s+)?chrome\b|\bchromium\b", icon: "🌐" },
    ProductSpec { name: "Mozilla Firefox", pattern: r"(?i)\bfirefox\b", icon: "🦊" },
    ProductSpec { name: "iOS", pattern: r"\b(?:iOS|iPadOS)\b", icon: "📱" },
    ProductSpec { name: "macOS", pattern: r"(?i)\bmacos\b|\bmac\s+os\s+x\b", icon: "🍎" },
    ProductSpec { name: "Android", pattern: r"\bAndroid\b", icon: "🤖" },
    ProductSpec { name: "Linux Kernel", pattern: r"(?i)\blinux\s+kernel\b", icon: "🐧" },
    ProductSpec { name: "Apache HTTP Server", pattern: r"(?i)\bapache\s+(?:http\s+server|httpd)\b", icon: "🪶" },
    ProductSpec { name: "Apache Log4j", pattern: r"(?i)\blog4j2?\b|\blog4shell\b", icon: "📜" },
    ProductSpec { name: "Cisco", pattern: r"(?i)\bcisco\b", icon: "🔌" },
    ProductSpec {
        name: "Fortinet",
        pattern: r"(?i)\bfortinet\b|\bforti(?:os|gate|web|manager|client|proxy)\b",
        icon: "🛡️",
    },
    ProductSpec { name: "VMware", pattern: r"(?i)\bvmware\b|\besxi\b|\bvcenter\b", icon: "🖥️" },
    ProductSpec { name: "Citrix", pattern: r"(?i)\bcitrix\b|\bnetscaler\b", icon: "🔗" },
    ProductSpec { name: "Ivanti", pattern: r"(?i)\bivanti\b", icon: "🔐" },
    ProductSpec {
        name: "Palo Alto PAN-OS",
        pattern: r"(?i)\bpan-os\b|\bpalo\s+alto\s+networks\b|\bglobalprotect\b",
        icon: "🧱",
    },
    ProductSpec { name: "WordPress", pattern: r"(?i)\bwordpress\b", icon: "📝" },
    ProductSpec { name: "Oracle", pattern: r"(?i)\boracle\b", icon: "🗄️" },
    ProductSpec {
        name: "Adobe",
        pattern: r"(?i)\badobe\s+(?:acrobat|reader|coldfusion|commerce|experience\s+manager)\b|\bacrobat\b",
        icon: "🎨",
    },
];

static PRODUCT_PATTERNS: LazyLock<Vec<(&'static ProductSpec, Regex)>> = LazyLock::new(|| {
    PRODUCTS
        .iter()
        .map(|spec| (spec, Regex::new(spec.pattern).unwrap()))
        .collect()
});

/// How a version string was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionShape {
    /// `version 2.4` or `versions 10 through 12`
    Explicit,
    /// `v3.1.2`
    Prefixed,
    /// `16.0.1`
    Dotted,
    /// `Exchange Server 2019`
    ProductYear,
    /// `2016-2019`
    YearRange,
}

const VERSION_SHAPES: &[(VersionShape, &str)] = &[
    (
        VersionShape::Explicit,
        r"(?i)\bversions?\s+(\d+(?:\.\d+)*(?:\s*(?:and|through|to|-)\s*\d+(?:\.\d+)*)?)",
    ),
    (VersionShape::Prefixed, r"\b(v\d+(?:\.\d+)+)\b"),
    (VersionShape::Dotted, r"\b(\d+\.\d+(?:\.\d+)*)\b"),
    (VersionShape::ProductYear, r"^\s*((?:19|20)\d{2})\b"),
    (VersionShape::YearRange, r"\b((?:19|20)\d{2}\s*(?:-|–|to|through)\s*(?:19|20)\d{2})\b"),
];

static VERSION_PATTERNS: LazyLock<Vec<(VersionShape, Regex)>> = LazyLock::new(|| {
    VERSION_SHAPES
        .iter()
        .map(|(shape, pattern)| (*shape, Regex::new(pattern).unwrap()))
        .collect()
});

/// First version found in `window`, by shape priority.
pub fn find_version(window: &str) -> Option<(VersionShape, String)> {
    VERSION_PATTERNS
        .iter()
        .find_map(|(shape, re)| re.captures(window).map(|c| (*shape, c[1].trim().to_string())))
}

/// Products mentioned in `text`, in order of first mention.
pub fn detect_products(text: &str) -> Vec<ProductRecord> {
    let mut found: Vec<(usize, ProductRecord)> = PRODUCT_PATTERNS
        .iter()
        .filter_map(|(spec, re)| {
            let m = re.find(text)?;
            let versions = find_version(after(text, m.end(), VERSION_WINDOW)).map(|(_, v)| v);
            Some((
                m.start(),
                ProductRecord {
                    name: truncate_label(spec.name, MAX_LABEL_CHARS),
                    versions,
                    icon: spec.icon.to_string(),
                },
            ))
        })
        .collect();

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, product)| product).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("affects version 2.4.1 and later", VersionShape::Explicit, "2.4.1")]
    #[case("versions 10 through 12 are affected", VersionShape::Explicit, "10 through 12")]
    #[case("fixed in v3.1.2 today", VersionShape::Prefixed, "v3.1.2")]
    #[case("builds before 16.0.1 are exposed", VersionShape::Dotted, "16.0.1")]
    #[case(" 2019 Cumulative Update", VersionShape::ProductYear, "2019")]
    #[case(" editions shipped 2016-2019", VersionShape::YearRange, "2016-2019")]
    fn test_find_version(#[case] window: &str, #[case] shape: VersionShape, #[case] expected: &str) {
        assert_eq!(find_version(window), Some((shape, expected.to_string())));
    }

    #[test]
    fn test_find_version_none() {
        assert_eq!(find_version(" administrators should patch now"), None);
    }

    #[test]
    fn test_detect_products_in_mention_order() {
        let text = "Attackers used Windows hosts to reach Exchange Server 2019 installations.";
        let products = detect_products(text);
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Windows", "Exchange Server"]);
        assert_eq!(products[1].versions.as_deref(), Some("2019"));
        assert_eq!(products[1].icon, "📧");
    }

    #[test]
    fn test_detect_products_first_match_only() {
        let text = "Chrome 120.0.6099 fixes the bug. Chrome is updated automatically.";
        let products = detect_products(text);

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].versions.as_deref(), Some("120.0.6099"));
    }

    #[test]
    fn test_lowercase_exchange_is_not_a_product() {
        assert!(detect_products("a threat intelligence exchange between vendors").is_empty());
    }
}
