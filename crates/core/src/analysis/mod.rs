//! Threat, product and severity analysis of extracted article text.
//!
//! # Example
//!
//! ```rust
//! use threatscope_core::analysis::{Severity, ThreatKind, analyze};
//!
//! let analysis = analyze(
//!     "Emergency patch released",
//!     "CVE-2024-1234 critical vulnerability allows remote code execution in Exchange Server",
//! );
//!
//! let primary = analysis.primary_threat().unwrap();
//! assert_eq!(primary.cve.as_deref(), Some("CVE-2024-1234"));
//! assert_eq!(primary.kind, ThreatKind::Vulnerability);
//! assert!(analysis.severity >= Severity::High);
//! assert_eq!(analysis.products[0].name, "Exchange Server");
//! ```

pub mod details;
pub mod model;
pub mod naming;
pub mod products;
pub mod recommendations;
pub mod severity;
pub mod summary;
pub mod text;
pub mod threats;

pub use details::{Ioc, IocKind, extract_iocs, technical_details};
pub use model::{Analysis, ProductRecord, Severity, ThreatKind, ThreatRecord};
pub use naming::{OccurrencePolicy, ThreatNamePolicy};
pub use products::{VersionShape, detect_products};
pub use recommendations::recommendations;
pub use severity::{SeverityScores, score_severity};
pub use summary::summarize;
pub use threats::{MAX_THREATS, detect_threats};

use crate::article::ExtractedArticle;

/// Runs every analysis step over a title and body.
///
/// The threat-name policy is swappable; everything else is fixed pattern data.
pub struct Analyzer {
    policy: Box<dyn ThreatNamePolicy>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self { policy: Box::new(OccurrencePolicy::default()) }
    }

    /// Uses `policy` to gate pattern-derived threat names.
    pub fn with_policy(policy: impl ThreatNamePolicy + 'static) -> Self {
        Self { policy: Box::new(policy) }
    }

    /// Analyzes an article. Empty input yields a threat-free analysis.
    pub fn analyze(&self, title: &str, body: &str) -> Analysis {
        let text = if title.is_empty() { body.to_string() } else { format!("{title}\n{body}") };

        let products = detect_products(&text);
        let threats = detect_threats(title, body, self.policy.as_ref());
        let severity = score_severity(&text, &threats);

        let analysis = Analysis {
            summary: summarize(body, &threats),
            severity,
            technical_details: technical_details(body, &threats),
            recommendations: recommendations(severity, &threats, &products),
            products,
            threats,
        };

        tracing::info!(
            severity = %analysis.severity,
            threats = analysis.threats.len(),
            products = analysis.products.len(),
            "analysis complete"
        );
        analysis
    }

    /// Analyzes an extracted article. Stub articles carry no real text and
    /// are analyzed as empty.
    pub fn analyze_article(&self, article: &ExtractedArticle) -> Analysis {
        if article.is_stub() {
            return self.analyze("", "");
        }
        self.analyze(article.title(), article.content())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyzes a title and body with the default policy.
pub fn analyze(title: &str, body: &str) -> Analysis {
    Analyzer::new().analyze(title, body)
}
