//! Library API integration tests
use chrono::{Datelike, TimeZone, Timelike, Utc};
use threatscope_core::*;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

fn extractor() -> Extractor {
    let config = ExtractConfig::builder()
        .reference_time(Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap())
        .build();
    Extractor::with_config(config)
}

const FIXTURES: &[&str] = &["exchange_cve.html", "blackcat.html", "custom_layout.html", "empty.html", "preprocessed.txt"];

#[test]
fn test_every_fixture_yields_an_article() {
    for name in FIXTURES {
        let article = extractor().extract(&read_fixture(name), None, None);

        assert!(!article.title().is_empty(), "{name}: empty title");
        assert!(!article.content().is_empty(), "{name}: empty content");
        assert!((0.0..=1.0).contains(&article.confidence()), "{name}: confidence out of range");
    }
}

#[test]
fn test_extraction_is_idempotent() {
    for name in FIXTURES {
        let html = read_fixture(name);
        assert_eq!(extractor().extract(&html, None, None), extractor().extract(&html, None, None));
    }
}

#[test]
fn test_exchange_article() {
    let article = extractor().extract(&read_fixture("exchange_cve.html"), None, None);

    assert_eq!(article.title(), "Microsoft warns of actively exploited Exchange Server flaw");
    assert_eq!(article.author(), Some("Jane Doe"));
    assert_eq!(article.extraction_method(), "fallback");
    assert_eq!(article.confidence(), 0.6);
    assert_eq!(article.publish_date(), Some(Utc.with_ymd_and_hms(2024, 2, 14, 9, 30, 0).unwrap()));
    assert!(article.content().contains("CVE-2024-21410"));
    assert!(!article.content().contains("window.analytics"));
    assert!(!article.content().contains("Subscribe"));
}

#[test]
fn test_exchange_analysis() {
    let article = extractor().extract(&read_fixture("exchange_cve.html"), None, None);
    let analysis = Analyzer::new().analyze_article(&article);

    assert!(analysis.threats.len() <= 3);
    assert!(
        analysis
            .threats
            .iter()
            .any(|t| t.cve.as_deref() == Some("CVE-2024-21410"))
    );
    assert!(analysis.threats.iter().all(|t| t.name.chars().count() <= 30));
    assert!(analysis.products.iter().any(|p| p.name == "Exchange Server"));
    assert!(analysis.severity >= Severity::High);
    assert!(analysis.technical_details.starts_with("EXPLOIT DETAILS:"));
    assert!(analysis.technical_details.contains("INDICATORS OF COMPROMISE:"));
    assert!(!analysis.summary.is_empty());
    assert!(!analysis.recommendations.is_empty());
}

#[test]
fn test_blackcat_article() {
    let article = extractor().extract(&read_fixture("blackcat.html"), None, None);

    assert_eq!(article.title(), "BlackCat ransomware targets healthcare providers");
    assert_eq!(article.author(), Some("Sam Lee"));

    let date = article.publish_date().unwrap();
    assert_eq!((date.year(), date.month(), date.day()), (2025, 7, 9));
    assert_eq!((date.hour(), date.minute()), (15, 54));

    let analysis = analyze(article.title(), article.content());
    let primary = analysis.primary_threat().unwrap();
    assert_eq!(primary.name, "BlackCat");
    assert_eq!(primary.kind, ThreatKind::Ransomware);
    assert!(analysis.severity >= Severity::High);
}

#[test]
fn test_selectors_from_config_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::copy(get_fixture_path("sites/custom_layout.txt"), dir.path().join("portal.example.txt")).unwrap();

    let mut loader = ConfigLoaderBuilder::new().custom_dir(dir.path()).build();
    let selectors = loader.load_for_url("https://www.portal.example/news/1").unwrap();

    let html = read_fixture("custom_layout.html");
    let article = extractor().extract(&html, Some("https://www.portal.example/news/1"), Some(&selectors));

    assert_eq!(article.extraction_method(), "primary");
    assert_eq!(article.confidence(), 0.8);
    assert_eq!(article.title(), "Vendor ships emergency fix for VPN appliance");
    assert_eq!(article.author(), Some("Alex Kim"));
}

#[test]
fn test_custom_layout_without_selectors_is_desperate() {
    let article = extractor().extract(&read_fixture("custom_layout.html"), None, None);

    assert_eq!(article.extraction_method(), "desperate");
    assert_eq!(article.confidence(), 0.3);
    assert_eq!(article.title(), "Portal");
}

#[test]
fn test_preprocessed_input() {
    let article = extractor().extract(&read_fixture("preprocessed.txt"), None, None);

    assert_eq!(article.extraction_method(), "preprocessed");
    assert_eq!(article.title(), "Critical flaw in Example Server under attack");
    assert_eq!(article.author(), Some("Jane Doe"));
    assert_eq!(article.publish_date().map(|d| (d.year(), d.month(), d.day())), Some((2024, 3, 15)));
}

#[test]
fn test_empty_page_is_stub() {
    let article = extractor().extract(&read_fixture("empty.html"), None, None);

    assert!(article.is_stub());
    assert_eq!(article.extraction_method(), "extraction-failed");
    assert_eq!(article.confidence(), 0.0);

    let analysis = Analyzer::new().analyze_article(&article);
    assert!(analysis.threats.is_empty());
    assert!(analysis.products.is_empty());
}

#[test]
fn test_date_round_trip() {
    let dates = [
        Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2023, 11, 5, 18, 45, 0).unwrap(),
    ];

    for date in dates {
        assert_eq!(parse_date(&date.to_rfc3339()), Some(date));
    }
}

#[test]
fn test_eastern_dateline() {
    let dt = parse_date("JULY 09, 2025 03:54 PM (EDT)").unwrap();
    assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute()), (2025, 7, 9, 15, 54));
}

#[test]
fn test_threat_list_is_capped() {
    let filler = "The release notes also describe changes to logging and installer behavior. ".repeat(6);
    let body: String = (1..=5)
        .map(|i| format!("CVE-2024-000{i} is a flaw fixed in KB503444{i}. {filler}"))
        .collect();
    let analysis = analyze("Patch Tuesday roundup", &body);

    assert_eq!(analysis.threats.len(), 3);
    assert!(analysis.threats.iter().all(|t| t.cve.is_some()));
    assert_eq!(analysis.threats[0].name, "KB5034441");
}

#[test]
fn test_severity_is_monotonic_in_critical_terms() {
    let mut body = String::from("A vulnerability was reported in a popular library. Impact is low.");
    let mut previous = analyze("", &body).severity;

    for extra in [" It is critical.", " It is actively exploited.", " It is a zero-day."] {
        body.push_str(extra);
        let severity = analyze("", &body).severity;
        assert!(severity >= previous);
        previous = severity;
    }
    assert_eq!(previous, Severity::Critical);
}

#[test]
fn test_report_formats() {
    let article = extractor().extract(&read_fixture("exchange_cve.html"), None, None);
    let analysis = analyze(article.title(), article.content());
    let report = Report::new(article, Some(analysis)).with_source_url(Some("https://news.example/a".to_string()));

    let json = convert_to_json(&report, &JsonConfig::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["article"]["author"], "Jane Doe");
    assert!(value["analysis"]["threats"].as_array().is_some_and(|t| !t.is_empty()));

    let markdown = convert_to_markdown(&report, &MarkdownConfig::default()).unwrap();
    assert!(markdown.starts_with("+++"));
    assert!(markdown.contains("## Threats"));

    let text = convert_to_text(&report, &TextConfig::default()).unwrap();
    assert!(text.contains("Source: https://news.example/a"));
}
