use crate::Result;
use crate::analysis::{Analysis, ProductRecord, ThreatRecord};
use crate::formatters::Report;

/// Configuration for Markdown output
#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Include TOML frontmatter with article metadata
    pub include_frontmatter: bool,
    /// Append the extracted article body
    pub include_content: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { include_frontmatter: true, include_content: true }
    }
}

/// Renders a report as Markdown.
pub fn convert_to_markdown(report: &Report, config: &MarkdownConfig) -> Result<String> {
    let mut output = String::new();

    if config.include_frontmatter {
        output.push_str(&generate_frontmatter(report));
        output.push('\n');
    }

    output.push_str(&format!("# {}\n\n", report.article.title()));

    if let Some(analysis) = &report.analysis {
        output.push_str(&analysis_sections(analysis));
    }

    if config.include_content {
        output.push_str("## Article\n\n");
        output.push_str(report.article.content());
        output.push('\n');
    }

    Ok(output)
}

/// Generate TOML frontmatter from the article record
fn generate_frontmatter(report: &Report) -> String {
    let article = &report.article;
    let mut frontmatter = String::from("+++");

    frontmatter.push_str(&format!("\ntitle = {}", toml_escape_string(article.title())));

    if let Some(author) = article.author() {
        frontmatter.push_str(&format!("\nauthor = {}", toml_escape_string(author)));
    }

    if let Some(date) = article.publish_date() {
        frontmatter.push_str(&format!("\ndate = {}", date.to_rfc3339()));
    }

    if let Some(url) = &report.source_url {
        frontmatter.push_str(&format!("\nsource = {}", toml_escape_string(url)));
    }

    frontmatter.push_str(&format!("\nmethod = {}", toml_escape_string(article.extraction_method())));
    frontmatter.push_str(&format!("\nconfidence = {:.2}", article.confidence()));
    frontmatter.push_str(&format!("\nword_count = {}", article.word_count()));

    if let Some(analysis) = &report.analysis {
        frontmatter.push_str(&format!("\nseverity = {}", toml_escape_string(analysis.severity.as_str())));
        let names: Vec<String> = analysis.threats.iter().map(|t| toml_escape_string(&t.name)).collect();
        frontmatter.push_str(&format!("\nthreats = [{}]", names.join(", ")));
    }

    frontmatter.push_str("\n+++\n");
    frontmatter
}

/// Escape a string for TOML format
fn toml_escape_string(s: &str) -> String {
    let needs_escape = s.contains('"') || s.contains('\\') || s.contains('\n');
    if needs_escape {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('\"', "\\\"").replace('\n', "\\n"))
    } else {
        format!("\"{}\"", s)
    }
}

fn analysis_sections(analysis: &Analysis) -> String {
    let mut out = String::new();

    out.push_str(&format!("## Summary\n\n{}\n\n", analysis.summary));
    out.push_str(&format!("**Severity:** {}\n\n", analysis.severity.as_str().to_uppercase()));

    if !analysis.threats.is_empty() {
        out.push_str("## Threats\n\n");
        out.push_str(&threat_table(&analysis.threats));
        out.push('\n');
    }

    if !analysis.products.is_empty() {
        out.push_str("## Affected Products\n\n");
        for product in &analysis.products {
            out.push_str(&product_line(product));
        }
        out.push('\n');
    }

    out.push_str(&format!("## Technical Details\n\n```text\n{}\n```\n\n", analysis.technical_details));
    out.push_str(&format!("## Recommendations\n\n{}\n\n", analysis.recommendations));
    out
}

fn threat_table(threats: &[ThreatRecord]) -> String {
    let mut table = String::from("| Type | Name | CVE |\n");
    table.push_str("|------|------|-----|\n");

    for threat in threats {
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            threat.kind,
            escape_pipe(&threat.name),
            threat.cve.as_deref().unwrap_or("-")
        ));
    }

    table
}

fn product_line(product: &ProductRecord) -> String {
    match &product.versions {
        Some(versions) => format!("- {} {} ({})\n", product.icon, product.name, versions),
        None => format!("- {} {}\n", product.icon, product.name),
    }
}

/// Escape pipe characters for Markdown tables
fn escape_pipe(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Markdown formatter with configurable options
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &Report) -> Result<String> {
        convert_to_markdown(report, &self.config)
    }
}
