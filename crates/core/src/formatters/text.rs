use crate::Result;
use crate::analysis::Analysis;
use crate::formatters::Report;

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// Wrap lines at specified width (0 = no wrapping)
    pub line_width: usize,

    /// Append the extracted article body
    pub include_content: bool,
}

/// Plain text formatter for reports
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &Report) -> Result<String> {
        convert_to_text(report, &self.config)
    }
}

/// Renders a report as plain text with underlined section headings.
pub fn convert_to_text(report: &Report, config: &TextConfig) -> Result<String> {
    let mut output = generate_header(report);

    if let Some(analysis) = &report.analysis {
        output.push('\n');
        output.push_str(&analysis_sections(analysis, config.line_width));
    }

    if config.include_content {
        output.push('\n');
        output.push_str(&section("ARTICLE", &wrap_text(report.article.content(), config.line_width)));
    }

    Ok(output.trim().to_string())
}

/// Generate a header from the article record
fn generate_header(report: &Report) -> String {
    let article = &report.article;
    let mut header = String::new();

    header.push_str(article.title());
    header.push('\n');
    header.push_str(&"=".repeat(article.title().chars().count()));
    header.push('\n');

    let mut meta_parts = Vec::new();

    if let Some(author) = article.author() {
        meta_parts.push(format!("By: {}", author));
    }

    if let Some(date) = article.publish_date() {
        meta_parts.push(format!("Date: {}", date.format("%Y-%m-%d %H:%M UTC")));
    }

    meta_parts.push(format!("Method: {} ({:.2})", article.extraction_method(), article.confidence()));

    if let Some(url) = &report.source_url {
        meta_parts.push(format!("Source: {}", url));
    }

    header.push_str(&meta_parts.join(" | "));
    header.push('\n');
    header
}

fn section(heading: &str, body: &str) -> String {
    format!("{}\n{}\n{}\n", heading, "-".repeat(heading.chars().count()), body)
}

fn analysis_sections(analysis: &Analysis, width: usize) -> String {
    let mut out = String::new();

    out.push_str(&section("SUMMARY", &wrap_text(&analysis.summary, width)));
    out.push('\n');
    out.push_str(&format!("SEVERITY: {}\n\n", analysis.severity.as_str().to_uppercase()));

    if !analysis.threats.is_empty() {
        let lines: Vec<String> = analysis
            .threats
            .iter()
            .map(|t| match &t.cve {
                Some(cve) => format!("* [{}] {} ({})", t.kind, t.name, cve),
                None => format!("* [{}] {}", t.kind, t.name),
            })
            .collect();
        out.push_str(&section("THREATS", &lines.join("\n")));
        out.push('\n');
    }

    if !analysis.products.is_empty() {
        let lines: Vec<String> = analysis
            .products
            .iter()
            .map(|p| match &p.versions {
                Some(v) => format!("* {} {} {}", p.icon, p.name, v),
                None => format!("* {} {}", p.icon, p.name),
            })
            .collect();
        out.push_str(&section("PRODUCTS", &lines.join("\n")));
        out.push('\n');
    }

    out.push_str(&section("TECHNICAL DETAILS", &analysis.technical_details));
    out.push('\n');
    out.push_str(&section("RECOMMENDATIONS", &analysis.recommendations));
    out
}

/// Wrap text to specified line width, keeping paragraph breaks
fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    text.split("\n\n")
        .map(|p| {
            p.lines()
                .map(|line| {
                    let words: Vec<&str> = line.split_whitespace().collect();
                    if words.is_empty() { String::new() } else { wrap_words(&words, width) }
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wrap a slice of words to specified width
fn wrap_words(words: &[&str], width: usize) -> String {
    let mut lines = Vec::new();
    let mut current_line = Vec::new();
    let mut current_length = 0;

    for &word in words {
        let word_len = word.chars().count();

        if current_length == 0 {
            current_line.push(word);
            current_length = word_len;
        } else if current_length + 1 + word_len <= width {
            current_length += 1 + word_len;
            current_line.push(word);
        } else {
            lines.push(current_line.join(" "));
            current_line = vec![word];
            current_length = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line.join(" "));
    }

    lines.join("\n")
}
