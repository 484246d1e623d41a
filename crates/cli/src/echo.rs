use std::time::Duration;

use owo_colors::OwoColorize;
use threatscope_core::{Report, Severity};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "threatscope".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract security news and summarize the threats it describes\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value under the current step
pub fn print_field(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print one timing line, colored by how long it took
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Print the extraction and analysis outcome of one report
pub fn print_report_details(report: &Report) {
    let article = &report.article;

    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", article.title().bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    print_field("Method", article.extraction_method());
    print_field("Confidence", &format!("{:.2}", article.confidence()));
    print_field("Words", &article.word_count().to_string());

    if let Some(date) = article.publish_date() {
        print_field("Published", &date.format("%Y-%m-%d %H:%M UTC").to_string());
    }

    if let Some(analysis) = &report.analysis {
        let severity = analysis.severity.as_str().to_uppercase();
        match analysis.severity {
            Severity::Critical | Severity::High => {
                eprintln!("  {} {}", "Severity:".dimmed(), severity.bright_red())
            }
            Severity::Medium => eprintln!("  {} {}", "Severity:".dimmed(), severity.bright_yellow()),
            Severity::Low => eprintln!("  {} {}", "Severity:".dimmed(), severity.bright_green()),
        }

        for threat in &analysis.threats {
            eprintln!("  {} {} {}", "•".dimmed(), threat.name.bright_white(), format!("[{}]", threat.kind).dimmed());
        }
    }

    eprintln!();
}

/// Print timing summary
pub fn print_timing_summary(total: Duration, timings: &[(String, Duration)]) {
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Timing Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    for (label, duration) in timings {
        print_timing(label, *duration);
    }

    eprintln!("  {} {:>8.2}ms\n", format!("{}:", "Total").bold().dimmed(), total.as_secs_f64() * 1000.0);
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
