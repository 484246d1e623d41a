mod echo;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use threatscope_core::{
    Analyzer, ConfigLoader, ConfigLoaderBuilder, ConfigParser, ExtractConfig, Extractor, FetchConfig, JsonConfig,
    MarkdownConfig, RawDocument, Report, ScanRegistry, SelectorConfig, TextConfig, convert_to_json,
    convert_to_markdown, convert_to_text, fetch_file, fetch_stdin, fetch_url,
};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Markdown,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, markdown, text", s)),
        }
    }
}

/// Extract security news articles and summarize the threats they describe
#[derive(Parser, Debug)]
#[command(name = "threatscope")]
#[command(version)]
#[command(about = "Extract security news articles and summarize the threats they describe", long_about = None)]
struct Args {
    /// Local HTML files, or "-" for stdin
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,

    /// Fetch an article from this URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Selector directive file applied to every input
    #[arg(long, value_name = "FILE")]
    selectors: Option<PathBuf>,

    /// Directory of per-domain selector configs
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Extraction settings as JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (json, markdown, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Skip threat analysis and report the extracted article only
    #[arg(long)]
    extract_only: bool,

    /// Generate a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// An input document and the label it is scanned under
struct Input {
    label: String,
    document: RawDocument,
}

/// Logs go to stderr so reports on stdout stay machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

async fn read_inputs(args: &Args) -> anyhow::Result<Vec<Input>> {
    let mut inputs = Vec::new();

    for path in &args.inputs {
        if path == "-" {
            let document = fetch_stdin().context("Failed to read from stdin")?;
            inputs.push(Input { label: "stdin".to_string(), document });
        } else {
            let document = fetch_file(path).with_context(|| format!("Failed to read file: {}", path))?;
            inputs.push(Input { label: path.clone(), document });
        }
    }

    if let Some(url) = &args.url {
        let mut config = FetchConfig { timeout: args.timeout, ..Default::default() };
        if let Some(user_agent) = &args.user_agent {
            config.user_agent = user_agent.clone();
        }

        let document = fetch_url(url, &config)
            .await
            .with_context(|| format!("Failed to fetch URL: {}", url))?;
        inputs.push(Input { label: url.clone(), document });
    }

    Ok(inputs)
}

/// Selectors for one document: an explicit file wins, then per-domain
/// configs for documents with a source URL.
fn resolve_selectors(
    loader: &mut ConfigLoader, explicit: Option<&SelectorConfig>, source_url: Option<&str>,
) -> Option<SelectorConfig> {
    if let Some(config) = explicit {
        return Some(config.clone());
    }

    let url = source_url?;
    match loader.load_for_url(url) {
        Ok(config) if !config.is_empty() => Some(config),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(url, error = %e, "no selector config");
            None
        }
    }
}

fn render(report: &Report, args: &Args) -> anyhow::Result<String> {
    let output = match args.format {
        OutputFormat::Json => {
            let config = JsonConfig { pretty: args.pretty, ..Default::default() };
            convert_to_json(report, &config).context("Failed to convert to JSON")?
        }
        OutputFormat::Markdown => {
            convert_to_markdown(report, &MarkdownConfig::default()).context("Failed to convert to Markdown")?
        }
        OutputFormat::Text => {
            let config = TextConfig { include_content: true, ..Default::default() };
            convert_to_text(report, &config).context("Failed to convert to text")?
        }
    };
    Ok(output)
}

/// Several JSON reports form an array; other formats are separated by a rule.
fn join_outputs(outputs: Vec<String>, format: OutputFormat) -> String {
    match (format, outputs.len()) {
        (_, 1) => outputs.into_iter().collect(),
        (OutputFormat::Json, _) => format!("[{}]", outputs.join(",\n")),
        (OutputFormat::Markdown, _) => outputs.join("\n---\n\n"),
        (OutputFormat::Text, _) => outputs.join("\n\n"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "threatscope", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);

    if args.inputs.is_empty() && args.url.is_none() {
        bail!("No input given. Pass HTML files, \"-\" for stdin, or --url");
    }

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let started = Instant::now();
    let mut timings: Vec<(String, Duration)> = Vec::new();

    let extract_config = match &args.config {
        Some(path) => ExtractConfig::from_json_file(path)
            .with_context(|| format!("Failed to load extraction config: {}", path.display()))?,
        None => ExtractConfig::default(),
    };
    let explicit_selectors = match &args.selectors {
        Some(path) => Some(
            ConfigParser::parse_file(path)
                .with_context(|| format!("Failed to load selector config: {}", path.display()))?,
        ),
        None => None,
    };
    let mut loader = match &args.config_dir {
        Some(dir) => ConfigLoaderBuilder::new().custom_dir(dir).build(),
        None => ConfigLoader::default(),
    };

    if args.verbose {
        echo::print_step(1, 4, "Reading input");
    }

    let step = Instant::now();
    let inputs = read_inputs(&args).await?;
    timings.push(("Read".to_string(), step.elapsed()));

    if args.verbose {
        for input in &inputs {
            let host = input
                .document
                .source_url
                .as_deref()
                .and_then(|u| url::Url::parse(u).ok())
                .and_then(|u| u.host_str().map(str::to_string));
            let size = echo::format_size(input.document.html.len());
            match host {
                Some(host) => echo::print_field(&input.label, &format!("{} from {}", size, host)),
                None => echo::print_field(&input.label, &size),
            }
        }
        eprintln!();
        echo::print_step(2, 4, "Extracting articles");
    }

    let extractor = Extractor::with_config(extract_config);
    let analyzer = Analyzer::new();
    let registry = ScanRegistry::new();
    let mut reports = Vec::with_capacity(inputs.len());
    let mut analysis_time = Duration::ZERO;

    let step = Instant::now();
    for input in &inputs {
        let _guard = registry.try_begin(&input.label).with_context(|| format!("Cannot scan {}", input.label))?;

        let selectors = resolve_selectors(&mut loader, explicit_selectors.as_ref(), input.document.source_url.as_deref());
        let article = extractor.extract_document(&input.document, selectors.as_ref());
        if article.is_stub() && args.verbose {
            echo::print_warning(&format!("No article found in {}", input.label));
        }

        let analysis = if args.extract_only {
            None
        } else {
            let analyzed = Instant::now();
            let analysis = analyzer.analyze_article(&article);
            analysis_time += analyzed.elapsed();
            Some(analysis)
        };

        reports.push(Report::new(article, analysis).with_source_url(input.document.source_url.clone()));
    }
    timings.push(("Extract".to_string(), step.elapsed().saturating_sub(analysis_time)));

    if args.verbose {
        if args.extract_only {
            echo::print_step(3, 4, &format!("Skipping analysis {}", "(--extract-only)".dimmed()));
        } else {
            echo::print_step(3, 4, "Analyzing threats");
            timings.push(("Analyze".to_string(), analysis_time));
        }
        for report in &reports {
            echo::print_report_details(report);
        }
    }

    let outputs = reports.iter().map(|r| render(r, &args)).collect::<anyhow::Result<Vec<_>>>()?;
    let output = join_outputs(outputs, args.format);

    if args.verbose {
        echo::print_step(4, 4, "Writing output");
        echo::print_field("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", output))
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", output),
    }

    if args.verbose {
        echo::print_timing_summary(started.elapsed(), &timings);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("txt".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_join_outputs() {
        let single = join_outputs(vec!["{}".to_string()], OutputFormat::Json);
        assert_eq!(single, "{}");

        let many = join_outputs(vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()], OutputFormat::Json);
        assert_eq!(many, "[{\"a\":1},\n{\"b\":2}]");

        let text = join_outputs(vec!["one".to_string(), "two".to_string()], OutputFormat::Text);
        assert_eq!(text, "one\n\ntwo");
    }

    #[test]
    fn test_explicit_selectors_win() {
        let explicit = ConfigParser::parse_string("title: h1.headline").unwrap();
        let mut loader = ConfigLoaderBuilder::new().build();

        let resolved = resolve_selectors(&mut loader, Some(&explicit), Some("https://example.com/a"));
        assert_eq!(resolved, Some(explicit));
    }

    #[test]
    fn test_no_selectors_without_url() {
        let mut loader = ConfigLoaderBuilder::new().build();
        assert!(resolve_selectors(&mut loader, None, None).is_none());
    }
}
