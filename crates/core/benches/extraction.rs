use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use threatscope_core::{Analyzer, Document, Extractor, analyze, parse_date};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let html = fixture("exchange_cve.html");

    let mut group = c.benchmark_group("parse");
    group.bench_function("raw", |b| b.iter(|| Document::parse(black_box(&html))));
    group.bench_function("cleaned", |b| b.iter(|| Document::parse_cleaned(black_box(&html))));
    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let extractor = Extractor::new();
    let mut group = c.benchmark_group("extract");

    for name in ["exchange_cve.html", "blackcat.html", "custom_layout.html"] {
        let html = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), &html, |b, html| {
            b.iter(|| extractor.extract(black_box(html), None, None))
        });
    }

    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let article = Extractor::new().extract(&fixture("exchange_cve.html"), None, None);
    let analyzer = Analyzer::new();

    c.bench_function("analyze", |b| b.iter(|| analyzer.analyze_article(black_box(&article))));
}

fn bench_full_pipeline(c: &mut Criterion) {
    let html = fixture("blackcat.html");
    let extractor = Extractor::new();

    c.bench_function("extract_and_analyze", |b| {
        b.iter(|| {
            let article = extractor.extract(black_box(&html), None, None);
            analyze(article.title(), article.content())
        })
    });
}

fn bench_dates(c: &mut Criterion) {
    let inputs = ["2024-02-14T09:30:00Z", "JULY 09, 2025 03:54 PM (EDT)", "Sept 3, 2024, 12:05 a.m.", "3 days ago"];

    c.bench_function("parse_date", |b| {
        b.iter(|| inputs.iter().filter_map(|s| parse_date(black_box(s))).count())
    });
}

criterion_group!(benches, bench_parse, bench_extraction, bench_analysis, bench_full_pipeline, bench_dates);
criterion_main!(benches);
