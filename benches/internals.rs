use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use aoc_times::bench;
use aoc_times::display;
use aoc_times::document::ResultsDocument;
use aoc_times::summary::Summary;
use aoc_times::types::{BenchOutcome, Measurement};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A README with prose around a fully populated 49-row timing table.
fn sample_readme() -> String {
    let mut out = String::from("# Advent of Code 2021\n\nSolutions in Rust.\n\n");
    out.push_str("Day | Part | Time\n--- | ---  | ---\n");
    let units = ["ns", "us", "ms", "s"];
    for target in bench::all_targets() {
        let unit = units[(target.day as usize + target.part as usize) % units.len()];
        out.push_str(&format!(
            "{:<3} | {:<4} | {}.{} {}\n",
            target.day,
            target.part,
            target.day * 13 % 997,
            target.part * 7,
            unit
        ));
    }
    out.push_str("\nTotal: 0.0 s\n\nSee LICENSE.\n");
    out
}

fn sample_outcomes() -> Vec<BenchOutcome> {
    bench::all_targets()
        .into_iter()
        .map(|target| BenchOutcome {
            target,
            measurement: Measurement::parse(&format!("{}.5", target.day), "us").unwrap(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks: document
// ---------------------------------------------------------------------------

fn bench_document(c: &mut Criterion) {
    let text = sample_readme();
    let doc = ResultsDocument::parse(&text);

    let mut group = c.benchmark_group("document");
    group.bench_function("parse", |b| b.iter(|| ResultsDocument::parse(&text)));
    group.bench_function("render", |b| b.iter(|| doc.render()));
    group.finish();
}

fn bench_apply_outcomes(c: &mut Criterion) {
    let doc = ResultsDocument::parse(&sample_readme());
    let outcomes = sample_outcomes();

    c.bench_function("apply_outcomes", |b| {
        b.iter(|| bench::apply_outcomes(&doc, &outcomes));
    });
}

// ---------------------------------------------------------------------------
// Benchmarks: parsing benchmark output
// ---------------------------------------------------------------------------

fn bench_parse_timing(c: &mut Criterion) {
    let inputs = [
        ("bare", "time: [10.0 ms 12.5 ms 15.0 ms]".to_string()),
        (
            "criterion_report",
            "Day1 - Part1/(default)\n\
             time:   [1.2001 \u{b5}s 1.2100 \u{b5}s 1.2250 \u{b5}s]\n\
             change: [-1.2% +0.3% +1.9%] (p = 0.61 > 0.05)\n\
             No change in performance detected.\n"
                .to_string(),
        ),
        (
            "long_preamble",
            format!("{}time: [1.0 s 1.1 s 1.2 s]\n", "Compiling aoc v0.1.0\n".repeat(200)),
        ),
    ];

    let target = bench::all_targets()[0];
    let mut group = c.benchmark_group("parse_timing");
    for (name, input) in &inputs {
        group.bench_with_input(BenchmarkId::new("input", name), input, |b, s| {
            b.iter(|| bench::parse_timing(s, target).unwrap());
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmarks: summary
// ---------------------------------------------------------------------------

fn bench_summary(c: &mut Criterion) {
    let doc = ResultsDocument::parse(&sample_readme());
    let summary = Summary::from_document(&doc).unwrap();

    let mut group = c.benchmark_group("summary");
    group.bench_function("from_document", |b| {
        b.iter(|| Summary::from_document(&doc).unwrap());
    });
    group.bench_function("format_biggest_5", |b| {
        b.iter(|| display::format_biggest(summary.biggest(5).unwrap()));
    });
    group.finish();
}

fn bench_format_sig(c: &mut Criterion) {
    let values = [("fixed", 0.0123046), ("large", 123456.0), ("tiny", 0.0000045)];

    let mut group = c.benchmark_group("format_sig");
    for (name, value) in &values {
        group.bench_with_input(BenchmarkId::new("value", name), value, |b, v| {
            b.iter(|| display::format_sig(*v, 5));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Criterion groups
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_document,
    bench_apply_outcomes,
    bench_parse_timing,
    bench_summary,
    bench_format_sig,
);
criterion_main!(benches);
