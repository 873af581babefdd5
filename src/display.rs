use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::summary::{Summary, SummaryEntry};
use crate::types::BenchOutcome;

/// Format `value` with `digits` significant figures using general-format
/// rules: fixed notation (always with a fractional digit) when the decimal
/// exponent is in `[-4, digits)`, scientific notation otherwise.
///
/// `format_sig(0.0123046, 5)` is `"0.012305"`, `format_sig(2.0, 5)` is
/// `"2.0"`, `format_sig(123456.0, 5)` is `"1.2346e+05"`.
pub fn format_sig(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }

    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (digits as i32 - 1 - exp) as usize;
        let fixed = trim_fraction(&format!("{:.*}", decimals, value));
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    }
}

fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

fn style_label() -> Style {
    Style::new().cyan().bold()
}

/// Progress line for one finished benchmark: the raw value as reported.
pub fn format_bench_line(outcome: &BenchOutcome) -> String {
    let label = format!(
        "Day {} part {}:",
        outcome.target.day, outcome.target.part
    );
    format!(
        "{} {}",
        label.if_supports_color(Stream::Stdout, |s| s.style(style_label())),
        outcome
            .measurement
            .if_supports_color(Stream::Stdout, |s| s.yellow())
    )
}

pub fn format_run_total(total_seconds: f64) -> String {
    let total = format!("{} s", format_sig(total_seconds, 5));
    format!(
        "Total time: {}",
        total.if_supports_color(Stream::Stdout, |s| s.green())
    )
}

pub fn format_summary_total(summary: &Summary) -> String {
    let total = format_sig(summary.total_seconds(), 5);
    format!(
        "Total time: {} ({} parts)",
        total.if_supports_color(Stream::Stdout, |s| s.green()),
        summary.len()
    )
}

/// `Biggest N:` header followed by one indented line per entry.
pub fn format_biggest(entries: &[SummaryEntry]) -> String {
    let mut out = String::new();
    let header = format!("Biggest {}:", entries.len());
    out.push_str(
        &header
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string(),
    );
    out.push('\n');

    for entry in entries {
        let label = format!("Day {}, part {}:", entry.key.day, entry.key.part);
        let secs = format!("{} s", format_sig(entry.seconds, 5));
        out.push_str(&format!(
            "    {} {}\n",
            label.if_supports_color(Stream::Stdout, |s| s.style(style_label())),
            secs.if_supports_color(Stream::Stdout, |s| s.yellow())
        ));
    }

    out
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    day: &'a str,
    part: &'a str,
    seconds: f64,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    generated_at: String,
    total_seconds: f64,
    parts: usize,
    biggest: Vec<JsonEntry<'a>>,
}

pub fn format_json(summary: &Summary, biggest: &[SummaryEntry], now: DateTime<Utc>) -> String {
    let json = JsonSummary {
        generated_at: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        total_seconds: summary.total_seconds(),
        parts: summary.len(),
        biggest: biggest
            .iter()
            .map(|e| JsonEntry {
                day: &e.key.day,
                part: &e.key.part,
                seconds: e.seconds,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
}
