use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::display::format_sig;
use crate::errors::{AocTimesError, Result};
use crate::types::{Measurement, RowKey};

/// `<day> | <part> | ` at the start of a line. Everything after the prefix is
/// the timing cell.
static ROW_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+\|\s+(\d+)\s+\|[ \t]*").unwrap());

/// `<value> <unit>` at the start of a timing cell. Trailing marks after the
/// unit (`ms*`, `s/iter`) are ignored.
static CELL_TIMING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s+(\w+)").unwrap());

const TOTAL_PREFIX: &str = "Total: ";

/// A table row: the untouched prefix (day, part, separators and padding) plus
/// the timing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: RowKey,
    prefix: String,
    cell: String,
    crlf: bool,
}

impl Row {
    /// Parse the timing cell. `Ok(None)` for cells that hold no timing yet
    /// (blank, `-`, etc.).
    pub fn timing(&self) -> Result<Option<Measurement>> {
        match CELL_TIMING.captures(&self.cell) {
            Some(caps) => Measurement::parse(&caps[1], &caps[2]).map(Some),
            None => Ok(None),
        }
    }

    fn set_measurement(&mut self, measurement: &Measurement) {
        if !self.prefix.ends_with([' ', '\t']) {
            self.prefix.push(' ');
        }
        self.cell = measurement.to_string();
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Row(Row),
    Total { text: String, crlf: bool },
    Other(String),
}

/// A results document (usually the README) split into row lines, the total
/// line, and everything else. Rendering an unmodified document reproduces the
/// input byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsDocument {
    lines: Vec<Line>,
}

impl ResultsDocument {
    pub fn parse(text: &str) -> ResultsDocument {
        let lines = text.split('\n').map(parse_line).collect();
        ResultsDocument { lines }
    }

    pub fn load(path: &Path) -> Result<ResultsDocument> {
        let text = std::fs::read_to_string(path).map_err(|source| AocTimesError::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ResultsDocument::parse(&text))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match line {
                Line::Row(row) => {
                    out.push_str(&row.prefix);
                    out.push_str(&row.cell);
                    if row.crlf {
                        out.push('\r');
                    }
                }
                Line::Total { text, crlf } => {
                    out.push_str(text);
                    if *crlf {
                        out.push('\r');
                    }
                }
                Line::Other(text) => out.push_str(text),
            }
        }
        out
    }

    /// Replace the file at `path` with the rendered document. The new text is
    /// written to a sibling temporary file first and renamed over the target,
    /// so readers never observe a half-written table.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = temp_path_for(path);
        let write_err = |source| AocTimesError::DocumentWrite {
            path: path.to_path_buf(),
            source,
        };

        std::fs::write(&tmp, self.render()).map_err(write_err)?;
        if let Err(source) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(write_err(source));
        }
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.lines.iter().filter_map(|line| match line {
            Line::Row(row) => Some(row),
            _ => None,
        })
    }

    /// Rewrite the timing cell of the first row keyed `key`. Returns `false`
    /// (and leaves the document alone) when there is no such row.
    pub fn update_row(&mut self, key: &RowKey, measurement: &Measurement) -> bool {
        let row = self.lines.iter_mut().find_map(|line| match line {
            Line::Row(row) if row.key == *key => Some(row),
            _ => None,
        });
        match row {
            Some(row) => {
                row.set_measurement(measurement);
                true
            }
            None => false,
        }
    }

    /// Rewrite every `Total: ` line to `Total: <seconds> s`. Returns how many
    /// lines were rewritten.
    pub fn set_total(&mut self, seconds: f64) -> usize {
        let text = format!("{}{} s", TOTAL_PREFIX, format_sig(seconds, 5));
        let mut count = 0;
        for line in &mut self.lines {
            if let Line::Total { text: existing, .. } = line {
                existing.clone_from(&text);
                count += 1;
            }
        }
        count
    }

    /// All rows that carry a timing, in document order.
    pub fn timings(&self) -> Result<Vec<(RowKey, Measurement)>> {
        let mut out = Vec::new();
        for row in self.rows() {
            if let Some(measurement) = row.timing()? {
                out.push((row.key.clone(), measurement));
            }
        }
        Ok(out)
    }
}

fn parse_line(raw: &str) -> Line {
    let (body, crlf) = match raw.strip_suffix('\r') {
        Some(body) => (body, true),
        None => (raw, false),
    };

    if let Some(caps) = ROW_PREFIX.captures(body) {
        let prefix_len = caps[0].len();
        return Line::Row(Row {
            key: RowKey {
                day: caps[1].to_string(),
                part: caps[2].to_string(),
            },
            prefix: body[..prefix_len].to_string(),
            cell: body[prefix_len..].to_string(),
            crlf,
        });
    }

    if body.starts_with(TOTAL_PREFIX) {
        return Line::Total {
            text: body.to_string(),
            crlf,
        };
    }

    Line::Other(raw.to_string())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BenchTarget;

    const SAMPLE: &str = "# Advent of Code 2021\n\
        \n\
        Day | Part | Time\n\
        --- | ---  | ---\n\
        1   | 1    | 12.3 ms\n\
        1   | 2    | 4.5 us\n\
        5   | 1    | 99.9 s\n\
        25  | 1    | -\n\
        \n\
        Total: 100.0 s\n";

    fn key(day: u32, part: u32) -> RowKey {
        BenchTarget { day, part }.key()
    }

    #[test]
    fn render_roundtrips_untouched_document() {
        let doc = ResultsDocument::parse(SAMPLE);
        assert_eq!(doc.render(), SAMPLE);
    }

    #[test]
    fn render_preserves_missing_trailing_newline() {
        let text = "1 | 1 | 1.0 ms\nTotal: 0.001 s";
        assert_eq!(ResultsDocument::parse(text).render(), text);
    }

    #[test]
    fn render_preserves_crlf() {
        let text = "1 | 1 | 1.0 ms\r\nTotal: 0.001 s\r\nnotes\r\n";
        let mut doc = ResultsDocument::parse(text);
        assert_eq!(doc.render(), text);

        doc.update_row(&key(1, 1), &Measurement::parse("2.0", "ms").unwrap());
        assert_eq!(doc.render(), "1 | 1 | 2.0 ms\r\nTotal: 0.001 s\r\nnotes\r\n");
    }

    #[test]
    fn header_and_separator_are_not_rows() {
        let doc = ResultsDocument::parse(SAMPLE);
        let keys: Vec<_> = doc.rows().map(|r| (r.key.day.as_str(), r.key.part.as_str())).collect();
        assert_eq!(keys, vec![("1", "1"), ("1", "2"), ("5", "1"), ("25", "1")]);
    }

    #[test]
    fn update_replaces_cell_and_keeps_padding() {
        let mut doc = ResultsDocument::parse("5 | 1 | 99.9 s\n");
        assert!(doc.update_row(&key(5, 1), &Measurement::parse("50.0", "ms").unwrap()));
        assert_eq!(doc.render(), "5 | 1 | 50.0 ms\n");

        let mut padded = ResultsDocument::parse(SAMPLE);
        padded.update_row(&key(1, 2), &Measurement::parse("7.25", "ns").unwrap());
        assert!(padded.render().contains("1   | 2    | 7.25 ns\n"));
    }

    #[test]
    fn update_fills_placeholder_cell() {
        let mut doc = ResultsDocument::parse(SAMPLE);
        assert!(doc.update_row(&key(25, 1), &Measurement::parse("3.1", "us").unwrap()));
        assert!(doc.render().contains("25  | 1    | 3.1 us\n"));
    }

    #[test]
    fn update_adds_space_after_bare_separator() {
        let mut doc = ResultsDocument::parse("3 | 2 |");
        doc.update_row(&key(3, 2), &Measurement::parse("1.5", "s").unwrap());
        assert_eq!(doc.render(), "3 | 2 | 1.5 s");
    }

    #[test]
    fn update_is_idempotent() {
        let m = Measurement::parse("12.5", "ms").unwrap();
        let mut once = ResultsDocument::parse(SAMPLE);
        once.update_row(&key(1, 1), &m);
        let mut twice = once.clone();
        twice.update_row(&key(1, 1), &m);
        assert_eq!(once.render(), twice.render());
    }

    #[test]
    fn update_missing_row_leaves_document_unchanged() {
        let mut doc = ResultsDocument::parse(SAMPLE);
        assert!(!doc.update_row(&key(12, 2), &Measurement::parse("1.0", "ms").unwrap()));
        assert_eq!(doc.render(), SAMPLE);
    }

    #[test]
    fn update_matches_day_text_exactly() {
        // Row for day 11 must not be mistaken for day 1.
        let mut doc = ResultsDocument::parse("11 | 1 | 5.0 ms\n1 | 1 | 6.0 ms\n");
        doc.update_row(&key(1, 1), &Measurement::parse("1.0", "ms").unwrap());
        assert_eq!(doc.render(), "11 | 1 | 5.0 ms\n1 | 1 | 1.0 ms\n");
    }

    #[test]
    fn update_only_touches_first_duplicate() {
        let mut doc = ResultsDocument::parse("2 | 1 | 5.0 ms\n2 | 1 | 6.0 ms\n");
        doc.update_row(&key(2, 1), &Measurement::parse("1.0", "ms").unwrap());
        assert_eq!(doc.render(), "2 | 1 | 1.0 ms\n2 | 1 | 6.0 ms\n");
    }

    #[test]
    fn set_total_rewrites_total_line() {
        let mut doc = ResultsDocument::parse(SAMPLE);
        assert_eq!(doc.set_total(0.0123046), 1);
        assert!(doc.render().contains("\nTotal: 0.012305 s\n"));
    }

    #[test]
    fn set_total_without_total_line_is_noop() {
        let mut doc = ResultsDocument::parse("1 | 1 | 1.0 ms\n");
        assert_eq!(doc.set_total(1.0), 0);
        assert_eq!(doc.render(), "1 | 1 | 1.0 ms\n");
    }

    #[test]
    fn timings_skip_placeholders() {
        let doc = ResultsDocument::parse(SAMPLE);
        let timings = doc.timings().unwrap();
        assert_eq!(timings.len(), 3);
        assert_eq!(timings[0].1.to_string(), "12.3 ms");
        assert_eq!(timings[2].1.to_string(), "99.9 s");
    }

    #[test]
    fn timings_ignore_marks_after_unit() {
        let doc = ResultsDocument::parse("1 | 1 | 3.5 ms*\n1 | 2 | 2.0 s/iter\n2 | 1 | 8.25 \u{b5}s\n");
        let timings = doc.timings().unwrap();
        let rendered: Vec<_> = timings.iter().map(|(_, m)| m.to_string()).collect();
        assert_eq!(rendered, vec!["3.5 ms", "2.0 s", "8.25 us"]);
    }

    #[test]
    fn timings_unknown_unit_is_error() {
        let doc = ResultsDocument::parse("1 | 1 | 3.0 min\n");
        let err = doc.timings().unwrap_err();
        assert!(matches!(err, AocTimesError::UnknownUnit { .. }));
    }

    #[test]
    fn save_replaces_file() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let path = tmp.path().join("README.md");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut doc = ResultsDocument::load(&path).unwrap();
        doc.update_row(&key(5, 1), &Measurement::parse("50.0", "ms").unwrap());
        doc.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("5   | 1    | 50.0 ms\n"));
        assert!(!tmp.path().join(".README.md.tmp").exists());
    }

    #[test]
    fn load_missing_file_is_error() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let err = ResultsDocument::load(&tmp.path().join("nope.md")).unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }
}
