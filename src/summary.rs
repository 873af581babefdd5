use std::collections::HashMap;

use crate::document::ResultsDocument;
use crate::errors::{AocTimesError, Result};
use crate::types::RowKey;

/// Number of entries `bench-summary` lists by default.
pub const DEFAULT_TOP: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub key: RowKey,
    pub seconds: f64,
}

/// Normalized timings from a results document, slowest first.
#[derive(Debug, Clone)]
pub struct Summary {
    entries: Vec<SummaryEntry>,
}

impl Summary {
    /// Collect every timed row. A later row with the same (day, part) replaces
    /// the earlier value but keeps its position.
    pub fn from_document(doc: &ResultsDocument) -> Result<Summary> {
        let mut entries: Vec<SummaryEntry> = Vec::new();
        let mut index: HashMap<RowKey, usize> = HashMap::new();

        for (key, measurement) in doc.timings()? {
            let seconds = measurement.seconds();
            match index.get(&key) {
                Some(&i) => entries[i].seconds = seconds,
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push(SummaryEntry { key, seconds });
                }
            }
        }

        let total: f64 = entries.iter().map(|e| e.seconds).sum();
        log::debug!("summarized {} parts, {total} s", entries.len());

        // Stable sort: equal timings keep document order.
        entries.sort_by(|a, b| b.seconds.total_cmp(&a.seconds));

        Ok(Summary { entries })
    }

    pub fn total_seconds(&self) -> f64 {
        self.entries.iter().map(|e| e.seconds).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, slowest first.
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    /// The `n` slowest entries. Errors when fewer than `n` parts were timed.
    pub fn biggest(&self, n: usize) -> Result<&[SummaryEntry]> {
        if self.entries.len() < n {
            return Err(AocTimesError::NotEnoughRows {
                needed: n,
                found: self.entries.len(),
            });
        }
        Ok(&self.entries[..n])
    }
}
