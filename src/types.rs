use std::fmt;

use crate::errors::{AocTimesError, Result};

/// Units the benchmark tool reports timings in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    /// Parse a unit symbol. Both micro sign spellings map to `us`.
    pub fn parse(symbol: &str) -> Result<TimeUnit> {
        match symbol {
            "s" => Ok(TimeUnit::Seconds),
            "ms" => Ok(TimeUnit::Millis),
            "us" | "\u{b5}s" | "\u{3bc}s" => Ok(TimeUnit::Micros),
            "ns" => Ok(TimeUnit::Nanos),
            _ => Err(AocTimesError::UnknownUnit {
                unit: symbol.to_string(),
            }),
        }
    }

    /// How many of this unit make up one second.
    pub fn factor(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Millis => 1_000,
            TimeUnit::Micros => 1_000_000,
            TimeUnit::Nanos => 1_000_000_000,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Millis => "ms",
            TimeUnit::Micros => "us",
            TimeUnit::Nanos => "ns",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single timing figure. The literal text is kept so that a value is
/// written back exactly as the benchmark tool printed it ("50.0", not "50").
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub literal: String,
    pub value: f64,
    pub unit: TimeUnit,
}

impl Measurement {
    pub fn parse(literal: &str, unit: &str) -> Result<Measurement> {
        let unit = TimeUnit::parse(unit)?;
        let value: f64 = literal
            .parse()
            .map_err(|_| AocTimesError::InvalidValue {
                value: literal.to_string(),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(AocTimesError::InvalidValue {
                value: literal.to_string(),
            });
        }
        Ok(Measurement {
            literal: literal.to_string(),
            value,
            unit,
        })
    }

    /// Normalize to seconds.
    pub fn seconds(&self) -> f64 {
        self.value / self.unit.factor() as f64
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.literal, self.unit)
    }
}

/// One (day, part) puzzle solution to benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BenchTarget {
    pub day: u32,
    pub part: u32,
}

impl BenchTarget {
    pub fn key(&self) -> RowKey {
        RowKey {
            day: self.day.to_string(),
            part: self.part.to_string(),
        }
    }
}

/// Day and part of a table row, as the raw text tokens found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub day: String,
    pub part: String,
}

/// Result of benchmarking one target.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchOutcome {
    pub target: BenchTarget,
    pub measurement: Measurement,
}
