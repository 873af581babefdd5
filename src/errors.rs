use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, AocTimesError>;

#[derive(thiserror::Error, Debug)]
pub enum AocTimesError {
    #[error("No timing summary found in benchmark output for day {day} part {part}")]
    TimingNotFound { day: u32, part: u32 },

    #[error("Unknown time unit '{unit}'. Supported: s, ms, us, ns")]
    UnknownUnit { unit: String },

    #[error("Invalid timing value '{value}'")]
    InvalidValue { value: String },

    #[error("Need at least {needed} timed parts to rank, found {found}")]
    NotEnoughRows { needed: usize, found: usize },

    #[error("Failed to run benchmark command '{program}': {source}")]
    BenchSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Benchmark for day {day} part {part} exited with {status}")]
    BenchFailed {
        day: u32,
        part: u32,
        status: ExitStatus,
    },

    #[error("Benchmark for day {day} part {part} timed out after {:.1}s", .timeout.as_secs_f64())]
    BenchTimedOut {
        day: u32,
        part: u32,
        timeout: Duration,
    },

    #[error("Failed to read benchmark output for day {day} part {part}: {source}")]
    BenchOutput {
        day: u32,
        part: u32,
        source: std::io::Error,
    },

    #[error("Failed to read results document {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write results document {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },
}
