use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::bench::BenchCommand;
use crate::errors::{AocTimesError, Result};

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "aoc-times.toml";

pub const DEFAULT_README: &str = "README.md";

/// Optional settings shared by both tools. Command-line flags win over
/// anything set here.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub readme: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub command: Option<CommandConfig>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Config> {
        toml::from_str(text).map_err(|e| AocTimesError::ConfigParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Load the config. An explicit path must exist; otherwise the local
    /// `aoc-times.toml` and then `<config dir>/aoc-times/config.toml` are
    /// tried, falling back to defaults when neither exists.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            return Config::load_file(path);
        }

        for path in search_paths() {
            if path.is_file() {
                log::debug!("using config {}", path.display());
                return Config::load_file(&path);
            }
        }

        Ok(Config::default())
    }

    fn load_file(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path).map_err(|source| AocTimesError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Config::parse(&text, path)
    }

    pub fn readme_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.readme.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_README))
    }

    /// Build the benchmark command. A timeout of zero means none.
    pub fn bench_command(&self, timeout_flag: Option<u64>) -> BenchCommand {
        let mut cmd = match &self.command {
            Some(c) => BenchCommand {
                program: c.program.clone(),
                args: c.args.clone(),
                timeout: None,
            },
            None => BenchCommand::default(),
        };
        cmd.timeout = timeout_flag
            .or(self.timeout_secs)
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);
        cmd
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("aoc-times").join("config.toml"));
    }
    paths
}
