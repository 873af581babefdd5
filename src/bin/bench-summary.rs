use std::path::PathBuf;
use std::process;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;

use aoc_times::config::Config;
use aoc_times::display;
use aoc_times::document::ResultsDocument;
use aoc_times::summary::{DEFAULT_TOP, Summary};

#[derive(Parser)]
#[command(
    name = "bench-summary",
    version,
    about = "Total the README timing table and list the slowest parts"
)]
struct Cli {
    /// Results document to read
    #[arg(long, value_name = "PATH")]
    readme: Option<PathBuf>,

    /// Config file (default: ./aoc-times.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How many of the slowest parts to list
    #[arg(long, default_value_t = DEFAULT_TOP)]
    top: usize,

    #[arg(long)]
    json: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let readme = config.readme_path(cli.readme);

    let doc = ResultsDocument::load(&readme)?;
    let summary = Summary::from_document(&doc)?;

    if cli.json {
        let biggest = summary.biggest(cli.top)?;
        println!("{}", display::format_json(&summary, biggest, Utc::now()));
        return Ok(());
    }

    println!("{}", display::format_summary_total(&summary));
    let biggest = summary.biggest(cli.top)?;
    print!("{}", display::format_biggest(biggest));

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
