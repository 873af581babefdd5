use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use aoc_times::bench;
use aoc_times::config::Config;
use aoc_times::display;
use aoc_times::document::ResultsDocument;

#[derive(Parser)]
#[command(
    name = "auto-bench",
    version,
    about = "Benchmark every day and part and update the README timing table"
)]
struct Cli {
    /// Results document to update
    #[arg(long, value_name = "PATH")]
    readme: Option<PathBuf>,

    /// Config file (default: ./aoc-times.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Per-benchmark timeout in seconds, 0 for none
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the updated document instead of writing it
    #[arg(long)]
    dry_run: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let readme = config.readme_path(cli.readme);
    let command = config.bench_command(cli.timeout);

    // Read up front so a missing table fails before any benchmark runs.
    let doc = ResultsDocument::load(&readme)?;

    let targets = bench::all_targets();
    let outcomes = bench::run_all(
        &targets,
        |target| command.run(target),
        |outcome| println!("{}", display::format_bench_line(outcome)),
    )?;

    let (updated, total) = bench::apply_outcomes(&doc, &outcomes);
    println!("{}", display::format_run_total(total));

    if cli.dry_run {
        print!("{}", updated.render());
    } else {
        updated.save(&readme)?;
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}
