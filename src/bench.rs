use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::LazyLock;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::document::ResultsDocument;
use crate::errors::{AocTimesError, Result};
use crate::types::{BenchOutcome, BenchTarget, Measurement};

pub const LAST_DAY: u32 = 25;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// `time: [<lower> <unit> <median> <unit> <upper> <unit>]`, capturing the
/// median value and its unit.
static TIME_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"time:\s*\[\s*\d+(?:\.\d+)?\s*[^\s\]]+\s+(\d+(?:\.\d+)?)\s*([^\s\]]+)\s+\d+(?:\.\d+)?\s*[^\s\]]+\s*\]",
    )
    .unwrap()
});

/// Every (day, part) to benchmark, in order. Day 25 has no part 2.
pub fn all_targets() -> Vec<BenchTarget> {
    (1..=LAST_DAY)
        .flat_map(|day| (1..=2).map(move |part| BenchTarget { day, part }))
        .filter(|t| !(t.day == LAST_DAY && t.part == 2))
        .collect()
}

/// Extract the median timing from benchmark output.
pub fn parse_timing(output: &str, target: BenchTarget) -> Result<Measurement> {
    let caps = TIME_SUMMARY
        .captures(output)
        .ok_or(AocTimesError::TimingNotFound {
            day: target.day,
            part: target.part,
        })?;
    Measurement::parse(&caps[1], &caps[2])
}

/// External command that benchmarks one target. `{day}` and `{part}` in any
/// argument are substituted per run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Default for BenchCommand {
    fn default() -> Self {
        BenchCommand {
            program: "cargo".to_string(),
            args: ["aoc", "bench", "-d", "{day}", "-p", "{part}"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout: None,
        }
    }
}

impl BenchCommand {
    pub fn args_for(&self, target: BenchTarget) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{day}", &target.day.to_string())
                    .replace("{part}", &target.part.to_string())
            })
            .collect()
    }

    /// Run the command for `target` and return its stdout. Stderr is
    /// discarded. A non-zero exit or an expired timeout is an error.
    ///
    /// On unix the command runs in its own process group, so a timeout kills
    /// everything it spawned (e.g. the bench binary under `cargo`), not just
    /// the direct child.
    pub fn capture(&self, target: BenchTarget) -> Result<String> {
        let args = self.args_for(target);
        log::debug!("running {} {}", self.program, args.join(" "));

        let spawn_err = |source| AocTimesError::BenchSpawn {
            program: self.program.clone(),
            source,
        };

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(spawn_err)?;

        // Stdout is drained on its own thread so the exit status can be
        // polled against the deadline while the pipe is still open.
        let stdout = child.stdout.take();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(read_output(stdout));
        });

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let status = match wait_until(&mut child, deadline).map_err(spawn_err)? {
            Some(status) => status,
            None => return Err(self.abandon(&mut child, target)),
        };

        // Whatever the command left behind may still hold the pipe open.
        let received = match deadline {
            Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(mpsc::RecvTimeoutError::from),
        };
        let output = match received {
            Ok(output) => output,
            Err(mpsc::RecvTimeoutError::Timeout) => return Err(self.abandon(&mut child, target)),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(io::Error::other("stdout reader stopped without a result"))
            }
        };
        let buf = output.map_err(|source| AocTimesError::BenchOutput {
            day: target.day,
            part: target.part,
            source,
        })?;

        if !status.success() {
            return Err(AocTimesError::BenchFailed {
                day: target.day,
                part: target.part,
                status,
            });
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Kill the command's process tree after its deadline passed.
    fn abandon(&self, child: &mut Child, target: BenchTarget) -> AocTimesError {
        let timeout = self.timeout.unwrap_or_default();
        log::warn!(
            "day {} part {}: killing {} after {:?}",
            target.day,
            target.part,
            self.program,
            timeout
        );
        kill_process_tree(child);
        let _ = child.wait();
        AocTimesError::BenchTimedOut {
            day: target.day,
            part: target.part,
            timeout,
        }
    }

    /// Benchmark one target and extract its median timing.
    pub fn run(&self, target: BenchTarget) -> Result<BenchOutcome> {
        let output = self.capture(target)?;
        let measurement = parse_timing(&output, target)?;
        log::debug!("day {} part {}: {}", target.day, target.part, measurement);
        Ok(BenchOutcome {
            target,
            measurement,
        })
    }
}

fn read_output<R: Read>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

/// Wait for `child` to exit. `Ok(None)` when `deadline` passes first.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        // The child leads its own group; a negative pid addresses the group.
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success());
        if killed {
            return;
        }
    }
    let _ = child.kill();
}

/// Benchmark `targets` in order, stopping at the first failure. `on_outcome`
/// sees each result as soon as it is available.
pub fn run_all<B, F>(targets: &[BenchTarget], mut bench: B, mut on_outcome: F) -> Result<Vec<BenchOutcome>>
where
    B: FnMut(BenchTarget) -> Result<BenchOutcome>,
    F: FnMut(&BenchOutcome),
{
    let mut outcomes = Vec::with_capacity(targets.len());
    for &target in targets {
        let outcome = bench(target)?;
        on_outcome(&outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Fold outcomes into an updated copy of `doc` and the total in seconds.
/// The total line is rewritten as part of the fold.
pub fn apply_outcomes(doc: &ResultsDocument, outcomes: &[BenchOutcome]) -> (ResultsDocument, f64) {
    let (mut updated, total) = outcomes.iter().fold(
        (doc.clone(), 0.0_f64),
        |(mut acc, total), outcome| {
            let key = outcome.target.key();
            if !acc.update_row(&key, &outcome.measurement) {
                log::warn!(
                    "no row for day {} part {} in results table",
                    key.day,
                    key.part
                );
            }
            (acc, total + outcome.measurement.seconds())
        },
    );

    if updated.set_total(total) == 0 {
        log::warn!("no 'Total: ' line in results table");
    }
    (updated, total)
}
