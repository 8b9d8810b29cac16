// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find antennas that are completely flagged in every measurement set.
//!
//! A [`FlagDiagnostic`] reports the fully-flagged antennas of a single
//! measurement set. [`identify_bad_antennas`] runs a diagnostic over many
//! measurement sets in parallel and keeps only the antennas that every one of
//! them reports.

use std::{
    collections::BTreeSet,
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, RecvTimeoutError};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, trace, warn};
use rayon::prelude::*;

use super::FlagDiagnosticError;
use crate::{constants::DEFAULT_DPPP, PROGRESS_BARS};

/// Something that can tell which antennas of a measurement set are fully
/// flagged.
pub trait FlagDiagnostic: Sync {
    fn flagged_antennas(&self, ms: &Path) -> Result<Vec<String>, FlagDiagnosticError>;
}

impl<F> FlagDiagnostic for F
where
    F: Fn(&Path) -> Result<Vec<String>, FlagDiagnosticError> + Sync,
{
    fn flagged_antennas(&self, ms: &Path) -> Result<Vec<String>, FlagDiagnosticError> {
        self(ms)
    }
}

/// Runs DPPP's flag counter on a measurement set and reads the fully-flagged
/// antennas out of its NOTE lines.
///
/// On timeout only the DPPP process itself is killed. If DPPP is started
/// through a wrapper that forks it, the forked process can outlive the
/// timeout, and the thread reading its output stays blocked until it exits.
#[derive(Debug, Clone)]
pub struct DpppCounter {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl Default for DpppCounter {
    fn default() -> Self {
        DpppCounter {
            executable: PathBuf::from(DEFAULT_DPPP),
            timeout: None,
        }
    }
}

impl DpppCounter {
    pub fn new<P: Into<PathBuf>>(executable: P, timeout: Option<Duration>) -> DpppCounter {
        DpppCounter {
            executable: executable.into(),
            timeout,
        }
    }

    pub(crate) fn command(&self, ms: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        command.arg(format!("msin={}", ms.display())).args([
            "msout=.",
            "steps=[count]",
            "count.type=counter",
            "count.warnperc=100",
        ]);
        command
    }
}

impl FlagDiagnostic for DpppCounter {
    fn flagged_antennas(&self, ms: &Path) -> Result<Vec<String>, FlagDiagnosticError> {
        let output = run_with_timeout(self.command(ms), self.timeout)?;
        let antennas = parse_counter_output(&output);
        debug!("{}: fully flagged antennas {antennas:?}", ms.display());
        Ok(antennas)
    }
}

/// Pull the antenna names out of flag-counter output. Only lines containing
/// "NOTE" are considered; the antenna is whatever follows the last '(' on the
/// line, minus the closing ')'.
pub(crate) fn parse_counter_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains("NOTE"))
        .filter_map(|line| {
            let tail = line.rsplit('(').next()?;
            let antenna = tail.trim_end().trim_end_matches(')');
            if antenna.is_empty() {
                None
            } else {
                Some(antenna.to_string())
            }
        })
        .collect()
}

/// Run `command` and return its stdout. If `timeout` elapses before the
/// command has closed its stdout and exited, the child is killed and a
/// [`FlagDiagnosticError::Timeout`] is returned. A non-zero exit status is
/// only warned about.
pub(crate) fn run_with_timeout(
    mut command: Command,
    timeout: Option<Duration>,
) -> Result<String, FlagDiagnosticError> {
    let program = command.get_program().to_string_lossy().to_string();
    trace!("Running {command:?}");
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| FlagDiagnosticError::Spawn {
            program: program.clone(),
            err,
        })?;
    let mut stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => unreachable!("stdout is piped"),
    };

    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let mut output = String::new();
        let result = stdout.read_to_string(&mut output).map(|_| output);
        // The receiver is gone if the command timed out.
        let _ = tx.send(result);
    });

    let deadline = timeout.map(|t| Instant::now() + t);
    let received = match deadline {
        Some(deadline) => rx.recv_deadline(deadline),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(Ok(output)) => {
            let status = wait_until(&mut child, deadline).map_err(|err| {
                FlagDiagnosticError::Output {
                    program: program.clone(),
                    err,
                }
            })?;
            match status {
                Some(status) => {
                    if !status.success() {
                        warn!("'{program}' exited with {status}");
                    }
                    Ok(output)
                }
                None => {
                    debug!("'{program}' closed its output but didn't exit; killing it");
                    let _ = child.kill();
                    let _ = child.wait();
                    Err(FlagDiagnosticError::Timeout {
                        program,
                        timeout: timeout.unwrap_or_default(),
                    })
                }
            }
        }

        Ok(Err(err)) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(FlagDiagnosticError::Output { program, err })
        }

        Err(RecvTimeoutError::Timeout) => {
            debug!("Killing '{program}' (pid {})", child.id());
            let _ = child.kill();
            let _ = child.wait();
            Err(FlagDiagnosticError::Timeout {
                program,
                timeout: timeout.unwrap_or_default(),
            })
        }

        Err(RecvTimeoutError::Disconnected) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(FlagDiagnosticError::Output {
                program,
                err: std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "the output reader stopped unexpectedly",
                ),
            })
        }
    }
}

/// Wait for `child` to exit. `None` means `deadline` passed first.
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> Result<Option<ExitStatus>, std::io::Error> {
    let deadline = match deadline {
        Some(d) => d,
        None => return child.wait().map(Some),
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(10));
    }
}

/// Run `diagnostic` over every measurement set in `ms_files` and return the
/// antennas that are fully flagged in all of them.
///
/// At most `num_threads` diagnostics run at once (all available CPUs if
/// `None`). Results are gathered in input order before they're intersected.
/// The first failing diagnostic fails the whole identification.
pub fn identify_bad_antennas<D: FlagDiagnostic + ?Sized>(
    diagnostic: &D,
    ms_files: &[PathBuf],
    num_threads: Option<usize>,
) -> Result<BTreeSet<String>, FlagDiagnosticError> {
    if ms_files.is_empty() {
        return Err(FlagDiagnosticError::NoInputs);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()?;
    debug!(
        "Running flag diagnostics on {} measurement sets with {} threads",
        ms_files.len(),
        pool.current_num_threads()
    );

    let draw_target = if PROGRESS_BARS.load() {
        ProgressDrawTarget::stdout()
    } else {
        ProgressDrawTarget::hidden()
    };
    let progress = ProgressBar::with_draw_target(Some(ms_files.len() as u64), draw_target)
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} measurement sets ({elapsed_precise}<{eta_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Counting flags");

    // An indexed parallel iterator collects in input order.
    let per_file: Vec<Result<Vec<String>, FlagDiagnosticError>> = pool.install(|| {
        ms_files
            .par_iter()
            .map(|ms| {
                let result = diagnostic.flagged_antennas(ms);
                progress.inc(1);
                result
            })
            .collect()
    });
    progress.abandon_with_message("Finished counting");

    let per_file = per_file.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(intersect(per_file))
}

/// The antennas common to every list. An empty input gives an empty set.
pub(crate) fn intersect(per_file: Vec<Vec<String>>) -> BTreeSet<String> {
    let mut sets = per_file
        .into_iter()
        .map(|antennas| antennas.into_iter().collect::<BTreeSet<_>>());
    let first = match sets.next() {
        Some(first) => first,
        None => return BTreeSet::new(),
    };
    sets.fold(first, |common, set| {
        common.intersection(&set).cloned().collect()
    })
}

/// Append a `;!<antenna>*` exclusion for each antenna to `filter`, in sorted
/// order.
pub fn extend_filter(filter: &str, antennas: &BTreeSet<String>) -> String {
    let mut filter = filter.to_string();
    for antenna in antennas {
        filter.push_str(";!");
        filter.push_str(antenna);
        filter.push('*');
    }
    filter
}
