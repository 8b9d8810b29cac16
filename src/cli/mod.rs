// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code. Each pipeline step is a `lofar-steps`
//! subcommand with its own module.
//!
//! All booleans must have `#[serde(default)]` annotated, and anything that
//! isn't a boolean must be optional. This allows all arguments to be optional
//! *and* usable in an arguments file.
//!
//! Only 3 things should be public in this module: `LofarSteps`,
//! `LofarSteps::run`, and `StepsError`.

#[macro_use]
mod common;
mod add_list_mapfile;
mod check_unflagged;
mod copy_files;
mod download_ionex;
mod error;
mod identify_bad_antennas;
mod plot_uvcov;
mod target_name;

pub use error::StepsError;

use std::path::PathBuf;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;

use crate::PROGRESS_BARS;

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Mapfile bookkeeping and small pipeline steps for LOFAR calibration pipelines"
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct LofarSteps {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Don't draw progress bars.
    #[clap(long)]
    #[clap(global = true)]
    no_progress_bars: bool,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,

    /// Only verify that arguments were correctly ingested and print out
    /// high-level information.
    #[clap(long)]
    #[clap(global = true)]
    dry_run: bool,

    /// Save the input arguments into a new TOML file that can be used to
    /// reproduce this run.
    #[clap(long)]
    #[clap(global = true)]
    save_toml: Option<PathBuf>,

    /// Write the step's results (e.g. the path of the mapfile it wrote) to
    /// this file as a json object.
    #[clap(long)]
    #[clap(global = true)]
    results_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    #[clap(alias = "add-list")]
    #[clap(about = "Make a mapfile out of a list of files and hosts.")]
    AddListMapfile(add_list_mapfile::AddListMapfileArgs),

    #[clap(about = "Copy (or link) a single file or directory to many destinations.")]
    CopyFiles(copy_files::CopyFilesArgs),

    #[clap(alias = "check-unflagged")]
    #[clap(
        about = "Invalidate measurement sets that have too little unflagged data."
    )]
    CheckUnflaggedFraction(check_unflagged::CheckUnflaggedArgs),

    #[clap(
        about = "Find antennas that are fully flagged in every measurement set and exclude them from a baseline filter."
    )]
    IdentifyBadAntennas(identify_bad_antennas::IdentifyBadAntennasArgs),

    #[clap(about = "Get the target name of an observation.")]
    GetTargetName(target_name::TargetNameArgs),

    #[clap(
        about = r#"Plot the uv coverage of measurement sets. Only available if compiled with the "plotting" feature."#
    )]
    PlotUvcov(plot_uvcov::PlotUvcovArgs),

    #[clap(about = "Retrieve the IONEX files covering an observation.")]
    DownloadIonex(download_ionex::DownloadIonexArgs),
}

impl LofarSteps {
    pub fn run(self) -> Result<(), StepsError> {
        // Set up logging.
        let GlobalArgs {
            verbosity,
            dry_run,
            no_progress_bars,
            save_toml,
            results_file,
        } = self.global_opts;
        setup_logging(verbosity)
            .map_err(|e| StepsError::Generic(format!("Failed to initialise logging: {e}")))?;
        // Enable progress bars if the user didn't say "no progress bars".
        if !no_progress_bars {
            PROGRESS_BARS.store(true);
        }

        // Print the version of lofar-steps and its build-time information.
        let sub_command = match &self.command {
            Command::AddListMapfile(_) => "add-list-mapfile",
            Command::CopyFiles(_) => "copy-files",
            Command::CheckUnflaggedFraction(_) => "check-unflagged-fraction",
            Command::IdentifyBadAntennas(_) => "identify-bad-antennas",
            Command::GetTargetName(_) => "get-target-name",
            Command::PlotUvcov(_) => "plot-uvcov",
            Command::DownloadIonex(_) => "download-ionex",
        };
        info!("lofar-steps {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        macro_rules! merge_save_run {
            ($args:expr) => {{
                let args = $args.merge()?;
                if let Some(toml) = save_toml {
                    use std::{
                        fs::File,
                        io::{BufWriter, Write},
                    };

                    let mut f = BufWriter::new(File::create(toml)?);
                    let toml_str = toml::to_string(&args).map_err(|e| {
                        StepsError::Generic(format!("Couldn't serialise arguments to toml: {e}"))
                    })?;
                    f.write_all(toml_str.as_bytes())?;
                }
                args.run(dry_run)?
            }};
        }

        let results = match self.command {
            Command::AddListMapfile(args) => merge_save_run!(args),
            Command::CopyFiles(args) => merge_save_run!(args),
            Command::CheckUnflaggedFraction(args) => merge_save_run!(args),
            Command::IdentifyBadAntennas(args) => merge_save_run!(args),
            Command::GetTargetName(args) => merge_save_run!(args),
            Command::PlotUvcov(args) => merge_save_run!(args),
            Command::DownloadIonex(args) => merge_save_run!(args),
        };

        match results {
            Some(results) => common::report_results(&results, results_file.as_deref())?,
            None => info!("Dry run -- exiting now."),
        }

        info!("lofar-steps {} complete.", sub_command);
        Ok(())
    }
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        info!("            git head ref: {}", hr);
    }
    info!("            {}", BUILT_TIME_UTC);
    info!("         with compiler {}", RUSTC_VERSION);
    info!("");
}
