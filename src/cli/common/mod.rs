// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Here, we abstract many aspects
//! of the steps, e.g. the `add-list-mapfile` and `copy-files` subcommands both
//! write a mapfile, so the same output arguments are shared between them.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use super::StepsError;
use crate::lists::{ListArg, ListError};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(StepsError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(StepsError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(StepsError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// What a step hands back to the pipeline, e.g. `mapfile` -> the path of the
/// mapfile it wrote.
pub(super) type StepResults = BTreeMap<&'static str, String>;

/// Log a step's results, and write them as a json object to `results_file` if
/// one was given.
pub(super) fn report_results(
    results: &StepResults,
    results_file: Option<&Path>,
) -> Result<(), StepsError> {
    let mut printer = InfoPrinter::new("Results".into());
    for (key, value) in results {
        printer.push_line(format!("{key}: {value}").into());
    }
    printer.display();

    if let Some(path) = results_file {
        debug!("Writing results to {}", path.display());
        let mut f = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut f, results).map_err(|e| {
            StepsError::Generic(format!(
                "Couldn't write results to {}: {e}",
                path.display()
            ))
        })?;
        writeln!(f)?;
        f.flush()?;
    }
    Ok(())
}

/// Where a step writes its mapfile.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct MapfileOutputArgs {
    /// The directory to write the output mapfile into. The default is the
    /// current directory.
    #[clap(long, help_heading = "OUTPUT MAPFILE")]
    pub(super) mapfile_dir: Option<PathBuf>,

    /// The name of the output mapfile.
    #[clap(long, help_heading = "OUTPUT MAPFILE")]
    pub(super) filename: Option<String>,
}

impl MapfileOutputArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            mapfile_dir: self.mapfile_dir.or(other.mapfile_dir),
            filename: self.filename.or(other.filename),
        }
    }

    /// Get the output directory and filename. If no filename was given,
    /// `default_filename` is used; if there isn't one of those either, that's
    /// an error.
    pub(super) fn parse(
        self,
        default_filename: Option<&str>,
    ) -> Result<(PathBuf, String), StepArgsError> {
        let filename = match (self.filename, default_filename) {
            (Some(f), _) => f,
            (None, Some(d)) => d.to_string(),
            (None, None) => return Err(StepArgsError::Missing("filename")),
        };
        Ok((self.mapfile_dir.unwrap_or_default(), filename))
    }
}

/// Problems with step arguments that aren't specific to a single step.
#[derive(Error, Debug)]
pub(super) enum StepArgsError {
    #[error("The argument '{0}' is required, but wasn't given on the command line or in an argument file")]
    Missing(&'static str),

    #[error("The list given for '{0}' has no elements")]
    EmptyList(&'static str),

    #[error("The argument '{name}' must be a positive number, not {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("The argument '{name}' is too large ({value} seconds)")]
    DurationTooLarge { name: &'static str, value: f64 },

    #[error("Mapfile {} has no records", .0.display())]
    EmptyMapfile(PathBuf),

    #[error(transparent)]
    BadList(#[from] ListError),
}

/// Get a list-valued argument that must be present.
pub(super) fn require(arg: Option<ListArg>, name: &'static str) -> Result<ListArg, StepArgsError> {
    arg.ok_or(StepArgsError::Missing(name))
}

/// Complain if `list` is empty.
pub(super) fn non_empty(list: Vec<String>, name: &'static str) -> Result<Vec<String>, StepArgsError> {
    if list.is_empty() {
        Err(StepArgsError::EmptyList(name))
    } else {
        Ok(list)
    }
}

/// Describe a list for the user, e.g. "3 files: a.ms, b.ms, c.ms".
pub(super) fn describe_list(what: &str, list: &[String]) -> Cow<'static, str> {
    format!("{} {what}: {}", list.len(), list.iter().join(", ")).into()
}
