// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    describe_list, display_warnings, non_empty, require, InfoPrinter, MapfileOutputArgs,
    StepResults, ARG_FILE_HELP,
};
use crate::{
    constants::{
        DEFAULT_MIN_UNFLAGGED_FRACTION, DEFAULT_UNFLAGGED_MAPFILE, UNFLAGGED_FRACTION_MAPFILE,
    },
    flagging::check_unflagged_fractions,
    lists::{bool_or_string, parse_literal_list, ListArg},
    ms::{CasacoreReader, TableReader},
    StepsError,
};

lazy_static::lazy_static! {
    static ref MIN_FRACTION_HELP: String =
        format!("Measurement sets with less unflagged data than this fraction are removed. Default: {DEFAULT_MIN_UNFLAGGED_FRACTION}");

    static ref FILENAME_HELP: String =
        format!("The name of the output mapfile. The unflagged fractions are written next to it, in {UNFLAGGED_FRACTION_MAPFILE}. Default: {DEFAULT_UNFLAGGED_MAPFILE}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CheckUnflaggedArgs {
    /// The measurement sets to check, e.g. "[a.ms, b.ms]" or a single path.
    #[clap(name = "INPUTMS", parse(from_str), help_heading = "INPUT")]
    pub(super) inputms: Option<ListArg>,

    // The positional slot belongs to the measurement sets for this step.
    #[clap(long = "arguments-file", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(long, alias = "min_fraction", help = MIN_FRACTION_HELP.as_str(), help_heading = "CHECK")]
    pub(super) min_fraction: Option<f64>,

    /// Log the percentage of unflagged data of each measurement set.
    #[clap(long, help_heading = "CHECK")]
    #[serde(default, deserialize_with = "bool_or_string")]
    pub(super) print_fraction: bool,

    /// The directory to write the output mapfiles into. The default is the
    /// current directory.
    #[clap(long, help_heading = "OUTPUT MAPFILE")]
    pub(super) mapfile_dir: Option<PathBuf>,

    #[clap(long, help = FILENAME_HELP.as_str(), help_heading = "OUTPUT MAPFILE")]
    pub(super) filename: Option<String>,
}

impl CheckUnflaggedArgs {
    pub(super) fn merge(self) -> Result<CheckUnflaggedArgs, StepsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let CheckUnflaggedArgs {
                args_file: _,
                inputms,
                min_fraction,
                print_fraction,
                mapfile_dir,
                filename,
            } = unpack_arg_file!(arg_file);

            Ok(CheckUnflaggedArgs {
                args_file: None,
                inputms: cli_args.inputms.or(inputms),
                min_fraction: cli_args.min_fraction.or(min_fraction),
                print_fraction: cli_args.print_fraction || print_fraction,
                mapfile_dir: cli_args.mapfile_dir.or(mapfile_dir),
                filename: cli_args.filename.or(filename),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<CheckUnflaggedParams, StepsError> {
        debug!("{:#?}", self);

        let CheckUnflaggedArgs {
            args_file: _,
            inputms,
            min_fraction,
            print_fraction,
            mapfile_dir,
            filename,
        } = self;

        let ms_files = non_empty(parse_literal_list(require(inputms, "inputms")?), "inputms")?;
        let min_fraction = min_fraction.unwrap_or(DEFAULT_MIN_UNFLAGGED_FRACTION);
        let (mapfile_dir, filename) = MapfileOutputArgs {
            mapfile_dir,
            filename,
        }
        .parse(Some(DEFAULT_UNFLAGGED_MAPFILE))?;

        let mut printer = InfoPrinter::new("Checking unflagged fractions".into());
        printer.push_line(describe_list("measurement sets", &ms_files));
        printer.push_line(format!("Minimum unflagged fraction: {min_fraction}").into());
        printer.push_line(format!("Output: {}", mapfile_dir.join(&filename).display()).into());
        printer.display();
        display_warnings();

        Ok(CheckUnflaggedParams {
            ms_files,
            min_fraction,
            print_fraction,
            mapfile_dir,
            filename,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<Option<StepResults>, StepsError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            return Ok(None);
        }

        params.run(&CasacoreReader).map(Some)
    }
}

#[derive(Debug)]
struct CheckUnflaggedParams {
    ms_files: Vec<String>,
    min_fraction: f64,
    print_fraction: bool,
    mapfile_dir: PathBuf,
    filename: String,
}

impl CheckUnflaggedParams {
    fn run<R: TableReader>(&self, reader: &R) -> Result<StepResults, StepsError> {
        let maps = check_unflagged_fractions(
            reader,
            &self.ms_files,
            self.min_fraction,
            self.print_fraction,
        )?;
        let num_removed = maps.flags.iter().filter(|p| p.is_invalidated()).count();
        if num_removed > 0 {
            info!(
                "{num_removed} of {} measurement sets had too little unflagged data",
                self.ms_files.len()
            );
        }

        let flags_path = maps.flags.save(&self.mapfile_dir, &self.filename)?;
        let fractions_path = maps
            .fractions
            .save(&self.mapfile_dir, UNFLAGGED_FRACTION_MAPFILE)?;
        info!("Wrote {} and {}", flags_path.display(), fractions_path.display());
        Ok(StepResults::from([
            ("mapfile", flags_path.display().to_string()),
            ("fraction_mapfile", fractions_path.display().to_string()),
        ]))
    }
}
