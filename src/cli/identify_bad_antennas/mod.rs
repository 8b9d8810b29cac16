// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::{path::PathBuf, time::Duration};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, InfoPrinter, StepArgsError, StepResults, ARG_FILE_HELP};
use crate::{
    constants::DEFAULT_DPPP,
    flagging::{extend_filter, identify_bad_antennas, DpppCounter, FlagDiagnostic},
    mapfile::DataMap,
    StepsError,
};

lazy_static::lazy_static! {
    static ref DPPP_HELP: String =
        format!("The DPPP executable used to count flags. Default: {DEFAULT_DPPP}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct IdentifyBadAntennasArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The mapfile of measurement sets to inspect. Records marked to be
    /// skipped are ignored.
    #[clap(long, help_heading = "INPUT")]
    pub(super) mapfile_in: Option<PathBuf>,

    /// The baseline filter to extend, e.g. "[CR]S*&". Each bad antenna is
    /// appended to it as ";!<antenna>*".
    #[clap(long, allow_hyphen_values = true, help_heading = "INPUT")]
    pub(super) filter: Option<String>,

    #[clap(long, help = DPPP_HELP.as_str(), help_heading = "FLAG COUNTING")]
    pub(super) dppp: Option<PathBuf>,

    /// Give up on a measurement set (and fail) if counting its flags takes
    /// longer than this many seconds. The default is to wait forever.
    #[clap(long, help_heading = "FLAG COUNTING")]
    pub(super) timeout: Option<f64>,

    /// The maximum number of measurement sets to count at once. The default
    /// is the number of available CPUs.
    #[clap(long, help_heading = "FLAG COUNTING")]
    pub(super) num_threads: Option<usize>,
}

impl IdentifyBadAntennasArgs {
    pub(super) fn merge(self) -> Result<IdentifyBadAntennasArgs, StepsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let IdentifyBadAntennasArgs {
                args_file: _,
                mapfile_in,
                filter,
                dppp,
                timeout,
                num_threads,
            } = unpack_arg_file!(arg_file);

            Ok(IdentifyBadAntennasArgs {
                args_file: None,
                mapfile_in: cli_args.mapfile_in.or(mapfile_in),
                filter: cli_args.filter.or(filter),
                dppp: cli_args.dppp.or(dppp),
                timeout: cli_args.timeout.or(timeout),
                num_threads: cli_args.num_threads.or(num_threads),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<IdentifyBadAntennasParams, StepsError> {
        debug!("{:#?}", self);

        let IdentifyBadAntennasArgs {
            args_file: _,
            mapfile_in,
            filter,
            dppp,
            timeout,
            num_threads,
        } = self;

        let mapfile_in = mapfile_in.ok_or(StepArgsError::Missing("mapfile_in"))?;
        let filter = filter.ok_or(StepArgsError::Missing("filter"))?;
        let timeout = match timeout {
            Some(t) if t.is_finite() && t > 0.0 => Some(Duration::try_from_secs_f64(t).map_err(
                |_| StepArgsError::DurationTooLarge {
                    name: "timeout",
                    value: t,
                },
            )?),
            Some(t) => {
                return Err(StepArgsError::NotPositive {
                    name: "timeout",
                    value: t,
                }
                .into())
            }
            None => None,
        };
        if num_threads == Some(0) {
            return Err(StepArgsError::NotPositive {
                name: "num_threads",
                value: 0.0,
            }
            .into());
        }

        let map = DataMap::load(&mapfile_in)?;
        let ms_files: Vec<PathBuf> = map.unskipped_files().map(PathBuf::from).collect();
        let num_skipped = map.len() - ms_files.len();

        let mut printer = InfoPrinter::new("Identifying bad antennas".into());
        printer.push_line(
            format!(
                "{} measurement sets from {} ({num_skipped} skipped)",
                ms_files.len(),
                mapfile_in.display()
            )
            .into(),
        );
        printer.push_line(format!("Filter: {filter}").into());
        if let Some(timeout) = timeout {
            printer.push_line(format!("Timeout: {}s", timeout.as_secs_f64()).into());
        }
        printer.display();
        display_warnings();

        Ok(IdentifyBadAntennasParams {
            ms_files,
            filter,
            counter: DpppCounter::new(dppp.unwrap_or_else(|| PathBuf::from(DEFAULT_DPPP)), timeout),
            num_threads,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<Option<StepResults>, StepsError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            return Ok(None);
        }

        params.run_with(&params.counter).map(Some)
    }
}

#[derive(Debug)]
struct IdentifyBadAntennasParams {
    ms_files: Vec<PathBuf>,
    filter: String,
    counter: DpppCounter,
    num_threads: Option<usize>,
}

impl IdentifyBadAntennasParams {
    fn run_with<D: FlagDiagnostic + ?Sized>(
        &self,
        diagnostic: &D,
    ) -> Result<StepResults, StepsError> {
        let bad = identify_bad_antennas(diagnostic, &self.ms_files, self.num_threads)?;
        info!("Identified bad antennas: [{}]", bad.iter().join(", "));
        let filter = extend_filter(&self.filter, &bad);
        Ok(StepResults::from([("filter", filter)]))
    }
}
