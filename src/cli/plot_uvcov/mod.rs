// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    describe_list, display_warnings, non_empty, require, InfoPrinter, StepArgsError,
    StepResults, ARG_FILE_HELP,
};
use crate::{
    constants::{DEFAULT_UVCOV_MARKER_SIZE, DEFAULT_UVCOV_TITLE},
    io::expand_globs,
    lists::{option_bool_or_string, parse_literal_list, string_to_bool, ListArg},
    ms::{CasacoreReader, TableReader},
    uvcov::{
        plot_uvcov, AntennaSelection, AxisLimits, PlotFormat, Timeslots, UvCovError, UvCovPlot,
        UvSelection, UVCOV_PLOT_EXTENSIONS,
    },
    StepsError,
};

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("The plot to write. The format is taken from the extension; supported formats: {}", *UVCOV_PLOT_EXTENSIONS);

    static ref TITLE_HELP: String =
        format!("The plot's title. Default: {DEFAULT_UVCOV_TITLE}");

    static ref MARKER_SIZE_HELP: String =
        format!("The size of each point [pixels]. Default: {DEFAULT_UVCOV_MARKER_SIZE}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct PlotUvcovArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The measurement sets to plot, e.g. "[a.ms, b.ms]", a single path, or
    /// a glob like "*.ms".
    #[clap(short, long, parse(from_str), help_heading = "INPUT")]
    pub(super) input: Option<ListArg>,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT")]
    pub(super) output: Option<PathBuf>,

    #[clap(long, help = TITLE_HELP.as_str(), help_heading = "OUTPUT")]
    pub(super) title: Option<String>,

    /// The axis limits as "xmin,xmax,ymin,ymax". Empty values are worked out
    /// from the data, e.g. ",,-10,10".
    #[clap(long, allow_hyphen_values = true, help_heading = "OUTPUT")]
    pub(super) limits: Option<String>,

    #[clap(long, help = MARKER_SIZE_HELP.as_str(), help_heading = "OUTPUT")]
    pub(super) markersize: Option<u32>,

    /// The timeslots to plot as "start,skip,end". A skip of 0 picks one
    /// automatically and an end of 0 means the last timeslot. Default: 0,0,0
    #[clap(long, help_heading = "SELECTION")]
    pub(super) timeslots: Option<String>,

    /// The antenna indices to plot baselines of, e.g. "0,3,5..9". -1 means
    /// all antennas. Default: -1
    #[clap(long, allow_hyphen_values = true, help_heading = "SELECTION")]
    pub(super) antennas: Option<String>,

    /// Plot u and v in kilolambda rather than kilometres. Default: true
    #[clap(long, parse(try_from_str = string_to_bool), help_heading = "SELECTION")]
    #[serde(default, deserialize_with = "option_bool_or_string")]
    pub(super) kilolambda: Option<bool>,

    /// Plot a point for every channel rather than only at the reference
    /// frequency. Only matters with kilolambda. Default: true
    #[clap(long, parse(try_from_str = string_to_bool), help_heading = "SELECTION")]
    #[serde(default, deserialize_with = "option_bool_or_string")]
    pub(super) wideband: Option<bool>,

    /// Use the uvw of the first measurement set for all of them, scaled by
    /// each one's wavelengths. Default: true
    #[clap(long, parse(try_from_str = string_to_bool), help_heading = "SELECTION")]
    #[serde(default, deserialize_with = "option_bool_or_string")]
    pub(super) sameuv: Option<bool>,

    /// Draw flagged rows in red. Default: true
    #[clap(long, parse(try_from_str = string_to_bool), help_heading = "SELECTION")]
    #[serde(default, deserialize_with = "option_bool_or_string")]
    pub(super) flagged: Option<bool>,
}

impl PlotUvcovArgs {
    pub(super) fn merge(self) -> Result<PlotUvcovArgs, StepsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let PlotUvcovArgs {
                args_file: _,
                input,
                output,
                title,
                limits,
                markersize,
                timeslots,
                antennas,
                kilolambda,
                wideband,
                sameuv,
                flagged,
            } = unpack_arg_file!(arg_file);

            Ok(PlotUvcovArgs {
                args_file: None,
                input: cli_args.input.or(input),
                output: cli_args.output.or(output),
                title: cli_args.title.or(title),
                limits: cli_args.limits.or(limits),
                markersize: cli_args.markersize.or(markersize),
                timeslots: cli_args.timeslots.or(timeslots),
                antennas: cli_args.antennas.or(antennas),
                kilolambda: cli_args.kilolambda.or(kilolambda),
                wideband: cli_args.wideband.or(wideband),
                sameuv: cli_args.sameuv.or(sameuv),
                flagged: cli_args.flagged.or(flagged),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<PlotUvcovParams, StepsError> {
        debug!("{:#?}", self);

        let PlotUvcovArgs {
            args_file: _,
            input,
            output,
            title,
            limits,
            markersize,
            timeslots,
            antennas,
            kilolambda,
            wideband,
            sameuv,
            flagged,
        } = self;

        let ms_files = non_empty(
            expand_globs(parse_literal_list(require(input, "input")?))?,
            "input",
        )?;
        let output = output.ok_or(StepArgsError::Missing("output"))?;
        let format = PlotFormat::from_path(&output)?;

        let limits = match limits {
            Some(l) => AxisLimits::from_str(&l)?,
            None => AxisLimits::default(),
        };
        let timeslots = match timeslots {
            Some(t) => Timeslots::from_str(&t)?,
            None => Timeslots::default(),
        };
        let antennas = match antennas {
            Some(a) => AntennaSelection::from_str(&a)?,
            None => AntennaSelection::All,
        };
        let marker_size = markersize.unwrap_or(DEFAULT_UVCOV_MARKER_SIZE);
        if marker_size == 0 {
            return Err(UvCovError::BadMarkerSize.into());
        }
        let selection = UvSelection {
            timeslots,
            antennas,
            kilolambda: kilolambda.unwrap_or(true),
            wideband: wideband.unwrap_or(true),
            sameuv: sameuv.unwrap_or(true),
            flagged: flagged.unwrap_or(true),
        };

        let mut printer = InfoPrinter::new("Plotting uv coverage".into());
        printer.push_line(describe_list("measurement sets", &ms_files));
        printer.push_line(format!("Output: {} ({format})", output.display()).into());
        printer.push_line(
            format!(
                "Units: {}",
                if selection.kilolambda {
                    "kilolambda"
                } else {
                    "km"
                }
            )
            .into(),
        );
        if let AntennaSelection::Only(antennas) = &selection.antennas {
            printer.push_line(format!("Only antennas {antennas:?}").into());
        }
        printer.display();
        display_warnings();

        Ok(PlotUvcovParams {
            ms_files,
            output,
            title: title.unwrap_or_else(|| DEFAULT_UVCOV_TITLE.to_string()),
            limits,
            marker_size,
            selection,
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
struct PlotUvcovParams {
    ms_files: Vec<String>,
    output: PathBuf,
    title: String,
    limits: AxisLimits,
    marker_size: u32,
    selection: UvSelection,
}

impl PlotUvcovParams {
    fn run<R: TableReader>(&self, reader: &R) -> Result<StepResults, StepsError> {
        plot_uvcov(
            reader,
            &self.ms_files,
            &UvCovPlot {
                output: &self.output,
                title: &self.title,
                limits: self.limits,
                marker_size: self.marker_size,
                selection: self.selection.clone(),
            },
        )?;
        info!("Wrote {}", self.output.display());
        Ok(StepResults::from([(
            "plot",
            self.output.display().to_string(),
        )]))
    }
}
