// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{InfoPrinter, StepArgsError, StepResults, ARG_FILE_HELP};
use crate::{
    mapfile::DataMap,
    ms::{CasacoreReader, MeasurementSet, TableReader},
    StepsError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct TargetNameArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// A mapfile of measurement sets of the observation. Only the first one
    /// is read.
    #[clap(long, help_heading = "INPUT")]
    pub(super) mapfile_in: Option<PathBuf>,
}

impl TargetNameArgs {
    pub(super) fn merge(self) -> Result<TargetNameArgs, StepsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let TargetNameArgs {
                args_file: _,
                mapfile_in,
            } = unpack_arg_file!(arg_file);

            Ok(TargetNameArgs {
                args_file: None,
                mapfile_in: cli_args.mapfile_in.or(mapfile_in),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<TargetNameParams, StepsError> {
        debug!("{:#?}", self);

        let mapfile_in = self
            .mapfile_in
            .ok_or(StepArgsError::Missing("mapfile_in"))?;
        let map = DataMap::load(&mapfile_in)?;
        let ms = match map.first() {
            Some(product) => PathBuf::from(product.file()),
            None => return Err(StepArgsError::EmptyMapfile(mapfile_in).into()),
        };

        let mut printer = InfoPrinter::new("Getting the target name".into());
        printer.push_line(format!("Measurement set: {}", ms.display()).into());
        printer.display();

        Ok(TargetNameParams { ms })
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
struct TargetNameParams {
    ms: PathBuf,
}

impl TargetNameParams {
    fn run<R: TableReader>(&self, reader: &R) -> Result<StepResults, StepsError> {
        let target_name = reader.open(&self.ms)?.target_name()?;
        info!("Target name: {target_name}");
        Ok(StepResults::from([("targetName", target_name)]))
    }
}
