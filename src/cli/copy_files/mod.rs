// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    describe_list, display_warnings, non_empty, require, InfoPrinter, MapfileOutputArgs,
    StepArgsError, StepResults, Warn, ARG_FILE_HELP,
};
use crate::{
    constants::LOCALHOST,
    lists::{align_hosts, bool_or_string, parse_file_list, parse_host_list, ListArg},
    mapfile::{DataMap, DataProduct},
    replicate::{replicate, ReplicateMode},
    StepsError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CopyFilesArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The file or directory to copy.
    #[clap(long, help_heading = "INPUT")]
    pub(super) input_file: Option<PathBuf>,

    /// A mapfile whose first record is the file or directory to copy. Used
    /// only if --input-file isn't given.
    #[clap(long, help_heading = "INPUT")]
    pub(super) input_mapfile: Option<PathBuf>,

    /// Where to copy to. Either a list like "[s1.skymodel, s2.skymodel]", a
    /// single path, or a mapfile whose entries are such lists.
    #[clap(long, parse(from_str), help_heading = "OUTPUT FILES")]
    pub(super) output_files: Option<ListArg>,

    /// The hosts to pair with the output files. If there are fewer hosts than
    /// files, the hosts are used again from the start.
    /// Default: localhost
    #[clap(long, parse(from_str), help_heading = "OUTPUT FILES")]
    pub(super) hosts: Option<ListArg>,

    /// Copy the input once and make every output file a symbolic link to that
    /// copy. The output mapfile then points at the copy.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default, deserialize_with = "bool_or_string")]
    pub(super) link: bool,

    /// With --link, where to put the copy of the input. The default is next to
    /// the first output file, with a ".linksrc" extension.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) link_source: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(flatten)]
    pub(super) output: MapfileOutputArgs,
}

impl CopyFilesArgs {
    pub(super) fn merge(self) -> Result<CopyFilesArgs, StepsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let CopyFilesArgs {
                args_file: _,
                input_file,
                input_mapfile,
                output_files,
                hosts,
                link,
                link_source,
                output,
            } = unpack_arg_file!(arg_file);

            Ok(CopyFilesArgs {
                args_file: None,
                input_file: cli_args.input_file.or(input_file),
                input_mapfile: cli_args.input_mapfile.or(input_mapfile),
                output_files: cli_args.output_files.or(output_files),
                hosts: cli_args.hosts.or(hosts),
                link: cli_args.link || link,
                link_source: cli_args.link_source.or(link_source),
                output: cli_args.output.merge(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<CopyFilesParams, StepsError> {
        debug!("{:#?}", self);

        let CopyFilesArgs {
            args_file: _,
            input_file,
            input_mapfile,
            output_files,
            hosts,
            link,
            link_source,
            output,
        } = self;

        let source = match (input_file, input_mapfile) {
            (Some(file), Some(mapfile)) => {
                format!(
                    "Both an input file and an input mapfile ({}) were given; using the input file",
                    mapfile.display()
                )
                .warn();
                file
            }
            (Some(file), None) => file,
            (None, Some(mapfile)) => {
                let map = DataMap::load(&mapfile)?;
                match map.first() {
                    Some(product) => PathBuf::from(product.file()),
                    None => return Err(StepArgsError::EmptyMapfile(mapfile).into()),
                }
            }
            (None, None) => return Err(StepArgsError::Missing("input_file").into()),
        };

        let destinations = non_empty(
            parse_file_list(require(output_files, "output_files")?)?,
            "output_files",
        )?;
        let hosts = match hosts {
            Some(hosts) => parse_host_list(hosts),
            None => vec![LOCALHOST.to_string()],
        };
        if hosts.len() > destinations.len() {
            format!(
                "{} hosts were given for {} output files; the extra hosts are ignored",
                hosts.len(),
                destinations.len()
            )
            .warn();
        }
        let hosts = align_hosts(&hosts, &destinations)?;
        let (mapfile_dir, filename) = output.parse(None)?;

        let mode = if link {
            ReplicateMode::Link {
                materialised: link_source,
            }
        } else {
            if link_source.is_some() {
                "--link-source does nothing without --link".warn();
            }
            ReplicateMode::Copy
        };

        let mut printer = InfoPrinter::new("Copying files".into());
        printer.push_line(format!("Input: {}", source.display()).into());
        printer.push_line(describe_list("output files", &destinations));
        match &mode {
            ReplicateMode::Copy => (),
            ReplicateMode::Link {
                materialised: Some(m),
            } => printer.push_line(format!("Linking outputs to {}", m.display()).into()),
            ReplicateMode::Link { materialised: None } => {
                printer.push_line("Linking outputs to a single copy".into())
            }
        }
        printer.push_line(format!("Output: {}", mapfile_dir.join(&filename).display()).into());
        printer.display();
        display_warnings();

        Ok(CopyFilesParams {
            source,
            destinations: destinations.into_iter().map(PathBuf::from).collect(),
            hosts,
            mode,
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

        params.run().map(Some)
    }
}

#[derive(Debug)]
struct CopyFilesParams {
    source: PathBuf,
    destinations: Vec<PathBuf>,
    /// Aligned with `destinations`.
    hosts: Vec<String>,
    mode: ReplicateMode,
    mapfile_dir: PathBuf,
    filename: String,
}

impl CopyFilesParams {
    fn run(&self) -> Result<StepResults, StepsError> {
        let products: Vec<DataProduct> =
            replicate(&self.source, &self.destinations, &self.hosts, &self.mode)?;
        let map: DataMap = products.into_iter().collect();

        let path = map.save(&self.mapfile_dir, &self.filename)?;
        info!("Wrote {}", path.display());
        Ok(StepResults::from([("mapfile", path.display().to_string())]))
    }
}
