// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    describe_list, display_warnings, non_empty, require, InfoPrinter, MapfileOutputArgs,
    StepResults, Warn, ARG_FILE_HELP,
};
use crate::{
    constants::LOCALHOST,
    lists::{align_hosts, bool_or_string, parse_file_list, parse_host_list, ListArg},
    mapfile::{build_records, NoCheck, SkipPolicy, ValidTable},
    ms::{CasacoreReader, TableReader},
    StepsError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct AddListMapfileArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The files to put into the mapfile. Either a list like "[a.ms, b.ms]",
    /// a single file, or a mapfile whose entries are such lists.
    #[clap(long, parse(from_str), help_heading = "INPUT")]
    pub(super) files: Option<ListArg>,

    /// The hosts to pair with the files, e.g. "[node1, node2]". If there are
    /// fewer hosts than files, the hosts are used again from the start.
    /// Default: localhost
    #[clap(long, parse(from_str), help_heading = "INPUT")]
    pub(super) hosts: Option<ListArg>,

    /// Mark files that don't exist to be skipped. Measurement sets that can't
    /// be opened are skipped too.
    #[clap(long, help_heading = "INPUT")]
    #[serde(default, deserialize_with = "bool_or_string")]
    pub(super) check_files_exist: bool,

    /// When checking files, also skip measurement sets without this column.
    #[clap(long, help_heading = "INPUT")]
    pub(super) required_column: Option<String>,

    #[clap(flatten)]
    #[serde(flatten)]
    pub(super) output: MapfileOutputArgs,
}

impl AddListMapfileArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<AddListMapfileArgs, StepsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let AddListMapfileArgs {
                args_file: _,
                files,
                hosts,
                check_files_exist,
                required_column,
                output,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(AddListMapfileArgs {
                args_file: None,
                files: cli_args.files.or(files),
                hosts: cli_args.hosts.or(hosts),
                check_files_exist: cli_args.check_files_exist || check_files_exist,
                required_column: cli_args.required_column.or(required_column),
                output: cli_args.output.merge(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<AddListMapfileParams, StepsError> {
        debug!("{:#?}", self);

        let AddListMapfileArgs {
            args_file: _,
            files,
            hosts,
            check_files_exist,
            required_column,
            output,
        } = self;

        let files = non_empty(parse_file_list(require(files, "files")?)?, "files")?;
        let hosts = match hosts {
            Some(hosts) => parse_host_list(hosts),
            None => vec![LOCALHOST.to_string()],
        };
        if hosts.len() > files.len() {
            format!(
                "{} hosts were given for {} files; the extra hosts are ignored",
                hosts.len(),
                files.len()
            )
            .warn();
        }
        let hosts = align_hosts(&hosts, &files)?;
        let (mapfile_dir, filename) = output.parse(None)?;

        let check = match (check_files_exist, required_column) {
            (false, None) => FileCheck::None,
            (false, Some(column)) => {
                format!("A required column ({column}) was given, so files are being checked")
                    .warn();
                FileCheck::Tables { column: Some(column) }
            }
            (true, column) => FileCheck::Tables { column },
        };

        let mut printer = InfoPrinter::new("Adding files to a mapfile".into());
        printer.push_line(describe_list("files", &files));
        printer.push_line(
            match &check {
                FileCheck::None => "Not checking files".to_string(),
                FileCheck::Tables { column: None } => "Skipping files that don't exist".to_string(),
                FileCheck::Tables {
                    column: Some(column),
                } => format!("Skipping files that don't exist or lack column {column}"),
            }
            .into(),
        );
        printer.push_line(format!("Output: {}", mapfile_dir.join(&filename).display()).into());
        printer.display();
        display_warnings();

        Ok(AddListMapfileParams {
            files,
            hosts,
            check,
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

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileCheck {
    None,
    Tables { column: Option<String> },
}

#[derive(Debug)]
struct AddListMapfileParams {
    files: Vec<String>,
    /// Aligned with `files`.
    hosts: Vec<String>,
    check: FileCheck,
    mapfile_dir: PathBuf,
    filename: String,
}

impl AddListMapfileParams {
    fn run<R: TableReader>(&self, reader: &R) -> Result<StepResults, StepsError> {
        let valid_table;
        let policy: &dyn SkipPolicy = match &self.check {
            FileCheck::None => &NoCheck,
            FileCheck::Tables { column } => {
                valid_table = ValidTable::new(reader, column.clone());
                &valid_table
            }
        };
        let map = build_records(&self.hosts, &self.files, policy);
        let num_skipped = map.iter().filter(|p| p.skip()).count();
        if num_skipped > 0 {
            info!("{num_skipped} of {} files will be skipped", map.len());
        }

        let path = map.save(&self.mapfile_dir, &self.filename)?;
        info!("Wrote {}", path.display());
        Ok(StepResults::from([("mapfile", path.display().to_string())]))
    }
}
