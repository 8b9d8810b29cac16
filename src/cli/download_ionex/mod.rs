// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::common::{
    display_warnings, non_empty, require, InfoPrinter, StepResults, Warn, ARG_FILE_HELP,
};
use crate::{
    constants::{DEFAULT_IONEX_DIR, DEFAULT_IONEX_PREFIX, DEFAULT_IONEX_SERVER},
    ionex::{
        default_candidates, retrieve_ionex, HttpFetcher, IonexFetcher, IonexSource, ProxyConfig,
    },
    lists::{parse_literal_list, ListArg},
    ms::{CasacoreReader, MeasurementSet, TableReader},
    StepsError,
};

lazy_static::lazy_static! {
    static ref SERVER_HELP: String =
        format!("The URL of the server to get IONEX files from. Default: {DEFAULT_IONEX_SERVER}");

    static ref PREFIX_HELP: String =
        format!("The prefix of the IONEX files. Default: {DEFAULT_IONEX_PREFIX}");

    static ref IONEX_PATH_HELP: String =
        format!("The directory to put the IONEX files into. Files already there are used instead of being downloaded again. Default: {DEFAULT_IONEX_DIR}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct DownloadIonexArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The measurement sets of the observation, e.g. "[a.ms, b.ms]". Only the
    /// first is used to work out the observation's time range.
    #[clap(short, long, parse(from_str), help_heading = "INPUT")]
    pub(super) ms_files: Option<ListArg>,

    #[clap(long, help = SERVER_HELP.as_str(), help_heading = "IONEX")]
    pub(super) server: Option<String>,

    #[clap(long, help = PREFIX_HELP.as_str(), help_heading = "IONEX")]
    pub(super) prefix: Option<String>,

    #[clap(long, alias = "path", alias = "ionexpath", help = IONEX_PATH_HELP.as_str(), help_heading = "IONEX")]
    pub(super) ionex_path: Option<PathBuf>,

    /// The proxy server to download through, e.g. "proxy.example.com".
    #[clap(long, help_heading = "PROXY")]
    pub(super) proxy_server: Option<String>,

    /// The port of the proxy server.
    #[clap(long, help_heading = "PROXY")]
    pub(super) proxy_port: Option<u16>,

    /// The type of the proxy, e.g. "http" or "socks5". Default: http
    #[clap(long, help_heading = "PROXY")]
    pub(super) proxy_type: Option<String>,

    /// The user name for the proxy.
    #[clap(long, help_heading = "PROXY")]
    pub(super) proxy_user: Option<String>,

    /// The password for the proxy.
    #[clap(long, help_heading = "PROXY")]
    pub(super) proxy_pass: Option<String>,
}

impl DownloadIonexArgs {
    pub(super) fn merge(self) -> Result<DownloadIonexArgs, StepsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let DownloadIonexArgs {
                args_file: _,
                ms_files,
                server,
                prefix,
                ionex_path,
                proxy_server,
                proxy_port,
                proxy_type,
                proxy_user,
                proxy_pass,
            } = unpack_arg_file!(arg_file);

            Ok(DownloadIonexArgs {
                args_file: None,
                ms_files: cli_args.ms_files.or(ms_files),
                server: cli_args.server.or(server),
                prefix: cli_args.prefix.or(prefix),
                ionex_path: cli_args.ionex_path.or(ionex_path),
                proxy_server: cli_args.proxy_server.or(proxy_server),
                proxy_port: cli_args.proxy_port.or(proxy_port),
                proxy_type: cli_args.proxy_type.or(proxy_type),
                proxy_user: cli_args.proxy_user.or(proxy_user),
                proxy_pass: cli_args.proxy_pass.or(proxy_pass),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<DownloadIonexParams, StepsError> {
        // Don't log the proxy password.
        debug!(
            "{:#?}",
            DownloadIonexArgs {
                proxy_pass: self.proxy_pass.as_ref().map(|_| "***".to_string()),
                ..self.clone()
            }
        );

        let DownloadIonexArgs {
            args_file: _,
            ms_files,
            server,
            prefix,
            ionex_path,
            proxy_server,
            proxy_port,
            proxy_type,
            proxy_user,
            proxy_pass,
        } = self;

        let ms_files = non_empty(parse_literal_list(require(ms_files, "ms_files")?), "ms_files")?;
        if ms_files.len() > 1 {
            format!(
                "{} measurement sets were given; only the first ({}) is used",
                ms_files.len(),
                ms_files[0]
            )
            .warn();
        }
        let ms = PathBuf::from(&ms_files[0]);

        let server = server.unwrap_or_else(|| DEFAULT_IONEX_SERVER.to_string());
        let prefix = prefix.unwrap_or_else(|| DEFAULT_IONEX_PREFIX.to_string());
        let candidates = default_candidates(&server, &prefix);
        let ionex_dir = ionex_path.unwrap_or_else(|| PathBuf::from(DEFAULT_IONEX_DIR));

        let proxy = match proxy_server {
            Some(server) => Some(ProxyConfig {
                server,
                port: proxy_port,
                proxy_type,
                user: proxy_user,
                pass: proxy_pass,
            }),
            None => {
                if proxy_port.is_some() || proxy_user.is_some() || proxy_pass.is_some() {
                    "Proxy settings were given without a proxy server; they are ignored".warn();
                }
                None
            }
        };

        let mut printer = InfoPrinter::new("Retrieving IONEX files".into());
        printer.push_line(format!("Measurement set: {}", ms.display()).into());
        let mut block = vec!["Servers, in order:".into()];
        for source in &candidates {
            block.push(format!("{source}").into());
        }
        printer.push_block(block);
        printer.push_line(format!("IONEX directory: {}", ionex_dir.display()).into());
        if let Some(proxy) = &proxy {
            printer.push_line(format!("Proxy: {}", proxy.url()).into());
        }
        printer.display();
        display_warnings();

        Ok(DownloadIonexParams {
            ms,
            candidates,
            ionex_dir,
            proxy,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<Option<StepResults>, StepsError> {
        debug!("Converting arguments into parameters");
        let params = self.parse()?;

        if dry_run {
            return Ok(None);
        }

        let fetcher = HttpFetcher::new(params.proxy.as_ref())?;
        params.run_with(&CasacoreReader, &fetcher).map(Some)
    }
}

#[derive(Debug)]
struct DownloadIonexParams {
    ms: PathBuf,
    candidates: Vec<IonexSource>,
    ionex_dir: PathBuf,
    proxy: Option<ProxyConfig>,
}

impl DownloadIonexParams {
    fn run_with<R: TableReader, F: IonexFetcher + ?Sized>(
        &self,
        reader: &R,
        fetcher: &F,
    ) -> Result<StepResults, StepsError> {
        let range = reader.open(&self.ms)?.time_range()?;
        debug!(
            "Time range of {}: {} to {} (interval {}s)",
            self.ms.display(),
            range.first,
            range.last,
            range.interval
        );
        let paths = retrieve_ionex(&range, &self.candidates, &self.ionex_dir, fetcher)?;
        info!("{} IONEX file(s) available", paths.len());
        Ok(StepResults::from([(
            "ionex_files",
            format!("[{}]", paths.iter().map(|p| p.display()).join(", ")),
        )]))
    }
}
