// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with retrieving IONEX files.

use std::path::PathBuf;

use itertools::Itertools;
use thiserror::Error;

use crate::ms::MsError;

#[derive(Error, Debug)]
pub enum IonexError {
    #[error("No measurement sets were supplied")]
    NoInputs,

    #[error("The IONEX directory {} exists but isn't a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("The measurement set's times ({first}..{last} MJD seconds) are not usable")]
    BadTimeRange { first: f64, last: f64 },

    #[error("Can't retrieve '{0}'; only http:// and https:// URLs are supported")]
    UnsupportedScheme(String),

    #[error("Invalid proxy '{proxy}': {err}")]
    Proxy {
        proxy: String,
        #[source]
        err: reqwest::Error,
    },

    #[error("Couldn't set up the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request for {url} failed: {err}")]
    Http {
        url: String,
        #[source]
        err: reqwest::Error,
    },

    #[error("IONEX data for {day} is not available from any server:\n{}", .attempts.iter().map(|a| format!("  {a}")).join("\n"))]
    Exhausted { day: String, attempts: Vec<String> },

    #[error("Couldn't write {}: {err}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error(transparent)]
    MeasurementSet(#[from] MsError),
}
