// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with interacting with CASA measurement sets.

use std::path::PathBuf;

use marlu::rubbl_casatables;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MsError {
    #[error("Supplied file path {0} does not exist or is not readable!")]
    BadFile(PathBuf),

    #[error("The main table of measurement set {0} contains no rows!")]
    MainTableEmpty(PathBuf),

    #[error("The FLAG column of measurement set {0} contains no elements")]
    NoFlags(PathBuf),

    #[error("The OBSERVATION table of measurement set {0} has no LOFAR_TARGET")]
    NoTargetName(PathBuf),

    #[error("The SPECTRAL_WINDOW table of measurement set {0} contained no channel frequencies")]
    NoChannelFreqs(PathBuf),

    #[error("Row {row} of the UVW column has {len} elements; expected 3")]
    BadUvw { row: usize, len: usize },

    #[error("Error when trying to interface with measurement set: {0}")]
    Table(#[from] rubbl_casatables::TableError),

    #[error("Error from casacore: {0}")]
    Casacore(#[from] rubbl_casatables::CasacoreError),
}
