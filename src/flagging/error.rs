// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with flag diagnostics.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::ms::MsError;

#[derive(Error, Debug)]
pub enum FlagDiagnosticError {
    #[error("No unskipped measurement sets were supplied; there is nothing to diagnose")]
    NoInputs,

    #[error("Couldn't start '{program}': {err}")]
    Spawn {
        program: String,
        #[source]
        err: std::io::Error,
    },

    #[error("'{program}' didn't finish within {}s and was killed", .timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    #[error("Couldn't read the output of '{program}': {err}")]
    Output {
        program: String,
        #[source]
        err: std::io::Error,
    },

    #[error("Diagnostic of {} failed: {reason}", .ms.display())]
    Diagnostic { ms: PathBuf, reason: String },

    #[error("Couldn't build the diagnostic thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Error, Debug)]
pub enum UnflaggedError {
    #[error("No measurement sets were supplied")]
    NoInputs,

    #[error("The minimum unflagged fraction must be between 0 and 1, not {0}")]
    BadMinFraction(f64),

    #[error(transparent)]
    MeasurementSet(#[from] MsError),
}
