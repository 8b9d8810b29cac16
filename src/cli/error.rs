// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all lofar-steps-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::common::StepArgsError;
use crate::{
    flagging::{FlagDiagnosticError, UnflaggedError},
    io::GlobError,
    ionex::IonexError,
    lists::ListError,
    mapfile::MapfileError,
    ms::MsError,
    replicate::ReplicateError,
    uvcov::UvCovError,
};

const MAPFILE_EXAMPLE: &str =
    "[{'host': 'localhost', 'file': '/data/a.ms', 'skip': False}, ...]";

/// The *only* publicly visible error from lofar-steps. The variant says what
/// the message is about.
#[derive(Error, Debug)]
pub enum StepsError {
    /// An error related to reading or writing mapfiles.
    #[error("{0}\n\nMapfiles look like: {MAPFILE_EXAMPLE}")]
    Mapfile(String),

    /// An error related to list-valued arguments (files, hosts).
    #[error("{0}\n\nLists may be given as \"[a, b, c]\", as a single value, or (for files) as a mapfile")]
    List(String),

    /// An error related to measurement sets.
    #[error("{0}")]
    MeasurementSet(String),

    /// An error related to copying or linking files.
    #[error("{0}")]
    Replicate(String),

    /// An error related to inspecting flags.
    #[error("{0}")]
    Flagging(String),

    /// An error related to retrieving IONEX files.
    #[error("{0}")]
    Ionex(String),

    /// An error related to plotting.
    #[error("{0}")]
    Plot(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files must be toml or json, with the same argument names as the command line (underscores instead of dashes)")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary sub-command errors.

impl From<StepArgsError> for StepsError {
    fn from(e: StepArgsError) -> Self {
        match e {
            StepArgsError::BadList(e) => Self::from(e),
            StepArgsError::EmptyMapfile(_) => Self::Mapfile(e.to_string()),
            StepArgsError::Missing(_)
            | StepArgsError::EmptyList(_)
            | StepArgsError::NotPositive { .. }
            | StepArgsError::DurationTooLarge { .. } => Self::Generic(e.to_string()),
        }
    }
}

// Library code errors.

impl From<MapfileError> for StepsError {
    fn from(e: MapfileError) -> Self {
        Self::Mapfile(e.to_string())
    }
}

impl From<ListError> for StepsError {
    fn from(e: ListError) -> Self {
        let s = e.to_string();
        match e {
            ListError::EmptyHostList { .. } | ListError::NotABool(_) => Self::List(s),
            ListError::Mapfile(e) => Self::from(e),
        }
    }
}

impl From<MsError> for StepsError {
    fn from(e: MsError) -> Self {
        Self::MeasurementSet(e.to_string())
    }
}

impl From<ReplicateError> for StepsError {
    fn from(e: ReplicateError) -> Self {
        Self::Replicate(e.to_string())
    }
}

impl From<FlagDiagnosticError> for StepsError {
    fn from(e: FlagDiagnosticError) -> Self {
        let s = e.to_string();
        match e {
            FlagDiagnosticError::NoInputs
            | FlagDiagnosticError::Spawn { .. }
            | FlagDiagnosticError::Timeout { .. }
            | FlagDiagnosticError::Output { .. }
            | FlagDiagnosticError::Diagnostic { .. } => Self::Flagging(s),
            FlagDiagnosticError::ThreadPool(_) => Self::Generic(s),
        }
    }
}

impl From<UnflaggedError> for StepsError {
    fn from(e: UnflaggedError) -> Self {
        let s = e.to_string();
        match e {
            UnflaggedError::NoInputs | UnflaggedError::BadMinFraction(_) => Self::Flagging(s),
            UnflaggedError::MeasurementSet(e) => Self::from(e),
        }
    }
}

impl From<IonexError> for StepsError {
    fn from(e: IonexError) -> Self {
        let s = e.to_string();
        match e {
            IonexError::NoInputs
            | IonexError::NotADirectory(_)
            | IonexError::BadTimeRange { .. }
            | IonexError::UnsupportedScheme(_)
            | IonexError::Proxy { .. }
            | IonexError::Client(_)
            | IonexError::Http { .. }
            | IonexError::Exhausted { .. } => Self::Ionex(s),
            IonexError::Write { .. } => Self::Generic(s),
            IonexError::MeasurementSet(e) => Self::from(e),
        }
    }
}

impl From<UvCovError> for StepsError {
    fn from(e: UvCovError) -> Self {
        let s = e.to_string();
        match e {
            #[cfg(not(feature = "plotting"))]
            UvCovError::NoPlottingFeature => Self::Plot(s),
            UvCovError::NoInputs
            | UvCovError::InvalidPlotFormat(_)
            | UvCovError::WrongNumLimits(_)
            | UvCovError::BadLimit(_)
            | UvCovError::BadTimeslots(_)
            | UvCovError::NegativeTimeslot(_)
            | UvCovError::BadAntennaList(_)
            | UvCovError::BadMarkerSize
            | UvCovError::NoPoints => Self::Plot(s),
            #[cfg(feature = "plotting")]
            UvCovError::Draw(_) => Self::Plot(s),
            UvCovError::MeasurementSet(e) => Self::from(e),
            UvCovError::IO(e) => Self::from(e),
        }
    }
}

impl From<GlobError> for StepsError {
    fn from(e: GlobError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for StepsError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
