// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with uv-coverage plots.

use std::path::PathBuf;

use thiserror::Error;

use crate::ms::MsError;

#[derive(Error, Debug)]
pub enum UvCovError {
    #[cfg(not(feature = "plotting"))]
    #[error("lofar-steps was not compiled with the \"plotting\" feature.\nYou need to compile it from source with this feature to plot uv coverage.")]
    NoPlottingFeature,

    #[error("No measurement sets were supplied")]
    NoInputs,

    #[error(
        "An invalid plot format was specified ({}).\nSupported formats: {}",
        .0.display(),
        *super::UVCOV_PLOT_EXTENSIONS,
    )]
    InvalidPlotFormat(PathBuf),

    #[error("Four axis limits are needed (xmin,xmax,ymin,ymax), but {0} were given")]
    WrongNumLimits(usize),

    #[error("Couldn't parse axis limit '{0}' as a number")]
    BadLimit(String),

    #[error("Timeslots must be given as start,skip,end, not '{0}'")]
    BadTimeslots(String),

    #[error("Timeslot values must not be negative (got '{0}')")]
    NegativeTimeslot(String),

    #[error("Couldn't understand the antenna list '{0}'")]
    BadAntennaList(String),

    #[error("The marker size must be positive")]
    BadMarkerSize,

    #[error("No uv points were selected; check the timeslots and antennas")]
    NoPoints,

    #[cfg(feature = "plotting")]
    #[error(transparent)]
    Draw(#[from] super::plot::DrawError),

    #[error(transparent)]
    MeasurementSet(#[from] MsError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
