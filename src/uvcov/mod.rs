// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! uv-coverage plots of measurement sets.

mod error;
mod params;
#[cfg(feature = "plotting")]
mod plot;
mod points;
#[cfg(test)]
mod tests;
#[cfg(feature = "plotting")]
mod vector;

pub use error::UvCovError;
pub use params::{AntennaSelection, AxisLimits, PlotRange, Timeslots};
#[cfg(feature = "plotting")]
pub use plot::{plot_uv_points, DrawError, PlotStyle};
pub use points::{collect_uv_points, UvPoint, UvSelection};

use std::{path::Path, str::FromStr};

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::ms::TableReader;

lazy_static::lazy_static! {
    pub(crate) static ref UVCOV_PLOT_EXTENSIONS: String = PlotFormat::iter().join(", ");
}

/// The file formats uv-coverage plots can be written in. The format is taken
/// from the output file's extension.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
pub enum PlotFormat {
    #[strum(serialize = "png")]
    Png,

    #[strum(serialize = "pdf")]
    Pdf,

    #[strum(serialize = "eps")]
    Eps,

    #[strum(serialize = "ps")]
    Ps,
}

impl PlotFormat {
    pub fn from_path(path: &Path) -> Result<PlotFormat, UvCovError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| PlotFormat::from_str(e).ok())
            .ok_or_else(|| UvCovError::InvalidPlotFormat(path.to_path_buf()))
    }
}

/// Everything needed to make a uv-coverage plot.
#[derive(Debug, Clone)]
pub struct UvCovPlot<'a> {
    pub output: &'a Path,
    pub title: &'a str,
    pub limits: AxisLimits,
    pub marker_size: u32,
    pub selection: UvSelection,
}

/// Gather the uv points of `ms_files` and plot them. The output format is
/// checked before any measurement set is read.
pub fn plot_uvcov<R: TableReader>(
    reader: &R,
    ms_files: &[String],
    plot: &UvCovPlot,
) -> Result<(), UvCovError> {
    let format = PlotFormat::from_path(plot.output)?;
    if plot.marker_size == 0 {
        return Err(UvCovError::BadMarkerSize);
    }
    if ms_files.is_empty() {
        return Err(UvCovError::NoInputs);
    }

    draw(reader, ms_files, plot, format)
}

#[cfg(feature = "plotting")]
fn draw<R: TableReader>(
    reader: &R,
    ms_files: &[String],
    plot: &UvCovPlot,
    format: PlotFormat,
) -> Result<(), UvCovError> {
    let points = collect_uv_points(reader, ms_files, &plot.selection)?;
    let range = plot.limits.resolve(&points);
    log::info!("Plotting {} uv points", points.len());
    plot_uv_points(
        &points,
        &range,
        &PlotStyle {
            title: plot.title,
            kilolambda: plot.selection.kilolambda,
            marker_size: plot.marker_size,
        },
        plot.output,
        format,
    )?;
    Ok(())
}

#[cfg(not(feature = "plotting"))]
fn draw<R: TableReader>(
    _reader: &R,
    _ms_files: &[String],
    _plot: &UvCovPlot,
    _format: PlotFormat,
) -> Result<(), UvCovError> {
    Err(UvCovError::NoPlottingFeature)
}
