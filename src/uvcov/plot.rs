// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Draw uv points with plotters.

use std::path::Path;

use log::debug;
use plotters::{coord::Shift, prelude::*};
use thiserror::Error;

use super::{
    vector::{VectorBackend, VectorFormat},
    PlotFormat, PlotRange, UvPoint,
};

/// The side length of bitmap plots [pixels].
const PIXELS: u32 = 1200;
/// The side length of vector plots [points].
const POINTS: u32 = 600;

/// How a uv-coverage plot should look.
#[derive(Debug, Clone)]
pub struct PlotStyle<'a> {
    pub title: &'a str,
    pub kilolambda: bool,
    /// The radius of each point, relative to a 600-unit-wide canvas.
    pub marker_size: u32,
}

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("Error from the plotters library: {0}")]
    Plotters(String),
}

/// Draw `points` into `output`. Points at the origin, or outside `range`, are
/// left out.
pub fn plot_uv_points(
    points: &[UvPoint],
    range: &PlotRange,
    style: &PlotStyle,
    output: &Path,
    format: PlotFormat,
) -> Result<(), DrawError> {
    debug!("Plotting {} uv points into {}", points.len(), output.display());
    match format {
        PlotFormat::Png => {
            let root = BitMapBackend::new(output, (PIXELS, PIXELS)).into_drawing_area();
            draw(&root, points, range, style, PIXELS / POINTS)?;
            root.present()
                .map_err(|e| DrawError::Plotters(e.to_string()))?;
        }

        PlotFormat::Ps | PlotFormat::Eps | PlotFormat::Pdf => {
            let vector_format = match format {
                PlotFormat::Eps => VectorFormat::Eps,
                PlotFormat::Pdf => VectorFormat::Pdf,
                _ => VectorFormat::Ps,
            };
            let root =
                VectorBackend::new(output, (POINTS, POINTS), vector_format).into_drawing_area();
            draw(&root, points, range, style, 1)?;
            root.present()
                .map_err(|e| DrawError::Plotters(e.to_string()))?;
        }
    }
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[UvPoint],
    range: &PlotRange,
    style: &PlotStyle,
    scale: u32,
) -> Result<(), DrawError> {
    root.fill(&WHITE)
        .map_err(|e| DrawError::Plotters(e.to_string()))?;

    let unit = if style.kilolambda { "kλ" } else { "km" };
    let font_size = |size: u32| (size * scale) as i32;
    let mut chart = ChartBuilder::on(root)
        .caption(style.title, ("sans-serif", font_size(20)))
        .margin(10 * scale)
        .x_label_area_size(40 * scale)
        .y_label_area_size(60 * scale)
        .build_cartesian_2d(range.x.0..range.x.1, range.y.0..range.y.1)
        .map_err(|e| DrawError::Plotters(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(format!("u [{unit}]"))
        .y_desc(format!("v [{unit}]"))
        .label_style(("sans-serif", font_size(12)))
        .axis_desc_style(("sans-serif", font_size(14)))
        .draw()
        .map_err(|e| DrawError::Plotters(e.to_string()))?;

    let (x_lo, x_hi) = (range.x.0.min(range.x.1), range.x.0.max(range.x.1));
    let (y_lo, y_hi) = (range.y.0.min(range.y.1), range.y.0.max(range.y.1));
    let visible = |p: &&UvPoint| {
        (p.u != 0.0 || p.v != 0.0)
            && (x_lo..=x_hi).contains(&p.u)
            && (y_lo..=y_hi).contains(&p.v)
    };
    let radius = style.marker_size * scale;
    chart
        .draw_series(
            points
                .iter()
                .filter(visible)
                .map(|p| Circle::new((p.u, p.v), radius, BLUE.filled())),
        )
        .map_err(|e| DrawError::Plotters(e.to_string()))?;
    // Flagged points go on top.
    chart
        .draw_series(
            points
                .iter()
                .filter(visible)
                .filter(|p| p.flagged)
                .map(|p| Circle::new((p.u, p.v), radius, RED.filled())),
        )
        .map_err(|e| DrawError::Plotters(e.to_string()))?;

    Ok(())
}
