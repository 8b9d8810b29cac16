// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gather uv points out of measurement sets.

use std::{collections::BTreeMap, path::Path};

use log::{debug, info};

use super::{AntennaSelection, Timeslots, UvCovError};
use crate::{
    constants::VEL_C,
    ms::{MeasurementSet, TableReader},
};

/// A single point on a uv-coverage plot. Depending on the units requested,
/// `u` and `v` are either kilolambda or kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvPoint {
    pub u: f64,
    pub v: f64,
    /// Should this point be highlighted as flagged?
    pub flagged: bool,
}

/// What to take out of each measurement set.
#[derive(Debug, Clone, Default)]
pub struct UvSelection {
    pub timeslots: Timeslots,
    pub antennas: AntennaSelection,
    /// Express u and v in kilolambda rather than kilometres.
    pub kilolambda: bool,
    /// Plot a point per channel rather than only at the reference frequency.
    pub wideband: bool,
    /// Reuse the first measurement set's uvw for all others.
    pub sameuv: bool,
    /// Mark flagged rows.
    pub flagged: bool,
}

/// Collect the uv points of all of `ms_files`. Each selected row contributes
/// both (u, v) and (-u, -v), once per wavelength when `kilolambda` is set.
pub fn collect_uv_points<R: TableReader>(
    reader: &R,
    ms_files: &[String],
    selection: &UvSelection,
) -> Result<Vec<UvPoint>, UvCovError> {
    if ms_files.is_empty() {
        return Err(UvCovError::NoInputs);
    }

    let mut points = vec![];
    // uvw of the first measurement set [metres], if it's being reused.
    let mut first_uvw: Option<Vec<UvPoint>> = None;
    for ms in ms_files {
        info!("Getting info for {ms}");
        let mut table = reader.open(Path::new(ms))?;
        let spw = table.spectral_window()?;
        info!("Reference frequency: {:.6} MHz", spw.ref_freq_hz / 1e6);
        let wavelengths: Vec<f64> = if selection.wideband {
            spw.chan_freqs_hz.iter().map(|f| VEL_C / f).collect()
        } else {
            vec![VEL_C / spw.ref_freq_hz]
        };
        if let Some(wavelength) = wavelengths.first() {
            info!("Reference wavelength: {wavelength:.6} m");
        }

        let metres = match first_uvw.as_ref() {
            Some(uvw) => {
                info!("Assuming the same uvw as the first measurement set");
                uvw.clone()
            }
            None => {
                let uvw = select_rows(&mut table, selection)?;
                if selection.sameuv {
                    first_uvw = Some(uvw.clone());
                }
                uvw
            }
        };

        if selection.kilolambda {
            for wavelength in &wavelengths {
                mirror_into(&metres, wavelength * 1000.0, &mut points);
            }
        } else {
            mirror_into(&metres, 1000.0, &mut points);
        }
    }

    if points.is_empty() {
        return Err(UvCovError::NoPoints);
    }
    Ok(points)
}

fn mirror_into(metres: &[UvPoint], divisor: f64, points: &mut Vec<UvPoint>) {
    points.extend(metres.iter().map(|p| UvPoint {
        u: p.u / divisor,
        v: p.v / divisor,
        flagged: p.flagged,
    }));
    points.extend(metres.iter().map(|p| UvPoint {
        u: -p.u / divisor,
        v: -p.v / divisor,
        flagged: p.flagged,
    }));
}

/// The uvw [metres] of the rows of `table` matching `selection`. Rows are
/// grouped by baseline (autocorrelations are ignored) and thinned to one in
/// every `step` rows of each baseline.
fn select_rows<T: MeasurementSet>(
    table: &mut T,
    selection: &UvSelection,
) -> Result<Vec<UvPoint>, UvCovError> {
    let time_range = table.time_range()?;
    let times = selection.timeslots.select(&time_range);
    info!("Integration time: {:.6} s", time_range.interval);
    info!(
        "For each baseline, plotting one point every {} samples",
        times.step
    );

    let rows = table.baseline_rows()?;
    let mut baselines: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();
    for (i_row, ((&ant1, &ant2), &time)) in rows
        .antenna1
        .iter()
        .zip(rows.antenna2.iter())
        .zip(rows.time.iter())
        .enumerate()
    {
        if ant1 == ant2
            || !selection.antennas.contains(ant1)
            || !selection.antennas.contains(ant2)
            || !times.contains(time)
        {
            continue;
        }
        baselines.entry((ant1, ant2)).or_default().push(i_row);
    }
    debug!("Selected {} baselines", baselines.len());

    Ok(baselines
        .values()
        .flat_map(|rows_of_baseline| rows_of_baseline.iter().step_by(times.step))
        .filter_map(|&i_row| {
            let uvw = rows.uvw.get(i_row)?;
            let flagged =
                selection.flagged && rows.flag_row.get(i_row).copied().unwrap_or(false);
            Some(UvPoint {
                u: uvw[0],
                v: uvw[1],
                flagged,
            })
        })
        .collect())
}
