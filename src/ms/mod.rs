// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to interface with CASA measurement sets.
//!
//! The steps only ever need a handful of things out of a measurement set, so
//! table access sits behind the [`TableReader`] and [`MeasurementSet`]
//! traits. [`CasacoreReader`] is the real thing; tests supply their own.
//!
//! More info: https://casa.nrao.edu/Memos/229.html#SECTION00060000000000000000

mod error;

pub use error::MsError;

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use marlu::rubbl_casatables;
use ndarray::Array2;
use rubbl_casatables::{Table, TableOpenMode};

/// Opens measurement sets.
pub trait TableReader {
    type Table: MeasurementSet;

    fn open(&self, ms: &Path) -> Result<Self::Table, MsError>;
}

/// An opened measurement set. The table is closed when this is dropped.
pub trait MeasurementSet {
    /// The names of the main table's columns.
    fn column_names(&mut self) -> Result<BTreeSet<String>, MsError>;

    fn has_column(&mut self, name: &str) -> bool {
        self.column_names()
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// The number of unflagged FLAG elements divided by the total number of
    /// FLAG elements.
    fn unflagged_fraction(&mut self) -> Result<f64, MsError>;

    /// The first LOFAR_TARGET of the OBSERVATION table.
    fn target_name(&mut self) -> Result<String, MsError>;

    fn time_range(&mut self) -> Result<TimeRange, MsError>;

    fn spectral_window(&mut self) -> Result<SpectralWindow, MsError>;

    fn antenna_names(&mut self) -> Result<Vec<String>, MsError>;

    fn baseline_rows(&mut self) -> Result<BaselineRows, MsError>;
}

/// The times in a measurement set's main table. All values are in seconds;
/// `first` and `last` are MJD seconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub first: f64,
    pub last: f64,
    pub interval: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralWindow {
    pub ref_freq_hz: f64,
    pub chan_freqs_hz: Vec<f64>,
}

/// Per-row baseline information out of the main table. All vectors have one
/// element per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineRows {
    pub antenna1: Vec<i32>,
    pub antenna2: Vec<i32>,
    pub time: Vec<f64>,
    /// [metres]
    pub uvw: Vec<[f64; 3]>,
    pub flag_row: Vec<bool>,
}

/// Open a measurement set table read only. If `table` is `None`, then open the
/// base table.
fn read_table(ms: &Path, table: Option<&str>) -> Result<Table, MsError> {
    let t = Table::open(
        format!("{}/{}", ms.display(), table.unwrap_or("")),
        TableOpenMode::Read,
    )?;
    Ok(t)
}

/// Reads measurement sets with casacore.
#[derive(Debug, Clone, Copy, Default)]
pub struct CasacoreReader;

impl TableReader for CasacoreReader {
    type Table = CasacoreMs;

    fn open(&self, ms: &Path) -> Result<CasacoreMs, MsError> {
        debug!("Opening measurement set: {}", ms.display());
        if !ms.exists() {
            return Err(MsError::BadFile(ms.to_path_buf()));
        }
        let main = read_table(ms, None)?;
        Ok(CasacoreMs {
            path: ms.to_path_buf(),
            main,
        })
    }
}

pub struct CasacoreMs {
    path: PathBuf,
    main: Table,
}

impl CasacoreMs {
    fn ensure_rows(&self) -> Result<(), MsError> {
        if self.main.n_rows() == 0 {
            return Err(MsError::MainTableEmpty(self.path.clone()));
        }
        Ok(())
    }
}

impl MeasurementSet for CasacoreMs {
    fn column_names(&mut self) -> Result<BTreeSet<String>, MsError> {
        let names = self.main.column_names()?;
        Ok(names.into_iter().collect())
    }

    fn unflagged_fraction(&mut self) -> Result<f64, MsError> {
        self.ensure_rows()?;
        let mut num_unflagged: u64 = 0;
        let mut num_elements: u64 = 0;
        self.main.for_each_row(|row| {
            let flags: Array2<bool> = row.get_cell("FLAG")?;
            num_elements += flags.len() as u64;
            num_unflagged += flags.iter().filter(|&&f| !f).count() as u64;
            Ok(())
        })?;
        trace!(
            "{}: {num_unflagged} of {num_elements} flags unset",
            self.path.display()
        );
        if num_elements == 0 {
            return Err(MsError::NoFlags(self.path.clone()));
        }
        Ok(num_unflagged as f64 / num_elements as f64)
    }

    fn target_name(&mut self) -> Result<String, MsError> {
        let mut observation_table = read_table(&self.path, Some("OBSERVATION"))?;
        let targets: Vec<String> = observation_table.get_cell_as_vec("LOFAR_TARGET", 0)?;
        targets
            .into_iter()
            .next()
            .ok_or_else(|| MsError::NoTargetName(self.path.clone()))
    }

    fn time_range(&mut self) -> Result<TimeRange, MsError> {
        self.ensure_rows()?;
        let last_row = self.main.n_rows() - 1;
        let first: f64 = self.main.get_cell("TIME", 0)?;
        let last: f64 = self.main.get_cell("TIME", last_row)?;
        let interval: f64 = self.main.get_cell("INTERVAL", 0)?;
        Ok(TimeRange {
            first,
            last,
            interval,
        })
    }

    fn spectral_window(&mut self) -> Result<SpectralWindow, MsError> {
        let mut spectral_window_table = read_table(&self.path, Some("SPECTRAL_WINDOW"))?;
        let ref_freq_hz: f64 = spectral_window_table.get_cell("REF_FREQUENCY", 0)?;
        let chan_freqs_hz: Vec<f64> = spectral_window_table.get_cell_as_vec("CHAN_FREQ", 0)?;
        if chan_freqs_hz.is_empty() {
            return Err(MsError::NoChannelFreqs(self.path.clone()));
        }
        Ok(SpectralWindow {
            ref_freq_hz,
            chan_freqs_hz,
        })
    }

    fn antenna_names(&mut self) -> Result<Vec<String>, MsError> {
        let mut antenna_table = read_table(&self.path, Some("ANTENNA"))?;
        let names: Vec<String> = antenna_table.get_col_as_vec("NAME")?;
        Ok(names)
    }

    fn baseline_rows(&mut self) -> Result<BaselineRows, MsError> {
        self.ensure_rows()?;
        let antenna1: Vec<i32> = self.main.get_col_as_vec("ANTENNA1")?;
        let antenna2: Vec<i32> = self.main.get_col_as_vec("ANTENNA2")?;
        let time: Vec<f64> = self.main.get_col_as_vec("TIME")?;
        let flag_row: Vec<bool> = self.main.get_col_as_vec("FLAG_ROW")?;

        let mut raw_uvw = Vec::with_capacity(self.main.n_rows() as usize);
        self.main.for_each_row(|row| {
            let uvw: Vec<f64> = row.get_cell("UVW")?;
            raw_uvw.push(uvw);
            Ok(())
        })?;
        let uvw = raw_uvw
            .into_iter()
            .enumerate()
            .map(|(row, uvw)| match uvw.as_slice() {
                [u, v, w] => Ok([*u, *v, *w]),
                _ => Err(MsError::BadUvw {
                    row,
                    len: uvw.len(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BaselineRows {
            antenna1,
            antenna2,
            time,
            uvw,
            flag_row,
        })
    }
}
