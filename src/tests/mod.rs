// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful things for tests: a measurement-set reader that doesn't need
//! casacore or real data.

use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use crate::ms::{
    BaselineRows, MeasurementSet, MsError, SpectralWindow, TableReader, TimeRange,
};

/// The contents of a fake measurement set.
#[derive(Debug, Clone)]
pub(crate) struct StubMs {
    pub(crate) columns: BTreeSet<String>,
    pub(crate) unflagged_fraction: f64,
    pub(crate) target: Option<String>,
    pub(crate) time_range: TimeRange,
    pub(crate) spectral_window: SpectralWindow,
    pub(crate) antenna_names: Vec<String>,
    pub(crate) rows: BaselineRows,
}

impl Default for StubMs {
    fn default() -> Self {
        StubMs {
            columns: ["ANTENNA1", "ANTENNA2", "DATA", "FLAG", "TIME", "UVW"]
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            unflagged_fraction: 1.0,
            target: Some("3C196".to_string()),
            time_range: TimeRange {
                first: 4.9e9,
                last: 4.9e9 + 3600.0,
                interval: 1.0,
            },
            spectral_window: SpectralWindow {
                ref_freq_hz: 150e6,
                chan_freqs_hz: vec![150e6],
            },
            antenna_names: vec![],
            rows: BaselineRows::default(),
        }
    }
}

impl MeasurementSet for StubMs {
    fn column_names(&mut self) -> Result<BTreeSet<String>, MsError> {
        Ok(self.columns.clone())
    }

    fn unflagged_fraction(&mut self) -> Result<f64, MsError> {
        Ok(self.unflagged_fraction)
    }

    fn target_name(&mut self) -> Result<String, MsError> {
        self.target
            .clone()
            .ok_or_else(|| MsError::NoTargetName(PathBuf::from("stub")))
    }

    fn time_range(&mut self) -> Result<TimeRange, MsError> {
        Ok(self.time_range)
    }

    fn spectral_window(&mut self) -> Result<SpectralWindow, MsError> {
        Ok(self.spectral_window.clone())
    }

    fn antenna_names(&mut self) -> Result<Vec<String>, MsError> {
        Ok(self.antenna_names.clone())
    }

    fn baseline_rows(&mut self) -> Result<BaselineRows, MsError> {
        Ok(self.rows.clone())
    }
}

/// Hands out [`StubMs`]s by path. Paths that weren't inserted fail to open.
#[derive(Debug, Default)]
pub(crate) struct StubReader {
    tables: HashMap<PathBuf, StubMs>,
}

impl StubReader {
    pub(crate) fn with<P: Into<PathBuf>>(mut self, path: P, ms: StubMs) -> Self {
        self.tables.insert(path.into(), ms);
        self
    }
}

impl TableReader for StubReader {
    type Table = StubMs;

    fn open(&self, ms: &Path) -> Result<StubMs, MsError> {
        self.tables
            .get(ms)
            .cloned()
            .ok_or_else(|| MsError::BadFile(ms.to_path_buf()))
    }
}
