// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Drop measurement sets that have too little unflagged data.

use std::path::Path;

use log::{debug, info};

use super::UnflaggedError;
use crate::{
    constants::LOCALHOST,
    mapfile::{DataMap, DataProduct},
    ms::{MeasurementSet, TableReader},
};

/// The two mapfiles produced by [`check_unflagged_fractions`].
#[derive(Debug, Clone, PartialEq)]
pub struct UnflaggedMaps {
    /// One record per input; the file is the "None" sentinel if the
    /// measurement set didn't have enough unflagged data.
    pub flags: DataMap,

    /// One record per input; the file is the unflagged fraction.
    pub fractions: DataMap,
}

/// Compute the unflagged fraction of each measurement set. Sets with a
/// fraction below `min_fraction` are invalidated in the returned `flags` map.
/// Any measurement set that can't be read is an error.
pub fn check_unflagged_fractions<R: TableReader>(
    reader: &R,
    ms_files: &[String],
    min_fraction: f64,
    print_fraction: bool,
) -> Result<UnflaggedMaps, UnflaggedError> {
    if ms_files.is_empty() {
        return Err(UnflaggedError::NoInputs);
    }
    if !(0.0..=1.0).contains(&min_fraction) {
        return Err(UnflaggedError::BadMinFraction(min_fraction));
    }

    let mut flags = DataMap::new();
    let mut fractions = DataMap::new();
    for ms in ms_files {
        let fraction = reader.open(Path::new(ms))?.unflagged_fraction()?;
        debug!("{ms}: unflagged fraction {fraction}");
        if print_fraction {
            let name = Path::new(ms)
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| ms.into());
            info!("{name} has {:.2}% unflagged data", fraction * 100.0);
        }

        if fraction < min_fraction {
            info!("Unflagged fraction of {ms} is {fraction}; removing it");
            flags.push(DataProduct::invalidated(LOCALHOST));
        } else {
            flags.push(DataProduct::new(LOCALHOST, ms.as_str(), false));
        }
        fractions.push(DataProduct::new(LOCALHOST, format!("{fraction}"), false));
    }

    Ok(UnflaggedMaps { flags, fractions })
}
