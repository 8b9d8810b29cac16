// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to inspect the flags of measurement sets.

mod antennas;
mod error;
mod unflagged;

pub use antennas::{extend_filter, identify_bad_antennas, DpppCounter, FlagDiagnostic};
pub use error::{FlagDiagnosticError, UnflaggedError};
pub use unflagged::{check_unflagged_fractions, UnflaggedMaps};
