// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Mapfile bookkeeping and small pipeline steps for LOFAR calibration pipelines.

Each step is a `lofar-steps` subcommand. The steps share the [`mapfile`]
model of (host, file, skip) records and the [`lists`] conventions for
list-valued arguments; measurement sets are read through the [`ms`] traits.
 */

mod cli;
pub mod constants;
pub mod flagging;
pub(crate) mod io;
pub mod ionex;
pub mod lists;
pub mod mapfile;
pub mod ms;
pub mod replicate;
pub mod uvcov;

#[cfg(test)]
mod tests;

use crossbeam_utils::atomic::AtomicCell;

/// Are progress bars being drawn? This should only ever be enabled by CLI
/// code.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use cli::{LofarSteps, StepsError};
pub use lists::{ListArg, ListInput};
pub use mapfile::{DataMap, DataProduct};
pub use ms::{CasacoreReader, MeasurementSet, TableReader};
