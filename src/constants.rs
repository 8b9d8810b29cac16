// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

/// The literal value written into a mapfile's file field when a record has
/// been invalidated (e.g. a measurement set with too little unflagged data).
pub const NONE_SENTINEL: &str = "None";

/// The host used for records produced on the machine running the step.
pub const LOCALHOST: &str = "localhost";

/// Measurement sets with an unflagged fraction below this value are removed.
pub const DEFAULT_MIN_UNFLAGGED_FRACTION: f64 = 0.01;

/// The default name of the mapfile written by `check-unflagged-fraction`.
pub const DEFAULT_UNFLAGGED_MAPFILE: &str = "check_unflagged.mapfile";

/// The name of the mapfile holding the unflagged fractions themselves.
pub const UNFLAGGED_FRACTION_MAPFILE: &str = "unflagged_fraction.mapfile";

/// The executable used to count flags per antenna.
pub const DEFAULT_DPPP: &str = "DPPP";

/// The default IONEX server. The CODE archive is also served over HTTP.
pub const DEFAULT_IONEX_SERVER: &str = "http://ftp.aiub.unibe.ch/CODE/";

/// The default IONEX file prefix.
pub const DEFAULT_IONEX_PREFIX: &str = "CODG";

/// The "fast product" server tried when the requested server doesn't have
/// the data.
pub const FALLBACK_IONEX_SERVER: &str = "https://igsiono.uwm.edu.pl";

/// The IONEX file prefix used on [`FALLBACK_IONEX_SERVER`].
pub const FALLBACK_IONEX_PREFIX: &str = "igrg";

/// The extension appended to the materialised source when replicating files
/// by symbolic link.
pub const LINK_SOURCE_EXTENSION: &str = "linksrc";

/// The default title of uv-coverage plots.
pub const DEFAULT_UVCOV_TITLE: &str = "uv coverage";

/// The default marker size of uv-coverage plots [pixels].
pub const DEFAULT_UVCOV_MARKER_SIZE: u32 = 2;

/// The default directory IONEX files are put into.
pub const DEFAULT_IONEX_DIR: &str = "./";

/// Speed of light [metres/second].
pub const VEL_C: f64 = 299_792_458.0;
