// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading and writing mapfiles.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapfileError {
    #[error("Mapfile {0} does not exist")]
    NotFound(PathBuf),

    #[error("Couldn't parse mapfile {path} at character {pos}: {reason}")]
    Parse {
        path: PathBuf,
        pos: usize,
        reason: String,
    },

    #[error("{path} can't be read as a mapfile: {err}")]
    Unreadable {
        path: PathBuf,
        err: std::io::Error,
    },

    #[error("Couldn't read mapfile {path}: {err}")]
    Read {
        path: PathBuf,
        err: std::io::Error,
    },

    #[error("Couldn't write mapfile {path}: {err}")]
    Write {
        path: PathBuf,
        err: std::io::Error,
    },
}

impl MapfileError {
    /// Is this error a sign that the path simply isn't a mapfile (as opposed
    /// to a mapfile we couldn't access)? Callers accepting either a mapfile
    /// or a literal list use this to decide whether to fall back.
    pub fn is_not_a_mapfile(&self) -> bool {
        matches!(
            self,
            MapfileError::NotFound(_)
                | MapfileError::Unreadable { .. }
                | MapfileError::Parse { .. }
        )
    }
}
