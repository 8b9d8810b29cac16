// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplicateError {
    #[error("The file to be copied ({0}) does not exist")]
    NoSource(PathBuf),

    #[error("Cannot determine the file name of {0}")]
    NoFileName(PathBuf),

    #[error("The materialised copy of the source ({0}) cannot also be a destination")]
    MaterialisedIsDestination(PathBuf),

    #[cfg(not(unix))]
    #[error("Symbolic links are only supported on unix platforms")]
    LinksUnsupported,

    #[error("IO error on {path}: {err}")]
    IO { path: PathBuf, err: std::io::Error },
}

impl ReplicateError {
    pub(super) fn io<P: AsRef<Path>>(path: P, err: std::io::Error) -> ReplicateError {
        ReplicateError::IO {
            path: path.as_ref().to_path_buf(),
            err,
        }
    }
}
