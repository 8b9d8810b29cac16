// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::mapfile::MapfileError;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("The list of hosts is empty; at least one host is needed to pair with {num_files} files")]
    EmptyHostList { num_files: usize },

    #[error("Cannot convert string \"{0}\" to boolean!")]
    NotABool(String),

    #[error(transparent)]
    Mapfile(#[from] MapfileError),
}
