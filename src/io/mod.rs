// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff (globs).

mod glob;

pub(crate) use self::glob::{expand_globs, get_all_matches_from_glob, GlobError};
