// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Functions to glob files.

use std::path::PathBuf;

use glob::glob;
use log::debug;
use thiserror::Error;

/// Given a glob pattern, get all of the matches from the filesystem.
pub(crate) fn get_all_matches_from_glob(g: &str) -> Result<Vec<PathBuf>, GlobError> {
    let mut entries = vec![];
    for entry in glob(g)? {
        match entry {
            Ok(e) => entries.push(e),
            Err(e) => return Err(GlobError::GlobCrate(e)),
        }
    }
    Ok(entries)
}

/// Replace every entry that looks like a glob pattern with its (sorted)
/// matches. Other entries are kept as they are. A pattern without any matches
/// is an error.
pub(crate) fn expand_globs(entries: Vec<String>) -> Result<Vec<String>, GlobError> {
    let mut expanded = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.contains(['*', '?']) {
            expanded.push(entry);
            continue;
        }

        let matches = get_all_matches_from_glob(&entry)?;
        if matches.is_empty() {
            return Err(GlobError::NoMatches { glob: entry });
        }
        debug!("Glob {entry} matched {} entries", matches.len());
        expanded.extend(matches.into_iter().map(|m| m.display().to_string()));
    }
    Ok(expanded)
}

#[derive(Error, Debug)]
/// Error type associated with glob helper functions.
pub enum GlobError {
    #[error("No glob matches were found for {glob}")]
    NoMatches { glob: String },

    #[error(transparent)]
    GlobCrate(#[from] glob::GlobError),

    #[error(transparent)]
    PatternError(#[from] glob::PatternError),
}
