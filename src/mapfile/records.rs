// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Building mapfile records from aligned host and file lists.

use std::path::Path;

use log::{debug, trace};

use super::{DataMap, DataProduct};
use crate::ms::{MeasurementSet, TableReader};

/// Decides whether a file should be skipped by downstream steps.
pub trait SkipPolicy {
    fn skip(&self, file: &str) -> bool;
}

impl<F: Fn(&str) -> bool> SkipPolicy for F {
    fn skip(&self, file: &str) -> bool {
        self(file)
    }
}

/// Never skip anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheck;

impl SkipPolicy for NoCheck {
    fn skip(&self, _: &str) -> bool {
        false
    }
}

/// Skip files that don't exist on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExists;

impl SkipPolicy for FileExists {
    fn skip(&self, file: &str) -> bool {
        !Path::new(file).exists()
    }
}

/// Skip files that don't exist, and measurement sets (".ms" files) that can't
/// be opened. If `column` is set, measurement sets without that column are
/// skipped too.
pub struct ValidTable<'a, R> {
    reader: &'a R,
    column: Option<String>,
}

impl<'a, R: TableReader> ValidTable<'a, R> {
    pub fn new(reader: &'a R, column: Option<String>) -> ValidTable<'a, R> {
        ValidTable { reader, column }
    }
}

impl<R: TableReader> SkipPolicy for ValidTable<'_, R> {
    fn skip(&self, file: &str) -> bool {
        if FileExists.skip(file) {
            debug!("{file} does not exist; skipping it");
            return true;
        }
        if !file.to_lowercase().ends_with(".ms") {
            return false;
        }

        match self.reader.open(Path::new(file)) {
            Ok(mut table) => match self.column.as_deref() {
                Some(column) if !table.has_column(column) => {
                    debug!("{file} has no column {column}; skipping it");
                    true
                }
                _ => false,
            },
            Err(e) => {
                debug!("Couldn't open {file} as a measurement set; skipping it ({e})");
                true
            }
        }
    }
}

/// Pair up `hosts` and `files` by position, deciding each record's skip flag
/// with `policy`. The lists must have the same length; use
/// [`crate::lists::align_hosts`] first.
pub fn build_records<P: SkipPolicy + ?Sized>(
    hosts: &[String],
    files: &[String],
    policy: &P,
) -> DataMap {
    debug_assert_eq!(hosts.len(), files.len());
    hosts
        .iter()
        .zip(files)
        .map(|(host, file)| {
            let skip = policy.skip(file);
            trace!("{host}: {file} (skip: {skip})");
            DataProduct::new(host.as_str(), file.as_str(), skip)
        })
        .collect()
}
