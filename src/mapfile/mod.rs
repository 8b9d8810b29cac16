// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mapfiles.
//!
//! A mapfile is an ordered list of (host, file, skip) records that pipeline
//! steps use to hand file manifests to one another. The order of the records
//! is significant; downstream steps pair records with other lists by
//! position. A record marked "skip" stays in the manifest, but is excluded
//! from downstream processing.

mod error;
mod format;
mod records;

pub use error::MapfileError;
pub use records::{build_records, FileExists, NoCheck, SkipPolicy, ValidTable};

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, trace};

use crate::constants::NONE_SENTINEL;

/// One record of a mapfile.
///
/// The skip flag is decided when the record is created and can't be changed
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataProduct {
    host: String,
    file: String,
    skip: bool,
}

impl DataProduct {
    pub fn new<H: Into<String>, F: Into<String>>(host: H, file: F, skip: bool) -> DataProduct {
        DataProduct {
            host: host.into(),
            file: file.into(),
            skip,
        }
    }

    /// A record whose file has been invalidated. The file field holds the
    /// literal sentinel "None".
    pub fn invalidated<H: Into<String>>(host: H) -> DataProduct {
        DataProduct::new(host, NONE_SENTINEL, false)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn skip(&self) -> bool {
        self.skip
    }

    /// Does this record carry the "None" sentinel instead of a path?
    pub fn is_invalidated(&self) -> bool {
        self.file == NONE_SENTINEL
    }
}

/// An ordered list of [`DataProduct`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataMap {
    products: Vec<DataProduct>,
}

impl DataMap {
    pub fn new() -> DataMap {
        DataMap::default()
    }

    pub fn push(&mut self, product: DataProduct) {
        self.products.push(product);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn first(&self) -> Option<&DataProduct> {
        self.products.first()
    }

    pub fn iter(&self) -> std::slice::Iter<DataProduct> {
        self.products.iter()
    }

    /// The files of all records, skipped or not.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.file())
    }

    /// The files of all records that aren't marked to be skipped.
    pub fn unskipped_files(&self) -> impl Iterator<Item = &str> {
        self.products
            .iter()
            .filter(|p| !p.skip())
            .map(|p| p.file())
    }

    /// Serialise this map into `directory`/`filename`, returning the path
    /// that was written. An empty `directory` means the current directory.
    pub fn save<P: AsRef<Path>>(
        &self,
        directory: P,
        filename: &str,
    ) -> Result<PathBuf, MapfileError> {
        let path = directory.as_ref().join(filename);
        self.write(&path)?;
        Ok(path)
    }

    /// Serialise this map to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), MapfileError> {
        let path = path.as_ref();
        debug!(
            "Writing mapfile with {} records to {}",
            self.len(),
            path.display()
        );
        let write = || -> Result<(), std::io::Error> {
            let mut f = BufWriter::new(File::create(path)?);
            f.write_all(format::serialise(&self.products).as_bytes())?;
            f.flush()
        };
        write().map_err(|err| MapfileError::Write {
            path: path.to_path_buf(),
            err,
        })
    }

    /// Deserialise the mapfile at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataMap, MapfileError> {
        let path = path.as_ref();
        trace!("Attempting to load mapfile {}", path.display());
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(MapfileError::NotFound(path.to_path_buf()))
            }
            // Only a file we aren't allowed to read could still be a mapfile.
            // Anything else (a directory, a name too long to be a path, a
            // binary file) isn't one.
            Err(err) if err.kind() != std::io::ErrorKind::PermissionDenied => {
                return Err(MapfileError::Unreadable {
                    path: path.to_path_buf(),
                    err,
                })
            }
            Err(err) => {
                return Err(MapfileError::Read {
                    path: path.to_path_buf(),
                    err,
                })
            }
        };
        let products = format::parse(&contents).map_err(|e| MapfileError::Parse {
            path: path.to_path_buf(),
            pos: e.pos,
            reason: e.reason,
        })?;
        debug!(
            "Loaded {} records from mapfile {}",
            products.len(),
            path.display()
        );
        Ok(DataMap { products })
    }
}

impl FromIterator<DataProduct> for DataMap {
    fn from_iter<I: IntoIterator<Item = DataProduct>>(iter: I) -> Self {
        DataMap {
            products: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DataMap {
    type Item = DataProduct;
    type IntoIter = std::vec::IntoIter<DataProduct>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.into_iter()
    }
}

impl<'a> IntoIterator for &'a DataMap {
    type Item = &'a DataProduct;
    type IntoIter = std::slice::Iter<'a, DataProduct>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
