// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Replicating one file or directory to many destinations.

mod error;

pub use error::ReplicateError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, trace};

use crate::{constants::LINK_SOURCE_EXTENSION, mapfile::DataProduct};

/// How destinations are made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicateMode {
    /// Each destination is a full copy of the source.
    Copy,

    /// The source is copied once, to `materialised` if given (otherwise next
    /// to the first destination), and every destination is a symbolic link
    /// to that copy.
    Link { materialised: Option<PathBuf> },
}

/// Replicate `source` to each of `destinations`, pairing each destination
/// with a host. Anything already at a destination is removed first. The
/// returned records point at the destinations, or with
/// [`ReplicateMode::Link`], all at the materialised copy of the source.
pub fn replicate(
    source: &Path,
    destinations: &[PathBuf],
    hosts: &[String],
    mode: &ReplicateMode,
) -> Result<Vec<DataProduct>, ReplicateError> {
    debug_assert_eq!(destinations.len(), hosts.len());
    if !source.exists() {
        return Err(ReplicateError::NoSource(source.to_path_buf()));
    }
    let Some(first_destination) = destinations.first() else {
        return Ok(vec![]);
    };

    match mode {
        ReplicateMode::Copy => {
            for dest in destinations {
                info!("Copying {} to {}", source.display(), dest.display());
                remove_existing(dest)?;
                copy_entry(source, dest)?;
            }
            Ok(hosts
                .iter()
                .zip(destinations)
                .map(|(host, dest)| DataProduct::new(host.as_str(), dest.display().to_string(), false))
                .collect())
        }

        ReplicateMode::Link { materialised } => {
            let materialised = match materialised {
                Some(m) => m.clone(),
                None => default_materialised_path(source, first_destination)?,
            };
            if destinations.contains(&materialised) {
                return Err(ReplicateError::MaterialisedIsDestination(materialised));
            }
            info!(
                "Copying {} to {} and linking {} destinations to it",
                source.display(),
                materialised.display(),
                destinations.len()
            );
            remove_existing(&materialised)?;
            copy_entry(source, &materialised)?;

            for dest in destinations {
                remove_existing(dest)?;
                link(&materialised, dest)?;
            }
            let file = materialised.display().to_string();
            Ok(hosts
                .iter()
                .map(|host| DataProduct::new(host.as_str(), file.as_str(), false))
                .collect())
        }
    }
}

/// `<directory of first destination>/<source name>.linksrc`
fn default_materialised_path(
    source: &Path,
    first_destination: &Path,
) -> Result<PathBuf, ReplicateError> {
    let name = source
        .file_name()
        .ok_or_else(|| ReplicateError::NoFileName(source.to_path_buf()))?;
    let mut name = name.to_os_string();
    name.push(".");
    name.push(LINK_SOURCE_EXTENSION);
    let dir = first_destination
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(dir.join(name))
}

/// Remove whatever is at `path`: a file, a directory tree or a (possibly
/// dangling) symbolic link. Nothing there is fine.
fn remove_existing(path: &Path) -> Result<(), ReplicateError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(ReplicateError::io(path, err)),
    };
    trace!("Removing existing {}", path.display());
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|err| ReplicateError::io(path, err))
}

fn copy_entry(source: &Path, dest: &Path) -> Result<(), ReplicateError> {
    if source.is_dir() {
        copy_dir(source, dest)
    } else {
        fs::copy(source, dest)
            .map(|_| ())
            .map_err(|err| ReplicateError::io(dest, err))
    }
}

fn copy_dir(source: &Path, dest: &Path) -> Result<(), ReplicateError> {
    debug!("Recursively copying {} to {}", source.display(), dest.display());
    fs::create_dir_all(dest).map_err(|err| ReplicateError::io(dest, err))?;
    let entries = fs::read_dir(source).map_err(|err| ReplicateError::io(source, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ReplicateError::io(source, err))?;
        let file_type = entry
            .file_type()
            .map_err(|err| ReplicateError::io(entry.path(), err))?;
        let target = dest.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|err| ReplicateError::io(&target, err))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn link(target: &Path, link: &Path) -> Result<(), ReplicateError> {
    trace!("Linking {} -> {}", link.display(), target.display());
    // Relative targets would be resolved against the link's directory.
    let target = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| ReplicateError::io(target, err))?
            .join(target)
    };
    std::os::unix::fs::symlink(&target, link).map_err(|err| ReplicateError::io(link, err))
}

#[cfg(not(unix))]
fn link(_: &Path, _: &Path) -> Result<(), ReplicateError> {
    Err(ReplicateError::LinksUnsupported)
}
