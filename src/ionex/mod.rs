// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Retrieval of IONEX (ionosphere map) files for an observation.
//!
//! IONEX files are published once per UTC day. For each day an observation
//! touches, an ordered list of [`IonexSource`]s is tried until one of them
//! provides the file; files already on disk are never fetched again.

mod error;
mod fetch;
#[cfg(test)]
mod tests;

pub use error::IonexError;
pub use fetch::{HttpFetcher, IonexFetcher, ProxyConfig};

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use hifitime::Epoch;
use log::{debug, info, warn};

use crate::{
    constants::{FALLBACK_IONEX_PREFIX, FALLBACK_IONEX_SERVER},
    ms::TimeRange,
};

const SECONDS_PER_DAY: f64 = 86400.0;

/// How a server arranges its IONEX files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IonexLayout {
    /// `<server>/<year>/<PREFIX><doy>0.<yy>I.Z`, as used by the CODE archive.
    Code,

    /// `<server>/data/ilt/<year>/<doy>/<prefix><doy>0.<yy>i`, as used by the
    /// UWM fast-product server.
    Uwm,
}

/// A place IONEX files can be retrieved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IonexSource {
    pub server: String,
    pub prefix: String,
    pub layout: IonexLayout,
}

impl IonexSource {
    /// The layout is worked out from the server.
    pub fn new<S: Into<String>, P: Into<String>>(server: S, prefix: P) -> IonexSource {
        let server = server.into();
        let layout = if is_uwm(&server) {
            IonexLayout::Uwm
        } else {
            IonexLayout::Code
        };
        IonexSource {
            server,
            prefix: prefix.into(),
            layout,
        }
    }

    /// The name of this source's IONEX file for `day`.
    pub fn filename(&self, day: &ObservationDay) -> String {
        let yy = day.year.rem_euclid(100);
        match self.layout {
            IonexLayout::Code => format!(
                "{}{:03}0.{yy:02}I.Z",
                self.prefix.to_uppercase(),
                day.day_of_year
            ),
            IonexLayout::Uwm => format!("{}{:03}0.{yy:02}i", self.prefix, day.day_of_year),
        }
    }

    pub fn url(&self, day: &ObservationDay) -> String {
        let server = self.server.trim_end_matches('/');
        match self.layout {
            IonexLayout::Code => format!("{server}/{}/{}", day.year, self.filename(day)),
            IonexLayout::Uwm => format!(
                "{server}/data/ilt/{}/{:03}/{}",
                day.year,
                day.day_of_year,
                self.filename(day)
            ),
        }
    }
}

impl Display for IonexSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (prefix {})", self.server, self.prefix)
    }
}

fn is_uwm(server: &str) -> bool {
    server.contains("igsiono.uwm.edu.pl")
}

/// The sources to try, in order: the user's, then the fast-product server
/// unless that's what the user gave.
pub fn default_candidates(server: &str, prefix: &str) -> Vec<IonexSource> {
    let mut candidates = vec![IonexSource::new(server, prefix)];
    if !is_uwm(server) {
        candidates.push(IonexSource::new(
            FALLBACK_IONEX_SERVER,
            FALLBACK_IONEX_PREFIX,
        ));
    }
    candidates
}

/// A UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObservationDay {
    pub year: i32,
    /// 1-based.
    pub day_of_year: u32,
}

impl ObservationDay {
    /// The UTC day of an integer MJD.
    fn from_mjd(mjd: i64) -> Option<ObservationDay> {
        // Noon keeps the conversion well away from the day boundaries.
        let epoch = Epoch::from_mjd_utc(mjd as f64 + 0.5);
        let (year, month, day, ..) = epoch.to_gregorian_utc();
        let date = NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))?;
        Some(ObservationDay {
            year: date.year(),
            day_of_year: date.ordinal(),
        })
    }
}

impl Display for ObservationDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, day {:03}", self.year, self.day_of_year)
    }
}

/// The UTC days covered by `range`, padded by one integration either side,
/// in chronological order.
pub fn days_covered(range: &TimeRange) -> Result<Vec<ObservationDay>, IonexError> {
    let bad = || IonexError::BadTimeRange {
        first: range.first,
        last: range.last,
    };
    if !(range.first.is_finite() && range.last.is_finite() && range.interval.is_finite()) {
        return Err(bad());
    }
    let interval = range.interval.abs();
    let start = range.first.min(range.last) - interval;
    let end = range.first.max(range.last) + interval;

    let first_day = (start / SECONDS_PER_DAY).floor() as i64;
    let last_day = (end / SECONDS_PER_DAY).floor() as i64;
    (first_day..=last_day)
        .map(|mjd| ObservationDay::from_mjd(mjd).ok_or_else(bad))
        .collect()
}

/// Try each candidate in order until `attempt` succeeds. On success, the
/// winning candidate is returned with the result; otherwise every candidate's
/// failure is returned, in order.
pub fn try_candidates<'a, C, T, E, F>(
    candidates: &'a [C],
    mut attempt: F,
) -> Result<(&'a C, T), Vec<(&'a C, E)>>
where
    F: FnMut(&C) -> Result<T, E>,
{
    let mut failures = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match attempt(candidate) {
            Ok(t) => return Ok((candidate, t)),
            Err(e) => failures.push((candidate, e)),
        }
    }
    Err(failures)
}

/// Make sure an IONEX file for every day of `range` is in `ionex_dir`,
/// fetching missing ones from `candidates`. Days are handled latest first and
/// the paths are returned in the same order.
pub fn retrieve_ionex<F: IonexFetcher + ?Sized>(
    range: &TimeRange,
    candidates: &[IonexSource],
    ionex_dir: &Path,
    fetcher: &F,
) -> Result<Vec<PathBuf>, IonexError> {
    if ionex_dir.exists() && !ionex_dir.is_dir() {
        return Err(IonexError::NotADirectory(ionex_dir.to_path_buf()));
    }
    std::fs::create_dir_all(ionex_dir).map_err(|err| IonexError::Write {
        path: ionex_dir.to_path_buf(),
        err,
    })?;

    let days = days_covered(range)?;
    debug!("Observation covers {} UTC day(s)", days.len());

    let mut paths = Vec::with_capacity(days.len());
    for day in days.iter().rev() {
        let result = try_candidates(candidates, |source| {
            let path = ionex_dir.join(source.filename(day));
            if path.exists() {
                info!("Using existing IONEX file {}", path.display());
                return Ok(path);
            }
            let url = source.url(day);
            info!("Retrieving {url}");
            fetcher.fetch(&url, &path).map(|_| path)
        });

        match result {
            Ok((_, path)) => paths.push(path),
            Err(failures) => {
                for (source, e) in &failures {
                    warn!("Couldn't get IONEX data for {day} from {source}: {e}");
                }
                return Err(IonexError::Exhausted {
                    day: day.to_string(),
                    attempts: failures
                        .into_iter()
                        .map(|(source, e)| format!("{source}: {e}"))
                        .collect(),
                });
            }
        }
    }

    Ok(paths)
}
