// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! User-facing selections for uv-coverage plots.

use std::{ops::RangeInclusive, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;

use super::{UvCovError, UvPoint};
use crate::ms::TimeRange;

lazy_static! {
    static ref ANTENNA_RANGE: Regex = Regex::new(r"^(-?\d+)\.\.(-?\d+)$").unwrap();
}

/// Axis limits as given by the user. Any limit that's `None` is worked out
/// from the data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisLimits {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
}

/// The final ranges of a plot's axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRange {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl FromStr for AxisLimits {
    type Err = UvCovError;

    /// Parse "xmin,xmax,ymin,ymax". Empty tokens are automatic limits.
    fn from_str(s: &str) -> Result<AxisLimits, UvCovError> {
        let tokens: Vec<&str> = s.trim().split(',').map(|t| t.trim()).collect();
        if tokens.len() != 4 {
            return Err(UvCovError::WrongNumLimits(tokens.len()));
        }
        let parse = |t: &str| -> Result<Option<f64>, UvCovError> {
            if t.is_empty() {
                Ok(None)
            } else {
                t.parse()
                    .map(Some)
                    .map_err(|_| UvCovError::BadLimit(t.to_string()))
            }
        };
        Ok(AxisLimits {
            xmin: parse(tokens[0])?,
            xmax: parse(tokens[1])?,
            ymin: parse(tokens[2])?,
            ymax: parse(tokens[3])?,
        })
    }
}

impl AxisLimits {
    /// Fill in automatic limits from `points`. Automatic limits are shared by
    /// both axes and span all u and v values with a 2% margin either side. An
    /// axis whose minimum equals its maximum becomes -1 to 1.
    pub fn resolve(&self, points: &[UvPoint]) -> PlotRange {
        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
                (min.min(p.u).min(p.v), max.max(p.u).max(p.v))
            });
        let (auto_min, auto_max) = if min.is_finite() && max.is_finite() {
            let margin = 0.02 * (max - min);
            (min - margin, max + margin)
        } else {
            (-1.0, 1.0)
        };

        let axis = |lo: Option<f64>, hi: Option<f64>| {
            let lo = lo.unwrap_or(auto_min);
            let hi = hi.unwrap_or(auto_max);
            if lo == hi {
                (-1.0, 1.0)
            } else {
                (lo, hi)
            }
        };
        PlotRange {
            x: axis(self.xmin, self.xmax),
            y: axis(self.ymin, self.ymax),
        }
    }
}

/// Which timeslots to plot. `skip` of 0 picks a skip automatically; `end` of 0
/// means the last timeslot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeslots {
    pub start: usize,
    pub skip: usize,
    pub end: usize,
}

impl FromStr for Timeslots {
    type Err = UvCovError;

    /// Parse "start,skip,end".
    fn from_str(s: &str) -> Result<Timeslots, UvCovError> {
        let tokens: Vec<&str> = s.trim().split(',').map(|t| t.trim()).collect();
        if tokens.len() != 3 {
            return Err(UvCovError::BadTimeslots(s.to_string()));
        }
        let mut values = [0; 3];
        for (value, token) in values.iter_mut().zip(tokens) {
            let v: i64 = token
                .parse()
                .map_err(|_| UvCovError::BadTimeslots(s.to_string()))?;
            if v < 0 {
                return Err(UvCovError::NegativeTimeslot(token.to_string()));
            }
            *value = v as usize;
        }
        Ok(Timeslots {
            start: values[0],
            skip: values[1],
            end: values[2],
        })
    }
}

/// The rows of a measurement set selected by [`Timeslots`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TimeSelection {
    /// [MJD seconds]
    pub(crate) first: f64,
    /// [MJD seconds]
    pub(crate) last: f64,
    /// Use one in every `step` rows of each baseline.
    pub(crate) step: usize,
    tolerance: f64,
}

impl TimeSelection {
    pub(crate) fn contains(&self, time: f64) -> bool {
        time >= self.first - self.tolerance && time <= self.last + self.tolerance
    }
}

impl Timeslots {
    pub(crate) fn select(&self, range: &TimeRange) -> TimeSelection {
        let num_timeslots = if range.interval > 0.0 {
            (range.last - range.first) / range.interval
        } else {
            0.0
        };
        let step = match self.skip {
            0 if num_timeslots >= 100.0 => (num_timeslots / 100.0) as usize,
            0 => 1,
            s => s,
        };
        let end = if self.end == 0 {
            num_timeslots
        } else {
            self.end as f64
        };
        TimeSelection {
            first: range.first + self.start as f64 * range.interval,
            last: range.first + end * range.interval,
            step,
            tolerance: 1e-3 * range.interval.abs(),
        }
    }
}

/// Which antennas (by index) to plot baselines of. Ranges are kept as given
/// rather than expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AntennaSelection {
    #[default]
    All,
    Only(Vec<RangeInclusive<i32>>),
}

impl FromStr for AntennaSelection {
    type Err = UvCovError;

    /// Parse "-1" (all antennas) or a comma-separated list of indices and
    /// inclusive "a..b" ranges.
    fn from_str(s: &str) -> Result<AntennaSelection, UvCovError> {
        let bad = || UvCovError::BadAntennaList(s.to_string());
        let mut antennas = vec![];
        for token in s.split(',').map(|t| t.trim()) {
            if let Some(caps) = ANTENNA_RANGE.captures(token) {
                let lo: i32 = caps[1].parse().map_err(|_| bad())?;
                let hi: i32 = caps[2].parse().map_err(|_| bad())?;
                antennas.push(lo..=hi);
            } else {
                let a: i32 = token.parse().map_err(|_| bad())?;
                antennas.push(a..=a);
            }
        }

        if antennas.iter().all(|r| *r == (-1..=-1)) {
            Ok(AntennaSelection::All)
        } else {
            Ok(AntennaSelection::Only(antennas))
        }
    }
}

impl AntennaSelection {
    pub fn contains(&self, antenna: i32) -> bool {
        match self {
            AntennaSelection::All => true,
            AntennaSelection::Only(antennas) => antennas.iter().any(|r| r.contains(&antenna)),
        }
    }
}
