// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use approx::assert_abs_diff_eq;

use super::*;
use crate::{
    constants::VEL_C,
    ms::{BaselineRows, SpectralWindow, TimeRange},
    tests::{StubMs, StubReader},
};

/// Three baselines and an autocorrelation over four timesteps. Baseline 0-2
/// is flagged.
fn stub_ms() -> StubMs {
    let mut rows = BaselineRows::default();
    for i_time in 0..4 {
        for (ant1, ant2, uvw, flagged) in [
            (0, 1, [1000.0, 2000.0, 0.0], false),
            (0, 2, [3000.0, 0.0, 0.0], true),
            (1, 2, [-500.0, 500.0, 0.0], false),
            (1, 1, [0.0, 0.0, 0.0], false),
        ] {
            rows.antenna1.push(ant1);
            rows.antenna2.push(ant2);
            rows.time.push(100.0 + f64::from(i_time));
            rows.uvw.push(uvw);
            rows.flag_row.push(flagged);
        }
    }
    StubMs {
        time_range: TimeRange {
            first: 100.0,
            last: 103.0,
            interval: 1.0,
        },
        spectral_window: SpectralWindow {
            ref_freq_hz: 150e6,
            chan_freqs_hz: vec![140e6, 160e6],
        },
        antenna_names: vec!["CS001".into(), "CS002".into(), "CS003".into()],
        rows,
        ..Default::default()
    }
}

fn reader() -> StubReader {
    StubReader::default().with("a.ms", stub_ms())
}

fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_limits() {
    let limits: AxisLimits = ",,,".parse().unwrap();
    assert_eq!(limits, AxisLimits::default());

    let limits: AxisLimits = " -10, 10,,5.5 ".parse().unwrap();
    assert_eq!(limits.xmin, Some(-10.0));
    assert_eq!(limits.xmax, Some(10.0));
    assert_eq!(limits.ymin, None);
    assert_eq!(limits.ymax, Some(5.5));

    assert!(matches!(
        "1,2,3".parse::<AxisLimits>(),
        Err(UvCovError::WrongNumLimits(3))
    ));
    assert!(matches!(
        "a,,,".parse::<AxisLimits>(),
        Err(UvCovError::BadLimit(_))
    ));
}

#[test]
fn test_resolve_limits() {
    let points = [
        UvPoint {
            u: 3.0,
            v: 2.0,
            flagged: false,
        },
        UvPoint {
            u: -3.0,
            v: -2.0,
            flagged: false,
        },
    ];
    let range = AxisLimits::default().resolve(&points);
    assert_abs_diff_eq!(range.x.0, -3.12, epsilon = 1e-10);
    assert_abs_diff_eq!(range.x.1, 3.12, epsilon = 1e-10);
    assert_eq!(range.x, range.y);

    // Equal limits are replaced, the others are used as is.
    let limits: AxisLimits = "5,5,-1,4".parse().unwrap();
    let range = limits.resolve(&points);
    assert_eq!(range.x, (-1.0, 1.0));
    assert_eq!(range.y, (-1.0, 4.0));
}

#[test]
fn test_parse_timeslots() {
    let t: Timeslots = "0,0,0".parse().unwrap();
    assert_eq!(t, Timeslots::default());
    let t: Timeslots = "5, 2, 100".parse().unwrap();
    assert_eq!(
        t,
        Timeslots {
            start: 5,
            skip: 2,
            end: 100
        }
    );

    assert!(matches!(
        "0,0".parse::<Timeslots>(),
        Err(UvCovError::BadTimeslots(_))
    ));
    assert!(matches!(
        "0,x,0".parse::<Timeslots>(),
        Err(UvCovError::BadTimeslots(_))
    ));
    assert!(matches!(
        "0,-1,0".parse::<Timeslots>(),
        Err(UvCovError::NegativeTimeslot(_))
    ));
}

#[test]
fn test_automatic_time_skip() {
    let range = TimeRange {
        first: 0.0,
        last: 1000.0,
        interval: 2.0,
    };
    // 500 timeslots; plot one in every 5.
    let selection = Timeslots::default().select(&range);
    assert_eq!(selection.step, 5);
    assert!(selection.contains(0.0));
    assert!(selection.contains(1000.0));
    assert!(!selection.contains(1002.0));

    let short = TimeRange {
        first: 0.0,
        last: 20.0,
        interval: 2.0,
    };
    assert_eq!(Timeslots::default().select(&short).step, 1);

    let explicit = Timeslots {
        start: 2,
        skip: 3,
        end: 4,
    }
    .select(&range);
    assert_eq!(explicit.step, 3);
    assert!(!explicit.contains(2.0));
    assert!(explicit.contains(4.0));
    assert!(explicit.contains(8.0));
    assert!(!explicit.contains(10.0));
}

#[test]
fn test_parse_antennas() {
    assert_eq!(
        "-1".parse::<AntennaSelection>().unwrap(),
        AntennaSelection::All
    );
    assert_eq!(
        "0, 2..4".parse::<AntennaSelection>().unwrap(),
        AntennaSelection::Only(vec![0..=0, 2..=4])
    );
    assert!(matches!(
        "1..2..3".parse::<AntennaSelection>(),
        Err(UvCovError::BadAntennaList(_))
    ));
    assert!(matches!(
        "CS001".parse::<AntennaSelection>(),
        Err(UvCovError::BadAntennaList(_))
    ));

    let selection: AntennaSelection = "1..2".parse().unwrap();
    assert!(!selection.contains(0));
    assert!(selection.contains(1));
    assert!(selection.contains(2));
    assert!(AntennaSelection::All.contains(1000));

    // Wide ranges aren't expanded.
    let selection: AntennaSelection = "0..2000000000".parse().unwrap();
    assert_eq!(selection, AntennaSelection::Only(vec![0..=2_000_000_000]));
    assert!(selection.contains(1_999_999_999));
    assert!(!selection.contains(-2));
}

#[test]
fn test_plot_format_from_path() {
    assert_eq!(
        PlotFormat::from_path(Path::new("/tmp/uv.png")).unwrap(),
        PlotFormat::Png
    );
    assert_eq!(
        PlotFormat::from_path(Path::new("uv.eps")).unwrap(),
        PlotFormat::Eps
    );
    for bad in ["uv.jpg", "uv", "uv.PNG"] {
        assert!(matches!(
            PlotFormat::from_path(Path::new(bad)),
            Err(UvCovError::InvalidPlotFormat(_))
        ));
    }
    assert_eq!(UVCOV_PLOT_EXTENSIONS.as_str(), "png, pdf, eps, ps");
}

#[test]
fn test_collect_kilometres() {
    let selection = UvSelection::default();
    let points = collect_uv_points(&reader(), &files(&["a.ms"]), &selection).unwrap();
    // 3 cross-correlation baselines, 4 timesteps, mirrored.
    assert_eq!(points.len(), 24);
    assert!(points.iter().all(|p| !p.flagged));
    assert!(points.iter().any(|p| p.u == 1.0 && p.v == 2.0));
    assert!(points.iter().any(|p| p.u == -1.0 && p.v == -2.0));
    assert!(points.iter().any(|p| p.u == 3.0 && p.v == 0.0));
    let max_u = points.iter().map(|p| p.u).fold(f64::MIN, f64::max);
    assert_eq!(max_u, 3.0);
}

#[test]
fn test_collect_kilolambda() {
    let selection = UvSelection {
        kilolambda: true,
        ..Default::default()
    };
    let points = collect_uv_points(&reader(), &files(&["a.ms"]), &selection).unwrap();
    assert_eq!(points.len(), 24);
    let wavelength = VEL_C / 150e6;
    let max_u = points.iter().map(|p| p.u).fold(f64::MIN, f64::max);
    assert_abs_diff_eq!(max_u, 3000.0 / wavelength / 1000.0, epsilon = 1e-10);

    // One set of points per channel.
    let selection = UvSelection {
        kilolambda: true,
        wideband: true,
        ..Default::default()
    };
    let points = collect_uv_points(&reader(), &files(&["a.ms"]), &selection).unwrap();
    assert_eq!(points.len(), 48);
    let max_u = points.iter().map(|p| p.u).fold(f64::MIN, f64::max);
    assert_abs_diff_eq!(max_u, 3000.0 / (VEL_C / 160e6) / 1000.0, epsilon = 1e-10);
}

#[test]
fn test_collect_selections() {
    let selection = UvSelection {
        antennas: "0,1".parse().unwrap(),
        ..Default::default()
    };
    let points = collect_uv_points(&reader(), &files(&["a.ms"]), &selection).unwrap();
    assert_eq!(points.len(), 8);
    assert!(points.iter().all(|p| p.u.abs() == 1.0));

    let selection = UvSelection {
        timeslots: "0,2,0".parse().unwrap(),
        ..Default::default()
    };
    let points = collect_uv_points(&reader(), &files(&["a.ms"]), &selection).unwrap();
    assert_eq!(points.len(), 12);

    let selection = UvSelection {
        timeslots: "2,0,0".parse().unwrap(),
        ..Default::default()
    };
    let points = collect_uv_points(&reader(), &files(&["a.ms"]), &selection).unwrap();
    assert_eq!(points.len(), 12);

    let selection = UvSelection {
        antennas: "7".parse().unwrap(),
        ..Default::default()
    };
    assert!(matches!(
        collect_uv_points(&reader(), &files(&["a.ms"]), &selection),
        Err(UvCovError::NoPoints)
    ));
}

#[test]
fn test_collect_flagged() {
    let selection = UvSelection {
        flagged: true,
        ..Default::default()
    };
    let points = collect_uv_points(&reader(), &files(&["a.ms"]), &selection).unwrap();
    let flagged: Vec<_> = points.iter().filter(|p| p.flagged).collect();
    assert_eq!(flagged.len(), 8);
    assert!(flagged.iter().all(|p| p.u.abs() == 3.0));
}

#[test]
fn test_collect_sameuv() {
    // The second measurement set has no rows of its own.
    let second = StubMs {
        spectral_window: SpectralWindow {
            ref_freq_hz: 120e6,
            chan_freqs_hz: vec![120e6],
        },
        ..Default::default()
    };
    let reader = reader().with("b.ms", second);

    let selection = UvSelection {
        kilolambda: true,
        ..Default::default()
    };
    let points = collect_uv_points(&reader, &files(&["a.ms", "b.ms"]), &selection).unwrap();
    assert_eq!(points.len(), 24);

    let selection = UvSelection {
        kilolambda: true,
        sameuv: true,
        ..Default::default()
    };
    let points = collect_uv_points(&reader, &files(&["a.ms", "b.ms"]), &selection).unwrap();
    assert_eq!(points.len(), 48);
    let max_u = points.iter().map(|p| p.u).fold(f64::MIN, f64::max);
    assert_abs_diff_eq!(max_u, 3000.0 / (VEL_C / 150e6) / 1000.0, epsilon = 1e-10);
    // The second set is scaled by its own wavelength.
    assert!(points
        .iter()
        .any(|p| (p.u - 3000.0 / (VEL_C / 120e6) / 1000.0).abs() < 1e-10));
}

#[test]
fn test_collect_needs_readable_inputs() {
    let selection = UvSelection::default();
    assert!(matches!(
        collect_uv_points(&reader(), &[], &selection),
        Err(UvCovError::NoInputs)
    ));
    assert!(matches!(
        collect_uv_points(&reader(), &files(&["missing.ms"]), &selection),
        Err(UvCovError::MeasurementSet(_))
    ));
}

#[test]
fn test_plot_checks_arguments_before_reading() {
    let empty = StubReader::default();
    let plot = UvCovPlot {
        output: Path::new("uv.gif"),
        title: "uv coverage",
        limits: AxisLimits::default(),
        marker_size: 2,
        selection: UvSelection::default(),
    };
    assert!(matches!(
        plot_uvcov(&empty, &files(&["a.ms"]), &plot),
        Err(UvCovError::InvalidPlotFormat(_))
    ));

    let plot = UvCovPlot {
        output: Path::new("uv.png"),
        marker_size: 0,
        ..plot
    };
    assert!(matches!(
        plot_uvcov(&empty, &files(&["a.ms"]), &plot),
        Err(UvCovError::BadMarkerSize)
    ));
}

#[cfg(feature = "plotting")]
#[test]
fn test_vector_backend_writes_files() {
    use plotters::prelude::*;

    use super::vector::{VectorBackend, VectorFormat};

    let dir = tempfile::tempdir().unwrap();
    for (name, format, magic) in [
        ("uv.ps", VectorFormat::Ps, "%!PS-Adobe-3.0"),
        ("uv.eps", VectorFormat::Eps, "%!PS-Adobe-3.0 EPSF-3.0"),
        ("uv.pdf", VectorFormat::Pdf, "%PDF-1.4"),
    ] {
        let path = dir.path().join(name);
        let root = VectorBackend::new(&path, (200, 100), format).into_drawing_area();
        root.fill(&WHITE).unwrap();
        root.draw(&Circle::new((50, 50), 3, RED.filled())).unwrap();
        root.present().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(magic), "{name}: {contents}");
        if format == VectorFormat::Pdf {
            assert!(contents.contains("/MediaBox [0 0 200 100]"));
            // The red circle is filled with Bézier curves.
            assert!(contents.contains("1.000 0.000 0.000 rg"));
            assert!(contents.contains(" c "));
        } else {
            assert!(contents.contains("%%BoundingBox: 0 0 200 100"));
            assert!(contents.contains("newpath 50.00 50.00 3.00 0 360 arc closepath fill"));
        }
    }
}
