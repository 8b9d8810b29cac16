// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;
use tempfile::TempDir;

use super::*;

#[test]
fn test_defaults() {
    let params = PlotUvcovArgs {
        input: Some(ListArg::from("[a.ms, b.ms]")),
        output: Some(PathBuf::from("uv.png")),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert_eq!(params.ms_files, vec!["a.ms", "b.ms"]);
    assert_eq!(params.title, "uv coverage");
    assert_eq!(params.marker_size, 2);
    assert_eq!(params.limits, AxisLimits::default());
    assert_eq!(params.selection.timeslots, Timeslots::default());
    assert_eq!(params.selection.antennas, AntennaSelection::All);
    assert!(params.selection.kilolambda);
    assert!(params.selection.wideband);
    assert!(params.selection.sameuv);
    assert!(params.selection.flagged);
}

#[test]
fn test_command_line_options() {
    #[rustfmt::skip]
    let args = PlotUvcovArgs::parse_from([
        "plot-uvcov",
        "-i", "a.ms",
        "-o", "uv.pdf",
        "--title", "3C196",
        "--limits", ",,-10,10",
        "--markersize", "4",
        "--timeslots", "0,5,100",
        "--antennas", "0,3..5",
        "--kilolambda", "False",
        "--sameuv", "0",
    ]);
    let params = args.parse().unwrap();
    assert_eq!(params.title, "3C196");
    assert_eq!(params.marker_size, 4);
    assert_eq!(
        params.limits,
        AxisLimits {
            xmin: None,
            xmax: None,
            ymin: Some(-10.0),
            ymax: Some(10.0),
        }
    );
    assert_eq!(
        params.selection.timeslots,
        Timeslots {
            start: 0,
            skip: 5,
            end: 100
        }
    );
    assert_eq!(
        params.selection.antennas,
        AntennaSelection::Only(vec![0..=0, 3..=5])
    );
    assert!(!params.selection.kilolambda);
    assert!(!params.selection.sameuv);
    assert!(params.selection.wideband);
}

#[test]
fn test_string_booleans_in_arg_files() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("uvcov.toml");
    std::fs::write(
        &arg_file,
        "input = \"a.ms\"\noutput = \"uv.ps\"\nwideband = \"False\"\nflagged = false\n",
    )
    .unwrap();

    let args = PlotUvcovArgs {
        args_file: Some(arg_file),
        // The command line wins.
        flagged: Some(true),
        ..Default::default()
    }
    .merge()
    .unwrap();
    assert_eq!(args.wideband, Some(false));
    assert_eq!(args.flagged, Some(true));
    assert_eq!(args.kilolambda, None);
}

#[test]
fn test_globs_are_expanded() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    for name in ["b.ms", "a.ms"] {
        std::fs::create_dir(tmp_dir.path().join(name)).unwrap();
    }
    let pattern = tmp_dir.path().join("*.ms").display().to_string();

    let params = PlotUvcovArgs {
        input: Some(ListArg::One(pattern)),
        output: Some(PathBuf::from("uv.eps")),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert_eq!(
        params.ms_files,
        vec![
            tmp_dir.path().join("a.ms").display().to_string(),
            tmp_dir.path().join("b.ms").display().to_string(),
        ]
    );
}

#[test]
fn test_bad_arguments() {
    let args = || PlotUvcovArgs {
        input: Some(ListArg::from("a.ms")),
        output: Some(PathBuf::from("uv.png")),
        ..Default::default()
    };

    let result = PlotUvcovArgs {
        output: Some(PathBuf::from("uv.gif")),
        ..args()
    }
    .parse();
    assert!(matches!(result, Err(StepsError::Plot(_))));

    let result = PlotUvcovArgs {
        limits: Some("1,2,3".to_string()),
        ..args()
    }
    .parse();
    assert!(matches!(result, Err(StepsError::Plot(_))));

    let result = PlotUvcovArgs {
        timeslots: Some("0,-1,0".to_string()),
        ..args()
    }
    .parse();
    assert!(matches!(result, Err(StepsError::Plot(_))));

    let result = PlotUvcovArgs {
        antennas: Some("0,x".to_string()),
        ..args()
    }
    .parse();
    assert!(matches!(result, Err(StepsError::Plot(_))));

    let result = PlotUvcovArgs {
        markersize: Some(0),
        ..args()
    }
    .parse();
    assert!(matches!(result, Err(StepsError::Plot(_))));

    let result = PlotUvcovArgs {
        output: None,
        ..args()
    }
    .parse();
    let err = result.err().unwrap().to_string();
    assert!(err.contains("output"), "{err}");

    let result = PlotUvcovArgs {
        input: Some(ListArg::from("/no/such/dir/*.ms")),
        ..args()
    }
    .parse();
    assert!(matches!(result, Err(StepsError::Generic(_))));
}

#[cfg(feature = "plotting")]
#[test]
fn test_plot_written() {
    use crate::{
        ms::BaselineRows,
        tests::{StubMs, StubReader},
    };

    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("uv.eps");
    let mut ms = StubMs::default();
    ms.rows = BaselineRows {
        antenna1: vec![0, 0],
        antenna2: vec![1, 2],
        time: vec![ms.time_range.first; 2],
        uvw: vec![[1000.0, 2000.0, 0.0], [-3000.0, 500.0, 0.0]],
        flag_row: vec![false, true],
    };
    let reader = StubReader::default().with("a.ms", ms);

    let results = PlotUvcovArgs {
        input: Some(ListArg::from("a.ms")),
        output: Some(output.clone()),
        ..Default::default()
    }
    .parse()
    .unwrap()
    .run(&reader)
    .unwrap();
    assert_eq!(results["plot"], output.display().to_string());
    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("%!PS-Adobe-3.0 EPSF-3.0"));
}

#[cfg(feature = "plotting")]
#[test]
fn test_nothing_to_plot() {
    use crate::tests::{StubMs, StubReader};

    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("uv.ps");
    let reader = StubReader::default().with("a.ms", StubMs::default());
    let result = PlotUvcovArgs {
        input: Some(ListArg::from("a.ms")),
        output: Some(output.clone()),
        ..Default::default()
    }
    .parse()
    .unwrap()
    .run(&reader);
    assert!(matches!(result, Err(StepsError::Plot(_))));
    assert!(!output.exists());
}
