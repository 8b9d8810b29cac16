// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Failing steps exit with status 1 and say why on stderr.

use tempfile::TempDir;

use crate::{get_cmd_output, lofar_steps, write_file_in_dir};

#[test]
fn test_missing_argument() {
    let cmd = lofar_steps()
        .args(["add-list-mapfile", "--filename", "out.mapfile", "--dry-run"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("'files' is required"), "{stderr}");
}

#[test]
fn test_exit_status_is_one() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mapfile_dir = tmp_dir.path().display().to_string();
    let output = lofar_steps()
        .args([
            "add-list-mapfile",
            "--files",
            "[a.ms]",
            "--hosts",
            "[]",
            "--mapfile-dir",
            mapfile_dir.as_str(),
            "--filename",
            "out.mapfile",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!tmp_dir.path().join("out.mapfile").exists());
}

#[test]
fn test_malformed_mapfile() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mapfile = write_file_in_dir("bad.mapfile", tmp_dir.path(), "[{'host': 'localhost'");
    let mapfile = mapfile.display().to_string();
    let cmd = lofar_steps()
        .args([
            "get-target-name",
            "--mapfile-in",
            mapfile.as_str(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Mapfiles look like"), "{stderr}");
}

#[test]
fn test_unknown_arg_file_type() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let args = write_file_in_dir("args.yaml", tmp_dir.path(), "files: a.ms");
    let cmd = lofar_steps()
        .arg("add-list-mapfile")
        .arg(args.display().to_string())
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("toml, json"), "{stderr}");
}

#[test]
fn test_bad_plot_format() {
    let cmd = lofar_steps()
        .args(["plot-uvcov", "-i", "a.ms", "-o", "uv.gif", "--dry-run"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("png, pdf, eps, ps"), "{stderr}");
}
