// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the add-list-mapfile step, on the command line and with
//! argument files.

use indoc::formatdoc;
use tempfile::TempDir;

use crate::{get_cmd_output, lofar_steps, write_file_in_dir};

#[test]
fn test_add_list_mapfile_writes_mapfile_and_results() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let results = tmp_dir.path().join("results.json");
    let mapfile_dir = tmp_dir.path().display().to_string();
    let results_file = results.display().to_string();

    #[rustfmt::skip]
    let cmd = lofar_steps()
        .args([
            "add-list-mapfile",
            "--files", "[s1.skymodel, s2.skymodel, s3.skymodel]",
            "--hosts", "[node1, node2]",
            "--mapfile-dir", mapfile_dir.as_str(),
            "--filename", "sky.mapfile",
            "--results-file", results_file.as_str(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let mapfile = tmp_dir.path().join("sky.mapfile");
    assert_eq!(
        std::fs::read_to_string(&mapfile).unwrap(),
        "[{'host': 'node1', 'file': 's1.skymodel', 'skip': False}, \
         {'host': 'node2', 'file': 's2.skymodel', 'skip': False}, \
         {'host': 'node1', 'file': 's3.skymodel', 'skip': False}]"
    );

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results).unwrap()).unwrap();
    assert_eq!(json["mapfile"], mapfile.display().to_string());
}

#[test]
fn test_add_list_mapfile_from_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let exists = write_file_in_dir("exists.txt", tmp_dir.path(), "");
    let args = write_file_in_dir(
        "add.toml",
        tmp_dir.path(),
        &formatdoc! {r#"
            files = "[{exists}, {missing}]"
            check_files_exist = "True"
            mapfile_dir = "{dir}"
            filename = "checked.mapfile"
        "#,
            exists = exists.display(),
            missing = tmp_dir.path().join("missing.txt").display(),
            dir = tmp_dir.path().display(),
        },
    );

    let cmd = lofar_steps()
        .arg("add-list-mapfile")
        .arg(args.display().to_string())
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let map = lofar_steps::DataMap::load(tmp_dir.path().join("checked.mapfile")).unwrap();
    let skips: Vec<bool> = map.iter().map(|p| p.skip()).collect();
    assert_eq!(skips, vec![false, true]);
    assert!(map.iter().all(|p| p.host() == "localhost"));
}

#[test]
fn test_add_list_mapfile_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mapfile_dir = tmp_dir.path().display().to_string();

    #[rustfmt::skip]
    let cmd = lofar_steps()
        .args([
            "add-list-mapfile",
            "--files", "[a.ms]",
            "--mapfile-dir", mapfile_dir.as_str(),
            "--filename", "dry.mapfile",
            "--dry-run",
        ])
        .ok();
    let succeeded = cmd.is_ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(succeeded, "{stderr}");
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!tmp_dir.path().join("dry.mapfile").exists());
}
