// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, lofar_steps, write_file_in_dir};

#[test]
fn test_add_list_mapfile_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mapfile_dir = tmp_dir.path().display().to_string();

    #[rustfmt::skip]
    let cmd = lofar_steps()
        .args([
            "add-list-mapfile",
            "--files", "[a.ms, b.ms]",
            "--hosts", "[node1, node2, node3]",
            "--mapfile-dir", mapfile_dir.as_str(),
            "--filename", "out.mapfile",
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "add-list-mapfile failed: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_identify_bad_antennas_dry_run_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mapfile = write_file_in_dir(
        "in.mapfile",
        tmp_dir.path(),
        "[{'host': 'localhost', 'file': 'a.ms', 'skip': False}]",
    );
    let mapfile = mapfile.display().to_string();

    #[rustfmt::skip]
    let cmd = lofar_steps()
        .args([
            "identify-bad-antennas",
            "--mapfile-in", mapfile.as_str(),
            "--filter", "[CR]S*&",
            "--dry-run",
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "identify-bad-antennas failed: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_check_unflagged_fraction_positional_dry_run_no_stderr() {
    #[rustfmt::skip]
    let cmd = lofar_steps()
        .args([
            "check-unflagged-fraction",
            "[a.ms, b.ms]",
            "--min_fraction", "0.05",
            "--dry-run",
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "check-unflagged-fraction failed: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
