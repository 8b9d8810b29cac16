// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the copy-files step.

use tempfile::TempDir;

use crate::{get_cmd_output, lofar_steps, write_file_in_dir};

#[test]
fn test_copy_files_from_input_mapfile() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let source = write_file_in_dir("source.parset", tmp_dir.path(), "steps=[]");
    let input_mapfile = write_file_in_dir(
        "input.mapfile",
        tmp_dir.path(),
        &format!(
            "[{{'host': 'localhost', 'file': '{}', 'skip': False}}]",
            source.display()
        ),
    );
    let d1 = tmp_dir.path().join("1.parset");
    let d2 = tmp_dir.path().join("2.parset");
    let outputs = format!("[{}, {}]", d1.display(), d2.display());
    let input_mapfile = input_mapfile.display().to_string();
    let mapfile_dir = tmp_dir.path().display().to_string();

    #[rustfmt::skip]
    let cmd = lofar_steps()
        .args([
            "copy-files",
            "--input-mapfile", input_mapfile.as_str(),
            "--output-files", outputs.as_str(),
            "--hosts", "[node1]",
            "--mapfile-dir", mapfile_dir.as_str(),
            "--filename", "copies.mapfile",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    for d in [&d1, &d2] {
        assert_eq!(std::fs::read_to_string(d).unwrap(), "steps=[]");
    }
    let map = lofar_steps::DataMap::load(tmp_dir.path().join("copies.mapfile")).unwrap();
    let records: Vec<(&str, &str, bool)> =
        map.iter().map(|p| (p.host(), p.file(), p.skip())).collect();
    let (d1, d2) = (d1.display().to_string(), d2.display().to_string());
    assert_eq!(
        records,
        vec![
            ("node1", d1.as_str(), false),
            ("node1", d2.as_str(), false)
        ]
    );
}

#[test]
fn test_copy_directory() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let source = tmp_dir.path().join("source.ms");
    std::fs::create_dir_all(source.join("ANTENNA")).unwrap();
    write_file_in_dir("table.dat", source.join("ANTENNA"), "antennas");
    let dest = tmp_dir.path().join("copy.ms");
    let source = source.display().to_string();
    let outputs = dest.display().to_string();
    let mapfile_dir = tmp_dir.path().display().to_string();

    #[rustfmt::skip]
    let cmd = lofar_steps()
        .args([
            "copy-files",
            "--input-file", source.as_str(),
            "--output-files", outputs.as_str(),
            "--mapfile-dir", mapfile_dir.as_str(),
            "--filename", "copies.mapfile",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    assert_eq!(
        std::fs::read_to_string(dest.join("ANTENNA").join("table.dat")).unwrap(),
        "antennas"
    );
}
