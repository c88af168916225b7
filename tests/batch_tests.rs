mod common;

use common::{read_rows, touch, FixtureOpener, ScanBuilder};
use nxs2txt::batch::scan_files;
use nxs2txt::tree::MemoryTree;
use nxs2txt::{BatchRunner, Converter, Error};
use tempfile::tempdir;

fn nexafs_new() -> MemoryTree {
    ScanBuilder::new_layout()
        .vector("pgm_energy", &[280.0, 281.0])
        .vector("ca1", &[0.5, 0.75])
        .build()
}

fn nexafs_old() -> MemoryTree {
    ScanBuilder::old_layout()
        .vector("pgm_energy", &[280.0, 281.0])
        .vector("ca35b", &[0.5, 0.75])
        .build()
}

#[test]
fn test_mixed_folder() {
    let dir = tempdir().unwrap();
    let names = [
        "a_new.nxs",
        "b_old.nxs",
        "c_foreign.nxs",
        "d_broken.nxs",
        "e_no_instrument.nxs",
        "f_scalars.nxs",
        "notes.txt",
    ];
    for name in names {
        touch(dir.path(), name);
    }

    let opener = FixtureOpener::new()
        .with("a_new.nxs", nexafs_new())
        .with("b_old.nxs", nexafs_old())
        .with("c_foreign.nxs", MemoryTree::new().group("/scan/instrument"))
        .with("e_no_instrument.nxs", MemoryTree::new().group("/entry/sample"))
        .with(
            "f_scalars.nxs",
            ScanBuilder::new_layout()
                .scalar("pgm_energy", 280.0)
                .scalar("ca1", 1.0)
                .build(),
        );

    let report = BatchRunner::new(opener, Converter::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(report.new_files, 3);
    assert_eq!(report.old_files, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.files.len(), 3);

    assert_eq!(report.errors.len(), 2);
    let missing = dir.path().join("e_no_instrument.nxs");
    assert!(report.errors[0].starts_with(&format!("ERROR {} : ", missing.display())));
    assert!(report.errors[0].contains("/entry/instrument"));
    let empty = dir.path().join("f_scalars.nxs");
    assert_eq!(report.errors[1], format!("WARNING empty result {}", empty.display()));

    // Conversion went on past the failures
    assert!(dir.path().join("a_new_NEXAFS.dat").exists());
    let old_rows = read_rows(&dir.path().join("b_old_NEXAFS.dat"));
    assert_eq!(old_rows[0], vec!["pgm_energy", "ca35b"]);
    assert!(!dir.path().join("f_scalars_NEXAFS.dat").exists());
}

#[test]
fn test_summary_lines() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "one.nxs");
    let opener = FixtureOpener::new().with("one.nxs", nexafs_new());

    let report = BatchRunner::new(opener, Converter::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(
        report.summary(),
        "NUMBER OF PROCESSED NEW FILES: 1\nNUMBER OF PROCESSED OLD FILES: 0\nSKIPPED FILES: 0"
    );
    assert!(report.errors.is_empty());
}

#[test]
fn test_unknown_scan_type_is_not_a_warning() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "mystery.nxs");
    let tree = ScanBuilder::new_layout().vector("ca1", &[1.0]).build();
    let opener = FixtureOpener::new().with("mystery.nxs", tree);

    let report = BatchRunner::new(opener, Converter::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(report.new_files, 1);
    assert!(report.errors.is_empty());
}

#[test]
fn test_invalid_folder() {
    let dir = tempdir().unwrap();
    let file = touch(dir.path(), "not_a_folder.nxs");

    let runner = BatchRunner::new(FixtureOpener::new(), Converter::default());
    assert!(matches!(runner.run(&file), Err(Error::InvalidInput(_))));
    assert!(matches!(
        runner.run(&dir.path().join("missing")),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_empty_folder() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "readme.md");

    let report = BatchRunner::new(FixtureOpener::new(), Converter::default())
        .run(dir.path())
        .unwrap();

    assert_eq!(report.new_files + report.old_files + report.skipped, 0);
    assert!(report.files.is_empty());
}

#[test]
fn test_scan_files_sorted_and_filtered() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "b.nxs");
    touch(dir.path(), "a.nxs");
    touch(dir.path(), "c.nxs.bak");
    std::fs::create_dir(dir.path().join("sub.nxs")).unwrap();

    let files = scan_files(dir.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.nxs", "b.nxs"]);
}

#[test]
fn test_report_serializes_to_json() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "one.nxs");
    let opener = FixtureOpener::new().with("one.nxs", nexafs_new());

    let report = BatchRunner::new(opener, Converter::default())
        .run(dir.path())
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["new_files"], 1);
    assert_eq!(json["files"][0]["archetype"], "Nexafs");
}
