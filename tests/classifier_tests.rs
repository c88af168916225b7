mod common;

use common::ScanBuilder;
use nxs2txt::classifier::ScanClassifier;
use nxs2txt::models::ScanArchetype;
use nxs2txt::schema::{NEW_CONVENTIONS, OLD_CONVENTIONS};
use nxs2txt::tree::{MemoryTree, TextArray};
use proptest::prelude::*;

// Names that match none of the classification markers
fn filler() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[x-z][a-z0-9_]{0,8}", 0..6)
}

fn suffix() -> impl Strategy<Value = String> {
    "[a-z0-9_]{0,4}"
}

fn detector() -> impl Strategy<Value = String> {
    (prop_oneof![Just("ca"), Just("femto")], suffix())
        .prop_map(|(marker, rest)| format!("{}{}", marker, rest))
}

fn shuffled(mut names: Vec<String>, seed: usize) -> Vec<String> {
    let len = names.len();
    if len > 1 {
        names.rotate_left(seed % len);
    }
    names
}

proptest! {
    #[test]
    fn prop_energy_and_current_is_nexafs(
        energy in suffix(),
        current in detector(),
        rest in filler(),
        seed in any::<usize>(),
    ) {
        let mut rest = rest;
        rest.push(format!("pgm_energy{}", energy));
        rest.push(current);
        let names = shuffled(rest, seed);

        let classifier = ScanClassifier::new(&NEW_CONVENTIONS);
        prop_assert_eq!(classifier.classify(&names), ScanArchetype::Nexafs);
    }

    #[test]
    fn prop_energy_current_and_analyser_is_nexafs_with_analyser(
        energy in suffix(),
        current in detector(),
        analyser in suffix(),
        rest in filler(),
        seed in any::<usize>(),
    ) {
        let mut rest = rest;
        rest.push(format!("pgm_energy{}", energy));
        rest.push(current);
        rest.push(format!("analyser{}", analyser));
        let names = shuffled(rest, seed);

        let classifier = ScanClassifier::new(&NEW_CONVENTIONS);
        prop_assert_eq!(classifier.classify(&names), ScanArchetype::NexafsWithAnalyser);
    }

    #[test]
    fn prop_analyser_alone_is_xps(
        analyser in suffix(),
        energy in prop::option::of(suffix()),
        rest in filler(),
        seed in any::<usize>(),
    ) {
        let mut rest = rest;
        rest.push(format!("analyser{}", analyser));
        if let Some(energy) = energy {
            rest.push(format!("pgm_energy{}", energy));
        }
        let names = shuffled(rest, seed);

        let classifier = ScanClassifier::new(&NEW_CONVENTIONS);
        prop_assert_eq!(classifier.classify(&names), ScanArchetype::Xps);
    }
}

#[test]
fn test_position_scan_fields() {
    let classifier = ScanClassifier::new(&NEW_CONVENTIONS);
    for field in ["sm21b_x", "sm21b_y", "sm21b_z", "dummy_a"] {
        assert_eq!(classifier.classify(&[field, "ca2"]), ScanArchetype::PositionScan);
    }
    // The analyser outranks the manipulator
    assert_eq!(classifier.classify(&["sm21b_x", "analyser"]), ScanArchetype::Xps);
}

#[test]
fn test_legacy_layout_matches_anchors_exactly() {
    let classifier = ScanClassifier::new(&OLD_CONVENTIONS);
    assert_eq!(classifier.classify(&["pgm_energy_2", "ca1"]), ScanArchetype::Unknown);
    assert_eq!(classifier.classify(&["pgm_energy", "ca1"]), ScanArchetype::Nexafs);
    // Detectors match anywhere in the name
    assert_eq!(classifier.classify(&["pgm_energy", "m1_femto"]), ScanArchetype::Nexafs);
}

#[test]
fn test_current_layout_matches_detector_prefix_only() {
    let classifier = ScanClassifier::new(&NEW_CONVENTIONS);
    assert_eq!(classifier.classify(&["pgm_energy", "m1_femto"]), ScanArchetype::Unknown);
}

#[test]
fn test_classify_tree_uses_scan_fields() {
    // Instrument holds a current, but scan_fields only lists the energy
    let tree = ScanBuilder::new_layout()
        .vector("pgm_energy", &[1.0])
        .build()
        .numeric(
            "/entry/instrument/ca1/value",
            nxs2txt::tree::NumericArray::vector(vec![1.0]),
        );

    let classifier = ScanClassifier::new(&NEW_CONVENTIONS);
    assert_eq!(classifier.classify_tree(&tree).unwrap(), ScanArchetype::Unknown);
}

#[test]
fn test_classify_tree_without_scan_fields_is_unknown() {
    let tree = MemoryTree::new()
        .group("/entry/instrument/pgm_energy")
        .group("/entry/instrument/ca1");

    let classifier = ScanClassifier::new(&NEW_CONVENTIONS);
    assert_eq!(classifier.field_names(&tree).unwrap(), None);
    assert_eq!(classifier.classify_tree(&tree).unwrap(), ScanArchetype::Unknown);
}

#[test]
fn test_classify_tree_on_legacy_members() {
    let tree = MemoryTree::new()
        .group("/entry1/instrument/pgm_energy")
        .group("/entry1/instrument/ca1")
        .text("/entry1/instrument/analyser/region_list", TextArray::list(["r1"]));

    let classifier = ScanClassifier::new(&OLD_CONVENTIONS);
    assert_eq!(
        classifier.classify_tree(&tree).unwrap(),
        ScanArchetype::NexafsWithAnalyser
    );
}
