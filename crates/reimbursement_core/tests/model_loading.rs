//! Canonical loading and legacy conversion against the fixture models

mod common;

use common::{fixture, model_dir};
use reimbursement_core::gbdt::DumpModel;
use reimbursement_core::loader::{convert_legacy, load, load_canonical, load_optional};
use reimbursement_core::ModelError;
use std::fs;
use std::sync::Arc;
use std::thread;

#[test]
fn test_converted_model_equals_canonical_fixture() {
    let dir = model_dir(&["full_model.txt"]);
    let primary = dir.path().join("full_model.json");
    let legacy = dir.path().join("full_model.txt");

    let converted = load(&primary, &legacy).unwrap();
    let written = load_canonical(&primary).unwrap();
    let reference = load_canonical(&fixture("full_model.json")).unwrap();

    assert_eq!(converted, reference);
    assert_eq!(written, reference);
    assert_eq!(reference.num_trees(), 4);
}

#[test]
fn test_converted_dump_keeps_library_layout() {
    let converted = convert_legacy(&fixture("residual.txt")).unwrap();
    let content = fs::read_to_string(fixture("residual.json")).unwrap();
    let reference = DumpModel::from_json_str(&content, &fixture("residual.json")).unwrap();

    assert_eq!(converted, reference);
}

#[test]
fn test_second_load_reads_canonical_file() {
    let dir = model_dir(&["full_model.txt"]);
    let primary = dir.path().join("full_model.json");
    let legacy = dir.path().join("full_model.txt");

    let first = load(&primary, &legacy).unwrap();
    fs::remove_file(&legacy).unwrap();
    let second = load(&primary, &legacy).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unwritable_target_still_loads() {
    let dir = model_dir(&["full_model.txt"]);
    let primary = dir.path().join("no_such_dir").join("full_model.json");
    let legacy = dir.path().join("full_model.txt");

    let ensemble = load(&primary, &legacy).unwrap();
    assert!(!primary.exists());
    assert_eq!(ensemble.num_trees(), 4);
}

#[test]
fn test_missing_artifacts() {
    let dir = model_dir(&[]);
    let primary = dir.path().join("full_model.json");
    let legacy = dir.path().join("full_model.txt");

    match load(&primary, &legacy) {
        Err(ModelError::ModelNotFound { primary: p, legacy: l }) => {
            assert_eq!(p, primary);
            assert_eq!(l, legacy);
        }
        other => panic!("expected ModelNotFound, got {other:?}"),
    }
    assert!(load_optional(&primary, &legacy).unwrap().is_empty());
}

#[test]
fn test_malformed_artifacts() {
    let dir = model_dir(&[]);
    let primary = dir.path().join("m.json");
    let legacy = dir.path().join("m.txt");

    fs::write(&primary, r#"{"tree_info": [{"tree_structure": {"split_feature": 0}}]}"#).unwrap();
    assert!(matches!(
        load(&primary, &legacy),
        Err(ModelError::MalformedModel { .. })
    ));

    fs::remove_file(&primary).unwrap();
    fs::write(&legacy, "not a model\n").unwrap();
    assert!(matches!(
        load(&primary, &legacy),
        Err(ModelError::MalformedModel { .. })
    ));
    assert!(!primary.exists());

    // an optional model that exists but is broken is still an error
    assert!(matches!(
        load_optional(&primary, &legacy),
        Err(ModelError::MalformedModel { .. })
    ));
}

#[test]
fn test_concurrent_first_use_converts_consistently() {
    let dir = Arc::new(model_dir(&["full_model.txt"]));
    let reference = load_canonical(&fixture("full_model.json")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dir = Arc::clone(&dir);
            thread::spawn(move || {
                load(
                    &dir.path().join("full_model.json"),
                    &dir.path().join("full_model.txt"),
                )
                .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), reference);
    }
    assert_eq!(load_canonical(&dir.path().join("full_model.json")).unwrap(), reference);
}

#[test]
fn test_summary_of_fixture() {
    let summary = load_canonical(&fixture("full_model.json")).unwrap().summary();
    assert_eq!(summary.num_trees, 4);
    assert_eq!(summary.num_leaves, 4 + 3 + 1 + 2);
    assert_eq!(summary.max_depth, 2);
    assert_eq!(summary.max_feature_index, Some(9));
    assert_eq!(summary.feature_names.len(), 10);
}
