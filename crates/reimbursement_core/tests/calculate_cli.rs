//! Output contract of the `calculate_reimbursement` binary

mod common;

use common::model_dir;
use std::path::Path;
use std::process::{Command, Output};

fn run(models: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_calculate_reimbursement"))
        .args(args)
        .env("REIMBURSE_MODEL_DIR", models)
        .env_remove("REIMBURSE_CONFIG")
        .env("RUST_LOG", "debug")
        .output()
        .expect("run calculate_reimbursement")
}

#[test]
fn test_prints_only_the_amount() {
    let dir = model_dir(&["full_model.json"]);
    let output = run(dir.path(), &["3", "150", "200"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "401.56\n");
}

#[test]
fn test_days_accepts_decimal_form_and_case_index() {
    let dir = model_dir(&["full_model.json"]);

    let output = run(dir.path(), &["3.0", "150", "200", "500"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "397.56\n");
}

#[test]
fn test_unparsable_case_index_counts_as_zero() {
    let dir = model_dir(&["full_model.json"]);
    for raw in ["abc", "", "-abc", "--foo"] {
        let output = run(dir.path(), &["3", "150", "200", raw]);
        assert!(output.status.success(), "case index {raw:?}");
        assert_eq!(String::from_utf8_lossy(&output.stdout), "401.56\n");
    }
}

#[test]
fn test_wrong_argument_count_fails_without_output() {
    let dir = model_dir(&["full_model.json"]);
    for args in [&["3", "150"][..], &["3", "150", "200", "0", "9"][..], &[][..]] {
        let output = run(dir.path(), args);
        assert!(!output.status.success(), "args {args:?}");
        assert!(output.stdout.is_empty(), "args {args:?}");
        assert!(!output.stderr.is_empty(), "args {args:?}");
    }
}

#[test]
fn test_legacy_conversion_logs_stay_off_stdout() {
    let dir = model_dir(&["full_model.txt"]);
    let output = run(dir.path(), &["3", "150", "200"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "401.56\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("converted legacy model"));
    assert!(dir.path().join("full_model.json").exists());
}

#[test]
fn test_missing_model_fails_without_output() {
    let dir = model_dir(&[]);
    let output = run(dir.path(), &["3", "150", "200"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
