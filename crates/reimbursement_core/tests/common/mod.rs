#![allow(dead_code)]

use reimbursement_core::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Fresh model directory holding copies of the named fixtures
pub fn model_dir(fixtures: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for name in fixtures {
        fs::copy(fixture(name), dir.path().join(name)).expect("copy fixture");
    }
    dir
}

pub fn config_for(dir: &Path) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.models.dir = dir.to_path_buf();
    config
}
