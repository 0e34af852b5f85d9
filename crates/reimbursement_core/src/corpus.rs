//! Labelled trip cases used for evaluation

use crate::errors::CorpusError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Raw trip figures of one case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseInput {
    pub trip_duration_days: f64,
    pub miles_traveled: f64,
    pub total_receipts_amount: f64,
}

/// One case and its known reimbursement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub input: CaseInput,
    pub expected_output: f64,
}

/// Read a JSON array of cases
pub fn load_cases(path: &Path) -> Result<Vec<CaseRecord>, CorpusError> {
    let content = fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_cases(&content, path)
}

pub fn parse_cases(content: &str, path: &Path) -> Result<Vec<CaseRecord>, CorpusError> {
    serde_json::from_str(content).map_err(|source| CorpusError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
