//! Accuracy report of the engine over a labelled case corpus

use crate::corpus::CaseRecord;
use crate::engine::ReimbursementEngine;
use crate::errors::ModelError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Absolute error below which a prediction counts as exact
pub const EXACT_TOLERANCE: f64 = 0.01;
/// Absolute error below which a prediction counts as close
pub const CLOSE_TOLERANCE: f64 = 1.0;

/// Case index passed to the engine for each case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Every case is scored with index 0
    #[default]
    Zero,
    /// The case's position in the corpus
    Position,
}

impl IndexMode {
    fn case_index(self, position: usize) -> i64 {
        match self {
            Self::Zero => 0,
            Self::Position => position as i64,
        }
    }
}

impl FromStr for IndexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "position" => Ok(Self::Position),
            other => Err(format!("unknown index mode '{other}' (expected zero|position)")),
        }
    }
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "zero"),
            Self::Position => write!(f, "position"),
        }
    }
}

/// Prediction for one case
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub index: usize,
    pub days: f64,
    pub miles: f64,
    pub receipts: f64,
    pub expected: f64,
    pub predicted: f64,
    /// `predicted - expected`
    pub error: f64,
}

impl CaseOutcome {
    pub fn abs_error(&self) -> f64 {
        self.error.abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub index_mode: IndexMode,
    pub count: usize,
    pub mean_abs_error: f64,
    pub max_abs_error: f64,
    pub max_error_case: Option<usize>,
    pub exact_matches: usize,
    pub close_matches: usize,
    pub outcomes: Vec<CaseOutcome>,
}

impl EvaluationReport {
    /// The `n` cases with the largest absolute error, largest first
    pub fn worst(&self, n: usize) -> Vec<&CaseOutcome> {
        let mut ranked: Vec<&CaseOutcome> = self.outcomes.iter().collect();
        ranked.sort_by(|a, b| b.abs_error().total_cmp(&a.abs_error()));
        ranked.truncate(n);
        ranked
    }
}

/// Score every case and aggregate the errors
pub fn evaluate_cases(
    engine: &ReimbursementEngine,
    cases: &[CaseRecord],
    mode: IndexMode,
) -> Result<EvaluationReport, ModelError> {
    let mut outcomes = Vec::with_capacity(cases.len());
    for (index, case) in cases.iter().enumerate() {
        let input = &case.input;
        let predicted = engine.calculate(
            input.trip_duration_days,
            input.miles_traveled,
            input.total_receipts_amount,
            mode.case_index(index),
        )?;
        outcomes.push(CaseOutcome {
            index,
            days: input.trip_duration_days,
            miles: input.miles_traveled,
            receipts: input.total_receipts_amount,
            expected: case.expected_output,
            predicted,
            error: predicted - case.expected_output,
        });
    }

    let count = outcomes.len();
    let total_abs: f64 = outcomes.iter().map(CaseOutcome::abs_error).sum();
    let worst = outcomes
        .iter()
        .max_by(|a, b| a.abs_error().total_cmp(&b.abs_error()));

    let report = EvaluationReport {
        index_mode: mode,
        count,
        mean_abs_error: if count == 0 { 0.0 } else { total_abs / count as f64 },
        max_abs_error: worst.map_or(0.0, CaseOutcome::abs_error),
        max_error_case: worst.map(|o| o.index),
        exact_matches: outcomes
            .iter()
            .filter(|o| o.abs_error() < EXACT_TOLERANCE)
            .count(),
        close_matches: outcomes
            .iter()
            .filter(|o| o.abs_error() < CLOSE_TOLERANCE)
            .count(),
        outcomes,
    };
    debug!(
        count = report.count,
        mean_abs_error = report.mean_abs_error,
        "evaluated case corpus"
    );
    Ok(report)
}
