//! Feature derivation from raw trip inputs
//!
//! Both models consume fixed-order vectors built from the same trip figures:
//!
//! Primary (10 values):
//! 0. days
//! 1. miles
//! 2. receipts
//! 3. receipts per day
//! 4. miles per day
//! 5. days * receipts per day
//! 6. days * miles per day
//! 7. log1p(max(receipts, 1))
//! 8. log1p(max(miles, 1))
//! 9. quarter (case index bucket)
//!
//! Residual (6 values): days, miles, receipts, receipts per day, miles per
//! day, quarter.

use std::hash::{Hash, Hasher};

/// Number of consecutive case indices that share one quarter bucket
pub const QUARTER_SPAN: i64 = 250;

/// Column names of the primary schema, in order
pub const PRIMARY_FEATURES: [&str; 10] = [
    "days",
    "miles",
    "receipts",
    "rpd",
    "mpd",
    "days_x_rpd",
    "days_x_mpd",
    "log_r",
    "log_m",
    "quarter",
];

/// Column names of the residual schema, in order
pub const RESIDUAL_FEATURES: [&str; 6] = ["days", "miles", "receipts", "rpd", "mpd", "quarter"];

/// Which model a feature vector is laid out for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSchema {
    Primary,
    Residual,
}

impl FeatureSchema {
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            Self::Primary => &PRIMARY_FEATURES,
            Self::Residual => &RESIDUAL_FEATURES,
        }
    }

    pub fn width(&self) -> usize {
        self.names().len()
    }
}

/// Fixed-order feature values
///
/// Equality and hashing compare exact bit patterns so the vector can key a
/// score cache; `0.0` and `-0.0` are treated as the same value.
#[derive(Debug, Clone)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn key_bits(&self) -> impl Iterator<Item = u64> + '_ {
        self.0
            .iter()
            .map(|v| if *v == 0.0 { 0 } else { v.to_bits() })
    }
}

impl PartialEq for FeatureVector {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.key_bits().eq(other.key_bits())
    }
}

impl Eq for FeatureVector {}

impl Hash for FeatureVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for bits in self.key_bits() {
            bits.hash(state);
        }
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Intermediate trip figures shared by both schemas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripFeatures {
    pub days: i64,
    pub miles: f64,
    pub receipts: f64,
    pub receipts_per_day: f64,
    pub miles_per_day: f64,
    pub quarter: i64,
}

impl TripFeatures {
    /// Coerce raw inputs; no domain validation is applied
    pub fn new(days: f64, miles: f64, receipts: f64, case_index: i64) -> Self {
        let days = coerce_days(days);
        let day_count = days as f64;
        Self {
            days,
            miles,
            receipts,
            receipts_per_day: receipts / day_count,
            miles_per_day: miles / day_count,
            quarter: quarter_bucket(case_index),
        }
    }

    pub fn primary(&self) -> FeatureVector {
        let days = self.days as f64;
        FeatureVector(vec![
            days,
            self.miles,
            self.receipts,
            self.receipts_per_day,
            self.miles_per_day,
            days * self.receipts_per_day,
            days * self.miles_per_day,
            clamped_log1p(self.receipts),
            clamped_log1p(self.miles),
            self.quarter as f64,
        ])
    }

    pub fn residual(&self) -> FeatureVector {
        FeatureVector(vec![
            self.days as f64,
            self.miles,
            self.receipts,
            self.receipts_per_day,
            self.miles_per_day,
            self.quarter as f64,
        ])
    }
}

/// Build the primary model's feature vector
pub fn derive(days: f64, miles: f64, receipts: f64, case_index: i64) -> FeatureVector {
    TripFeatures::new(days, miles, receipts, case_index).primary()
}

/// Build the residual model's feature vector
pub fn derive_residual(days: f64, miles: f64, receipts: f64, case_index: i64) -> FeatureVector {
    TripFeatures::new(days, miles, receipts, case_index).residual()
}

/// Truncate toward zero, never below one day
pub fn coerce_days(days: f64) -> i64 {
    (days.trunc() as i64).max(1)
}

/// Floor division of the case index into buckets of [`QUARTER_SPAN`]
pub fn quarter_bucket(case_index: i64) -> i64 {
    case_index.div_euclid(QUARTER_SPAN)
}

/// `ln(1 + max(x, 1))`: the argument is clamped at 1 before the log
pub fn clamped_log1p(x: f64) -> f64 {
    x.max(1.0).ln_1p()
}
