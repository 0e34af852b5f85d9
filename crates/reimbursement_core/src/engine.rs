//! Reimbursement calculation engine

use crate::cache::CacheStats;
use crate::config::{CacheConfig, EngineConfig};
use crate::errors::{EngineError, ModelError};
use crate::features::{FeatureSchema, TripFeatures};
use crate::gbdt::Ensemble;
use crate::loader;
use crate::scorer::EnsembleScorer;
use once_cell::sync::OnceCell;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{error, info};

static GLOBAL_ENGINE: OnceCell<ReimbursementEngine> = OnceCell::new();

/// Primary model plus optional residual correction
#[derive(Debug)]
pub struct ReimbursementEngine {
    primary: EnsembleScorer,
    residual: Option<EnsembleScorer>,
}

impl ReimbursementEngine {
    /// Build an engine from loaded ensembles
    ///
    /// Fails when a split reads past the width of its model's feature schema.
    /// An empty residual ensemble is treated as no residual.
    pub fn new(
        primary: Ensemble,
        residual: Option<Ensemble>,
        cache: CacheConfig,
    ) -> Result<Self, ModelError> {
        check_schema(&primary, FeatureSchema::Primary)?;
        let residual = match residual {
            Some(ensemble) if !ensemble.is_empty() => {
                check_schema(&ensemble, FeatureSchema::Residual)?;
                Some(EnsembleScorer::new(
                    Arc::new(ensemble),
                    cache.residual_capacity,
                ))
            }
            _ => None,
        };

        Ok(Self {
            primary: EnsembleScorer::new(Arc::new(primary), cache.primary_capacity),
            residual,
        })
    }

    /// Load both models as configured
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let models = &config.models;
        let primary = loader::load(&models.primary_path(), &models.primary_legacy_path())?;
        info!(summary = ?primary.summary(), "primary model ready");

        let residual = if models.use_residual {
            Some(loader::load_optional(
                &models.residual_path(),
                &models.residual_legacy_path(),
            )?)
        } else {
            None
        };

        Ok(Self::new(primary, residual, config.cache)?)
    }

    /// Process-wide engine, built from the environment on first use
    pub fn global() -> Result<&'static Self, EngineError> {
        GLOBAL_ENGINE.get_or_try_init(|| {
            let config = EngineConfig::resolve(None)?;
            Self::from_config(&config)
        })
    }

    /// Build the process-wide engine from `config` unless it already exists
    pub fn init_global(config: &EngineConfig) -> Result<&'static Self, EngineError> {
        GLOBAL_ENGINE.get_or_try_init(|| Self::from_config(config))
    }

    /// Reimbursement for one trip, rounded to cents
    pub fn calculate(
        &self,
        days: f64,
        miles: f64,
        receipts: f64,
        case_index: i64,
    ) -> Result<f64, ModelError> {
        Ok(round_currency(self.raw_total(days, miles, receipts, case_index)?))
    }

    /// Unrounded primary plus residual score
    pub fn raw_total(
        &self,
        days: f64,
        miles: f64,
        receipts: f64,
        case_index: i64,
    ) -> Result<f64, ModelError> {
        let trip = TripFeatures::new(days, miles, receipts, case_index);
        let mut total = self.primary.score(&trip.primary())?;
        if let Some(residual) = &self.residual {
            total += residual.score(&trip.residual())?;
        }
        Ok(total)
    }

    pub fn primary(&self) -> &EnsembleScorer {
        &self.primary
    }

    pub fn residual(&self) -> Option<&EnsembleScorer> {
        self.residual.as_ref()
    }

    pub fn has_residual(&self) -> bool {
        self.residual.is_some()
    }

    pub fn cache_stats(&self) -> (CacheStats, Option<CacheStats>) {
        (
            self.primary.cache_stats(),
            self.residual.as_ref().map(EnsembleScorer::cache_stats),
        )
    }
}

/// Calculate with the process-wide engine
pub fn calculate(days: f64, miles: f64, receipts: f64, case_index: i64) -> crate::Result<f64> {
    let engine = ReimbursementEngine::global()?;
    Ok(engine.calculate(days, miles, receipts, case_index)?)
}

/// Round to two decimals, ties to even, on the exact binary value
///
/// `2.675` is stored as `2.67499999...` and so rounds down; a true tie such
/// as `0.125` rounds to the even cent. A zero result keeps the sign of
/// `value`. Non-finite values pass through.
pub fn round_currency(value: f64) -> f64 {
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded: f64 = exact
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
                .to_string()
                .parse()
                .unwrap_or(value);
            // small negatives round to -0.0, not 0.0
            if rounded == 0.0 {
                rounded.copysign(value)
            } else {
                rounded
            }
        }
        None => value,
    }
}

fn check_schema(ensemble: &Ensemble, schema: FeatureSchema) -> Result<(), ModelError> {
    ensemble.check_width(schema.width()).map_err(|err| {
        error!(error = %err, ?schema, "model does not match feature schema");
        err
    })
}
