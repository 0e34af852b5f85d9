//! Cached ensemble scoring

use crate::cache::{CacheStats, ScoreCache};
use crate::errors::ModelError;
use crate::features::FeatureVector;
use crate::gbdt::Ensemble;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, trace};

/// Score `features` against `ensemble`, consulting `cache` first
///
/// A hit returns the stored value without walking any tree. On a miss the
/// trees are summed left to right from 0.0 and the result is cached.
pub fn score(
    ensemble: &Ensemble,
    features: &FeatureVector,
    cache: &mut ScoreCache,
) -> Result<f64, ModelError> {
    lookup_or_walk(ensemble, features, cache).map(|(value, _)| value)
}

fn lookup_or_walk(
    ensemble: &Ensemble,
    features: &FeatureVector,
    cache: &mut ScoreCache,
) -> Result<(f64, bool), ModelError> {
    if let Some(value) = cache.get(features) {
        trace!(value, "score cache hit");
        return Ok((value, false));
    }

    let value = ensemble.raw_score(features.as_slice()).map_err(|err| {
        error!(error = %err, "ensemble evaluation failed");
        err
    })?;
    cache.insert(features.clone(), value);
    trace!(value, "score cache miss");
    Ok((value, true))
}

/// An ensemble paired with its own score cache
///
/// The cache lock is held across lookup, evaluation and insert, so identical
/// concurrent requests are computed once.
#[derive(Debug)]
pub struct EnsembleScorer {
    ensemble: Arc<Ensemble>,
    cache: Mutex<ScoreCache>,
    tree_walks: AtomicU64,
}

impl EnsembleScorer {
    pub fn new(ensemble: Arc<Ensemble>, capacity: usize) -> Self {
        Self {
            ensemble,
            cache: Mutex::new(ScoreCache::new(capacity)),
            tree_walks: AtomicU64::new(0),
        }
    }

    pub fn score(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let mut cache = self.cache.lock();
        let (value, walked) = lookup_or_walk(&self.ensemble, features, &mut cache)?;
        if walked {
            self.tree_walks
                .fetch_add(self.ensemble.num_trees() as u64, Ordering::Relaxed);
        }
        Ok(value)
    }

    /// Total number of individual tree evaluations performed so far
    pub fn tree_walks(&self) -> u64 {
        self.tree_walks.load(Ordering::Relaxed)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }
}
