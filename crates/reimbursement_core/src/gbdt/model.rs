//! Tree ensemble with additive inference
//!
//! An [`Ensemble`] is the inference form of a gradient-boosted model: an
//! ordered list of trees whose leaf values are summed. The first tree already
//! carries the model's initial score, so there is no separate bias term.

use super::tree::Tree;
use crate::errors::ModelError;
use serde::Serialize;

/// Immutable, ordered collection of decision trees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ensemble {
    trees: Vec<Tree>,
    feature_names: Vec<String>,
}

/// Shape summary used for logging and model inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnsembleSummary {
    pub num_trees: usize,
    pub num_leaves: usize,
    pub max_depth: usize,
    pub max_feature_index: Option<usize>,
    pub feature_names: Vec<String>,
}

impl Ensemble {
    /// Create a new ensemble
    pub fn new(trees: Vec<Tree>) -> Self {
        Self {
            trees,
            feature_names: Vec::new(),
        }
    }

    /// Ensemble with no trees; scores every input as 0
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach the feature names recorded at training time
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Get number of trees in the ensemble
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Sum of every tree's leaf value for `features`, uncached
    ///
    /// Trees are accumulated left to right starting from 0.0 so the result is
    /// bit-identical to a sequential sum over the same tree order.
    pub fn raw_score(&self, features: &[f64]) -> Result<f64, ModelError> {
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate(features)?;
        }
        Ok(sum)
    }

    /// Largest feature index read by any split
    pub fn max_feature_index(&self) -> Option<usize> {
        self.trees.iter().filter_map(Tree::max_feature_index).max()
    }

    /// Ensure every split reads a feature inside a vector of `width` values
    pub fn check_width(&self, width: usize) -> Result<(), ModelError> {
        for tree in &self.trees {
            if let Some(feature) = tree.max_feature_index() {
                if feature >= width {
                    return Err(ModelError::FeatureIndexOutOfRange {
                        tree: tree.index(),
                        feature,
                        width,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> EnsembleSummary {
        EnsembleSummary {
            num_trees: self.trees.len(),
            num_leaves: self.trees.iter().map(Tree::num_leaves).sum(),
            max_depth: self.trees.iter().map(Tree::depth).max().unwrap_or(0),
            max_feature_index: self.max_feature_index(),
            feature_names: self.feature_names.clone(),
        }
    }
}
