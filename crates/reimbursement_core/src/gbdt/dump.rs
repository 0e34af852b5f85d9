//! Canonical model format: the boosting library's `dump_model()` JSON
//!
//! ```json
//! {
//!   "name": "tree",
//!   "version": "v4",
//!   "max_feature_idx": 9,
//!   "feature_names": ["days", "miles", "..."],
//!   "tree_info": [
//!     {
//!       "tree_index": 0,
//!       "num_leaves": 2,
//!       "shrinkage": 1,
//!       "tree_structure": {
//!         "split_index": 0,
//!         "split_feature": 0,
//!         "threshold": 4.5,
//!         "decision_type": "<=",
//!         "left_child": {"leaf_index": 0, "leaf_value": 412.25},
//!         "right_child": {"leaf_index": 1, "leaf_value": 1210.75}
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Only `tree_info`, `tree_structure`, `split_feature`, `threshold`,
//! `left_child`, `right_child` and `leaf_value` are required. Everything else
//! is carried through so a converted model keeps the library's field layout.

use super::model::Ensemble;
use super::tree::{Node, Tree};
use crate::errors::ModelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The only split operator numeric trees use
pub const NUMERIC_DECISION: &str = "<=";

fn default_name() -> String {
    "tree".to_string()
}

fn default_one() -> usize {
    1
}

fn default_shrinkage() -> f64 {
    1.0
}

fn default_decision() -> String {
    NUMERIC_DECISION.to_string()
}

/// Top-level dump document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpModel {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default = "default_one")]
    pub num_class: usize,
    #[serde(default = "default_one")]
    pub num_tree_per_iteration: usize,
    #[serde(default)]
    pub label_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_feature_idx: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
    pub tree_info: Vec<DumpTree>,
}

/// One tree descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpTree {
    #[serde(default)]
    pub tree_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_leaves: Option<usize>,
    #[serde(default)]
    pub num_cat: usize,
    #[serde(default = "default_shrinkage")]
    pub shrinkage: f64,
    pub tree_structure: DumpNode,
}

/// A nested node: either a split with two owned children or a leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DumpNode {
    Split(DumpSplit),
    Leaf(DumpLeaf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpSplit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_index: Option<usize>,
    pub split_feature: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_gain: Option<f64>,
    pub threshold: f64,
    #[serde(default = "default_decision")]
    pub decision_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_left: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_count: Option<u64>,
    pub left_child: Box<DumpNode>,
    pub right_child: Box<DumpNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpLeaf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_index: Option<usize>,
    pub leaf_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_count: Option<u64>,
}

impl DumpModel {
    /// Parse a dump document; `path` is only used in error messages
    pub fn from_json_str(json: &str, path: &Path) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::malformed(path, e.to_string()))
    }

    /// Serialize in the layout the library itself writes
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Flatten every nested tree into an arena-backed [`Ensemble`]
    pub fn to_ensemble(&self, path: &Path) -> Result<Ensemble, ModelError> {
        if self.num_tree_per_iteration > 1 {
            return Err(ModelError::malformed(
                path,
                format!(
                    "{} trees per iteration: only single-output models are supported",
                    self.num_tree_per_iteration
                ),
            ));
        }

        let mut trees = Vec::with_capacity(self.tree_info.len());
        for (position, info) in self.tree_info.iter().enumerate() {
            if info.num_cat > 0 {
                return Err(ModelError::malformed(
                    path,
                    format!("tree {position} uses categorical splits"),
                ));
            }

            let mut nodes = Vec::new();
            flatten(&info.tree_structure, &mut nodes)
                .map_err(|reason| ModelError::malformed(path, format!("tree {position}: {reason}")))?;
            let tree = Tree::new(position, nodes).map_err(|reason| ModelError::malformed(path, reason))?;
            trees.push(tree);
        }

        Ok(Ensemble::new(trees).with_feature_names(self.feature_names.clone()))
    }
}

/// Pre-order flattening; returns the arena index of `node`
fn flatten(node: &DumpNode, nodes: &mut Vec<Node>) -> Result<usize, String> {
    let idx = nodes.len();
    match node {
        DumpNode::Leaf(leaf) => nodes.push(Node::leaf(leaf.leaf_value)),
        DumpNode::Split(split) => {
            if split.decision_type != NUMERIC_DECISION {
                return Err(format!(
                    "unsupported decision type {:?} at split {}",
                    split.decision_type, idx
                ));
            }
            // children are patched in once their positions are known
            nodes.push(Node::split(split.split_feature, split.threshold, idx, idx));
            let left = flatten(&split.left_child, nodes)?;
            let right = flatten(&split.right_child, nodes)?;
            nodes[idx] = Node::split(split.split_feature, split.threshold, left, right);
        }
    }
    Ok(idx)
}
