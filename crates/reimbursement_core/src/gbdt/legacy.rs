//! Legacy model artifact: the boosting library's native text format
//!
//! This is the line-based `key=value` file written by `save_model()`:
//! a header, one `Tree=N` section per tree, then `end of trees`. Split
//! children are node indices; a negative child `c` addresses leaf `!c`.
//!
//! [`extract_trees`] rebuilds from it the exact nested structure that the
//! library's `dump_model()` would have produced, so a converted model is
//! indistinguishable from one exported directly.

use super::dump::{DumpLeaf, DumpModel, DumpNode, DumpSplit, DumpTree, NUMERIC_DECISION};
use crate::errors::ModelError;
use std::collections::HashMap;
use std::iter::Peekable;
use std::path::Path;
use std::str::Lines;

/// Parsed model header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextHeader {
    pub version: String,
    pub num_class: usize,
    pub num_tree_per_iteration: usize,
    pub label_index: i32,
    pub max_feature_idx: usize,
    pub objective: Option<String>,
    pub feature_names: Vec<String>,
}

/// One `Tree=N` section
#[derive(Debug, Clone, PartialEq)]
pub struct TextTree {
    pub num_leaves: usize,
    pub num_cat: usize,
    pub split_feature: Vec<i32>,
    pub split_gain: Vec<f64>,
    pub threshold: Vec<f64>,
    pub decision_type: Vec<i8>,
    pub left_child: Vec<i32>,
    pub right_child: Vec<i32>,
    pub leaf_value: Vec<f64>,
    pub leaf_weight: Vec<f64>,
    pub leaf_count: Vec<u64>,
    pub internal_value: Vec<f64>,
    pub internal_weight: Vec<f64>,
    pub internal_count: Vec<u64>,
    pub shrinkage: f64,
}

/// A parsed legacy text model
#[derive(Debug, Clone, PartialEq)]
pub struct TextModel {
    pub header: TextHeader,
    pub trees: Vec<TextTree>,
}

type Fields<'a> = HashMap<&'a str, &'a str>;

impl TextModel {
    /// Parse a model; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, ModelError> {
        let malformed = |reason: String| ModelError::malformed(path, reason);
        let mut lines = content.lines().peekable();

        match lines.next().map(str::trim) {
            Some("tree") => {}
            other => {
                return Err(malformed(format!(
                    "expected a `tree` header line, found {:?}",
                    other.unwrap_or_default()
                )))
            }
        }

        let header = parse_header(&mut lines).map_err(malformed)?;

        let mut trees = Vec::new();
        while let Some(line) = lines.next() {
            let line = line.trim();
            if line == "end of trees" {
                break;
            }
            if let Some(id) = line.strip_prefix("Tree=") {
                let tree = parse_tree(&mut lines).map_err(|e| malformed(format!("Tree={id}: {e}")))?;
                trees.push(tree);
            }
        }

        Ok(Self { header, trees })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

fn collect_fields<'a>(lines: &mut Peekable<Lines<'a>>) -> Fields<'a> {
    let mut fields = HashMap::new();
    while let Some(&line) = lines.peek() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("Tree=") || line == "end of trees" {
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            fields.insert(key, value);
        }
        lines.next();
    }
    fields
}

fn parse_header(lines: &mut Peekable<Lines<'_>>) -> Result<TextHeader, String> {
    let fields = collect_fields(lines);

    let num_class = required(&fields, "num_class")?;
    Ok(TextHeader {
        version: fields.get("version").map(|v| v.to_string()).unwrap_or_default(),
        num_class,
        num_tree_per_iteration: optional(&fields, "num_tree_per_iteration")?.unwrap_or(num_class),
        label_index: optional(&fields, "label_index")?.unwrap_or(0),
        max_feature_idx: required(&fields, "max_feature_idx")?,
        objective: fields.get("objective").map(|v| v.to_string()),
        feature_names: fields
            .get("feature_names")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
    })
}

fn parse_tree(lines: &mut Peekable<Lines<'_>>) -> Result<TextTree, String> {
    let fields = collect_fields(lines);

    let num_leaves: usize = required(&fields, "num_leaves")?;
    let num_splits = num_leaves.saturating_sub(1);

    let mut tree = TextTree {
        num_leaves,
        num_cat: optional(&fields, "num_cat")?.unwrap_or(0),
        split_feature: array(&fields, "split_feature", num_splits)?,
        split_gain: optional_array(&fields, "split_gain", num_splits)?,
        threshold: array(&fields, "threshold", num_splits)?,
        decision_type: optional_array(&fields, "decision_type", num_splits)?,
        left_child: array(&fields, "left_child", num_splits)?,
        right_child: array(&fields, "right_child", num_splits)?,
        leaf_value: Vec::new(),
        leaf_weight: optional_array(&fields, "leaf_weight", num_leaves)?,
        leaf_count: optional_array(&fields, "leaf_count", num_leaves)?,
        internal_value: optional_array(&fields, "internal_value", num_splits)?,
        internal_weight: optional_array(&fields, "internal_weight", num_splits)?,
        internal_count: optional_array(&fields, "internal_count", num_splits)?,
        shrinkage: optional(&fields, "shrinkage")?.unwrap_or(1.0),
    };

    if num_leaves <= 1 {
        // single-leaf trees may omit the value entirely
        tree.leaf_value = optional_array(&fields, "leaf_value", 1)?;
        if tree.leaf_value.is_empty() {
            tree.leaf_value.push(0.0);
        }
    } else {
        tree.leaf_value = array(&fields, "leaf_value", num_leaves)?;
    }

    Ok(tree)
}

fn required<T: std::str::FromStr>(fields: &Fields<'_>, key: &'static str) -> Result<T, String> {
    optional(fields, key)?.ok_or_else(|| format!("missing required field {key}"))
}

fn optional<T: std::str::FromStr>(fields: &Fields<'_>, key: &'static str) -> Result<Option<T>, String> {
    fields
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| format!("invalid value for {key}: {raw:?}"))
        })
        .transpose()
}

fn parse_values<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<Vec<T>, String> {
    raw.split_whitespace()
        .map(|v| v.parse().map_err(|_| format!("invalid entry in {key}: {v:?}")))
        .collect()
}

/// A required array of exactly `expected` entries (a missing key is fine when
/// nothing is expected, as in single-leaf trees)
fn array<T: std::str::FromStr>(fields: &Fields<'_>, key: &'static str, expected: usize) -> Result<Vec<T>, String> {
    match fields.get(key) {
        Some(raw) => {
            let values = parse_values(key, raw)?;
            if values.len() != expected {
                return Err(format!(
                    "array size mismatch for {key}: expected {expected}, got {}",
                    values.len()
                ));
            }
            Ok(values)
        }
        None if expected == 0 => Ok(Vec::new()),
        None => Err(format!("missing required field {key}")),
    }
}

/// Informational arrays: absent or wrongly sized arrays are dropped
fn optional_array<T: std::str::FromStr>(
    fields: &Fields<'_>,
    key: &'static str,
    expected: usize,
) -> Result<Vec<T>, String> {
    match fields.get(key) {
        Some(raw) => {
            let values = parse_values(key, raw)?;
            Ok(if values.len() == expected { values } else { Vec::new() })
        }
        None => Ok(Vec::new()),
    }
}

/// Map a text-format decision bitfield to the dump's `missing_type` name
fn missing_type_name(decision: i8) -> &'static str {
    match (decision as u8 >> 2) & 3 {
        1 => "Zero",
        2 => "NaN",
        _ => "None",
    }
}

/// Rebuild the nested `dump_model()` representation from a text model
pub fn extract_trees(model: &TextModel, path: &Path) -> Result<DumpModel, ModelError> {
    if model.header.num_tree_per_iteration > 1 {
        return Err(ModelError::malformed(
            path,
            format!(
                "{} trees per iteration: only single-output models are supported",
                model.header.num_tree_per_iteration
            ),
        ));
    }

    let tree_info = model
        .trees
        .iter()
        .enumerate()
        .map(|(index, tree)| {
            extract_tree(index, tree).map_err(|reason| ModelError::malformed(path, format!("tree {index}: {reason}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DumpModel {
        name: "tree".to_string(),
        version: Some(model.header.version.clone()).filter(|v| !v.is_empty()),
        num_class: model.header.num_class,
        num_tree_per_iteration: model.header.num_tree_per_iteration,
        label_index: model.header.label_index,
        max_feature_idx: Some(model.header.max_feature_idx),
        objective: model.header.objective.clone(),
        feature_names: model.header.feature_names.clone(),
        tree_info,
    })
}

fn extract_tree(index: usize, tree: &TextTree) -> Result<DumpTree, String> {
    if tree.num_cat > 0 || tree.decision_type.iter().any(|d| d & 1 != 0) {
        return Err("categorical splits are not supported".to_string());
    }

    let tree_structure = if tree.num_leaves <= 1 {
        DumpNode::Leaf(DumpLeaf {
            leaf_index: None,
            leaf_value: *tree.leaf_value.first().ok_or("missing leaf value")?,
            leaf_weight: None,
            leaf_count: None,
        })
    } else {
        build_node(tree, 0, 0)?
    };

    Ok(DumpTree {
        tree_index: index,
        num_leaves: Some(tree.num_leaves),
        num_cat: tree.num_cat,
        shrinkage: tree.shrinkage,
        tree_structure,
    })
}

fn build_node(tree: &TextTree, node: i32, depth: usize) -> Result<DumpNode, String> {
    // a path visits each split at most once
    if depth > tree.threshold.len() {
        return Err("split references form a cycle".to_string());
    }

    if node < 0 {
        let leaf = !node as usize;
        let leaf_value = *tree
            .leaf_value
            .get(leaf)
            .ok_or_else(|| format!("leaf index {leaf} out of range"))?;
        return Ok(DumpNode::Leaf(DumpLeaf {
            leaf_index: Some(leaf),
            leaf_value,
            leaf_weight: tree.leaf_weight.get(leaf).copied(),
            leaf_count: tree.leaf_count.get(leaf).copied(),
        }));
    }

    let split = node as usize;
    let out_of_range = || format!("split index {split} out of range");
    let threshold = *tree.threshold.get(split).ok_or_else(out_of_range)?;
    let left = *tree.left_child.get(split).ok_or_else(out_of_range)?;
    let right = *tree.right_child.get(split).ok_or_else(out_of_range)?;
    let feature = *tree.split_feature.get(split).ok_or_else(out_of_range)?;
    let split_feature =
        usize::try_from(feature).map_err(|_| format!("negative split feature at split {split}"))?;
    let decision = tree.decision_type.get(split).copied().unwrap_or(0);

    Ok(DumpNode::Split(DumpSplit {
        split_index: Some(split),
        split_feature,
        split_gain: tree.split_gain.get(split).copied(),
        threshold,
        decision_type: NUMERIC_DECISION.to_string(),
        default_left: Some(decision & 2 != 0),
        missing_type: Some(missing_type_name(decision).to_string()),
        internal_value: tree.internal_value.get(split).copied(),
        internal_weight: tree.internal_weight.get(split).copied(),
        internal_count: tree.internal_count.get(split).copied(),
        left_child: Box::new(build_node(tree, left, depth + 1)?),
        right_child: Box::new(build_node(tree, right, depth + 1)?),
    }))
}
