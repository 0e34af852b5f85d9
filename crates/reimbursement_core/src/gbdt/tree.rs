//! Decision tree structures for ensemble inference
//!
//! Trees are stored as a flat node arena: node 0 is the root and split nodes
//! address their children by index. Children always sit after their parent,
//! so every walk moves strictly forward and terminates.

use crate::errors::ModelError;

/// A decision tree node (split or leaf)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Internal node: go left when `features[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node carrying the tree's contribution
    Leaf { value: f64 },
}

impl Node {
    /// Create a new split node
    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Create a new leaf node
    pub fn leaf(value: f64) -> Self {
        Self::Leaf { value }
    }

    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

/// A single decision tree
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Position of the tree in its ensemble
    index: usize,

    /// Tree nodes (node 0 is the root)
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a new tree, checking the arena invariants
    pub fn new(index: usize, nodes: Vec<Node>) -> Result<Self, String> {
        let tree = Self { index, nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Evaluate this tree on a feature vector
    ///
    /// Equality routes left. A NaN feature compares false and routes right.
    pub fn evaluate(&self, features: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0usize;

        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = *features.get(feature).ok_or(
                        ModelError::FeatureIndexOutOfRange {
                            tree: self.index,
                            feature,
                            width: features.len(),
                        },
                    )?;
                    idx = if value <= threshold { left } else { right };
                }
            }
        }
    }

    /// Get the root node
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Largest feature index any split of this tree reads
    pub fn max_feature_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf { .. } => None,
            })
            .max()
    }

    /// Number of leaves
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Number of splits on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut deepest = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                depths[left] = depths[i] + 1;
                depths[right] = depths[i] + 1;
                deepest = deepest.max(depths[i] + 1);
            }
        }
        deepest
    }

    /// Validate tree structure
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("Tree {} has no nodes", self.index));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                for (side, child) in [("left", left), ("right", right)] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!(
                            "Tree {} node {} has invalid {} child: {}",
                            self.index, i, side, child
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64) -> Tree {
        Tree::new(
            0,
            vec![Node::split(0, threshold, 1, 2), Node::leaf(1.0), Node::leaf(2.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_boundary_routes_left() {
        let tree = stump(10.0);
        assert_eq!(tree.evaluate(&[10.0]).unwrap(), 1.0);
        assert_eq!(tree.evaluate(&[10.0001]).unwrap(), 2.0);
        assert_eq!(tree.evaluate(&[9.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_nan_routes_right() {
        let tree = stump(10.0);
        assert_eq!(tree.evaluate(&[f64::NAN]).unwrap(), 2.0);
    }

    #[test]
    fn test_single_leaf_ignores_features() {
        let tree = Tree::new(3, vec![Node::leaf(-0.5)]).unwrap();
        assert_eq!(tree.evaluate(&[]).unwrap(), -0.5);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.max_feature_index(), None);
    }

    #[test]
    fn test_out_of_range_feature_is_an_error() {
        let tree = Tree::new(
            7,
            vec![Node::split(4, 0.0, 1, 2), Node::leaf(1.0), Node::leaf(2.0)],
        )
        .unwrap();

        match tree.evaluate(&[1.0, 2.0]) {
            Err(ModelError::FeatureIndexOutOfRange {
                tree,
                feature,
                width,
            }) => {
                assert_eq!(tree, 7);
                assert_eq!(feature, 4);
                assert_eq!(width, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_tree_validation() {
        assert!(Tree::new(0, vec![]).is_err());

        // left child out of bounds
        assert!(Tree::new(
            0,
            vec![Node::split(0, 5.0, 5, 2), Node::leaf(1.0), Node::leaf(2.0)]
        )
        .is_err());

        // child pointing back at its parent
        assert!(Tree::new(
            0,
            vec![Node::split(0, 5.0, 0, 1), Node::leaf(1.0)]
        )
        .is_err());
    }

    #[test]
    fn test_shape_queries() {
        let tree = Tree::new(
            0,
            vec![
                Node::split(0, 4.5, 1, 4),
                Node::split(2, 828.5, 2, 3),
                Node::leaf(412.25),
                Node::leaf(980.5),
                Node::leaf(1210.75),
            ],
        )
        .unwrap();

        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.max_feature_index(), Some(2));
        assert!(!tree.root().unwrap().is_leaf());
    }
}
