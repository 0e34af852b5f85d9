//! Gradient-boosted tree ensemble inference
//!
//! Re-implements the scoring path of a trained gradient-boosting regressor
//! without the training library:
//!
//! - `dump`: the library's `dump_model()` JSON (the canonical model file)
//! - `legacy`: the library's native text model, converted to the dump form
//! - `tree`: flat node arena and the tree walker
//! - `model`: the [`Ensemble`] and its additive score
//!
//! # Usage
//!
//! ```rust
//! use reimbursement_core::gbdt::{Ensemble, Node, Tree};
//!
//! let tree = Tree::new(
//!     0,
//!     vec![Node::split(0, 10.0, 1, 2), Node::leaf(1.0), Node::leaf(2.0)],
//! )
//! .unwrap();
//! let ensemble = Ensemble::new(vec![tree]);
//!
//! assert_eq!(ensemble.raw_score(&[10.0]).unwrap(), 1.0);
//! assert_eq!(ensemble.raw_score(&[10.0001]).unwrap(), 2.0);
//! ```

pub mod dump;
pub mod legacy;
pub mod model;
pub mod tree;

pub use dump::{DumpModel, DumpNode, DumpTree};
pub use legacy::{extract_trees, TextModel};
pub use model::{Ensemble, EnsembleSummary};
pub use tree::{Node, Tree};
