//! Travel reimbursement engine
//!
//! Reproduces a legacy reimbursement system by scoring trip figures with a
//! pre-trained gradient-boosted tree ensemble, optionally corrected by a
//! second residual ensemble, and rounding the total to cents.
//!
//! Modules:
//! - `features`: Feature vectors derived from days, miles and receipts
//! - `gbdt`: Tree ensemble model, its JSON dump and legacy text formats
//! - `loader`: Canonical model loading with legacy conversion
//! - `cache` / `scorer`: Bounded LRU score caching around an ensemble
//! - `engine`: Primary + residual calculation and currency rounding
//! - `config`: TOML configuration with environment overrides
//! - `corpus` / `evaluate`: Accuracy reports over labelled cases
//! - `logging`: Subscriber setup for the binaries

pub mod cache;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod errors;
pub mod evaluate;
pub mod features;
pub mod gbdt;
pub mod loader;
pub mod logging;
pub mod scorer;

pub use cache::{CacheStats, ScoreCache};
pub use config::{CacheConfig, EngineConfig, LoggingConfig, ModelPaths};
pub use corpus::{load_cases, CaseInput, CaseRecord};
pub use engine::{calculate, round_currency, ReimbursementEngine};
pub use errors::{ConfigError, CorpusError, EngineError, ModelError, Result};
pub use evaluate::{evaluate_cases, CaseOutcome, EvaluationReport, IndexMode};
pub use features::{derive, derive_residual, FeatureSchema, FeatureVector};
pub use gbdt::{Ensemble, EnsembleSummary, Node, Tree};
pub use scorer::{score, EnsembleScorer};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
