//! Error types for the reimbursement engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or evaluating a tree ensemble
#[derive(Error, Debug)]
pub enum ModelError {
    /// Neither the canonical nor the legacy artifact exists
    #[error("Model not found: neither {} nor {} exists", primary.display(), legacy.display())]
    ModelNotFound { primary: PathBuf, legacy: PathBuf },

    /// Artifact exists but does not match the expected node schema
    #[error("Malformed model {}: {reason}", path.display())]
    MalformedModel { path: PathBuf, reason: String },

    /// A split references a feature the feature vector does not carry
    #[error("Tree {tree} splits on feature {feature} but the feature vector has {width} values")]
    FeatureIndexOutOfRange {
        tree: usize,
        feature: usize,
        width: usize,
    },

    /// I/O error other than a missing artifact
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ModelError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedModel {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Case corpus errors
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read case corpus {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse case corpus {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error for engine construction and use
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
