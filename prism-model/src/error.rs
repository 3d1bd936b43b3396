//! Error types for model loading and evaluation

use thiserror::Error;

use crate::lightgbm::ParseError;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while loading or evaluating the classifier
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact could not be read from disk
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact text is not a well-formed LightGBM model
    #[error("Model parse error: {0}")]
    Parse(#[from] ParseError),

    /// Artifact was written by a serializer version we cannot read
    #[error("Unsupported model format version: {0:?}")]
    UnsupportedVersion(String),

    /// Model does not produce a binary positive-class probability
    #[error("Unsupported objective: {0}")]
    UnsupportedObjective(String),

    /// Tree uses a feature this evaluator does not implement
    #[error("Unsupported tree {index}: {reason}")]
    UnsupportedTree { index: usize, reason: String },

    /// Input record does not match the model's feature layout
    #[error("Shape mismatch: model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Feature names only partly match RACE, BMI, AGE, C4_0
    #[error("Cannot map model features {0:?} onto RACE, BMI, AGE, C4_0")]
    FeatureNames(Vec<String>),
}
