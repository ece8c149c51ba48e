use std::path::PathBuf;
use thiserror::Error;

use super::vocabulary::CategoryKind;

/// Failures while loading or validating the artifact bundle.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact not found: {path}")]
    ArtifactMissing { path: PathBuf },

    #[error("failed to read artifact {path}: {source}")]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid forest: {reason}")]
    InvalidForest { reason: String },

    #[error("{kind} vocabulary is empty")]
    EmptyVocabulary { kind: CategoryKind },

    /// Label encoders emit classes in ascending order; anything else means the index
    /// mapping no longer matches the one the classifier was trained with.
    #[error("{kind} vocabulary is not strictly ascending: '{previous}' before '{next}'")]
    UnsortedVocabulary {
        kind: CategoryKind,
        previous: String,
        next: String,
    },

    #[error("{kind} classes in model config do not match the {kind} encoder")]
    VocabularyMismatch { kind: CategoryKind },

    #[error("invalid model metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("invalid feature names: {reason}")]
    InvalidFeatureNames { reason: String },
}

/// Failures raised while scoring a single feature row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("classifier inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("classifier returned invalid probability {value}")]
    InvalidProbability { value: f64 },
}
