use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{CategoryKind, ClassifierError, ModelError};

/// Why a single prediction failed.
///
/// Batch calls capture these per item; single-item calls hand them to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// Required field absent or of the wrong basic type.
    #[error("{reason}")]
    Validation { reason: String },

    /// Category outside the vocabulary under the strict policy.
    #[error("Unknown {kind} '{value}'. Valid options: {}", .valid.join(", "))]
    UnknownCategory {
        kind: CategoryKind,
        value: String,
        valid: Vec<String>,
    },

    #[error("Invalid {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Model not loaded: {reason}")]
    ModelNotLoaded { reason: String },
}

impl PredictionError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        PredictionError::Validation {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Validation { .. } => "validation_error",
            PredictionError::UnknownCategory { .. } => "unknown_category",
            PredictionError::Encoding { .. } => "encoding_error",
            PredictionError::Classifier(_) => "classifier_error",
            PredictionError::ModelNotLoaded { .. } => "model_not_loaded",
        }
    }

    /// True when the caller can fix the failure by correcting its input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictionError::Validation { .. }
                | PredictionError::UnknownCategory { .. }
                | PredictionError::Encoding { .. }
        )
    }

    /// Vocabulary the caller may choose from, for unknown-category failures.
    pub fn valid_options(&self) -> Option<&[String]> {
        match self {
            PredictionError::UnknownCategory { valid, .. } => Some(valid),
            _ => None,
        }
    }
}

/// Failures while assembling a pipeline from configuration and loaded artifacts.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
