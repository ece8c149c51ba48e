//! The opaque attrition classifier and the artifacts it is versioned with.
//!
//! Scoring code only sees [`RiskClassifier`]: a probability for one feature row, plus
//! optional introspection (feature names, importances). [`ForestClassifier`] is the
//! production implementation, loaded with its vocabularies by [`ModelArtifacts::load`].

pub mod artifacts;
pub mod error;
pub mod forest;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod vocabulary;


pub use artifacts::{ModelArtifacts, ModelMetadata};
pub use error::{ClassifierError, ModelError};
pub use forest::ForestClassifier;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockClassifier;
pub use vocabulary::{CategoryKind, CategoryVocabulary, Vocabulary};

/// Capability interface of a trained attrition classifier.
pub trait RiskClassifier: Send + Sync {
    /// Probability of attrition for one feature row, nominally in `[0, 1]`.
    fn predict_probability(&self, features: &[f64]) -> Result<f64, ClassifierError>;

    /// Width of the feature row the classifier accepts, if known.
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Feature ordering the classifier was trained with, if it advertises one.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Per-feature importances, aligned with the training feature order.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }

    fn model_type(&self) -> &str;
}
