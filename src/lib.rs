//! Attrition library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Scoring
//! - [`RiskPipeline`] - Validator → Reconciler → Encoder → Classifier adapter
//! - [`PredictionRequest`], [`PredictionResult`], [`RiskCategory`] - Per-employee input and output
//! - [`BatchOutcome`], [`BatchSummary`] - Partial-failure batch scoring
//! - [`EvaluationReport`] - Predictions compared with known outcomes
//! - [`PredictionError`] - Failure taxonomy shared by every entry point
//!
//! ## Model
//! - [`RiskClassifier`] - Capability interface of the opaque classifier
//! - [`ForestClassifier`], [`ModelArtifacts`] - Tree ensemble and its artifact bundle
//! - [`Vocabulary`] - Training-time department and job title classes
//!
//! ## Service & Transport
//! - [`AttritionService`] - Loaded pipeline or the standing "model not loaded" state
//! - [`gateway`] - Axum router around the service
//!
//! ## Configuration
//! - [`Config`] - Server settings, [`PipelineConfig`] - Scoring knobs
//!
//! ## Test/Mock Support
//! [`MockClassifier`] and the sample artifact bundle in `testing` are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod gateway;
pub mod hashing;
pub mod model;
pub mod pipeline;
pub mod service;

#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use config::{Config, ConfigError};
pub use hashing::{fingerprint_artifacts, short_fingerprint};
#[cfg(any(test, feature = "mock"))]
pub use model::MockClassifier;
pub use model::{
    CategoryKind, CategoryVocabulary, ClassifierError, ForestClassifier, ModelArtifacts,
    ModelError, ModelMetadata, RiskClassifier, Vocabulary,
};
pub use pipeline::{
    BatchItemError, BatchOutcome, BatchSummary, BuildError, EvaluationReport, LabeledRequest,
    PipelineConfig, PredictionError, PredictionRequest, PredictionResult, ProbabilityPolicy,
    ReconciliationPolicy, RiskCategory, RiskPipeline, RiskThresholds,
};
pub use service::{AttritionService, HealthStatus, LoadError, ModelInfo};
