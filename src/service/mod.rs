//! Scoring service: the loaded pipeline, or the standing "model not loaded" state.
//!
//! [`AttritionService::load`] never fails. A missing or inconsistent artifact bundle
//! leaves the service degraded: health checks still answer and every scoring or config
//! call reports [`PredictionError::ModelNotLoaded`] with the original reason.

pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::LoadError;
pub use types::{HealthStatus, ModelInfo, format_accuracy};

use std::path::Path;

use tracing::{error, info};

use crate::constants::{NOT_AVAILABLE, PERFORMANCE_SCALE, REQUIRED_FIELDS};
use crate::model::{ForestClassifier, ModelArtifacts, ModelMetadata, RiskClassifier, Vocabulary};
use crate::pipeline::{
    BatchOutcome, EvaluationReport, LabeledRequest, PipelineConfig, PredictionError,
    PredictionRequest, PredictionResult, RiskPipeline,
};

#[derive(Debug)]
struct LoadedModel<C> {
    pipeline: RiskPipeline<C>,
    metadata: ModelMetadata,
    fingerprint: Option<String>,
}

#[derive(Debug)]
enum ServiceState<C> {
    Ready(Box<LoadedModel<C>>),
    NotLoaded { reason: String },
}

/// Entry points of the attrition scoring service.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug)]
pub struct AttritionService<C = ForestClassifier> {
    state: ServiceState<C>,
}

impl AttritionService<ForestClassifier> {
    /// Loads the artifact bundle from `artifact_dir`, degrading on failure.
    pub fn load(artifact_dir: &Path, config: &PipelineConfig) -> Self {
        match Self::try_load(artifact_dir, config) {
            Ok(service) => service,
            Err(e) => {
                error!(
                    dir = %artifact_dir.display(),
                    error = %e,
                    "Model not loaded, scoring disabled"
                );
                Self::not_loaded(e.to_string())
            }
        }
    }

    /// Loads the artifact bundle from `artifact_dir`, returning the failure instead.
    pub fn try_load(artifact_dir: &Path, config: &PipelineConfig) -> Result<Self, LoadError> {
        let artifacts = ModelArtifacts::load(artifact_dir)?;
        let pipeline = RiskPipeline::new(artifacts.classifier, artifacts.vocabulary, config)?;

        info!(
            policy = %config.reconciliation_policy,
            medium = config.thresholds.medium,
            high = config.thresholds.high,
            "Attrition service ready"
        );

        Ok(Self {
            state: ServiceState::Ready(Box::new(LoadedModel {
                pipeline,
                metadata: artifacts.metadata,
                fingerprint: Some(artifacts.fingerprint),
            })),
        })
    }
}

impl<C: RiskClassifier> AttritionService<C> {
    /// Builds a ready service around an already constructed classifier.
    pub fn from_parts(
        classifier: C,
        vocabulary: Vocabulary,
        metadata: ModelMetadata,
        config: &PipelineConfig,
    ) -> Result<Self, LoadError> {
        let pipeline = RiskPipeline::new(classifier, vocabulary, config)?;
        Ok(Self {
            state: ServiceState::Ready(Box::new(LoadedModel {
                pipeline,
                metadata,
                fingerprint: None,
            })),
        })
    }

    /// A service that rejects every scoring call with `reason`.
    pub fn not_loaded(reason: impl Into<String>) -> Self {
        Self {
            state: ServiceState::NotLoaded {
                reason: reason.into(),
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ServiceState::Ready(_))
    }

    fn loaded(&self) -> Result<&LoadedModel<C>, PredictionError> {
        match &self.state {
            ServiceState::Ready(model) => Ok(model),
            ServiceState::NotLoaded { reason } => Err(PredictionError::ModelNotLoaded {
                reason: reason.clone(),
            }),
        }
    }

    /// The ready pipeline, if any.
    pub fn pipeline(&self) -> Option<&RiskPipeline<C>> {
        self.loaded().ok().map(|model| &model.pipeline)
    }

    pub fn predict_single(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        self.loaded()?.pipeline.predict_single(request)
    }

    /// Whole-batch failure only when no model is loaded; item failures land in the outcome.
    pub fn predict_batch(
        &self,
        requests: &[PredictionRequest],
    ) -> Result<BatchOutcome, PredictionError> {
        Ok(self.loaded()?.pipeline.predict_batch(requests))
    }

    pub fn evaluate(&self, items: &[LabeledRequest]) -> Result<EvaluationReport, PredictionError> {
        Ok(self.loaded()?.pipeline.evaluate(items))
    }

    pub fn get_config(&self) -> Result<ModelInfo, PredictionError> {
        let model = self.loaded()?;
        let pipeline = &model.pipeline;
        let classifier = pipeline.classifier();
        let vocabulary = pipeline.vocabulary();

        Ok(ModelInfo {
            model_type: classifier.model_type().to_string(),
            accuracy: format_accuracy(model.metadata.accuracy),
            required_fields: REQUIRED_FIELDS.to_vec(),
            supported_departments: vocabulary.departments.classes().to_vec(),
            supported_job_titles: vocabulary.job_titles.classes().to_vec(),
            performance_scale: PERFORMANCE_SCALE,
            reconciliation_policy: pipeline.reconciliation_policy(),
            risk_thresholds: pipeline.thresholds(),
            feature_order: pipeline.feature_order().names(),
            feature_importances: classifier.feature_importances().map(<[f64]>::to_vec),
            artifact_fingerprint: model.fingerprint.clone(),
        })
    }

    pub fn health_check(&self) -> HealthStatus {
        match &self.state {
            ServiceState::Ready(model) => HealthStatus {
                status: "ok",
                message: "Attrition prediction API is running".to_string(),
                model_loaded: true,
                accuracy: format_accuracy(model.metadata.accuracy),
                fields: REQUIRED_FIELDS.to_vec(),
                artifact_fingerprint: model.fingerprint.clone(),
            },
            ServiceState::NotLoaded { reason } => HealthStatus {
                status: "ok",
                message: format!("Attrition prediction API is running without a model: {}", reason),
                model_loaded: false,
                accuracy: NOT_AVAILABLE.to_string(),
                fields: REQUIRED_FIELDS.to_vec(),
                artifact_fingerprint: None,
            },
        }
    }
}
