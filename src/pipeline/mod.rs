//! The risk scoring pipeline.
//!
//! Validator → Reconciler → Encoder → Classifier adapter, run once per employee.
//! [`RiskPipeline`] owns the classifier and vocabulary it was built against and never
//! mutates them, so a single instance can be shared across request handlers.
//!
//! Batch calls run the same single-item path per employee and collect failures instead of
//! aborting (see [`batch`]).

pub mod adapter;
pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod evaluation;
pub mod reconciler;
pub mod types;
pub mod validator;

#[cfg(test)]
mod batch_tests;

pub use adapter::{FactorRules, ProbabilityPolicy, RiskAdapter, RiskAssessment, RiskThresholds};
pub use batch::{
    BatchItemError, BatchOutcome, BatchSummary, CategorySummary, HighRiskExample,
    HighRiskSummary, run_batch,
};
pub use config::PipelineConfig;
pub use encoder::{Feature, FeatureOrder, FeatureVector, STATIC_FEATURE_ORDER};
pub use error::{BuildError, PredictionError};
pub use evaluation::{ConfusionMatrix, EvaluationReport, LabeledRequest, parse_label};
pub use reconciler::{MatchKind, Reconciled, ReconciliationPolicy, Reconciler, SynonymTable};
pub use types::{PredictionDetails, PredictionRequest, PredictionResult, RiskCategory};
pub use validator::{ValidatedRequest, validate};

use tracing::debug;

use crate::model::{RiskClassifier, Vocabulary};
use types::employee_field_or_default;

/// Immutable scoring context: classifier, vocabulary and the stages configured for them.
#[derive(Debug)]
pub struct RiskPipeline<C> {
    classifier: C,
    vocabulary: Vocabulary,
    reconciler: Reconciler,
    feature_order: FeatureOrder,
    adapter: RiskAdapter,
    max_high_risk_examples: usize,
}

impl<C: RiskClassifier> RiskPipeline<C> {
    /// Binds the stages to a classifier and its vocabulary.
    ///
    /// Fails when a lenient fallback category is not in the vocabulary or the classifier
    /// advertises feature names that do not map onto the four known inputs.
    pub fn new(
        classifier: C,
        vocabulary: Vocabulary,
        config: &PipelineConfig,
    ) -> Result<Self, BuildError> {
        let reconciler = Reconciler::new(
            config.reconciliation_policy,
            &vocabulary,
            &config.fallback_department,
            &config.fallback_job_title,
        )?
        .with_case_insensitive_match(config.case_insensitive_match);
        let feature_order =
            FeatureOrder::resolve(classifier.feature_names(), classifier.n_features())?;
        let adapter = RiskAdapter::new(
            config.thresholds,
            config.probability_policy,
            config.factor_rules.clone(),
        );

        debug!(
            policy = %config.reconciliation_policy,
            feature_order = ?feature_order.names(),
            "Risk pipeline built"
        );

        Ok(Self {
            classifier,
            vocabulary,
            reconciler,
            feature_order,
            adapter,
            max_high_risk_examples: config.max_high_risk_examples,
        })
    }

    /// Scores one employee.
    pub fn predict_single(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        let validated = validate(request)?;

        let department = self
            .reconciler
            .reconcile(&self.vocabulary.departments, validated.department)?;
        let job_title = self
            .reconciler
            .reconcile(&self.vocabulary.job_titles, validated.job_title)?;

        let vector = encoder::encode(
            &self.vocabulary,
            validated.salary,
            validated.performance_rating,
            &department,
            &job_title,
        )?;
        let row = self.feature_order.arrange(&vector);

        let assessment = self
            .adapter
            .assess(&self.classifier, &row, &vector, &department.value)?;

        Ok(PredictionResult {
            risk_score: assessment.risk_score,
            risk_percentage: assessment.risk_percentage,
            risk_category: assessment.risk_category,
            factors: assessment.factors,
            prediction_details: PredictionDetails {
                salary: vector.salary,
                performance_rating: vector.performance_rating,
                department: department.value,
                job_title: job_title.value,
            },
            employee_id: employee_field_or_default(request.employee_id()),
            employee_name: employee_field_or_default(request.employee_name()),
            probability: assessment.probability,
        })
    }

    /// Scores every employee in order; failures are collected per item.
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> BatchOutcome {
        run_batch(requests, self.max_high_risk_examples, |request| {
            self.predict_single(request)
        })
    }

    /// Compares predictions with known outcomes.
    pub fn evaluate(&self, items: &[LabeledRequest]) -> EvaluationReport {
        evaluation::evaluate(items, |request| self.predict_single(request))
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.feature_order
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.adapter.thresholds()
    }

    pub fn reconciliation_policy(&self) -> ReconciliationPolicy {
        self.reconciler.policy()
    }

    pub fn probability_policy(&self) -> ProbabilityPolicy {
        self.adapter.probability_policy()
    }
}
