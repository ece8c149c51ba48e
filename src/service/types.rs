use serde::Serialize;

use crate::pipeline::{ReconciliationPolicy, RiskThresholds};

/// Model description consumed by UI layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    /// Hold-out accuracy formatted as a percentage, e.g. `"85.03%"`.
    pub accuracy: String,
    pub required_fields: Vec<&'static str>,
    pub supported_departments: Vec<String>,
    pub supported_job_titles: Vec<String>,
    pub performance_scale: &'static str,
    pub reconciliation_policy: ReconciliationPolicy,
    pub risk_thresholds: RiskThresholds,
    pub feature_order: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_fingerprint: Option<String>,
}

/// Liveness report. Always produced, loaded or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: String,
    pub model_loaded: bool,
    /// `"NN.NN%"`, or `"N/A"` when no model is loaded.
    pub accuracy: String,
    /// Required request fields, in validation order.
    pub fields: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_fingerprint: Option<String>,
}

/// Formats a `[0, 1]` accuracy as `"NN.NN%"`.
pub fn format_accuracy(accuracy: f64) -> String {
    format!("{:.2}%", accuracy * 100.0)
}
