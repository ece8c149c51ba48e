//! Cross-cutting, shared constants.
//!
//! Threshold and category defaults live here so that configuration, the pipeline and the
//! gateway agree on the same values. Runtime overrides go through
//! [`PipelineConfig`](crate::pipeline::PipelineConfig).

/// Request fields every prediction must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 4] = ["salary", "performanceRating", "department", "jobTitle"];

/// Placeholder echoed when a request carries no employee id or name.
pub const NOT_AVAILABLE: &str = "N/A";

/// Identifier used in batch error entries when the item has no employee id.
pub const UNKNOWN_IDENTIFIER: &str = "Unknown";

/// Human-readable performance scale reported by the config endpoint.
pub const PERFORMANCE_SCALE: &str = "1-4";

pub const DEFAULT_MEDIUM_RISK_THRESHOLD: f64 = 0.33;
pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 0.66;

/// Decision boundary used when comparing predictions against true labels.
pub const EVALUATION_DECISION_THRESHOLD: f64 = 0.5;

pub const DEFAULT_LOW_SALARY: f64 = 30_000.0;
pub const DEFAULT_HIGH_SALARY: f64 = 60_000.0;
pub const DEFAULT_LOW_PERFORMANCE: f64 = 2.0;
pub const DEFAULT_HIGH_PERFORMANCE: f64 = 4.0;
pub const DEFAULT_HIGH_ATTRITION_DEPARTMENTS: &[&str] = &["Sales"];
pub const DEFAULT_CURRENCY_LABEL: &str = "Rs";

pub const DEFAULT_FALLBACK_DEPARTMENT: &str = "Research & Development";
pub const DEFAULT_FALLBACK_JOB_TITLE: &str = "Research Scientist";

/// Maximum number of high-risk employees listed in a batch summary.
pub const DEFAULT_HIGH_RISK_EXAMPLES: usize = 10;

pub const MODEL_FILENAME: &str = "attrition_model.json";
pub const DEPARTMENT_ENCODER_FILENAME: &str = "department_encoder.json";
pub const JOB_ENCODER_FILENAME: &str = "job_encoder.json";
pub const MODEL_CONFIG_FILENAME: &str = "model_config.json";
