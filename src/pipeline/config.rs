use crate::config::{
    ConfigError, parse_bool_from_env, parse_f64_from_env, parse_list_from_env,
    parse_usize_from_env, read_env,
};
use crate::constants::{
    DEFAULT_FALLBACK_DEPARTMENT, DEFAULT_FALLBACK_JOB_TITLE, DEFAULT_HIGH_RISK_EXAMPLES,
};

use super::adapter::{FactorRules, ProbabilityPolicy, RiskThresholds};
use super::reconciler::ReconciliationPolicy;

/// Scoring knobs for [`RiskPipeline`](super::RiskPipeline).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Default: lenient.
    pub reconciliation_policy: ReconciliationPolicy,

    /// Lenient lookups also try a case-insensitive vocabulary match. Default: `false`.
    pub case_insensitive_match: bool,

    /// Lenient fallback for unmatched departments. Default: `Research & Development`.
    pub fallback_department: String,

    /// Lenient fallback for unmatched job titles. Default: `Research Scientist`.
    pub fallback_job_title: String,

    /// Default: 0.33 / 0.66.
    pub thresholds: RiskThresholds,

    /// Default: reject.
    pub probability_policy: ProbabilityPolicy,

    pub factor_rules: FactorRules,

    /// Cap on high-risk employees listed in a batch summary. Default: `10`.
    pub max_high_risk_examples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reconciliation_policy: ReconciliationPolicy::default(),
            case_insensitive_match: false,
            fallback_department: DEFAULT_FALLBACK_DEPARTMENT.to_string(),
            fallback_job_title: DEFAULT_FALLBACK_JOB_TITLE.to_string(),
            thresholds: RiskThresholds::default(),
            probability_policy: ProbabilityPolicy::default(),
            factor_rules: FactorRules::default(),
            max_high_risk_examples: DEFAULT_HIGH_RISK_EXAMPLES,
        }
    }
}

impl PipelineConfig {
    const ENV_POLICY: &'static str = "ATTRITION_RECONCILIATION_POLICY";
    const ENV_CASE_INSENSITIVE: &'static str = "ATTRITION_CASE_INSENSITIVE_MATCH";
    const ENV_DEFAULT_DEPARTMENT: &'static str = "ATTRITION_DEFAULT_DEPARTMENT";
    const ENV_DEFAULT_JOB_TITLE: &'static str = "ATTRITION_DEFAULT_JOB_TITLE";
    const ENV_MEDIUM_THRESHOLD: &'static str = "ATTRITION_MEDIUM_RISK_THRESHOLD";
    const ENV_HIGH_THRESHOLD: &'static str = "ATTRITION_HIGH_RISK_THRESHOLD";
    const ENV_PROBABILITY_POLICY: &'static str = "ATTRITION_PROBABILITY_POLICY";
    const ENV_LOW_SALARY: &'static str = "ATTRITION_LOW_SALARY";
    const ENV_HIGH_SALARY: &'static str = "ATTRITION_HIGH_SALARY";
    const ENV_LOW_PERFORMANCE: &'static str = "ATTRITION_LOW_PERFORMANCE";
    const ENV_HIGH_PERFORMANCE: &'static str = "ATTRITION_HIGH_PERFORMANCE";
    const ENV_HIGH_ATTRITION_DEPARTMENTS: &'static str = "ATTRITION_HIGH_ATTRITION_DEPARTMENTS";
    const ENV_CURRENCY_LABEL: &'static str = "ATTRITION_CURRENCY_LABEL";
    const ENV_HIGH_RISK_EXAMPLES: &'static str = "ATTRITION_HIGH_RISK_EXAMPLES";

    /// Loads scoring configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let reconciliation_policy = match read_env(Self::ENV_POLICY) {
            Some(value) => value
                .parse::<ReconciliationPolicy>()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: Self::ENV_POLICY,
                    value,
                    reason,
                })?,
            None => defaults.reconciliation_policy,
        };

        let probability_policy = match read_env(Self::ENV_PROBABILITY_POLICY) {
            Some(value) => value
                .parse::<ProbabilityPolicy>()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: Self::ENV_PROBABILITY_POLICY,
                    value,
                    reason,
                })?,
            None => defaults.probability_policy,
        };

        let thresholds = RiskThresholds::new(
            parse_f64_from_env(Self::ENV_MEDIUM_THRESHOLD, defaults.thresholds.medium)?,
            parse_f64_from_env(Self::ENV_HIGH_THRESHOLD, defaults.thresholds.high)?,
        )?;

        let factor_rules = FactorRules {
            low_salary: parse_f64_from_env(Self::ENV_LOW_SALARY, defaults.factor_rules.low_salary)?,
            high_salary: parse_f64_from_env(
                Self::ENV_HIGH_SALARY,
                defaults.factor_rules.high_salary,
            )?,
            low_performance: parse_f64_from_env(
                Self::ENV_LOW_PERFORMANCE,
                defaults.factor_rules.low_performance,
            )?,
            high_performance: parse_f64_from_env(
                Self::ENV_HIGH_PERFORMANCE,
                defaults.factor_rules.high_performance,
            )?,
            high_attrition_departments: parse_list_from_env(Self::ENV_HIGH_ATTRITION_DEPARTMENTS)
                .unwrap_or(defaults.factor_rules.high_attrition_departments),
            currency_label: read_env(Self::ENV_CURRENCY_LABEL)
                .unwrap_or(defaults.factor_rules.currency_label),
        };

        Ok(Self {
            reconciliation_policy,
            case_insensitive_match: parse_bool_from_env(
                Self::ENV_CASE_INSENSITIVE,
                defaults.case_insensitive_match,
            )?,
            fallback_department: read_env(Self::ENV_DEFAULT_DEPARTMENT)
                .unwrap_or(defaults.fallback_department),
            fallback_job_title: read_env(Self::ENV_DEFAULT_JOB_TITLE)
                .unwrap_or(defaults.fallback_job_title),
            thresholds,
            probability_policy,
            factor_rules,
            max_high_risk_examples: parse_usize_from_env(
                Self::ENV_HIGH_RISK_EXAMPLES,
                defaults.max_high_risk_examples,
            )?,
        })
    }

    pub fn with_policy(mut self, policy: ReconciliationPolicy) -> Self {
        self.reconciliation_policy = policy;
        self
    }

    pub fn with_case_insensitive_match(mut self, enabled: bool) -> Self {
        self.case_insensitive_match = enabled;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_probability_policy(mut self, policy: ProbabilityPolicy) -> Self {
        self.probability_policy = policy;
        self
    }
}
