//! Classifier call, probability checks, risk bucketing and factor annotations.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::encoder::FeatureVector;
use super::error::PredictionError;
use super::types::RiskCategory;
use crate::config::ConfigError;
use crate::constants::{
    DEFAULT_CURRENCY_LABEL, DEFAULT_HIGH_ATTRITION_DEPARTMENTS, DEFAULT_HIGH_PERFORMANCE,
    DEFAULT_HIGH_RISK_THRESHOLD, DEFAULT_HIGH_SALARY, DEFAULT_LOW_PERFORMANCE, DEFAULT_LOW_SALARY,
    DEFAULT_MEDIUM_RISK_THRESHOLD,
};
use crate::model::{ClassifierError, RiskClassifier};

/// Lower bounds of the medium and high bands.
///
/// `p < medium` is Low, `medium <= p < high` is Medium, `p >= high` is High.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: DEFAULT_MEDIUM_RISK_THRESHOLD,
            high: DEFAULT_HIGH_RISK_THRESHOLD,
        }
    }
}

impl RiskThresholds {
    pub fn new(medium: f64, high: f64) -> Result<Self, ConfigError> {
        let ordered = 0.0 <= medium && medium <= high && high <= 1.0;
        if !ordered {
            return Err(ConfigError::InvalidThresholds { medium, high });
        }
        Ok(Self { medium, high })
    }

    pub fn categorize(&self, probability: f64) -> RiskCategory {
        if probability >= self.high {
            RiskCategory::High
        } else if probability >= self.medium {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }
}

/// Handling of classifier output outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityPolicy {
    #[default]
    Reject,
    Clamp,
}

impl ProbabilityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbabilityPolicy::Reject => "reject",
            ProbabilityPolicy::Clamp => "clamp",
        }
    }

    /// Applies the policy. NaN and infinities are rejected under either policy.
    pub fn apply(&self, probability: f64) -> Result<f64, ClassifierError> {
        if !probability.is_finite() {
            return Err(ClassifierError::InvalidProbability { value: probability });
        }
        if (0.0..=1.0).contains(&probability) {
            return Ok(probability);
        }
        match self {
            ProbabilityPolicy::Reject => Err(ClassifierError::InvalidProbability {
                value: probability,
            }),
            ProbabilityPolicy::Clamp => {
                debug!(probability, "Clamping out-of-range probability");
                Ok(probability.clamp(0.0, 1.0))
            }
        }
    }
}

impl fmt::Display for ProbabilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbabilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(ProbabilityPolicy::Reject),
            "clamp" => Ok(ProbabilityPolicy::Clamp),
            _ => Err("expected 'reject' or 'clamp'".to_string()),
        }
    }
}

/// Thresholds behind the human-readable factor annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRules {
    pub low_salary: f64,
    pub high_salary: f64,
    /// Ratings at or below this are flagged.
    pub low_performance: f64,
    /// Ratings at or above this are called out as a strength.
    pub high_performance: f64,
    pub high_attrition_departments: Vec<String>,
    pub currency_label: String,
}

impl Default for FactorRules {
    fn default() -> Self {
        Self {
            low_salary: DEFAULT_LOW_SALARY,
            high_salary: DEFAULT_HIGH_SALARY,
            low_performance: DEFAULT_LOW_PERFORMANCE,
            high_performance: DEFAULT_HIGH_PERFORMANCE,
            high_attrition_departments: DEFAULT_HIGH_ATTRITION_DEPARTMENTS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            currency_label: DEFAULT_CURRENCY_LABEL.to_string(),
        }
    }
}

impl FactorRules {
    /// Salary, then performance, then department annotations.
    pub fn factors(&self, salary: f64, performance_rating: f64, department: &str) -> Vec<String> {
        let mut factors = Vec::new();

        if salary < self.low_salary {
            factors.push(format!(
                "⚠️ Low salary (< {} {})",
                self.currency_label,
                format_thousands(self.low_salary)
            ));
        } else if salary > self.high_salary {
            factors.push(format!(
                "✅ Good salary (> {} {})",
                self.currency_label,
                format_thousands(self.high_salary)
            ));
        }

        if performance_rating <= self.low_performance {
            factors.push("⚠️ Low performance rating".to_string());
        } else if performance_rating >= self.high_performance {
            factors.push("✅ High performance rating".to_string());
        }

        if self
            .high_attrition_departments
            .iter()
            .any(|d| d == department)
        {
            factors.push(format!("⚠️ High-attrition department: {}", department));
        }

        factors
    }
}

/// Scored and bucketed output for one feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub probability: f64,
    pub risk_score: f64,
    pub risk_percentage: f64,
    pub risk_category: RiskCategory,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RiskAdapter {
    thresholds: RiskThresholds,
    probability_policy: ProbabilityPolicy,
    factor_rules: FactorRules,
}

impl RiskAdapter {
    pub fn new(
        thresholds: RiskThresholds,
        probability_policy: ProbabilityPolicy,
        factor_rules: FactorRules,
    ) -> Self {
        Self {
            thresholds,
            probability_policy,
            factor_rules,
        }
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }

    pub fn probability_policy(&self) -> ProbabilityPolicy {
        self.probability_policy
    }

    /// Scores `row` and annotates the result from the encoded inputs.
    ///
    /// The category is decided on the unrounded probability.
    pub fn assess<C: RiskClassifier + ?Sized>(
        &self,
        classifier: &C,
        row: &[f64],
        vector: &FeatureVector,
        department: &str,
    ) -> Result<RiskAssessment, PredictionError> {
        let raw = classifier.predict_probability(row)?;
        let probability = self.probability_policy.apply(raw)?;

        Ok(RiskAssessment {
            probability,
            risk_score: round_to(probability, 3),
            risk_percentage: round_to(probability * 100.0, 1),
            risk_category: self.thresholds.categorize(probability),
            factors: self.factor_rules.factors(
                vector.salary,
                vector.performance_rating,
                department,
            ),
        })
    }
}

/// Rounds half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `30000.0` becomes `"30,000"`, `1234.5` becomes `"1,234.5"`.
fn format_thousands(value: f64) -> String {
    let text = value.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 2);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(30_000.0), "30,000");
        assert_eq!(format_thousands(60_000.0), "60,000");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1_234_567.0), "1,234,567");
        assert_eq!(format_thousands(1234.5), "1,234.5");
        assert_eq!(format_thousands(-4500.0), "-4,500");
        assert_eq!(format_thousands(0.0), "0");
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert_eq!(round_to(0.5, 0), 1.0);
        assert_eq!(round_to(0.25, 1), 0.3);
        assert_eq!(round_to(77.5, 0), 78.0);
        assert_eq!(round_to(0.77549, 3), 0.775);
    }
}
