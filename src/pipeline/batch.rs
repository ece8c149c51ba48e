//! Runs the single-item pipeline over a batch and summarises the successes.

use serde::Serialize;
use tracing::{debug, info};

use super::adapter::round_to;
use super::error::PredictionError;
use super::types::{PredictionRequest, PredictionResult, RiskCategory};
use crate::constants::UNKNOWN_IDENTIFIER;

/// A batch item that failed, tagged with its id and input position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemError {
    pub employee_id: String,
    pub index: usize,
    pub error: String,
}

impl BatchItemError {
    pub(crate) fn new(request: &PredictionRequest, index: usize, error: &PredictionError) -> Self {
        Self {
            employee_id: request
                .employee_id()
                .unwrap_or_else(|| UNKNOWN_IDENTIFIER.to_string()),
            index,
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategorySummary {
    pub count: usize,
    /// Share of the successful results, rounded to 1 decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighRiskExample {
    pub id: String,
    pub name: String,
    /// Risk percentage of this employee.
    pub risk: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighRiskSummary {
    pub count: usize,
    pub percentage: f64,
    pub employees: Vec<HighRiskExample>,
}

/// Aggregate over the successful results of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub high_risk: HighRiskSummary,
    pub medium_risk: CategorySummary,
    pub low_risk: CategorySummary,
    /// Mean of the per-item rounded risk scores, rounded to 3 decimals.
    pub average_risk_score: f64,
}

impl BatchSummary {
    /// Summarises `results`, keeping the first `max_examples` high-risk entries in order.
    ///
    /// With no results every count, percentage and the average are zero.
    pub fn from_results(results: &[PredictionResult], max_examples: usize) -> Self {
        let total = results.len();
        if total == 0 {
            return Self::default();
        }

        let count_of = |category: RiskCategory| {
            results
                .iter()
                .filter(|r| r.risk_category == category)
                .count()
        };
        let percentage_of = |count: usize| round_to(count as f64 / total as f64 * 100.0, 1);

        let high = count_of(RiskCategory::High);
        let medium = count_of(RiskCategory::Medium);
        let low = count_of(RiskCategory::Low);

        let employees = results
            .iter()
            .filter(|r| r.is_high_risk())
            .take(max_examples)
            .map(|r| HighRiskExample {
                id: r.employee_id.clone(),
                name: r.employee_name.clone(),
                risk: r.risk_percentage,
            })
            .collect();

        let score_sum: f64 = results.iter().map(|r| r.risk_score).sum();

        Self {
            high_risk: HighRiskSummary {
                count: high,
                percentage: percentage_of(high),
                employees,
            },
            medium_risk: CategorySummary {
                count: medium,
                percentage: percentage_of(medium),
            },
            low_risk: CategorySummary {
                count: low,
                percentage: percentage_of(low),
            },
            average_risk_score: round_to(score_sum / total as f64, 3),
        }
    }

    /// Number of results the summary was computed over.
    pub fn total(&self) -> usize {
        self.high_risk.count + self.medium_risk.count + self.low_risk.count
    }
}

/// Results, summary and per-item failures of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<PredictionResult>,
    pub summary: BatchSummary,
    pub errors: Vec<BatchItemError>,
}

impl BatchOutcome {
    /// Items processed, successful or not.
    pub fn processed(&self) -> usize {
        self.results.len() + self.errors.len()
    }
}

/// Runs `predict` on every request in order. A failing item is recorded and the batch
/// carries on.
pub fn run_batch<F>(
    requests: &[PredictionRequest],
    max_examples: usize,
    mut predict: F,
) -> BatchOutcome
where
    F: FnMut(&PredictionRequest) -> Result<PredictionResult, PredictionError>,
{
    let mut results = Vec::with_capacity(requests.len());
    let mut errors = Vec::new();

    for (index, request) in requests.iter().enumerate() {
        match predict(request) {
            Ok(result) => results.push(result),
            Err(e) => {
                debug!(index, error = %e, "Batch item failed");
                errors.push(BatchItemError::new(request, index, &e));
            }
        }
    }

    let summary = BatchSummary::from_results(&results, max_examples);

    info!(
        total = requests.len(),
        succeeded = results.len(),
        failed = errors.len(),
        high_risk = summary.high_risk.count,
        "Batch prediction complete"
    );

    BatchOutcome {
        results,
        summary,
        errors,
    }
}
