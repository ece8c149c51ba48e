//! Scores labeled employees and compares predictions with the recorded outcome.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::batch::BatchItemError;
use super::error::PredictionError;
use super::types::{PredictionRequest, PredictionResult};
use crate::constants::EVALUATION_DECISION_THRESHOLD;

const LABEL_FIELD: &str = "attrition";

/// A prediction request with its known attrition outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledRequest {
    pub request: PredictionRequest,
    pub label: Option<Value>,
}

impl LabeledRequest {
    pub fn new(request: PredictionRequest, label: impl Into<Value>) -> Self {
        Self {
            request,
            label: Some(label.into()),
        }
    }

    /// Splits the `attrition` field off an employee object.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => {
                let label = fields.remove(LABEL_FIELD).filter(|v| !v.is_null());
                Self {
                    request: PredictionRequest::from_value(Value::Object(fields)),
                    label,
                }
            }
            _ => Self::default(),
        }
    }
}

/// Reads `"Yes"`/`"No"`, booleans and `1`/`0` as an attrition outcome.
pub fn parse_label(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    fn record(&mut self, actual: bool, predicted: bool) {
        match (actual, predicted) {
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_positive += 1,
            (true, false) => self.false_negative += 1,
            (true, true) => self.true_positive += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub errors: Vec<BatchItemError>,
}

/// Scores every item with a usable label; the rest are skipped with an error entry.
pub fn evaluate<F>(items: &[LabeledRequest], mut predict: F) -> EvaluationReport
where
    F: FnMut(&PredictionRequest) -> Result<PredictionResult, PredictionError>,
{
    let mut matrix = ConfusionMatrix::default();
    let mut errors = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let Some(actual) = item.label.as_ref().and_then(parse_label) else {
            errors.push(BatchItemError::new(
                &item.request,
                index,
                &PredictionError::validation("Missing or invalid attrition label"),
            ));
            continue;
        };

        match predict(&item.request) {
            Ok(result) => {
                matrix.record(actual, result.probability > EVALUATION_DECISION_THRESHOLD);
            }
            Err(e) => errors.push(BatchItemError::new(&item.request, index, &e)),
        }
    }

    let report = EvaluationReport {
        evaluated: matrix.total(),
        skipped: errors.len(),
        accuracy: matrix.accuracy(),
        precision: matrix.precision(),
        recall: matrix.recall(),
        confusion_matrix: matrix,
        errors,
    };

    info!(
        evaluated = report.evaluated,
        skipped = report.skipped,
        accuracy = report.accuracy,
        "Evaluation complete"
    );

    report
}
