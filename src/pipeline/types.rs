use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::constants::NOT_AVAILABLE;

/// One employee's raw input, as received from a caller.
///
/// Every field is kept as a JSON value so that presence, type and numeric parsing can be
/// checked by the pipeline stages that own them. A JSON `null` deserializes to `None` and
/// therefore counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Value>,

    #[serde(
        default,
        rename = "performanceRating",
        skip_serializing_if = "Option::is_none"
    )]
    pub performance_rating: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Value>,

    #[serde(default, rename = "jobTitle", skip_serializing_if = "Option::is_none")]
    pub job_title: Option<Value>,

    #[serde(default, alias = "employeeId", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Value>,

    #[serde(default, alias = "employeeName", skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<Value>,
}

impl PredictionRequest {
    pub fn new(
        salary: impl Into<Value>,
        performance_rating: impl Into<Value>,
        department: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Self {
        Self {
            salary: Some(salary.into()),
            performance_rating: Some(performance_rating.into()),
            department: Some(Value::String(department.into())),
            job_title: Some(Value::String(job_title.into())),
            employee_id: None,
            employee_name: None,
        }
    }

    pub fn with_employee(mut self, id: impl Into<Value>, name: impl Into<Value>) -> Self {
        self.employee_id = Some(id.into());
        self.employee_name = Some(name.into());
        self
    }

    /// Builds a request from an arbitrary JSON value.
    ///
    /// Anything that is not an object becomes an empty request, so a batch keeps one
    /// entry per input item and the bad item fails validation on its own. When both
    /// spellings of an employee key are present, the snake_case one wins.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        Self {
            salary: take_field(&mut fields, &["salary"]),
            performance_rating: take_field(&mut fields, &["performanceRating"]),
            department: take_field(&mut fields, &["department"]),
            job_title: take_field(&mut fields, &["jobTitle"]),
            employee_id: take_field(&mut fields, &["employee_id", "employeeId"]),
            employee_name: take_field(&mut fields, &["employee_name", "employeeName"]),
        }
    }

    /// Caller-supplied employee id, rendered as text.
    pub fn employee_id(&self) -> Option<String> {
        self.employee_id.as_ref().and_then(passthrough_text)
    }

    /// Caller-supplied employee name, rendered as text.
    pub fn employee_name(&self) -> Option<String> {
        self.employee_name.as_ref().and_then(passthrough_text)
    }
}

/// First non-null value under any of `keys`.
fn take_field(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| fields.remove(*key).filter(|v| !v.is_null()))
}

fn passthrough_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Three-tier bucketing of the attrition probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low-risk")]
    Low,
    #[serde(rename = "Medium-risk")]
    Medium,
    #[serde(rename = "High-risk")]
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low-risk",
            RiskCategory::Medium => "Medium-risk",
            RiskCategory::High => "High-risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Echo of the inputs the prediction was actually made on, after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionDetails {
    #[serde(serialize_with = "serialize_number")]
    pub salary: f64,
    #[serde(serialize_with = "serialize_number")]
    pub performance_rating: f64,
    pub department: String,
    pub job_title: String,
}

/// Outcome of scoring one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Probability rounded to 3 decimals.
    pub risk_score: f64,
    /// Probability as a percentage, rounded to 1 decimal.
    pub risk_percentage: f64,
    pub risk_category: RiskCategory,
    pub factors: Vec<String>,
    pub prediction_details: PredictionDetails,
    pub employee_id: String,
    pub employee_name: String,
    /// Unrounded classifier output (after the probability policy).
    #[serde(skip)]
    pub probability: f64,
}

impl PredictionResult {
    pub fn is_high_risk(&self) -> bool {
        self.risk_category == RiskCategory::High
    }
}

pub(crate) fn employee_field_or_default(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Writes integral values as JSON integers (`50000` rather than `50000.0`).
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
