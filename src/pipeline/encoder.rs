//! Turns validated, reconciled fields into the classifier's numeric feature row.

use serde::Serialize;
use serde_json::Value;

use super::error::PredictionError;
use super::reconciler::Reconciled;
use crate::model::{CategoryVocabulary, ModelError, Vocabulary};

/// One classifier input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feature {
    #[serde(rename = "salary")]
    Salary,
    #[serde(rename = "performanceRating")]
    PerformanceRating,
    #[serde(rename = "department_encoded")]
    DepartmentCode,
    #[serde(rename = "jobTitle_encoded")]
    JobTitleCode,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Salary => "salary",
            Feature::PerformanceRating => "performanceRating",
            Feature::DepartmentCode => "department_encoded",
            Feature::JobTitleCode => "jobTitle_encoded",
        }
    }

    /// Maps an advertised training column name onto a feature.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "salary" => Some(Feature::Salary),
            "performanceRating" | "performance_rating" => Some(Feature::PerformanceRating),
            "department_encoded" | "department" => Some(Feature::DepartmentCode),
            "jobTitle_encoded" | "jobTitle" | "job_title_encoded" => Some(Feature::JobTitleCode),
            _ => None,
        }
    }
}

/// Order used when the classifier does not advertise its own.
pub const STATIC_FEATURE_ORDER: [Feature; 4] = [
    Feature::Salary,
    Feature::PerformanceRating,
    Feature::DepartmentCode,
    Feature::JobTitleCode,
];

/// Column order the classifier expects, resolved once when the pipeline is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureOrder([Feature; 4]);

impl Default for FeatureOrder {
    fn default() -> Self {
        Self(STATIC_FEATURE_ORDER)
    }
}

impl FeatureOrder {
    /// Uses the advertised names when present, otherwise [`STATIC_FEATURE_ORDER`].
    ///
    /// A classifier that reports a row width other than four is rejected either way.
    pub fn resolve(
        advertised: Option<&[String]>,
        n_features: Option<usize>,
    ) -> Result<Self, ModelError> {
        if let Some(n) = n_features
            && n != STATIC_FEATURE_ORDER.len()
        {
            return Err(ModelError::InvalidFeatureNames {
                reason: format!(
                    "classifier expects {} features, requests supply {}",
                    n,
                    STATIC_FEATURE_ORDER.len()
                ),
            });
        }

        let Some(names) = advertised else {
            return Ok(Self::default());
        };

        if names.len() != STATIC_FEATURE_ORDER.len() {
            return Err(ModelError::InvalidFeatureNames {
                reason: format!(
                    "expected {} feature names, got {}",
                    STATIC_FEATURE_ORDER.len(),
                    names.len()
                ),
            });
        }

        let mut order = STATIC_FEATURE_ORDER;
        for (slot, name) in order.iter_mut().zip(names) {
            *slot = Feature::from_name(name).ok_or_else(|| ModelError::InvalidFeatureNames {
                reason: format!("unknown feature '{}'", name),
            })?;
        }

        if let Some(duplicate) = order
            .iter()
            .enumerate()
            .find(|&(i, feature)| order[..i].contains(feature))
            .map(|(_, feature)| feature)
        {
            return Err(ModelError::InvalidFeatureNames {
                reason: format!("feature '{}' listed twice", duplicate.name()),
            });
        }

        Ok(Self(order))
    }

    pub fn features(&self) -> &[Feature; 4] {
        &self.0
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(Feature::name).collect()
    }

    /// Lays the vector out in classifier column order.
    pub fn arrange(&self, vector: &FeatureVector) -> [f64; 4] {
        self.0.map(|feature| vector.value(feature))
    }
}

/// Encoded inputs for one employee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub salary: f64,
    pub performance_rating: f64,
    pub department_code: usize,
    pub job_title_code: usize,
}

impl FeatureVector {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Salary => self.salary,
            Feature::PerformanceRating => self.performance_rating,
            Feature::DepartmentCode => self.department_code as f64,
            Feature::JobTitleCode => self.job_title_code as f64,
        }
    }

    /// Maps the category codes back to their vocabulary strings.
    pub fn decode<'v>(&self, vocabulary: &'v Vocabulary) -> Option<(&'v str, &'v str)> {
        Some((
            vocabulary.departments.decode(self.department_code)?,
            vocabulary.job_titles.decode(self.job_title_code)?,
        ))
    }
}

/// Parses a JSON number or numeric string into a finite `f64`.
pub fn parse_numeric(field: &'static str, value: &Value) -> Result<f64, PredictionError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(PredictionError::Encoding {
            field,
            reason: "must be a finite number".to_string(),
        }),
        None => Err(PredictionError::Encoding {
            field,
            reason: format!("{} is not a number", value),
        }),
    }
}

/// Encodes one employee.
pub fn encode(
    vocabulary: &Vocabulary,
    salary: &Value,
    performance_rating: &Value,
    department: &Reconciled,
    job_title: &Reconciled,
) -> Result<FeatureVector, PredictionError> {
    let salary = parse_numeric("salary", salary)?;
    if salary < 0.0 {
        return Err(PredictionError::Encoding {
            field: "salary",
            reason: "must not be negative".to_string(),
        });
    }
    let performance_rating = parse_numeric("performanceRating", performance_rating)?;

    Ok(FeatureVector {
        salary,
        performance_rating,
        department_code: category_code(&vocabulary.departments, &department.value)?,
        job_title_code: category_code(&vocabulary.job_titles, &job_title.value)?,
    })
}

fn category_code(vocabulary: &CategoryVocabulary, value: &str) -> Result<usize, PredictionError> {
    vocabulary
        .encode(value)
        .ok_or_else(|| PredictionError::Encoding {
            field: vocabulary.kind().field_name(),
            reason: format!("'{}' has no {} code", value, vocabulary.kind()),
        })
}
