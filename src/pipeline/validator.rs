use serde_json::Value;

use super::error::PredictionError;
use super::types::PredictionRequest;
use crate::constants::REQUIRED_FIELDS;

/// A request whose required fields are all present.
///
/// Numbers are still raw JSON here; parsing them is the encoder's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedRequest<'a> {
    pub salary: &'a Value,
    pub performance_rating: &'a Value,
    pub department: &'a str,
    pub job_title: &'a str,
}

/// Checks presence of the four required fields and that the categorical ones are strings.
///
/// Every missing field is reported in one error, in [`REQUIRED_FIELDS`] order.
pub fn validate(request: &PredictionRequest) -> Result<ValidatedRequest<'_>, PredictionError> {
    let fields = [
        request.salary.as_ref(),
        request.performance_rating.as_ref(),
        request.department.as_ref(),
        request.job_title.as_ref(),
    ];

    let [Some(salary), Some(performance_rating), Some(department), Some(job_title)] = fields
    else {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .zip(fields)
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        return Err(PredictionError::validation(format!(
            "Missing fields: {}",
            missing.join(", ")
        )));
    };

    Ok(ValidatedRequest {
        salary,
        performance_rating,
        department: require_text(REQUIRED_FIELDS[2], department)?,
        job_title: require_text(REQUIRED_FIELDS[3], job_title)?,
    })
}

fn require_text<'a>(field: &str, value: &'a Value) -> Result<&'a str, PredictionError> {
    value
        .as_str()
        .ok_or_else(|| PredictionError::validation(format!("Field {} must be a string", field)))
}
