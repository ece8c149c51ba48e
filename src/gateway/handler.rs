use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::ATTRITION_STATUS_HEADER;
use super::error::GatewayError;
use super::state::HandlerState;
use crate::model::RiskClassifier;
use crate::pipeline::{
    BatchItemError, BatchSummary, EvaluationReport, LabeledRequest, PredictionRequest,
    PredictionResult,
};

const EMPLOYEES_FIELD: &str = "employees";

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub success: bool,
    pub prediction: PredictionResult,
}

#[derive(Debug, Serialize)]
pub struct BatchPredictionResponse {
    pub success: bool,
    /// Successfully scored employees.
    pub total_employees: usize,
    pub predictions: Vec<PredictionResult>,
    pub summary: BatchSummary,
    /// `null` when every employee was scored.
    pub errors: Option<Vec<BatchItemError>>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub success: bool,
    pub evaluation: EvaluationReport,
}

#[instrument(skip(state))]
pub async fn health_handler<C>(State(state): State<HandlerState<C>>) -> Response
where
    C: RiskClassifier + 'static,
{
    let health = state.service.health_check();

    let mut headers = HeaderMap::new();
    headers.insert(
        ATTRITION_STATUS_HEADER,
        HeaderValue::from_static(if health.model_loaded {
            "ready"
        } else {
            "model_not_loaded"
        }),
    );

    (StatusCode::OK, headers, Json(health)).into_response()
}

#[instrument(skip(state))]
pub async fn config_handler<C>(
    State(state): State<HandlerState<C>>,
) -> Result<Response, GatewayError>
where
    C: RiskClassifier + 'static,
{
    let info = state.service.get_config()?;
    Ok(Json(info).into_response())
}

#[instrument(skip(state, payload))]
pub async fn predict_handler<C>(
    State(state): State<HandlerState<C>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    C: RiskClassifier + 'static,
{
    let body = json_body(payload)?;
    if !body.is_object() {
        return Err(GatewayError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    }

    let request = PredictionRequest::from_value(body);
    let prediction = state.service.predict_single(&request)?;

    debug!(
        employee_id = %prediction.employee_id,
        risk_score = prediction.risk_score,
        category = %prediction.risk_category,
        "Prediction served"
    );

    Ok(Json(PredictionResponse {
        success: true,
        prediction,
    })
    .into_response())
}

#[instrument(skip(state, payload))]
pub async fn predict_batch_handler<C>(
    State(state): State<HandlerState<C>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    C: RiskClassifier + 'static,
{
    let employees = employees_from_body(json_body(payload)?)?;
    let requests: Vec<PredictionRequest> = employees
        .into_iter()
        .map(PredictionRequest::from_value)
        .collect();

    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.predict_batch(&requests))
        .await
        .map_err(|e| GatewayError::InternalError(format!("batch task failed: {}", e)))??;

    info!(
        processed = outcome.processed(),
        failed = outcome.errors.len(),
        "Batch prediction served"
    );

    let errors = (!outcome.errors.is_empty()).then_some(outcome.errors);

    Ok(Json(BatchPredictionResponse {
        success: true,
        total_employees: outcome.results.len(),
        predictions: outcome.results,
        summary: outcome.summary,
        errors,
    })
    .into_response())
}

#[instrument(skip(state, payload))]
pub async fn evaluate_handler<C>(
    State(state): State<HandlerState<C>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    C: RiskClassifier + 'static,
{
    let employees = employees_from_body(json_body(payload)?)?;
    let items: Vec<LabeledRequest> = employees
        .into_iter()
        .map(LabeledRequest::from_value)
        .collect();

    let service = state.service.clone();
    let evaluation = tokio::task::spawn_blocking(move || service.evaluate(&items))
        .await
        .map_err(|e| GatewayError::InternalError(format!("evaluation task failed: {}", e)))??;

    Ok(Json(EvaluationResponse {
        success: true,
        evaluation,
    })
    .into_response())
}

pub(crate) fn json_body(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Value, GatewayError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))
}

/// Pulls the `employees` array out of a batch body.
pub(crate) fn employees_from_body(body: Value) -> Result<Vec<Value>, GatewayError> {
    match body {
        Value::Object(mut fields) => match fields.remove(EMPLOYEES_FIELD) {
            Some(Value::Array(employees)) => Ok(employees),
            Some(_) => Err(GatewayError::InvalidRequest(format!(
                "'{}' must be an array",
                EMPLOYEES_FIELD
            ))),
            None => Err(GatewayError::InvalidRequest(format!(
                "missing '{}' array",
                EMPLOYEES_FIELD
            ))),
        },
        _ => Err(GatewayError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        )),
    }
}
