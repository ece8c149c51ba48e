use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::ATTRITION_STATUS_HEADER;
use crate::pipeline::PredictionError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: &'static str,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_options: Option<Vec<String>>,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Prediction(PredictionError::ModelNotLoaded { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Prediction(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            GatewayError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::Prediction(e) => e.kind(),
            GatewayError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            tracing::error!(kind, error = %self, "Request failed");
        } else {
            tracing::debug!(kind, error = %self, "Request rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(ATTRITION_STATUS_HEADER, HeaderValue::from_static(kind));

        let valid_options = match &self {
            GatewayError::Prediction(e) => e.valid_options().map(<[String]>::to_vec),
            _ => None,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
            kind,
            code: status.as_u16(),
            valid_options,
        });

        (status, headers, body).into_response()
    }
}
