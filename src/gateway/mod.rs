//! HTTP gateway (Axum) around [`AttritionService`](crate::service::AttritionService).
//!
//! Thin transport: JSON in, JSON out. Scoring errors map to status codes in
//! [`error::GatewayError`]; everything else lives in the service.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{
    BatchPredictionResponse, EvaluationResponse, PredictionResponse, config_handler,
    evaluate_handler, health_handler, predict_batch_handler, predict_handler,
};
pub use state::HandlerState;

use crate::model::RiskClassifier;

/// Response header carrying the error kind, or the model state on health checks.
pub const ATTRITION_STATUS_HEADER: &str = "x-attrition-status";

pub const HEALTH_PATH: &str = "/api/health";
pub const CONFIG_PATH: &str = "/api/config";
pub const PREDICT_PATH: &str = "/api/predict-attrition";
pub const PREDICT_BATCH_PATH: &str = "/api/predict-attrition-batch";
pub const EVALUATE_PATH: &str = "/api/evaluate";

pub fn create_router_with_state<C>(state: HandlerState<C>) -> Router
where
    C: RiskClassifier + 'static,
{
    Router::new()
        .route(HEALTH_PATH, get(health_handler::<C>))
        .route(CONFIG_PATH, get(config_handler::<C>))
        .route(PREDICT_PATH, post(predict_handler::<C>))
        .route(PREDICT_BATCH_PATH, post(predict_batch_handler::<C>))
        .route(EVALUATE_PATH, post(evaluate_handler::<C>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
