//! Fleet Router - HTTP endpoints over the orchestrator
//!
//! Mount at the root of the server:
//! ```ignore
//! let state = FleetState::new(Arc::new(orchestrator));
//! let app = fleet_http::create_router(state);
//! ```

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use fleet_core::Error;
use fleet_orchestrator::{Orchestrator, ScheduledTask};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Default page size for `/api/history`
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Router state
#[derive(Clone)]
pub struct FleetState {
    pub orchestrator: Arc<Orchestrator>,
}

impl FleetState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

pub fn create_router(state: FleetState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/execute", post(execute_handler))
        .route("/api/schedules", get(list_schedules_handler))
        .route("/api/schedules", post(schedule_handler))
        .route("/api/schedules/:id", delete(unschedule_handler))
        .route("/api/status", get(status_handler))
        .route("/api/history", get(history_handler))
        .route("/api/bots", get(bots_handler))
        .with_state(state)
}

/// Error response: `{"success": false, "error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    Fleet(Error),
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Fleet(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Fleet(err) => {
                let status = match err {
                    Error::DuplicateSchedule(_) => StatusCode::CONFLICT,
                    Error::InvalidCron { .. } => StatusCode::BAD_REQUEST,
                    Error::ScheduleNotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    bot: String,
    command: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

// === Handlers ===

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "botfleet"
    }))
}

async fn metrics_handler(State(state): State<FleetState>) -> Result<Response, ApiError> {
    let text = state
        .orchestrator
        .metrics()
        .encode_text()
        .map_err(|e| Error::internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], text).into_response())
}

async fn execute_handler(
    State(state): State<FleetState>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let envelope = state
        .orchestrator
        .execute(&request.bot, &request.command, request.params)
        .await;
    Ok(Json(envelope))
}

async fn list_schedules_handler(State(state): State<FleetState>) -> impl IntoResponse {
    Json(json!({ "schedules": state.orchestrator.get_scheduled() }))
}

async fn schedule_handler(
    State(state): State<FleetState>,
    payload: Result<Json<ScheduledTask>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(task) = payload?;
    let ack = state.orchestrator.schedule(task)?;
    Ok(Json(ack))
}

async fn unschedule_handler(
    State(state): State<FleetState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.orchestrator.unschedule(&id)?;
    Ok(Json(ack))
}

async fn status_handler(State(state): State<FleetState>) -> impl IntoResponse {
    Json(state.orchestrator.get_bot_status().await)
}

async fn history_handler(
    State(state): State<FleetState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = state.orchestrator.history(limit).await?;
    Ok(Json(json!({ "history": history })))
}

async fn bots_handler(State(state): State<FleetState>) -> impl IntoResponse {
    Json(json!({ "bots": state.orchestrator.bots() }))
}
