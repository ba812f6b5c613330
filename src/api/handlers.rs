//! HTTP request handlers for the Payroll Run Engine API.
//!
//! Every handler delegates to the [`PayrollRunOrchestrator`] held in
//! [`AppState`] and maps engine errors through [`ApiErrorResponse`].
//!
//! [`PayrollRunOrchestrator`]: crate::orchestration::PayrollRunOrchestrator

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::request::{acting_user, CreatePeriodRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/periods", post(create_period_handler).get(list_periods_handler))
        .route("/periods/:id", get(get_period_handler))
        .route("/periods/:id/runs", post(run_period_handler))
        .route("/periods/:id/calculations", get(list_calculations_handler))
        .route("/periods/:id/close", post(close_period_handler))
        .route(
            "/periods/:id/employees/:employee_id/recalculate",
            post(recalculate_handler),
        )
        .with_state(state)
}

/// Handler for POST /periods.
async fn create_period_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePeriodRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let user_id = acting_user(&headers)?;
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected period request body");
        let error = match rejection {
            JsonRejection::JsonDataError(err) => ApiError::new("VALIDATION_ERROR", err.body_text()),
            JsonRejection::JsonSyntaxError(err) => {
                ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
            }
            _ => ApiError::malformed_json("Failed to parse request body"),
        };
        ApiErrorResponse::bad_request(error)
    })?;

    let period = state.orchestrator().create_period(
        &request.name,
        request.start_date,
        request.end_date,
        &user_id,
    )?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// Handler for GET /periods.
async fn list_periods_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator().periods()?))
}

/// Handler for GET /periods/:id.
async fn get_period_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator().period(period_id)?))
}

/// Handler for POST /periods/:id/runs.
///
/// Runs the period over its roster and returns the run summary. A partially
/// completed run is still a 200; the summary carries the failure count. A
/// client that disconnects mid-run does not stop the run.
async fn run_period_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(period_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user_id = acting_user(&headers)?;
    let start_time = Instant::now();

    match state.orchestrator().run_period(period_id, &user_id).await {
        Ok(summary) => {
            info!(
                period_id = %period_id,
                run_id = %summary.run_id,
                success_count = summary.success_count,
                failure_count = summary.failure_count,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Run request completed"
            );
            Ok(Json(summary))
        }
        Err(err) => {
            warn!(period_id = %period_id, error = %err, "Run request failed");
            Err(err.into())
        }
    }
}

/// Handler for GET /periods/:id/calculations.
async fn list_calculations_handler(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator().calculations(period_id)?))
}

/// Handler for POST /periods/:id/close.
async fn close_period_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(period_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user_id = acting_user(&headers)?;
    Ok(Json(state.orchestrator().close_period(period_id, &user_id)?))
}

/// Handler for POST /periods/:id/employees/:employee_id/recalculate.
async fn recalculate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((period_id, employee_id)): Path<(Uuid, String)>,
) -> ApiResult<impl IntoResponse> {
    let user_id = acting_user(&headers)?;
    let calculation = state
        .orchestrator()
        .recalculate_employee(period_id, &employee_id, &user_id)?;
    Ok(Json(calculation))
}
