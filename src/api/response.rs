//! Response types for the Payroll Run Engine API.
//!
//! This module defines the error response structures and the mapping from
//! [`EngineError`] to HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing header error response.
    pub fn missing_header(header: &str) -> Self {
        Self::with_details(
            "MISSING_HEADER",
            format!("missing header: {}", header),
            format!("Required header '{}' was not provided in the request", header),
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let (status, code) = match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            EngineError::InvalidPeriod { .. } => (StatusCode::BAD_REQUEST, "INVALID_PERIOD"),
            EngineError::InvalidRoster { .. } => (StatusCode::BAD_REQUEST, "INVALID_ROSTER"),
            EngineError::PeriodNotFound { .. } => (StatusCode::NOT_FOUND, "PERIOD_NOT_FOUND"),
            EngineError::EmployeeNotFound { .. } => (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND"),
            EngineError::PeriodNotRunnable { .. } => (StatusCode::CONFLICT, "PERIOD_NOT_RUNNABLE"),
            EngineError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            EngineError::RunInProgress { .. } => (StatusCode::CONFLICT, "RUN_IN_PROGRESS"),
            EngineError::PeriodClosed { .. } => (StatusCode::CONFLICT, "PERIOD_CLOSED"),
            EngineError::UnresolvedCalculations { .. } => {
                (StatusCode::CONFLICT, "UNRESOLVED_CALCULATIONS")
            }
            EngineError::RosterUnavailable { .. } => (StatusCode::BAD_GATEWAY, "ROSTER_UNAVAILABLE"),
            EngineError::RuleSourceUnavailable { .. } => {
                (StatusCode::BAD_GATEWAY, "RULE_SOURCE_UNAVAILABLE")
            }
            EngineError::WorkerFailed { .. } => (StatusCode::BAD_GATEWAY, "WORKER_FAILED"),
            EngineError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        let message = error.to_string();
        let error = if error.is_infrastructure() {
            ApiError::with_details(
                code,
                message,
                "The payroll run was marked failed and can be retried",
            )
        } else {
            ApiError::new(code, message)
        };
        Self { status, error }
    }
}
