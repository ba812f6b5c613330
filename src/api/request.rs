//! Request types for the Payroll Run Engine API.

use axum::http::HeaderMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::response::{ApiError, ApiErrorResponse};

/// Header carrying the id of the user acting on the request.
pub const USER_HEADER: &str = "x-user-id";

/// Request body for `POST /periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePeriodRequest {
    /// Human-readable label, e.g. "July 2026 (1)".
    pub name: String,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
}

/// Extracts the acting user from the request headers.
///
/// Authorization happens upstream; this only requires the header to be
/// present and non-blank.
pub(crate) fn acting_user(headers: &HeaderMap) -> Result<String, ApiErrorResponse> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiErrorResponse::bad_request(ApiError::missing_header(USER_HEADER))
        })
}
