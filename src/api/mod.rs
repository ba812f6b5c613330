//! HTTP API module for the Payroll Run Engine.
//!
//! This module exposes period management, payroll runs, calculation review
//! and operator close over REST. The acting user is taken from the
//! `x-user-id` header.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CreatePeriodRequest, USER_HEADER};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
