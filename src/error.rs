//! Error types for the Payroll Run Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! [`EngineError`] covers everything that can stop an operation as a whole,
//! while [`CalculationError`] covers per-employee failures that a run records
//! and then moves past.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PeriodStatus;

/// The main error type for the Payroll Run Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A payroll period definition was invalid.
    #[error("Invalid payroll period: {message}")]
    InvalidPeriod {
        /// A description of what made the period invalid.
        message: String,
    },

    /// No payroll period exists with the given id.
    #[error("Payroll period not found: {period_id}")]
    PeriodNotFound {
        /// The id that was looked up.
        period_id: Uuid,
    },

    /// A run cannot be started against the period in its current status.
    #[error("Payroll period {period_id} cannot be run while {status}")]
    PeriodNotRunnable {
        /// The period id.
        period_id: Uuid,
        /// The status that blocked the run.
        status: PeriodStatus,
    },

    /// A period status transition is not allowed.
    #[error("Payroll period {period_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The period id.
        period_id: Uuid,
        /// The current status.
        from: PeriodStatus,
        /// The requested status.
        to: PeriodStatus,
    },

    /// Another run already holds the period.
    #[error("A payroll run is already in progress for period {period_id}")]
    RunInProgress {
        /// The period id.
        period_id: Uuid,
    },

    /// The period is closed and its calculations are immutable.
    #[error("Payroll period {period_id} is closed")]
    PeriodClosed {
        /// The period id.
        period_id: Uuid,
    },

    /// The period still has failed employee calculations.
    #[error("Payroll period {period_id} has {count} unresolved employee calculation(s)")]
    UnresolvedCalculations {
        /// The period id.
        period_id: Uuid,
        /// How many records are in the failed state.
        count: usize,
    },

    /// The employee set submitted to a run was unusable.
    #[error("Invalid roster: {message}")]
    InvalidRoster {
        /// A description of the problem.
        message: String,
    },

    /// The employee roster could not be read.
    #[error("Employee roster unavailable: {message}")]
    RosterUnavailable {
        /// A description of the underlying fault.
        message: String,
    },

    /// The rate/rule source could not serve the run.
    #[error("Rate source unavailable: {message}")]
    RuleSourceUnavailable {
        /// A description of the underlying fault.
        message: String,
    },

    /// The employee is not part of the period's roster.
    #[error("Employee '{employee_id}' not found in roster for period {period_id}")]
    EmployeeNotFound {
        /// The employee id.
        employee_id: String,
        /// The period id.
        period_id: Uuid,
    },

    /// A calculation worker terminated without reporting a result.
    #[error("Calculation worker failed: {message}")]
    WorkerFailed {
        /// A description of the failure.
        message: String,
    },

    /// The persistence layer failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage fault.
        message: String,
    },
}

impl EngineError {
    /// Returns true for faults outside per-employee processing that abort a
    /// whole run.
    ///
    /// ```
    /// use payroll_engine::error::EngineError;
    ///
    /// let roster = EngineError::RosterUnavailable { message: "timeout".to_string() };
    /// assert!(roster.is_infrastructure());
    ///
    /// let invalid = EngineError::InvalidPeriod { message: "end before start".to_string() };
    /// assert!(!invalid.is_infrastructure());
    /// ```
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            EngineError::RosterUnavailable { .. }
                | EngineError::RuleSourceUnavailable { .. }
                | EngineError::WorkerFailed { .. }
                | EngineError::Storage { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a single employee's calculation failed.
///
/// These failures are recorded against the employee and never abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    /// No pay rate could be determined for the employee.
    #[error("No rate found for classification '{classification}'")]
    MissingRate {
        /// The classification code that had no rate.
        classification: String,
    },

    /// No attendance was recorded for the employee in the period.
    #[error("No attendance recorded for employee '{employee_id}'")]
    MissingAttendance {
        /// The employee id.
        employee_id: String,
    },

    /// The hourly rate was zero or negative.
    #[error("Invalid hourly rate {rate}")]
    InvalidRate {
        /// The offending rate.
        rate: Decimal,
    },

    /// Recorded hours were out of range.
    #[error("Invalid hours: {message}")]
    InvalidHours {
        /// A description of the problem.
        message: String,
    },

    /// Deductions exceeded gross pay.
    #[error("Deductions {deductions} exceed gross pay {gross}")]
    NegativeNetPay {
        /// Gross pay.
        gross: Decimal,
        /// Total deductions.
        deductions: Decimal,
    },

    /// An amount fell outside the representable decimal range.
    #[error("Amount overflow computing {item}")]
    AmountOverflow {
        /// The amount being computed when the overflow occurred.
        item: String,
    },

    /// The input source faulted while serving this employee.
    #[error("Input source fault: {message}")]
    SourceFault {
        /// A description of the fault.
        message: String,
    },
}

impl CalculationError {
    /// Stable machine-readable code stored with failed calculation records.
    pub fn code(&self) -> &'static str {
        match self {
            CalculationError::MissingRate { .. } => "MISSING_RATE",
            CalculationError::MissingAttendance { .. } => "MISSING_ATTENDANCE",
            CalculationError::InvalidRate { .. } => "INVALID_RATE",
            CalculationError::InvalidHours { .. } => "INVALID_HOURS",
            CalculationError::NegativeNetPay { .. } => "NEGATIVE_NET_PAY",
            CalculationError::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
            CalculationError::SourceFault { .. } => "SOURCE_FAULT",
        }
    }
}
