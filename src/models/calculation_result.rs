//! Calculation result models for the Payroll Run Engine.
//!
//! This module contains the [`EmployeePayrollCalculation`] record stored once
//! per (employee, period) pair, and the [`PayBreakdown`] it carries when the
//! calculation succeeded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CalculationError;

/// Represents the category of pay for a pay line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayCategory {
    /// Ordinary hours for permanent employees.
    Ordinary,
    /// Ordinary hours for casual employees (includes casual loading).
    OrdinaryCasual,
    /// Overtime hours.
    Overtime,
}

/// Represents a single earnings line in a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    /// The category of pay.
    pub category: PayCategory,
    /// The number of hours paid in this category.
    pub hours: Decimal,
    /// The hourly rate applied.
    pub rate: Decimal,
    /// The total amount for this line (hours * rate, rounded to cents).
    pub amount: Decimal,
}

/// Represents a single deduction taken from gross pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// Deduction code (e.g., "super_salary_sacrifice").
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// The amount deducted.
    pub amount: Decimal,
}

/// The monetary breakdown of a successful calculation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayBreakdown;
/// use rust_decimal::Decimal;
///
/// let breakdown = PayBreakdown {
///     gross: Decimal::new(100000, 2),
///     deductions: Decimal::new(15000, 2),
///     net: Decimal::new(85000, 2),
///     pay_lines: vec![],
///     deduction_lines: vec![],
/// };
/// assert_eq!(breakdown.gross - breakdown.deductions, breakdown.net);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayBreakdown {
    /// Total earnings before deductions.
    pub gross: Decimal,
    /// Total deductions.
    pub deductions: Decimal,
    /// Gross minus deductions.
    pub net: Decimal,
    /// Earnings lines making up gross.
    pub pay_lines: Vec<PayLine>,
    /// Deduction lines making up deductions.
    pub deduction_lines: Vec<DeductionLine>,
}

/// Status of a stored calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationStatus {
    /// The employee's pay was computed.
    Succeeded,
    /// The calculation failed; see the error detail.
    Failed,
}

/// Error detail persisted with a failed calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationFailure {
    /// Stable machine-readable code (e.g., "MISSING_RATE").
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&CalculationError> for CalculationFailure {
    fn from(error: &CalculationError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// The stored outcome of calculating one employee in one period.
///
/// Exactly one record exists per (employee, period); writing again supersedes
/// the previous record and bumps `revision`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayrollCalculation {
    /// Unique identifier for this record version.
    pub id: Uuid,
    /// The owning period.
    pub period_id: Uuid,
    /// The owning employee.
    pub employee_id: String,
    /// Whether the calculation succeeded.
    pub status: CalculationStatus,
    /// The breakdown, present only when succeeded.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub breakdown: Option<PayBreakdown>,
    /// The error detail, present only when failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<CalculationFailure>,
    /// How many times this (employee, period) record has been written.
    pub revision: u32,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
    /// The user whose action produced this record.
    pub calculated_by: String,
}

impl EmployeePayrollCalculation {
    /// Builds a succeeded record.
    pub fn succeeded(
        period_id: Uuid,
        employee_id: impl Into<String>,
        breakdown: PayBreakdown,
        calculated_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            period_id,
            employee_id: employee_id.into(),
            status: CalculationStatus::Succeeded,
            breakdown: Some(breakdown),
            error: None,
            revision: 1,
            calculated_at: Utc::now(),
            calculated_by: calculated_by.into(),
        }
    }

    /// Builds a failed record carrying the error detail.
    pub fn failed(
        period_id: Uuid,
        employee_id: impl Into<String>,
        error: &CalculationError,
        calculated_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            period_id,
            employee_id: employee_id.into(),
            status: CalculationStatus::Failed,
            breakdown: None,
            error: Some(error.into()),
            revision: 1,
            calculated_at: Utc::now(),
            calculated_by: calculated_by.into(),
        }
    }

    /// Returns true if the calculation failed.
    pub fn is_failed(&self) -> bool {
        self.status == CalculationStatus::Failed
    }
}
