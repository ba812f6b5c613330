//! Core data models for the Payroll Run Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod employee;
mod pay_period;
mod run_summary;

pub use calculation_result::{
    CalculationFailure, CalculationStatus, DeductionLine, EmployeePayrollCalculation, PayBreakdown,
    PayCategory, PayLine,
};
pub use employee::{Employee, EmploymentType};
pub use pay_period::{PayrollPeriod, PeriodStatus};
pub use run_summary::{RunOutcome, RunSummary};
