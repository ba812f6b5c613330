//! The per-employee calculator and the input source it draws from.
//!
//! [`EmployeePayrollCalculator`] is the boundary between a run and the
//! external rate/rule/attendance source: whatever the source does, including
//! panicking, comes back as a typed [`CalculationError`] for that employee.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::{DeductionRule, EngineSettings};
use crate::error::{CalculationError, EngineError, EngineResult};
use crate::models::{Employee, PayBreakdown, PayrollPeriod};

use super::compute_pay;

/// Everything the arithmetic needs for one employee in one period.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationInputs {
    /// The employee's base hourly rate.
    pub hourly_rate: Decimal,
    /// Ordinary hours worked in the period.
    pub ordinary_hours: Decimal,
    /// Overtime hours worked in the period.
    pub overtime_hours: Decimal,
    /// Deduction rules applying to the employee.
    pub deductions: Vec<DeductionRule>,
}

/// External source of pay rates, attendance and deduction rules.
pub trait InputSource: Send + Sync {
    /// Checks the source can serve a run over `period`.
    ///
    /// Called once per run before any employee is processed. An error here
    /// aborts the run.
    fn prepare(&self, _period: &PayrollPeriod) -> EngineResult<()> {
        Ok(())
    }

    /// Resolves the calculation inputs for one employee.
    fn inputs_for(
        &self,
        employee: &Employee,
        period: &PayrollPeriod,
    ) -> Result<CalculationInputs, CalculationError>;
}

/// Calculates one employee at a time against an [`InputSource`].
///
/// Cheap to clone; clones share the source.
#[derive(Clone)]
pub struct EmployeePayrollCalculator {
    source: Arc<dyn InputSource>,
    settings: EngineSettings,
}

impl EmployeePayrollCalculator {
    /// Creates a calculator over the given source.
    pub fn new(source: Arc<dyn InputSource>, settings: EngineSettings) -> Self {
        Self { source, settings }
    }

    /// Returns the arithmetic settings in use.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Runs the source's availability check for a run.
    ///
    /// A panicking source is reported as `RuleSourceUnavailable`.
    pub fn prepare(&self, period: &PayrollPeriod) -> EngineResult<()> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.source.prepare(period))) {
            Ok(result) => result,
            Err(payload) => Err(EngineError::RuleSourceUnavailable {
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Calculates one employee's pay for the period.
    ///
    /// Never panics on behalf of the source and never returns anything that
    /// should abort a run.
    pub fn calculate(
        &self,
        employee: &Employee,
        period: &PayrollPeriod,
    ) -> Result<PayBreakdown, CalculationError> {
        let inputs = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.source.inputs_for(employee, period)
        })) {
            Ok(result) => result?,
            Err(payload) => {
                return Err(CalculationError::SourceFault {
                    message: panic_message(payload.as_ref()),
                });
            }
        };

        compute_pay(employee, period, &inputs, &self.settings)
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "input source panicked".to_string()
    }
}
