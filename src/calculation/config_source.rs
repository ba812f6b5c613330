//! An [`InputSource`] backed by the YAML payroll configuration and an
//! in-memory attendance ledger.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PayrollConfig;
use crate::error::{CalculationError, EngineError, EngineResult};
use crate::models::{Employee, PayrollPeriod};

use super::{CalculationInputs, InputSource};

/// Hours an employee worked in a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursWorked {
    /// Ordinary hours.
    pub ordinary_hours: Decimal,
    /// Overtime hours.
    #[serde(default)]
    pub overtime_hours: Decimal,
}

/// Attendance totals keyed by (period, employee).
#[derive(Debug, Default)]
pub struct AttendanceLedger {
    entries: RwLock<HashMap<(Uuid, String), HoursWorked>>,
}

impl AttendanceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or replaces) an employee's hours for a period.
    pub fn record(
        &self,
        period_id: Uuid,
        employee_id: impl Into<String>,
        hours: HoursWorked,
    ) -> EngineResult<()> {
        let mut entries = self.entries.write().map_err(|_| EngineError::Storage {
            message: "attendance ledger lock poisoned".to_string(),
        })?;
        entries.insert((period_id, employee_id.into()), hours);
        Ok(())
    }

    /// Looks up an employee's hours for a period.
    pub fn hours_for(
        &self,
        period_id: Uuid,
        employee_id: &str,
    ) -> Result<Option<HoursWorked>, CalculationError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CalculationError::SourceFault {
                message: "attendance ledger lock poisoned".to_string(),
            })?;
        Ok(entries.get(&(period_id, employee_id.to_string())).copied())
    }
}

/// Resolves inputs from configured rate tables, deduction rules and recorded
/// attendance.
///
/// Rates come from the employee's override when present, otherwise from the
/// rate table effective on the period start date.
#[derive(Debug, Clone)]
pub struct ConfigInputSource {
    config: PayrollConfig,
    attendance: Arc<AttendanceLedger>,
}

impl ConfigInputSource {
    /// Creates a source over a configuration and a shared ledger.
    pub fn new(config: PayrollConfig, attendance: Arc<AttendanceLedger>) -> Self {
        Self { config, attendance }
    }

    /// Returns the attendance ledger.
    pub fn attendance(&self) -> &Arc<AttendanceLedger> {
        &self.attendance
    }

    fn base_rate(
        &self,
        employee: &Employee,
        period: &PayrollPeriod,
    ) -> Result<Decimal, CalculationError> {
        if let Some(override_rate) = employee.base_hourly_rate {
            return Ok(override_rate);
        }

        self.config
            .rate_table_for(period.start_date)
            .and_then(|table| table.rates.get(&employee.classification_code).copied())
            .ok_or_else(|| CalculationError::MissingRate {
                classification: employee.classification_code.clone(),
            })
    }
}

impl InputSource for ConfigInputSource {
    fn prepare(&self, period: &PayrollPeriod) -> EngineResult<()> {
        if self.config.rate_table_for(period.start_date).is_none() {
            return Err(EngineError::RuleSourceUnavailable {
                message: format!("no rate table effective on {}", period.start_date),
            });
        }
        Ok(())
    }

    fn inputs_for(
        &self,
        employee: &Employee,
        period: &PayrollPeriod,
    ) -> Result<CalculationInputs, CalculationError> {
        let hourly_rate = self.base_rate(employee, period)?;
        let hours = self
            .attendance
            .hours_for(period.id, &employee.id)?
            .ok_or_else(|| CalculationError::MissingAttendance {
                employee_id: employee.id.clone(),
            })?;

        Ok(CalculationInputs {
            hourly_rate,
            ordinary_hours: hours.ordinary_hours,
            overtime_hours: hours.overtime_hours,
            deductions: self.config.deductions_for(employee),
        })
    }
}
