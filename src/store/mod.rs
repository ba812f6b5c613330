//! Persistence interfaces for payroll periods and calculation records.
//!
//! The orchestrator only talks to the [`PeriodStore`] and
//! [`CalculationStore`] traits; [`InMemoryStore`] implements both.

mod memory;

use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{EmployeePayrollCalculation, PayrollPeriod};

pub use memory::InMemoryStore;

/// Storage for payroll periods.
pub trait PeriodStore: Send + Sync {
    /// Inserts a new period.
    fn insert_period(&self, period: PayrollPeriod) -> EngineResult<()>;

    /// Loads a period, or `PeriodNotFound`.
    fn get_period(&self, period_id: Uuid) -> EngineResult<PayrollPeriod>;

    /// Persists a changed period.
    fn save_period(&self, period: &PayrollPeriod) -> EngineResult<()>;

    /// Lists all periods, most recent start date first.
    fn list_periods(&self) -> EngineResult<Vec<PayrollPeriod>>;
}

/// Storage for per-employee calculation records.
///
/// Records are keyed by (employee, period). Writes to different keys must not
/// conflict; the orchestrator never writes the same key twice at once.
pub trait CalculationStore: Send + Sync {
    /// Inserts or replaces the record for the calculation's (employee, period).
    ///
    /// A replacement keeps exactly one record for the key and carries the
    /// revision forward. Returns the stored record.
    fn upsert_calculation(
        &self,
        calculation: EmployeePayrollCalculation,
    ) -> EngineResult<EmployeePayrollCalculation>;

    /// Returns every record of a period, ordered by employee id.
    fn get_calculations(&self, period_id: Uuid) -> EngineResult<Vec<EmployeePayrollCalculation>>;

    /// Returns one employee's record for a period, if any.
    fn get_calculation(
        &self,
        period_id: Uuid,
        employee_id: &str,
    ) -> EngineResult<Option<EmployeePayrollCalculation>>;
}
