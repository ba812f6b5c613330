//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeePayrollCalculation, PayrollPeriod, PeriodStatus};

use super::{CalculationStore, PeriodStore};

/// Thread-safe in-memory period and calculation store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    periods: RwLock<HashMap<Uuid, PayrollPeriod>>,
    // period -> employee -> record; BTreeMap keeps employee order stable
    calculations: RwLock<HashMap<Uuid, BTreeMap<String, EmployeePayrollCalculation>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(what: &str) -> EngineError {
    EngineError::Storage {
        message: format!("{} lock poisoned", what),
    }
}

impl PeriodStore for InMemoryStore {
    fn insert_period(&self, period: PayrollPeriod) -> EngineResult<()> {
        let mut periods = self.periods.write().map_err(|_| poisoned("period"))?;
        if periods.contains_key(&period.id) {
            return Err(EngineError::Storage {
                message: format!("period {} already exists", period.id),
            });
        }
        periods.insert(period.id, period);
        Ok(())
    }

    fn get_period(&self, period_id: Uuid) -> EngineResult<PayrollPeriod> {
        let periods = self.periods.read().map_err(|_| poisoned("period"))?;
        periods
            .get(&period_id)
            .cloned()
            .ok_or(EngineError::PeriodNotFound { period_id })
    }

    fn save_period(&self, period: &PayrollPeriod) -> EngineResult<()> {
        let mut periods = self.periods.write().map_err(|_| poisoned("period"))?;
        match periods.get_mut(&period.id) {
            Some(existing) => {
                *existing = period.clone();
                Ok(())
            }
            None => Err(EngineError::PeriodNotFound {
                period_id: period.id,
            }),
        }
    }

    fn list_periods(&self) -> EngineResult<Vec<PayrollPeriod>> {
        let periods = self.periods.read().map_err(|_| poisoned("period"))?;
        let mut list: Vec<PayrollPeriod> = periods.values().cloned().collect();
        list.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.name.cmp(&b.name)));
        Ok(list)
    }
}

impl CalculationStore for InMemoryStore {
    fn upsert_calculation(
        &self,
        mut calculation: EmployeePayrollCalculation,
    ) -> EngineResult<EmployeePayrollCalculation> {
        let closed = self
            .periods
            .read()
            .map_err(|_| poisoned("period"))?
            .get(&calculation.period_id)
            .is_some_and(|period| period.status == PeriodStatus::Closed);
        if closed {
            return Err(EngineError::PeriodClosed {
                period_id: calculation.period_id,
            });
        }

        let mut calculations = self
            .calculations
            .write()
            .map_err(|_| poisoned("calculation"))?;
        let by_employee = calculations.entry(calculation.period_id).or_default();

        if let Some(previous) = by_employee.get(&calculation.employee_id) {
            calculation.revision = previous.revision + 1;
        }
        by_employee.insert(calculation.employee_id.clone(), calculation.clone());
        Ok(calculation)
    }

    fn get_calculations(&self, period_id: Uuid) -> EngineResult<Vec<EmployeePayrollCalculation>> {
        let calculations = self
            .calculations
            .read()
            .map_err(|_| poisoned("calculation"))?;
        Ok(calculations
            .get(&period_id)
            .map(|by_employee| by_employee.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get_calculation(
        &self,
        period_id: Uuid,
        employee_id: &str,
    ) -> EngineResult<Option<EmployeePayrollCalculation>> {
        let calculations = self
            .calculations
            .read()
            .map_err(|_| poisoned("calculation"))?;
        Ok(calculations
            .get(&period_id)
            .and_then(|by_employee| by_employee.get(employee_id))
            .cloned())
    }
}
