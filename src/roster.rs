//! Employee roster sources.

use crate::error::EngineResult;
use crate::models::{Employee, PayrollPeriod};

/// Supplies the employees to pay for a period.
pub trait RosterSource: Send + Sync {
    /// Returns the employees to process for `period`, in processing order.
    ///
    /// An error means the roster could not be read at all.
    fn employees_for(&self, period: &PayrollPeriod) -> EngineResult<Vec<Employee>>;
}

/// A fixed roster, filtered to employees active during the period.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    employees: Vec<Employee>,
}

impl StaticRoster {
    /// Creates a roster from a list of employees.
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }

    /// Returns every employee on the roster.
    pub fn all(&self) -> &[Employee] {
        &self.employees
    }
}

impl RosterSource for StaticRoster {
    fn employees_for(&self, period: &PayrollPeriod) -> EngineResult<Vec<Employee>> {
        Ok(self
            .employees
            .iter()
            .filter(|employee| employee.is_active_during(period))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmploymentType;
    use chrono::NaiveDate;

    fn employee(id: &str, start: NaiveDate) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_string(),
            employment_type: EmploymentType::FullTime,
            classification_code: "level_1".to_string(),
            employment_start_date: start,
            termination_date: None,
            base_hourly_rate: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_static_roster_filters_inactive_employees() {
        let roster = StaticRoster::new(vec![
            employee("emp_001", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            employee("emp_002", NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()),
        ]);
        let period = PayrollPeriod::new(
            "July 2026 (1)",
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 14).unwrap(),
        )
        .unwrap();

        let employees = roster.employees_for(&period).unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].id, "emp_001");
        assert_eq!(roster.all().len(), 2);
    }
}
