//! Casual loading calculation functionality.
//!
//! Casual employees are paid their ordinary hours at the base rate times the
//! configured casual loading multiplier; everyone else is paid the base rate.

use rust_decimal::Decimal;

use crate::error::CalculationError;
use crate::models::{Employee, PayCategory};

/// The ordinary rate after casual loading, with the pay category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasualLoadingResult {
    /// The rate after applying casual loading (if applicable).
    pub loaded_rate: Decimal,
    /// `OrdinaryCasual` when loading was applied, otherwise `Ordinary`.
    pub category: PayCategory,
}

/// Applies casual loading to a base rate for casual employees.
///
/// Returns `AmountOverflow` if the loaded rate is out of decimal range.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::apply_casual_loading;
/// use payroll_engine::models::{Employee, EmploymentType, PayCategory};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Avery Lee".to_string(),
///     employment_type: EmploymentType::Casual,
///     classification_code: "level_3".to_string(),
///     employment_start_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
///     termination_date: None,
///     base_hourly_rate: None,
///     tags: vec![],
/// };
///
/// let result =
///     apply_casual_loading(Decimal::new(2854, 2), &employee, Decimal::new(125, 2)).unwrap();
/// assert_eq!(result.loaded_rate, Decimal::new(356750, 4));
/// assert_eq!(result.category, PayCategory::OrdinaryCasual);
/// ```
pub fn apply_casual_loading(
    base_rate: Decimal,
    employee: &Employee,
    multiplier: Decimal,
) -> Result<CasualLoadingResult, CalculationError> {
    if !employee.is_casual() {
        return Ok(CasualLoadingResult {
            loaded_rate: base_rate,
            category: PayCategory::Ordinary,
        });
    }

    let loaded_rate =
        base_rate
            .checked_mul(multiplier)
            .ok_or_else(|| CalculationError::AmountOverflow {
                item: "casual loaded rate".to_string(),
            })?;
    Ok(CasualLoadingResult {
        loaded_rate,
        category: PayCategory::OrdinaryCasual,
    })
}
