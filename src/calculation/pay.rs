//! Gross-to-net pay computation for one employee.
//!
//! [`compute_pay`] is pure: no I/O and no shared state, so any number of
//! employees can be computed at once.

use rust_decimal::Decimal;

use crate::config::EngineSettings;
use crate::error::CalculationError;
use crate::models::{Employee, PayBreakdown, PayCategory, PayLine, PayrollPeriod};

use super::{CalculationInputs, apply_casual_loading, calculate_deductions, round_money};

/// Computes an employee's pay breakdown for a period.
///
/// Ordinary hours are paid at the base rate (casual-loaded for casual
/// employees), overtime hours at the base rate times the overtime multiplier.
/// Deductions are taken from gross in rule order.
///
/// # Errors
///
/// - `InvalidRate` if the hourly rate is not positive
/// - `InvalidHours` if hours are negative or exceed the period's ceiling
/// - `NegativeNetPay` if deductions exceed gross
/// - `AmountOverflow` if an amount leaves the decimal range
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{CalculationInputs, compute_pay};
/// use payroll_engine::config::EngineSettings;
/// use payroll_engine::models::{Employee, EmploymentType, PayrollPeriod};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Avery Lee".to_string(),
///     employment_type: EmploymentType::FullTime,
///     classification_code: "level_3".to_string(),
///     employment_start_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
///     termination_date: None,
///     base_hourly_rate: None,
///     tags: vec![],
/// };
/// let period = PayrollPeriod::new(
///     "July 2026 (1)",
///     NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 14).unwrap(),
/// )
/// .unwrap();
/// let inputs = CalculationInputs {
///     hourly_rate: Decimal::new(2940, 2),
///     ordinary_hours: Decimal::new(76, 0),
///     overtime_hours: Decimal::ZERO,
///     deductions: vec![],
/// };
///
/// let breakdown = compute_pay(&employee, &period, &inputs, &EngineSettings::default()).unwrap();
/// assert_eq!(breakdown.gross, Decimal::new(223440, 2));
/// assert_eq!(breakdown.net, breakdown.gross);
/// ```
pub fn compute_pay(
    employee: &Employee,
    period: &PayrollPeriod,
    inputs: &CalculationInputs,
    settings: &EngineSettings,
) -> Result<PayBreakdown, CalculationError> {
    validate_inputs(period, inputs, settings)?;

    let base_rate = inputs.hourly_rate;
    let mut pay_lines = Vec::new();

    if inputs.ordinary_hours > Decimal::ZERO {
        let loading = apply_casual_loading(base_rate, employee, settings.casual_loading)?;
        pay_lines.push(PayLine {
            category: loading.category,
            hours: inputs.ordinary_hours,
            rate: loading.loaded_rate,
            amount: round_money(checked_mul(
                inputs.ordinary_hours,
                loading.loaded_rate,
                "ordinary pay",
            )?),
        });
    }

    if inputs.overtime_hours > Decimal::ZERO {
        let overtime_rate = checked_mul(base_rate, settings.overtime_multiplier, "overtime rate")?;
        pay_lines.push(PayLine {
            category: PayCategory::Overtime,
            hours: inputs.overtime_hours,
            rate: overtime_rate,
            amount: round_money(checked_mul(inputs.overtime_hours, overtime_rate, "overtime pay")?),
        });
    }

    let gross = checked_sum(pay_lines.iter().map(|line| line.amount), "gross pay")?;
    let deduction_lines = calculate_deductions(gross, &inputs.deductions)?;
    let deductions = checked_sum(deduction_lines.iter().map(|line| line.amount), "deductions")?;

    let net = gross
        .checked_sub(deductions)
        .ok_or_else(|| overflow("net pay"))?;
    if net < Decimal::ZERO {
        return Err(CalculationError::NegativeNetPay { gross, deductions });
    }

    Ok(PayBreakdown {
        gross,
        deductions,
        net,
        pay_lines,
        deduction_lines,
    })
}

fn overflow(item: &str) -> CalculationError {
    CalculationError::AmountOverflow {
        item: item.to_string(),
    }
}

fn checked_mul(a: Decimal, b: Decimal, item: &str) -> Result<Decimal, CalculationError> {
    a.checked_mul(b).ok_or_else(|| overflow(item))
}

fn checked_sum(
    mut amounts: impl Iterator<Item = Decimal>,
    item: &str,
) -> Result<Decimal, CalculationError> {
    amounts.try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or_else(|| overflow(item))
    })
}

fn validate_inputs(
    period: &PayrollPeriod,
    inputs: &CalculationInputs,
    settings: &EngineSettings,
) -> Result<(), CalculationError> {
    if inputs.hourly_rate <= Decimal::ZERO {
        return Err(CalculationError::InvalidRate {
            rate: inputs.hourly_rate,
        });
    }

    if inputs.ordinary_hours < Decimal::ZERO || inputs.overtime_hours < Decimal::ZERO {
        return Err(CalculationError::InvalidHours {
            message: format!(
                "hours cannot be negative (ordinary {}, overtime {})",
                inputs.ordinary_hours, inputs.overtime_hours
            ),
        });
    }

    let ceiling = checked_mul(
        settings.max_hours_per_day,
        Decimal::from(period.days()),
        "hour ceiling",
    )?;
    let total = inputs
        .ordinary_hours
        .checked_add(inputs.overtime_hours)
        .ok_or_else(|| overflow("total hours"))?;
    if total > ceiling {
        return Err(CalculationError::InvalidHours {
            message: format!(
                "{} hours exceed the {} hour ceiling for a {} day period",
                total,
                ceiling,
                period.days()
            ),
        });
    }

    Ok(())
}
