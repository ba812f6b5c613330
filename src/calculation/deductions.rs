//! Deduction calculation.

use rust_decimal::Decimal;

use crate::config::{DeductionMethod, DeductionRule};
use crate::error::CalculationError;
use crate::models::DeductionLine;

use super::round_money;

/// Applies deduction rules to a gross amount, in rule order.
///
/// Returns `AmountOverflow` if a percentage deduction is out of decimal range.
pub fn calculate_deductions(
    gross: Decimal,
    rules: &[DeductionRule],
) -> Result<Vec<DeductionLine>, CalculationError> {
    rules
        .iter()
        .map(|rule| {
            let amount = match &rule.method {
                DeductionMethod::Percentage { rate } => gross
                    .checked_mul(*rate)
                    .map(round_money)
                    .ok_or_else(|| CalculationError::AmountOverflow {
                        item: format!("deduction '{}'", rule.code),
                    })?,
                DeductionMethod::Fixed { amount } => round_money(*amount),
            };
            Ok(DeductionLine {
                code: rule.code.clone(),
                description: rule.description.clone(),
                amount,
            })
        })
        .collect()
}
