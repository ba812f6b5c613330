//! Calculation logic for the Payroll Run Engine.
//!
//! This module contains the per-employee calculator: pure gross-to-net
//! arithmetic (casual loading, overtime, deductions), the [`InputSource`]
//! boundary that turns any source fault into a typed failure, and a
//! configuration-backed source.

mod calculator;
mod casual_loading;
mod config_source;
mod deductions;
mod pay;

use rust_decimal::{Decimal, RoundingStrategy};

pub use calculator::{CalculationInputs, EmployeePayrollCalculator, InputSource};
pub(crate) use calculator::panic_message;
pub use casual_loading::{CasualLoadingResult, apply_casual_loading};
pub use config_source::{AttendanceLedger, ConfigInputSource, HoursWorked};
pub use deductions::calculate_deductions;
pub use pay::compute_pay;

/// Rounds a monetary amount to cents, midpoints away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
