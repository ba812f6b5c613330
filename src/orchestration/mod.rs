//! Payroll run orchestration.
//!
//! [`PayrollRunOrchestrator`] owns the period lifecycle and drives each run
//! over a bounded worker pool. [`RunCancellation`] stops a run between
//! employees.

mod cancellation;
mod orchestrator;

pub use cancellation::RunCancellation;
pub use orchestrator::PayrollRunOrchestrator;
