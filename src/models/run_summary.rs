//! Run summary returned by a payroll run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PeriodStatus;

/// How a run that reached the end of its employee set turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every employee succeeded; the period was closed.
    Completed,
    /// At least one employee failed; the period awaits operator review.
    PartiallyCompleted,
    /// The run was cancelled between employees.
    Cancelled,
}

/// Aggregate counts for one run. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Correlation id of the run.
    pub run_id: Uuid,
    /// The period that was processed.
    pub period_id: Uuid,
    /// Number of employees submitted to the run.
    pub submitted_count: usize,
    /// Employees whose calculation succeeded.
    pub success_count: usize,
    /// Employees whose calculation failed.
    pub failure_count: usize,
    /// Employees never started because the run was cancelled.
    pub skipped_count: usize,
    /// Ids of employees whose calculation failed, in submission order.
    pub failed_employees: Vec<String>,
    /// The user who started the run.
    pub initiated_by: String,
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Period status after the run.
    pub period_status: PeriodStatus,
}

impl RunSummary {
    /// Number of employees that were actually processed.
    pub fn processed_count(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// Returns true when every submitted employee is accounted for.
    pub fn is_balanced(&self) -> bool {
        self.processed_count() + self.skipped_count == self.submitted_count
    }
}
