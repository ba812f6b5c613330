//! Lifecycle events published by payroll runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Employee, EmployeePayrollCalculation, PayrollPeriod};

/// Discriminant used to subscribe listeners to one kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A period was created.
    PeriodCreated,
    /// A run started.
    RunStarted,
    /// One employee was calculated successfully.
    EmployeeCalculated,
    /// A run reached the end of its employee set.
    RunCompleted,
    /// A run could not complete at all.
    RunFailed,
    /// An operator closed a period.
    PeriodClosed,
}

impl EventKind {
    /// Every event kind.
    pub const ALL: [EventKind; 6] = [
        EventKind::PeriodCreated,
        EventKind::RunStarted,
        EventKind::EmployeeCalculated,
        EventKind::RunCompleted,
        EventKind::RunFailed,
        EventKind::PeriodClosed,
    ];

    /// Returns the snake_case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PeriodCreated => "period_created",
            EventKind::RunStarted => "run_started",
            EventKind::EmployeeCalculated => "employee_calculated",
            EventKind::RunCompleted => "run_completed",
            EventKind::RunFailed => "run_failed",
            EventKind::PeriodClosed => "period_closed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payroll lifecycle notification.
///
/// Period snapshots are taken at the moment of publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PayrollEvent {
    /// A period was created by an administrator.
    PeriodCreated {
        /// The new period.
        period: PayrollPeriod,
        /// The creating user.
        user_id: String,
    },
    /// A run started.
    RunStarted {
        /// The period, now `processing`.
        period: PayrollPeriod,
        /// The initiating user.
        user_id: String,
    },
    /// One employee was calculated successfully.
    EmployeeCalculated {
        /// The employee.
        employee: Employee,
        /// The period being run.
        period: PayrollPeriod,
        /// The stored calculation record.
        calculation: EmployeePayrollCalculation,
    },
    /// A run processed its employee set (fully, partially, or until cancelled).
    RunCompleted {
        /// The period after the run.
        period: PayrollPeriod,
        /// Employees that succeeded.
        success_count: usize,
        /// Employees that failed.
        failure_count: usize,
        /// The initiating user.
        user_id: String,
    },
    /// A run aborted on an unrecoverable fault.
    RunFailed {
        /// The period, now `failed`.
        period: PayrollPeriod,
        /// What went wrong.
        error_message: String,
        /// The initiating user.
        user_id: String,
    },
    /// An operator closed a period after review.
    PeriodClosed {
        /// The closed period.
        period: PayrollPeriod,
        /// The closing user.
        user_id: String,
    },
}

impl PayrollEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            PayrollEvent::PeriodCreated { .. } => EventKind::PeriodCreated,
            PayrollEvent::RunStarted { .. } => EventKind::RunStarted,
            PayrollEvent::EmployeeCalculated { .. } => EventKind::EmployeeCalculated,
            PayrollEvent::RunCompleted { .. } => EventKind::RunCompleted,
            PayrollEvent::RunFailed { .. } => EventKind::RunFailed,
            PayrollEvent::PeriodClosed { .. } => EventKind::PeriodClosed,
        }
    }

    /// Returns the period the event concerns.
    pub fn period(&self) -> &PayrollPeriod {
        match self {
            PayrollEvent::PeriodCreated { period, .. }
            | PayrollEvent::RunStarted { period, .. }
            | PayrollEvent::EmployeeCalculated { period, .. }
            | PayrollEvent::RunCompleted { period, .. }
            | PayrollEvent::RunFailed { period, .. }
            | PayrollEvent::PeriodClosed { period, .. } => period,
        }
    }

    /// Returns the acting user, where the event carries one.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            PayrollEvent::PeriodCreated { user_id, .. }
            | PayrollEvent::RunStarted { user_id, .. }
            | PayrollEvent::RunCompleted { user_id, .. }
            | PayrollEvent::RunFailed { user_id, .. }
            | PayrollEvent::PeriodClosed { user_id, .. } => Some(user_id.as_str()),
            PayrollEvent::EmployeeCalculated { calculation, .. } => {
                Some(calculation.calculated_by.as_str())
            }
        }
    }
}
