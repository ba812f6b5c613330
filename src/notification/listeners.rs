//! Built-in listeners: audit trail, run progress, payroll officer alerts.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{EventKind, ListenerError, PayrollEvent, PayrollListener};

fn lock_error(listener: &str) -> ListenerError {
    ListenerError::new(format!("{} state lock poisoned", listener))
}

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The event kind.
    pub kind: EventKind,
    /// The period concerned.
    pub period_id: Uuid,
    /// The acting user, if any.
    pub user_id: Option<String>,
    /// The full event as JSON.
    pub detail: serde_json::Value,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Writes every event to the log and keeps an in-memory audit trail.
#[derive(Debug, Default)]
pub struct AuditTrailListener {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditTrailListener {
    /// Creates an empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl PayrollListener for AuditTrailListener {
    fn name(&self) -> &str {
        "audit_trail"
    }

    fn handle(&self, event: &PayrollEvent) -> Result<(), ListenerError> {
        let detail = serde_json::to_value(event)
            .map_err(|e| ListenerError::new(format!("failed to serialize event: {}", e)))?;
        let entry = AuditEntry {
            kind: event.kind(),
            period_id: event.period().id,
            user_id: event.user_id().map(str::to_string),
            detail,
            recorded_at: Utc::now(),
        };

        info!(
            target: "payroll::audit",
            event = %entry.kind,
            period_id = %entry.period_id,
            user_id = entry.user_id.as_deref().unwrap_or("-"),
            "Payroll audit event"
        );

        self.entries
            .lock()
            .map_err(|_| lock_error(self.name()))?
            .push(entry);
        Ok(())
    }
}

/// State of a period's latest run as seen by the progress tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    /// The run is processing employees.
    Running,
    /// The run finished its employee set.
    Completed,
    /// The run aborted.
    Failed,
}

/// Progress of a period's latest run, for a progress display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    /// Current state.
    pub state: ProgressState,
    /// The user who started the run.
    pub started_by: String,
    /// Employees calculated successfully so far.
    pub calculated: usize,
    /// Final success count, once completed.
    pub success_count: Option<usize>,
    /// Final failure count, once completed.
    pub failure_count: Option<usize>,
    /// Error message, once failed.
    pub error_message: Option<String>,
}

/// Tracks per-period run progress from lifecycle events.
#[derive(Debug, Default)]
pub struct RunProgressTracker {
    runs: Mutex<HashMap<Uuid, RunProgress>>,
}

impl RunProgressTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the progress of the latest run of a period.
    pub fn progress(&self, period_id: Uuid) -> Option<RunProgress> {
        self.runs
            .lock()
            .ok()
            .and_then(|runs| runs.get(&period_id).cloned())
    }
}

impl PayrollListener for RunProgressTracker {
    fn name(&self) -> &str {
        "run_progress"
    }

    fn handle(&self, event: &PayrollEvent) -> Result<(), ListenerError> {
        let mut runs = self.runs.lock().map_err(|_| lock_error(self.name()))?;
        let period_id = event.period().id;

        match event {
            PayrollEvent::RunStarted { user_id, .. } => {
                runs.insert(
                    period_id,
                    RunProgress {
                        state: ProgressState::Running,
                        started_by: user_id.clone(),
                        calculated: 0,
                        success_count: None,
                        failure_count: None,
                        error_message: None,
                    },
                );
            }
            PayrollEvent::EmployeeCalculated { .. } => {
                if let Some(progress) = runs.get_mut(&period_id) {
                    progress.calculated += 1;
                }
            }
            PayrollEvent::RunCompleted {
                success_count,
                failure_count,
                ..
            } => {
                if let Some(progress) = runs.get_mut(&period_id) {
                    progress.state = ProgressState::Completed;
                    progress.success_count = Some(*success_count);
                    progress.failure_count = Some(*failure_count);
                }
            }
            PayrollEvent::RunFailed { error_message, .. } => {
                if let Some(progress) = runs.get_mut(&period_id) {
                    progress.state = ProgressState::Failed;
                    progress.error_message = Some(error_message.clone());
                }
            }
            PayrollEvent::PeriodCreated { .. } | PayrollEvent::PeriodClosed { .. } => {}
        }
        Ok(())
    }
}

/// How urgently the payroll officer should look at an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Some employees need attention before the period can close.
    Warning,
    /// The run did not complete.
    Critical,
}

/// An alert queued for the payroll officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerAlert {
    /// The period concerned.
    pub period_id: Uuid,
    /// Severity.
    pub severity: AlertSeverity,
    /// Alert text.
    pub message: String,
}

/// Queues alerts for the payroll officer on failed or partial runs.
///
/// Delivery (mail, chat) is left to whatever drains the outbox.
#[derive(Debug, Default)]
pub struct PayrollOfficerNotifier {
    outbox: Mutex<Vec<OfficerAlert>>,
}

impl PayrollOfficerNotifier {
    /// Creates a notifier with an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued alert.
    pub fn drain_alerts(&self) -> Vec<OfficerAlert> {
        self.outbox
            .lock()
            .map(|mut outbox| std::mem::take(&mut *outbox))
            .unwrap_or_default()
    }
}

impl PayrollListener for PayrollOfficerNotifier {
    fn name(&self) -> &str {
        "payroll_officer"
    }

    fn handle(&self, event: &PayrollEvent) -> Result<(), ListenerError> {
        let alert = match event {
            PayrollEvent::RunFailed {
                period,
                error_message,
                user_id,
            } => OfficerAlert {
                period_id: period.id,
                severity: AlertSeverity::Critical,
                message: format!(
                    "Payroll run for '{}' started by {} failed: {}",
                    period.name, user_id, error_message
                ),
            },
            PayrollEvent::RunCompleted {
                period,
                success_count,
                failure_count,
                ..
            } if *failure_count > 0 => OfficerAlert {
                period_id: period.id,
                severity: AlertSeverity::Warning,
                message: format!(
                    "Payroll run for '{}' completed with {} failure(s) and {} success(es); review before closing",
                    period.name, failure_count, success_count
                ),
            },
            _ => return Ok(()),
        };

        self.outbox
            .lock()
            .map_err(|_| lock_error(self.name()))?
            .push(alert);
        Ok(())
    }
}
