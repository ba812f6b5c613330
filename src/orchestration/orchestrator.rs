//! The payroll run orchestrator.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::calculation::{panic_message, EmployeePayrollCalculator, InputSource};
use crate::config::EngineSettings;
use crate::error::{CalculationError, EngineError, EngineResult};
use crate::models::{
    Employee, EmployeePayrollCalculation, PayBreakdown, PayrollPeriod, PeriodStatus, RunOutcome,
    RunSummary,
};
use crate::notification::{EventDispatcher, PayrollEvent};
use crate::roster::RosterSource;
use crate::store::{CalculationStore, PeriodStore};

use super::cancellation::{RunCancellation, RunLocks};

/// Where a run takes its employees from.
enum EmployeeSet {
    /// Supplied by the caller; validated before any state change.
    Provided(Vec<Employee>),
    /// Read from the roster once the period is processing.
    Roster,
}

/// What a worker task hands back for one employee.
struct WorkerReport {
    index: usize,
    employee: Employee,
    /// `None` when the run was cancelled before the employee started.
    outcome: Option<Result<PayBreakdown, CalculationError>>,
}

#[derive(Debug, Default)]
struct RunTally {
    success_count: usize,
    failure_count: usize,
    skipped_count: usize,
    failed: Vec<(usize, String)>,
}

/// Drives payroll runs for periods.
///
/// Owns the period state machine, runs employees through the
/// [`EmployeePayrollCalculator`] on a bounded worker pool, persists one record
/// per (employee, period) and publishes lifecycle events. A failure for one
/// employee is recorded and never stops the others; only faults outside
/// per-employee processing abort a run.
///
/// At most one run, recalculation or close is in flight per period; a second
/// attempt gets `RunInProgress`. Clones share the stores, the dispatcher and
/// the run lock.
#[derive(Clone)]
pub struct PayrollRunOrchestrator {
    periods: Arc<dyn PeriodStore>,
    calculations: Arc<dyn CalculationStore>,
    roster: Arc<dyn RosterSource>,
    calculator: EmployeePayrollCalculator,
    events: EventDispatcher,
    locks: RunLocks,
    workers: usize,
}

impl PayrollRunOrchestrator {
    /// Creates an orchestrator over its stores, roster and input source.
    pub fn new(
        periods: Arc<dyn PeriodStore>,
        calculations: Arc<dyn CalculationStore>,
        roster: Arc<dyn RosterSource>,
        source: Arc<dyn InputSource>,
        events: EventDispatcher,
        settings: EngineSettings,
    ) -> Self {
        let workers = settings.worker_count();
        Self {
            periods,
            calculations,
            roster,
            calculator: EmployeePayrollCalculator::new(source, settings),
            events,
            locks: RunLocks::default(),
            workers,
        }
    }

    /// Returns the event dispatcher runs publish to.
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Creates a new `open` period.
    pub fn create_period(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        user_id: &str,
    ) -> EngineResult<PayrollPeriod> {
        let period = PayrollPeriod::new(name, start_date, end_date)?;
        self.periods.insert_period(period.clone())?;

        info!(
            period_id = %period.id,
            name = %period.name,
            start_date = %period.start_date,
            end_date = %period.end_date,
            user_id,
            "Payroll period created"
        );
        self.events.publish(PayrollEvent::PeriodCreated {
            period: period.clone(),
            user_id: user_id.to_string(),
        });
        Ok(period)
    }

    /// Loads a period.
    pub fn period(&self, period_id: Uuid) -> EngineResult<PayrollPeriod> {
        self.periods.get_period(period_id)
    }

    /// Lists every period, most recent first.
    pub fn periods(&self) -> EngineResult<Vec<PayrollPeriod>> {
        self.periods.list_periods()
    }

    /// Returns the calculation records of a period, ordered by employee id.
    pub fn calculations(&self, period_id: Uuid) -> EngineResult<Vec<EmployeePayrollCalculation>> {
        self.periods.get_period(period_id)?;
        self.calculations.get_calculations(period_id)
    }

    /// Runs payroll for a period over a caller-supplied employee set.
    ///
    /// The employee set must be non-empty with unique ids, the period must
    /// exist and not be closed, and no other run may be active on it. These
    /// are checked before anything changes; a violation returns the error and
    /// publishes nothing.
    ///
    /// Returns the run summary once the employee set has been processed. If
    /// the input source or the store fails the period is marked `failed`,
    /// `RunFailed` is published and the error is returned.
    ///
    /// Once started, a run finishes on its own task: dropping the returned
    /// future stops the wait, not the run.
    pub async fn run_payroll(
        &self,
        period_id: Uuid,
        employees: Vec<Employee>,
        initiated_by: &str,
    ) -> EngineResult<RunSummary> {
        validate_employees(&employees)?;
        self.execute(
            period_id,
            EmployeeSet::Provided(employees),
            initiated_by,
            &RunCancellation::new(),
        )
        .await
    }

    /// Runs payroll for a period over its roster.
    pub async fn run_period(&self, period_id: Uuid, initiated_by: &str) -> EngineResult<RunSummary> {
        self.run_period_with_cancel(period_id, initiated_by, &RunCancellation::new())
            .await
    }

    /// Runs payroll for a period over its roster, stopping between employees
    /// once `cancellation` is triggered.
    ///
    /// A cancelled run leaves the period `processing` and reports the
    /// unstarted employees as skipped.
    pub async fn run_period_with_cancel(
        &self,
        period_id: Uuid,
        initiated_by: &str,
        cancellation: &RunCancellation,
    ) -> EngineResult<RunSummary> {
        self.execute(period_id, EmployeeSet::Roster, initiated_by, cancellation)
            .await
    }

    /// Recalculates one employee of a period that is not closed.
    ///
    /// The new record supersedes the employee's previous one, whether it
    /// succeeds or fails. The period status is left unchanged.
    pub fn recalculate_employee(
        &self,
        period_id: Uuid,
        employee_id: &str,
        user_id: &str,
    ) -> EngineResult<EmployeePayrollCalculation> {
        let _guard = self.locks.acquire(period_id)?;
        let period = self.periods.get_period(period_id)?;
        if period.status == PeriodStatus::Closed {
            return Err(EngineError::PeriodClosed { period_id });
        }

        let employee = self
            .roster
            .employees_for(&period)?
            .into_iter()
            .find(|employee| employee.id == employee_id)
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
                period_id,
            })?;
        self.calculator.prepare(&period)?;

        let outcome = self.calculator.calculate(&employee, &period);
        let succeeded = outcome.is_ok();
        let stored = self.store_outcome(Uuid::new_v4(), &period, &employee, outcome, user_id)?;

        info!(
            period_id = %period_id,
            employee_id,
            user_id,
            succeeded,
            revision = stored.revision,
            "Employee recalculated"
        );
        if succeeded {
            self.events.publish(PayrollEvent::EmployeeCalculated {
                employee,
                period,
                calculation: stored.clone(),
            });
        }
        Ok(stored)
    }

    /// Closes a `processing` period after operator review.
    ///
    /// Refused with `UnresolvedCalculations` while any of the period's
    /// records is failed.
    pub fn close_period(&self, period_id: Uuid, user_id: &str) -> EngineResult<PayrollPeriod> {
        let _guard = self.locks.acquire(period_id)?;
        let mut period = self.periods.get_period(period_id)?;
        if period.status == PeriodStatus::Closed {
            return Err(EngineError::PeriodClosed { period_id });
        }

        let unresolved = self.unresolved_count(period_id)?;
        if unresolved > 0 {
            return Err(EngineError::UnresolvedCalculations {
                period_id,
                count: unresolved,
            });
        }

        period.close(user_id)?;
        self.periods.save_period(&period)?;

        info!(period_id = %period_id, user_id, "Payroll period closed by operator");
        self.events.publish(PayrollEvent::PeriodClosed {
            period: period.clone(),
            user_id: user_id.to_string(),
        });
        Ok(period)
    }

    async fn execute(
        &self,
        period_id: Uuid,
        employee_set: EmployeeSet,
        initiated_by: &str,
        cancellation: &RunCancellation,
    ) -> EngineResult<RunSummary> {
        let guard = self.locks.acquire(period_id)?;
        let mut period = self.periods.get_period(period_id)?;
        period.begin_run()?;
        self.periods.save_period(&period)?;

        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            period_id = %period_id,
            initiated_by,
            "Payroll run started"
        );
        self.events.publish(PayrollEvent::RunStarted {
            period: period.clone(),
            user_id: initiated_by.to_string(),
        });

        // The task owns the run lock until the period is settled.
        let run = self.clone();
        let started = period.clone();
        let user_id = initiated_by.to_string();
        let cancellation = cancellation.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            run.drive(run_id, started, employee_set, &user_id, &cancellation)
                .await
        });

        match handle.await {
            Ok(result) => result,
            Err(err) => {
                let err = EngineError::WorkerFailed {
                    message: err.to_string(),
                };
                Err(self.abort(run_id, period, err, initiated_by))
            }
        }
    }

    async fn drive(
        &self,
        run_id: Uuid,
        mut period: PayrollPeriod,
        employee_set: EmployeeSet,
        initiated_by: &str,
        cancellation: &RunCancellation,
    ) -> EngineResult<RunSummary> {
        let period_id = period.id;
        let start = Instant::now();

        let employees = match self.resolve_employees(&period, employee_set) {
            Ok(employees) => employees,
            Err(err) => return Err(self.abort(run_id, period, err, initiated_by)),
        };
        if let Err(err) = self.calculator.prepare(&period) {
            return Err(self.abort(run_id, period, err, initiated_by));
        }

        let submitted_count = employees.len();
        let tally = match self
            .process(run_id, &period, employees, initiated_by, cancellation)
            .await
        {
            Ok(tally) => tally,
            Err(err) => return Err(self.abort(run_id, period, err, initiated_by)),
        };

        let mut outcome = if tally.skipped_count > 0 {
            RunOutcome::Cancelled
        } else if tally.failure_count == 0 {
            RunOutcome::Completed
        } else {
            RunOutcome::PartiallyCompleted
        };

        if outcome == RunOutcome::Completed {
            let unresolved = match self.unresolved_count(period_id) {
                Ok(count) => count,
                Err(err) => return Err(self.abort(run_id, period, err, initiated_by)),
            };
            if unresolved > 0 {
                warn!(
                    run_id = %run_id,
                    period_id = %period_id,
                    unresolved,
                    "Failed records from an earlier run remain; period left open for review"
                );
                outcome = RunOutcome::PartiallyCompleted;
            } else {
                let mut closed = period.clone();
                if let Err(err) = closed
                    .close(initiated_by)
                    .and_then(|()| self.periods.save_period(&closed))
                {
                    return Err(self.abort(run_id, period, err, initiated_by));
                }
                period = closed;
            }
        }

        info!(
            run_id = %run_id,
            period_id = %period_id,
            submitted = submitted_count,
            success_count = tally.success_count,
            failure_count = tally.failure_count,
            skipped_count = tally.skipped_count,
            outcome = ?outcome,
            period_status = %period.status,
            duration_us = start.elapsed().as_micros() as u64,
            "Payroll run completed"
        );
        self.events.publish(PayrollEvent::RunCompleted {
            period: period.clone(),
            success_count: tally.success_count,
            failure_count: tally.failure_count,
            user_id: initiated_by.to_string(),
        });

        let mut failed = tally.failed;
        failed.sort_by_key(|(index, _)| *index);
        Ok(RunSummary {
            run_id,
            period_id,
            submitted_count,
            success_count: tally.success_count,
            failure_count: tally.failure_count,
            skipped_count: tally.skipped_count,
            failed_employees: failed.into_iter().map(|(_, id)| id).collect(),
            initiated_by: initiated_by.to_string(),
            outcome,
            period_status: period.status,
        })
    }

    fn resolve_employees(
        &self,
        period: &PayrollPeriod,
        employee_set: EmployeeSet,
    ) -> EngineResult<Vec<Employee>> {
        match employee_set {
            EmployeeSet::Provided(employees) => Ok(employees),
            EmployeeSet::Roster => {
                let employees = self.roster.employees_for(period)?;
                validate_employees(&employees)?;
                Ok(employees)
            }
        }
    }

    async fn process(
        &self,
        run_id: Uuid,
        period: &PayrollPeriod,
        employees: Vec<Employee>,
        initiated_by: &str,
        cancellation: &RunCancellation,
    ) -> EngineResult<RunTally> {
        let shared_period = Arc::new(period.clone());
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (index, employee) in employees.into_iter().enumerate() {
            let permits = Arc::clone(&permits);
            let period = Arc::clone(&shared_period);
            let calculator = self.calculator.clone();
            let cancellation = cancellation.clone();

            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return WorkerReport {
                        index,
                        employee,
                        outcome: None,
                    };
                };
                if cancellation.is_cancelled() {
                    return WorkerReport {
                        index,
                        employee,
                        outcome: None,
                    };
                }

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    calculator.calculate(&employee, &period)
                }))
                .unwrap_or_else(|payload| {
                    Err(CalculationError::SourceFault {
                        message: panic_message(payload.as_ref()),
                    })
                });
                WorkerReport {
                    index,
                    employee,
                    outcome: Some(outcome),
                }
            });
        }

        let mut tally = RunTally::default();
        while let Some(joined) = tasks.join_next().await {
            let report = joined.map_err(|err| EngineError::WorkerFailed {
                message: err.to_string(),
            })?;
            let Some(outcome) = report.outcome else {
                tally.skipped_count += 1;
                continue;
            };

            let succeeded = outcome.is_ok();
            let stored =
                self.store_outcome(run_id, period, &report.employee, outcome, initiated_by)?;
            if succeeded {
                tally.success_count += 1;
                self.events.publish(PayrollEvent::EmployeeCalculated {
                    employee: report.employee,
                    period: period.clone(),
                    calculation: stored,
                });
            } else {
                tally.failure_count += 1;
                tally.failed.push((report.index, report.employee.id));
            }
        }

        if tally.skipped_count > 0 {
            warn!(
                run_id = %run_id,
                period_id = %period.id,
                skipped_count = tally.skipped_count,
                "Payroll run cancelled before every employee started"
            );
        }
        Ok(tally)
    }

    fn store_outcome(
        &self,
        run_id: Uuid,
        period: &PayrollPeriod,
        employee: &Employee,
        outcome: Result<PayBreakdown, CalculationError>,
        user_id: &str,
    ) -> EngineResult<EmployeePayrollCalculation> {
        let record = match outcome {
            Ok(breakdown) => {
                debug!(
                    run_id = %run_id,
                    period_id = %period.id,
                    employee_id = %employee.id,
                    gross = %breakdown.gross,
                    net = %breakdown.net,
                    "Employee calculated"
                );
                EmployeePayrollCalculation::succeeded(period.id, &employee.id, breakdown, user_id)
            }
            Err(err) => {
                warn!(
                    run_id = %run_id,
                    period_id = %period.id,
                    employee_id = %employee.id,
                    code = err.code(),
                    error = %err,
                    "Employee calculation failed"
                );
                EmployeePayrollCalculation::failed(period.id, &employee.id, &err, user_id)
            }
        };
        self.calculations.upsert_calculation(record)
    }

    fn unresolved_count(&self, period_id: Uuid) -> EngineResult<usize> {
        Ok(self
            .calculations
            .get_calculations(period_id)?
            .iter()
            .filter(|calculation| calculation.is_failed())
            .count())
    }

    /// Marks the period failed, publishes `RunFailed` and hands the error back.
    fn abort(
        &self,
        run_id: Uuid,
        mut period: PayrollPeriod,
        err: EngineError,
        initiated_by: &str,
    ) -> EngineError {
        error!(
            run_id = %run_id,
            period_id = %period.id,
            initiated_by,
            error = %err,
            "Payroll run failed"
        );

        match period.fail() {
            Ok(()) => {
                if let Err(save_err) = self.periods.save_period(&period) {
                    error!(
                        run_id = %run_id,
                        period_id = %period.id,
                        error = %save_err,
                        "Could not persist failed period status"
                    );
                }
            }
            Err(transition_err) => warn!(
                run_id = %run_id,
                period_id = %period.id,
                error = %transition_err,
                "Period not marked failed"
            ),
        }

        self.events.publish(PayrollEvent::RunFailed {
            period,
            error_message: err.to_string(),
            user_id: initiated_by.to_string(),
        });
        err
    }
}

fn validate_employees(employees: &[Employee]) -> EngineResult<()> {
    if employees.is_empty() {
        return Err(EngineError::InvalidRoster {
            message: "no employees to process".to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(employees.len());
    for employee in employees {
        if !seen.insert(employee.id.as_str()) {
            return Err(EngineError::InvalidRoster {
                message: format!("duplicate employee id '{}'", employee.id),
            });
        }
    }
    Ok(())
}
