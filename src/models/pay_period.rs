//! Payroll period model and its status lifecycle.
//!
//! A [`PayrollPeriod`] moves through
//! `open → processing → {closed | processing (awaiting review) | failed}`.
//! Only a `closed` period refuses new runs.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Created and not yet run.
    Open,
    /// A run is active, or a partial run is awaiting operator review.
    Processing,
    /// All employees calculated and the period is locked.
    Closed,
    /// The last run could not complete at all.
    Failed,
}

impl PeriodStatus {
    /// Returns the lowercase wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodStatus::Open => "open",
            PeriodStatus::Processing => "processing",
            PeriodStatus::Closed => "closed",
            PeriodStatus::Failed => "failed",
        }
    }

    /// Returns true if a new run may be started from this status.
    pub fn accepts_run(&self) -> bool {
        !matches!(self, PeriodStatus::Closed)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the pay cycle window being processed.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayrollPeriod, PeriodStatus};
/// use chrono::NaiveDate;
///
/// let period = PayrollPeriod::new(
///     "July 2026 (1)",
///     NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 14).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(period.status, PeriodStatus::Open);
/// assert_eq!(period.days(), 14);
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 7, 14).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Unique identifier for the period.
    pub id: Uuid,
    /// Human-readable label.
    pub name: String,
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Current lifecycle status.
    pub status: PeriodStatus,
    /// When the period was created.
    pub created_at: DateTime<Utc>,
    /// When the period last changed status.
    pub updated_at: DateTime<Utc>,
    /// The user who closed the period, once closed.
    #[serde(default)]
    pub closed_by: Option<String>,
}

impl PayrollPeriod {
    /// Creates a new `open` period.
    ///
    /// Returns `InvalidPeriod` if the end date precedes the start date.
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Self> {
        if end_date < start_date {
            return Err(EngineError::InvalidPeriod {
                message: format!("end date {} is before start date {}", end_date, start_date),
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date,
            end_date,
            status: PeriodStatus::Open,
            created_at: now,
            updated_at: now,
            closed_by: None,
        })
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days in the period, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Moves the period into `processing` for a new run.
    ///
    /// Allowed from `open`, `processing` (re-run after a partial run) and
    /// `failed`. A `closed` period is rejected with `PeriodNotRunnable`.
    pub fn begin_run(&mut self) -> EngineResult<()> {
        if !self.status.accepts_run() {
            return Err(EngineError::PeriodNotRunnable {
                period_id: self.id,
                status: self.status,
            });
        }
        self.set_status(PeriodStatus::Processing);
        Ok(())
    }

    /// Closes a `processing` period, locking its calculations.
    pub fn close(&mut self, user_id: &str) -> EngineResult<()> {
        self.require(PeriodStatus::Processing, PeriodStatus::Closed)?;
        self.closed_by = Some(user_id.to_string());
        self.set_status(PeriodStatus::Closed);
        Ok(())
    }

    /// Marks a `processing` period as failed.
    pub fn fail(&mut self) -> EngineResult<()> {
        self.require(PeriodStatus::Processing, PeriodStatus::Failed)?;
        self.set_status(PeriodStatus::Failed);
        Ok(())
    }

    fn require(&self, from: PeriodStatus, to: PeriodStatus) -> EngineResult<()> {
        if self.status != from {
            return Err(EngineError::InvalidTransition {
                period_id: self.id,
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    fn set_status(&mut self, status: PeriodStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
