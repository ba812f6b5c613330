//! Employee model and related types.
//!
//! This module defines the Employee struct and EmploymentType enum
//! for representing workers processed by a payroll run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayrollPeriod;

/// Represents the type of employment arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Full-time employment.
    FullTime,
    /// Part-time employment.
    PartTime,
    /// Casual employment (no guaranteed hours, includes casual loading).
    Casual,
}

/// Represents an employee on the payroll roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The type of employment arrangement.
    pub employment_type: EmploymentType,
    /// The pay classification code (e.g., "level_3").
    pub classification_code: String,
    /// The date the employee started employment.
    pub employment_start_date: NaiveDate,
    /// The last day of employment, if the employee has left.
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    /// Optional override for the base hourly rate.
    #[serde(default)]
    pub base_hourly_rate: Option<Decimal>,
    /// Tags used to select deduction rules (e.g., "union_member").
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Employee {
    /// Returns true if the employee is a casual worker.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, EmploymentType};
    /// use chrono::NaiveDate;
    ///
    /// let casual = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Avery Lee".to_string(),
    ///     employment_type: EmploymentType::Casual,
    ///     classification_code: "level_3".to_string(),
    ///     employment_start_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
    ///     termination_date: None,
    ///     base_hourly_rate: None,
    ///     tags: vec![],
    /// };
    /// assert!(casual.is_casual());
    /// ```
    pub fn is_casual(&self) -> bool {
        self.employment_type == EmploymentType::Casual
    }

    /// Returns true if the employment overlaps the period window.
    pub fn is_active_during(&self, period: &PayrollPeriod) -> bool {
        if self.employment_start_date > period.end_date {
            return false;
        }
        match self.termination_date {
            Some(last_day) => last_day >= period.start_date,
            None => true,
        }
    }

    /// Returns true if the employee carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
