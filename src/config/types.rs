//! Configuration types for payroll runs.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Employee;

fn default_max_concurrency() -> usize {
    4
}

fn default_overtime_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

fn default_casual_loading() -> Decimal {
    Decimal::new(125, 2)
}

fn default_max_hours_per_day() -> Decimal {
    Decimal::new(24, 0)
}

/// Engine settings from engine.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Upper bound on employees calculated at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Multiplier applied to the base rate for overtime hours.
    #[serde(default = "default_overtime_multiplier")]
    pub overtime_multiplier: Decimal,
    /// Multiplier applied to the base rate for casual ordinary hours.
    #[serde(default = "default_casual_loading")]
    pub casual_loading: Decimal,
    /// Ceiling on ordinary hours per calendar day of the period.
    #[serde(default = "default_max_hours_per_day")]
    pub max_hours_per_day: Decimal,
}

impl EngineSettings {
    /// Worker pool size, never below one.
    pub fn worker_count(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            overtime_multiplier: default_overtime_multiplier(),
            casual_loading: default_casual_loading(),
            max_hours_per_day: default_max_hours_per_day(),
        }
    }
}

/// Hourly rates by classification, effective from a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// The date these rates take effect.
    pub effective_date: NaiveDate,
    /// Map of classification code to hourly rate.
    pub rates: HashMap<String, Decimal>,
}

/// How a deduction amount is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeductionMethod {
    /// A fraction of gross pay (0.10 = 10%).
    Percentage {
        /// The fraction to deduct.
        rate: Decimal,
    },
    /// A fixed amount per period.
    Fixed {
        /// The amount to deduct.
        amount: Decimal,
    },
}

/// A deduction rule from deductions.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionRule {
    /// Deduction code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// How the amount is computed.
    pub method: DeductionMethod,
    /// Employee tags this rule is limited to; empty applies to everyone.
    #[serde(default)]
    pub applies_to_tags: Vec<String>,
}

impl DeductionRule {
    /// Returns true if the rule applies to the employee.
    pub fn applies_to(&self, employee: &Employee) -> bool {
        self.applies_to_tags.is_empty() || self.applies_to_tags.iter().any(|t| employee.has_tag(t))
    }
}

/// Deductions configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct DeductionsConfig {
    /// The deduction rules, applied in order.
    pub deductions: Vec<DeductionRule>,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    settings: EngineSettings,
    /// Rate tables sorted oldest first.
    rates: Vec<RateTable>,
    deductions: Vec<DeductionRule>,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        settings: EngineSettings,
        rates: Vec<RateTable>,
        deductions: Vec<DeductionRule>,
    ) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            settings,
            rates: sorted_rates,
            deductions,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all rate tables, oldest first.
    pub fn rates(&self) -> &[RateTable] {
        &self.rates
    }

    /// Returns all deduction rules.
    pub fn deductions(&self) -> &[DeductionRule] {
        &self.deductions
    }

    /// Returns the most recent rate table effective on or before `date`.
    pub fn rate_table_for(&self, date: NaiveDate) -> Option<&RateTable> {
        self.rates.iter().rfind(|r| r.effective_date <= date)
    }

    /// Returns the deduction rules applying to an employee, in file order.
    pub fn deductions_for(&self, employee: &Employee) -> Vec<DeductionRule> {
        self.deductions
            .iter()
            .filter(|rule| rule.applies_to(employee))
            .cloned()
            .collect()
    }
}
