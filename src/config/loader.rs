//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{DeductionsConfig, EngineSettings, PayrollConfig, RateTable};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml       # Worker pool and arithmetic settings
/// ├── deductions.yaml   # Deduction rules
/// └── rates/
///     └── 2026-07-01.yaml  # Hourly rates effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
/// let rate = loader.get_hourly_rate("level_3", date).unwrap();
/// println!("Hourly rate: ${}", rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing (`ConfigNotFound`)
    /// or contains invalid YAML (`ConfigParseError`).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let deductions = Self::load_yaml::<DeductionsConfig>(&path.join("deductions.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let config = PayrollConfig::new(settings, rates, deductions.deductions);
        tracing::debug!(
            path = %path.display(),
            rate_tables = config.rates().len(),
            deduction_rules = config.deductions().len(),
            "Loaded payroll configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateTable>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rates.push(Self::load_yaml::<RateTable>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Gets the hourly rate for a classification on a given date.
    ///
    /// Uses the most recent rate table effective on or before the date.
    /// Returns `None` when no table is effective or the classification is
    /// absent from it.
    pub fn get_hourly_rate(&self, classification: &str, date: NaiveDate) -> Option<Decimal> {
        self.config
            .rate_table_for(date)
            .and_then(|table| table.rates.get(classification).copied())
    }
}
