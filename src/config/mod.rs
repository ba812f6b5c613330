//! Configuration loading and management for the Payroll Run Engine.
//!
//! This module provides functionality to load payroll configuration from YAML
//! files: engine settings, rate tables by effective date, and deduction rules.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Workers: {}", config.settings().worker_count());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DeductionMethod, DeductionRule, DeductionsConfig, EngineSettings, PayrollConfig, RateTable,
};
