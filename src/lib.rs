//! Payroll Run Engine
//!
//! This crate runs payroll for a pay period: it moves the period through its
//! lifecycle, calculates every employee on a bounded worker pool while
//! isolating per-employee failures, persists one calculation record per
//! employee and period, and publishes lifecycle events to subscribed
//! listeners.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod notification;
pub mod orchestration;
pub mod roster;
pub mod store;
