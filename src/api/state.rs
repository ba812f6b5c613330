//! Application state for the Payroll Run Engine API.

use std::sync::Arc;

use crate::orchestration::PayrollRunOrchestrator;

/// Shared application state.
///
/// Holds the orchestrator every handler delegates to.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<PayrollRunOrchestrator>,
}

impl AppState {
    /// Creates a new application state around an orchestrator.
    pub fn new(orchestrator: PayrollRunOrchestrator) -> Self {
        Self::from_shared(Arc::new(orchestrator))
    }

    /// Creates a state sharing an orchestrator with other callers.
    pub fn from_shared(orchestrator: Arc<PayrollRunOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Returns the orchestrator.
    pub fn orchestrator(&self) -> &PayrollRunOrchestrator {
        &self.orchestrator
    }
}
