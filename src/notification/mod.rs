//! Payroll lifecycle notifications.
//!
//! Runs publish [`PayrollEvent`]s through an [`EventDispatcher`]; listeners
//! subscribe per [`EventKind`] and can never affect the run that published.

mod dispatcher;
mod events;
mod listeners;

pub use dispatcher::{DispatcherBuilder, EventDispatcher, ListenerError, PayrollListener};
pub use events::{EventKind, PayrollEvent};
pub use listeners::{
    AlertSeverity, AuditEntry, AuditTrailListener, OfficerAlert, PayrollOfficerNotifier,
    ProgressState, RunProgress, RunProgressTracker,
};
