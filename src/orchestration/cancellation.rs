//! Cooperative cancellation and the per-period run lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Cancellation handle for a run.
///
/// Clones share one flag. The run checks it between employees only; an
/// employee already being calculated always finishes.
#[derive(Debug, Clone, Default)]
pub struct RunCancellation {
    cancelled: Arc<AtomicBool>,
}

impl RunCancellation {
    /// Creates a handle that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Set of periods that currently have a run, recalculation or close in
/// flight.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunLocks {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl RunLocks {
    /// Claims the period, or fails with `RunInProgress` if already claimed.
    pub(crate) fn acquire(&self, period_id: Uuid) -> EngineResult<RunGuard> {
        let mut active = self.active.lock().map_err(|_| EngineError::Storage {
            message: "run lock poisoned".to_string(),
        })?;
        if !active.insert(period_id) {
            return Err(EngineError::RunInProgress { period_id });
        }
        Ok(RunGuard {
            active: Arc::clone(&self.active),
            period_id,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self, period_id: Uuid) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(&period_id))
            .unwrap_or(false)
    }
}

/// Releases the period's claim when dropped.
#[derive(Debug)]
pub(crate) struct RunGuard {
    active: Arc<Mutex<HashSet<Uuid>>>,
    period_id: Uuid,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut active = match self.active.lock() {
            Ok(active) => active,
            Err(poisoned) => poisoned.into_inner(),
        };
        active.remove(&self.period_id);
    }
}
