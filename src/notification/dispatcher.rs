//! Non-blocking fan-out of payroll events to subscribed listeners.
//!
//! Publishing only enqueues. A dedicated delivery thread hands each event to
//! the listeners subscribed to its kind, in subscription order. A listener
//! that errors, panics or stalls never reaches the publisher.

use std::collections::HashMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::calculation::panic_message;

use super::{EventKind, PayrollEvent};

/// Error returned by a listener that could not handle an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Creates a listener error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Consumer of payroll events.
pub trait PayrollListener: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Handles one event.
    fn handle(&self, event: &PayrollEvent) -> Result<(), ListenerError>;
}

type ListenerMap = HashMap<EventKind, Vec<Arc<dyn PayrollListener>>>;

enum Envelope {
    Event(PayrollEvent),
    Flush(oneshot::Sender<()>),
}

/// Builds an [`EventDispatcher`] from per-kind listener subscriptions.
#[derive(Default)]
pub struct DispatcherBuilder {
    listeners: ListenerMap,
}

impl DispatcherBuilder {
    /// Creates a builder with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a listener to one event kind.
    pub fn subscribe(mut self, kind: EventKind, listener: Arc<dyn PayrollListener>) -> Self {
        self.listeners.entry(kind).or_default().push(listener);
        self
    }

    /// Subscribes a listener to every event kind.
    pub fn subscribe_all(mut self, listener: Arc<dyn PayrollListener>) -> Self {
        for kind in EventKind::ALL {
            self.listeners
                .entry(kind)
                .or_default()
                .push(Arc::clone(&listener));
        }
        self
    }

    /// Starts the delivery thread and returns the dispatcher.
    pub fn build(self) -> io::Result<EventDispatcher> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let listeners = self.listeners;
        thread::Builder::new()
            .name("payroll-events".to_string())
            .spawn(move || deliver(listeners, receiver))?;
        Ok(EventDispatcher {
            sender: Some(sender),
        })
    }
}

/// Publishes payroll events without waiting for listeners.
///
/// Clones share the same delivery thread. The thread stops once every clone
/// has been dropped and the queue is drained.
#[derive(Clone)]
pub struct EventDispatcher {
    sender: Option<mpsc::UnboundedSender<Envelope>>,
}

impl EventDispatcher {
    /// Returns a dispatcher that discards every event.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Queues an event for delivery and returns immediately.
    pub fn publish(&self, event: PayrollEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        let kind = event.kind();
        if sender.send(Envelope::Event(event)).is_err() {
            warn!(event = %kind, "Event delivery thread has stopped; dropping event");
        }
    }

    /// Waits until every event published before this call has been handed to
    /// its listeners.
    pub async fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if sender.send(Envelope::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

fn deliver(listeners: ListenerMap, mut receiver: mpsc::UnboundedReceiver<Envelope>) {
    while let Some(envelope) = receiver.blocking_recv() {
        match envelope {
            Envelope::Event(event) => dispatch(&listeners, &event),
            Envelope::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Event delivery thread stopped");
}

fn dispatch(listeners: &ListenerMap, event: &PayrollEvent) {
    let kind = event.kind();
    let Some(subscribed) = listeners.get(&kind) else {
        return;
    };

    for listener in subscribed {
        match panic::catch_unwind(AssertUnwindSafe(|| listener.handle(event))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(
                listener = listener.name(),
                event = %kind,
                period_id = %event.period().id,
                error = %err,
                "Listener failed to handle event"
            ),
            Err(payload) => warn!(
                listener = listener.name(),
                event = %kind,
                period_id = %event.period().id,
                panic = %panic_message(payload.as_ref()),
                "Listener panicked while handling event"
            ),
        }
    }
}
