//! Observer bus decoupling the core from the rendering layer.
//!
//! Views never poll: every persisted mutation and every scan-state
//! transition is pushed here, and subscribers recompute from current state.

use std::sync::{Arc, Mutex};

use crate::services::scan::ScanState;

/// Notification emitted by the services.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The student roster changed (create/update/delete/import).
    RosterChanged,
    /// The equipment inventory changed (create/update/delete/seed).
    InventoryChanged,
    /// The transaction ledger changed (checkout/check-in/rename cascade).
    LedgerChanged,
    /// The scan interpreter moved to a new state.
    ScanStateChanged(ScanState),
}

type Subscriber = Box<dyn Fn(&AppEvent) + Send>;

/// Fan-out of [`AppEvent`]s to registered subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked synchronously on every event.
    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&AppEvent) + Send + 'static,
    {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(Box::new(subscriber));
        }
    }

    /// Deliver an event to every subscriber, in registration order.
    pub fn emit(&self, event: AppEvent) {
        if let Ok(subscribers) = self.subscribers.lock() {
            for subscriber in subscribers.iter() {
                subscriber(&event);
            }
        }
    }
}
