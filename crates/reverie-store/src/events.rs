//! Change notifications for UI observers.
//!
//! Events are published over a `tokio::sync::broadcast` channel for async
//! consumers and also delivered synchronously to callbacks registered with
//! [`ChangeNotifier::on_change`].

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::broadcast;

/// Something observers may want to refresh for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum StoreEvent {
    /// The set of saved dreams changed.
    DreamsChanged,
    /// A streak milestone was just reached.
    MilestoneUnlocked(u32),
}

type Callback = Box<dyn Fn(StoreEvent) + Send + Sync>;

/// Publish/subscribe hub.  Cheap to clone; clones share subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<StoreEvent>,
    callbacks: Arc<Mutex<Vec<Callback>>>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            callbacks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Publish an event.  Having no listeners is not an error.
    pub fn publish(&self, event: StoreEvent) {
        tracing::debug!(?event, "publishing store event");

        let _ = self.tx.send(event);

        match self.callbacks.lock() {
            Ok(callbacks) => {
                for callback in callbacks.iter() {
                    callback(event);
                }
            }
            Err(_) => tracing::error!(?event, "observer list poisoned, event not delivered"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Register a synchronous observer.  Callbacks must not publish.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(StoreEvent) + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.push(Box::new(callback));
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}
