//! Event bus for alert lifecycle events.
//!
//! Broadcast pub/sub plus a bounded in-memory history ring so diagnostics
//! and tests can inspect what happened without having subscribed up front.
//! Publishing never fails: an event with no subscribers still lands in the
//! history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;

use super::types::AlertEvent;

/// Broadcast channel capacity.
const CHANNEL_CAPACITY: usize = 256;

/// Maximum events retained in the history ring.
pub const HISTORY_CAPACITY: usize = 256;

/// Shared reference to an [`EventBus`].
pub type SharedEventBus = Arc<EventBus>;

/// Event bus with broadcast fan-out and bounded history.
pub struct EventBus {
    sender: broadcast::Sender<AlertEvent>,
    history: Mutex<VecDeque<AlertEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
        }
    }

    /// Create a shared reference to this bus.
    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish an event to all subscribers and record it in the history.
    pub fn publish(&self, event: AlertEvent) {
        {
            let mut history = self.history.lock().expect("history lock poisoned");
            if history.len() == HISTORY_CAPACITY {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, "event published"),
            // No receivers is fine — the history still has it.
            Err(_) => debug!("event published (no receivers)"),
        }
    }

    /// Subscribe to receive future events.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Snapshot of retained events, oldest first.
    pub fn history(&self) -> Vec<AlertEvent> {
        self.history
            .lock()
            .expect("history lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Retained events matching a predicate, oldest first.
    pub fn history_matching(&self, pred: impl Fn(&AlertEvent) -> bool) -> Vec<AlertEvent> {
        self.history().into_iter().filter(|e| pred(e)).collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
