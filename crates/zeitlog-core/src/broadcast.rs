//! Event fan-out to connected observers.
//!
//! The hub keeps a registry of bounded channels, one per observer. Delivery
//! is best-effort: a closed or full channel is unregistered on the spot and
//! the broadcast continues to the rest. Sends never block the mutation path
//! and failed sends are never retried, so a dead observer cannot delay or
//! fail the request that triggered the event. Late subscribers see no
//! replay of missed events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::events::Event;

/// Per-observer channel capacity. An observer that falls this far behind is
/// dropped rather than buffered without bound.
const CHANNEL_CAPACITY: usize = 256;

/// Opaque handle identifying one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

/// Registry of connected observer channels.
#[derive(Clone, Default)]
pub struct BroadcastHub {
    subscribers: Arc<Mutex<HashMap<SubscriberId, mpsc::Sender<Event>>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer. Returns the handle and the receiving end of
    /// its channel.
    pub fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<Event>) {
        let id = SubscriberId(Uuid::new_v4());
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        self.lock().insert(id.clone(), sender);
        (id, receiver)
    }

    /// Remove an observer. Safe to call for an already-removed handle.
    pub fn unsubscribe(&self, id: &SubscriberId) {
        self.lock().remove(id);
    }

    /// Deliver `event` to every registered observer. Channels that refuse
    /// the send (closed, or full beyond capacity) are silently unregistered.
    pub fn broadcast(&self, event: &Event) {
        let mut subscribers = self.lock();
        let mut dead: Vec<SubscriberId> = Vec::new();
        for (id, sender) in subscribers.iter() {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Closed(_)) | Err(TrySendError::Full(_)) => {
                    dead.push(id.clone());
                }
            }
        }
        for id in dead {
            subscribers.remove(&id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<Event>>> {
        // Subscriber maps hold no invariants across a panic; recover the map.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(id: i64) -> Event {
        Event::EntryDeleted { id }
    }

    #[test]
    fn delivers_to_all_subscribers() {
        let hub = BroadcastHub::new();
        let (_a, mut rx_a) = hub.subscribe();
        let (_b, mut rx_b) = hub.subscribe();

        hub.broadcast(&sample_event(1));

        assert_eq!(rx_a.try_recv().unwrap(), sample_event(1));
        assert_eq!(rx_b.try_recv().unwrap(), sample_event(1));
    }

    #[test]
    fn closed_channel_is_dropped_and_others_still_receive() {
        let hub = BroadcastHub::new();
        let (_a, rx_a) = hub.subscribe();
        let (_b, mut rx_b) = hub.subscribe();
        drop(rx_a);

        hub.broadcast(&sample_event(2));

        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(rx_b.try_recv().unwrap(), sample_event(2));
    }

    #[test]
    fn full_channel_is_dropped_not_awaited() {
        let hub = BroadcastHub::new();
        let (_a, _rx_a) = hub.subscribe();
        for i in 0..(CHANNEL_CAPACITY as i64) {
            hub.broadcast(&sample_event(i));
        }
        assert_eq!(hub.subscriber_count(), 1);

        // One past capacity: the stalled observer is unregistered.
        hub.broadcast(&sample_event(-1));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_removes_channel() {
        let hub = BroadcastHub::new();
        let (id, mut rx) = hub.subscribe();
        hub.unsubscribe(&id);

        hub.broadcast(&sample_event(3));
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.subscriber_count(), 0);
    }
}
