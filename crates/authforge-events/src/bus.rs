//! The event bus.

use authforge_protocol::NetworkEvent;
use tokio::sync::broadcast;

/// Default number of events a slow subscriber may lag behind before it
/// starts missing events.
const DEFAULT_CAPACITY: usize = 64;

/// Where the orchestrator publishes domain-wide notifications.
///
/// `publish` is synchronous and infallible: the orchestrator doesn't wait
/// for listeners and doesn't care whether there are any.
pub trait EventBus: Send + Sync + 'static {
    fn publish(&self, event: NetworkEvent);
}

/// An [`EventBus`] over a `tokio::sync::broadcast` channel.
///
/// Every subscriber gets every event published after it subscribed.
/// A subscriber that falls more than `capacity` events behind receives
/// `RecvError::Lagged` and skips ahead.
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<NetworkEvent>,
}

impl BroadcastEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: NetworkEvent) {
        tracing::debug!(?event, "publishing event");
        // `send` only fails when there are no receivers.
        if self.sender.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }
}
