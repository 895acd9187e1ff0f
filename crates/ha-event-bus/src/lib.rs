//! Event bus with typed pub/sub for Home Assistant
//!
//! Integrations fire device events on the bus; generic event triggers
//! subscribe to one event type and filter the data they receive.

use dashmap::DashMap;
use ha_core::{Context, Event, EventData, EventType};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Default channel capacity for event subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// The event bus for publishing and subscribing to events
///
/// Each event type gets its own broadcast channel, created on first
/// subscription. A separate channel feeds MATCH_ALL subscribers.
pub struct EventBus {
    listeners: DashMap<EventType, broadcast::Sender<Event<serde_json::Value>>>,
    match_all_sender: broadcast::Sender<Event<serde_json::Value>>,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (match_all_sender, _) = broadcast::channel(capacity);
        Self {
            listeners: DashMap::new(),
            match_all_sender,
            capacity,
        }
    }

    /// Subscribe to events of a specific type
    ///
    /// The receiver only sees events fired after this call returns.
    pub fn subscribe(
        &self,
        event_type: impl Into<EventType>,
    ) -> broadcast::Receiver<Event<serde_json::Value>> {
        let event_type = event_type.into();
        trace!(event_type = %event_type, "Subscribing to event type");

        if event_type.is_match_all() {
            return self.match_all_sender.subscribe();
        }

        self.listeners
            .entry(event_type)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Fire an event to the subscribers of its type and to MATCH_ALL subscribers
    pub fn fire(&self, event: Event<serde_json::Value>) {
        debug!(event_type = %event.event_type, "Firing event");

        if let Some(sender) = self.listeners.get(&event.event_type) {
            // A send error only means nobody is listening right now
            let _ = sender.send(event.clone());
        }

        let _ = self.match_all_sender.send(event);
    }

    /// Fire a typed event
    ///
    /// Data that fails to serialize is logged and dropped.
    pub fn fire_typed<T: EventData + serde::Serialize>(&self, data: T, context: Context) {
        let json_data = match serde_json::to_value(&data) {
            Ok(value) => value,
            Err(e) => {
                warn!(event_type = T::event_type(), error = %e, "Dropping unserializable event");
                return;
            }
        };
        self.fire(Event::new(T::event_type(), json_data, context));
    }

    /// Number of live receivers for an event type
    pub fn receiver_count(&self, event_type: &str) -> usize {
        self.listeners
            .get(&EventType::from(event_type))
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
