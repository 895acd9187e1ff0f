//! Generic event trigger
//!
//! Device triggers of event based integrations translate their config into
//! an [`EventTriggerConfig`] and hand it to an [`EventTriggerFacility`],
//! which owns the actual subscription and invokes the action on a match.

use async_trait::async_trait;
use ha_core::const_keys::{CONF_EVENT_DATA, CONF_EVENT_TYPE};
use ha_core::Event;
use ha_event_bus::EventBus;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::error::{DeviceAutomationError, DeviceAutomationResult};
use crate::trigger::{TriggerAction, TriggerData, TriggerInfo};
use crate::unsubscribe::Unsubscribe;

/// Subscription request for the generic event trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTriggerConfig {
    /// Event type to match
    pub event_type: String,

    /// Subset of the event data that must match
    #[serde(default)]
    pub event_data: serde_json::Map<String, serde_json::Value>,
}

impl EventTriggerConfig {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            event_data: serde_json::Map::new(),
        }
    }

    /// Require `key` to equal `value` in the event data
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.event_data.insert(key.into(), value);
        self
    }

    pub fn validate(&self) -> DeviceAutomationResult<()> {
        if self.event_type.is_empty() || self.event_type == "*" {
            return Err(DeviceAutomationError::invalid_config(format!(
                "{} must name a single event type",
                CONF_EVENT_TYPE
            )));
        }
        if self.event_data.keys().any(|k| k.is_empty()) {
            return Err(DeviceAutomationError::invalid_config(format!(
                "{} keys must not be empty",
                CONF_EVENT_DATA
            )));
        }
        Ok(())
    }

    /// Check an event against the type and data filter
    pub fn matches(&self, event: &Event<serde_json::Value>) -> bool {
        if event.event_type.as_str() != self.event_type {
            return false;
        }
        let serde_json::Value::Object(actual) = &event.data else {
            return self.event_data.is_empty();
        };
        self.event_data.iter().all(|(key, expected)| {
            actual
                .get(key)
                .map(|value| json_matches(value, expected))
                .unwrap_or(false)
        })
    }
}

/// Attaches event triggers on behalf of other trigger platforms
#[async_trait]
pub trait EventTriggerFacility: Send + Sync {
    /// Subscribe `action` to events matching `config`
    ///
    /// `platform_type` becomes the `platform` of the produced TriggerData.
    /// The subscription is live when this returns.
    async fn attach(
        &self,
        config: EventTriggerConfig,
        action: TriggerAction,
        info: TriggerInfo,
        platform_type: &str,
    ) -> DeviceAutomationResult<Unsubscribe>;
}

/// Event trigger backed by the event bus
///
/// Each attached trigger gets its own receiver and listener task.
pub struct BusEventTrigger {
    bus: Arc<EventBus>,
}

impl BusEventTrigger {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl EventTriggerFacility for BusEventTrigger {
    async fn attach(
        &self,
        config: EventTriggerConfig,
        action: TriggerAction,
        info: TriggerInfo,
        platform_type: &str,
    ) -> DeviceAutomationResult<Unsubscribe> {
        config.validate()?;

        let mut rx = self.bus.subscribe(config.event_type.as_str());
        let active = Arc::new(AtomicBool::new(true));
        let task_active = active.clone();
        let platform_type = platform_type.to_string();

        debug!(
            automation = %info.name,
            event_type = %config.event_type,
            event_data = ?config.event_data,
            "Attaching event trigger"
        );

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if !task_active.load(Ordering::SeqCst) {
                            break;
                        }
                        if !config.matches(&event) {
                            trace!(event_type = %event.event_type, "Event data doesn't match");
                            continue;
                        }

                        let mut data = TriggerData::new(platform_type.as_str())
                            .with_var("event_type", serde_json::json!(config.event_type))
                            .with_var("event", event.data.clone())
                            .with_var(
                                "description",
                                serde_json::json!(format!("event '{}'", config.event_type)),
                            );
                        if let Some(id) = &info.trigger_id {
                            data = data.with_id(id);
                        }

                        debug!(automation = %info.name, "Event trigger matched");
                        action(data).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(automation = %info.name, "Event trigger lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(automation = %info.name, "Event bus closed, stopping trigger");
                        task_active.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }
        });

        Ok(Unsubscribe::for_task(active, task))
    }
}

/// Check if actual JSON matches expected pattern
///
/// Objects match when every expected key matches; arrays must match exactly.
pub fn json_matches(actual: &serde_json::Value, expected: &serde_json::Value) -> bool {
    match (actual, expected) {
        (serde_json::Value::Object(actual_obj), serde_json::Value::Object(expected_obj)) => {
            expected_obj.iter().all(|(key, expected_val)| {
                actual_obj
                    .get(key)
                    .map(|actual_val| json_matches(actual_val, expected_val))
                    .unwrap_or(false)
            })
        }
        (serde_json::Value::Array(actual_arr), serde_json::Value::Array(expected_arr)) => {
            actual_arr.len() == expected_arr.len()
                && actual_arr
                    .iter()
                    .zip(expected_arr.iter())
                    .all(|(a, e)| json_matches(a, e))
        }
        _ => actual == expected,
    }
}
