//! Device events raised for LIVISI triggers
//!
//! The controller side fires one `livisi_event` per button press or motion
//! detection. Attached device triggers match on a subset of this payload.

use ha_core::{Context, EventData};
use ha_event_bus::EventBus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::LIVISI_EVENT;
use crate::trigger::{TriggerKind, TriggerType};

/// Press duration classification of a button event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressType {
    ShortPress,
    LongPress,
}

impl PressType {
    /// Press type implied by a trigger type, `None` for non-button types
    pub fn for_trigger_type(trigger_type: TriggerType) -> Option<Self> {
        match trigger_type {
            TriggerType::ButtonPress => Some(PressType::ShortPress),
            TriggerType::ButtonLongPress => Some(PressType::LongPress),
            TriggerType::MotionDetected => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PressType::ShortPress => "ShortPress",
            PressType::LongPress => "LongPress",
        }
    }

    /// Trigger type an event with this press type belongs to
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            PressType::ShortPress => TriggerType::ButtonPress,
            PressType::LongPress => TriggerType::ButtonLongPress,
        }
    }
}

/// Data of a `livisi_event`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub device_id: String,

    #[serde(rename = "type")]
    pub trigger_type: TriggerType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_index: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub press_type: Option<PressType>,
}

impl EventPayload {
    pub fn button(device_id: impl Into<String>, button_index: u8, press_type: PressType) -> Self {
        Self {
            device_id: device_id.into(),
            trigger_type: press_type.trigger_type(),
            button_index: Some(button_index),
            press_type: Some(press_type),
        }
    }

    pub fn motion(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            trigger_type: TriggerType::MotionDetected,
            button_index: None,
            press_type: None,
        }
    }

    /// The trigger this event fires, if well formed
    pub fn trigger_kind(&self) -> Option<TriggerKind> {
        match (self.trigger_type, self.button_index) {
            (TriggerType::ButtonPress, Some(n)) => Some(TriggerKind::ButtonPress(n)),
            (TriggerType::ButtonLongPress, Some(n)) => Some(TriggerKind::ButtonLongPress(n)),
            (TriggerType::MotionDetected, None) => Some(TriggerKind::MotionDetected),
            _ => None,
        }
    }
}

impl EventData for EventPayload {
    fn event_type() -> &'static str {
        LIVISI_EVENT
    }
}

/// Fire a `livisi_event` on the bus
pub fn fire_event(bus: &EventBus, payload: EventPayload, context: Context) {
    debug!(
        device_id = %payload.device_id,
        trigger_type = %payload.trigger_type,
        button_index = ?payload.button_index,
        "Firing LIVISI device event"
    );
    bus.fire_typed(payload, context);
}
