//! Core types for Home Assistant
//!
//! This crate provides the fundamental types shared by the event bus, the
//! registries and integrations: Event, EventType, Context, and the
//! configuration keys used by device automations.

mod context;
mod event;

pub use context::Context;
pub use event::{Event, EventData, EventOrigin, EventType};

/// Configuration keys shared by device automation schemas
pub mod const_keys {
    pub const CONF_PLATFORM: &str = "platform";
    pub const CONF_DEVICE_ID: &str = "device_id";
    pub const CONF_DOMAIN: &str = "domain";
    pub const CONF_TYPE: &str = "type";
    pub const CONF_SUBTYPE: &str = "subtype";
    pub const CONF_EVENT_TYPE: &str = "event_type";
    pub const CONF_EVENT_DATA: &str = "event_data";
    pub const CONF_HOST: &str = "host";
}

