//! Device Automations
//!
//! This crate is the seam between the automation engine and integrations
//! that expose device triggers.
//!
//! # Architecture
//!
//! ```text
//! raw config → DeviceTriggerPlatforms → DeviceTriggerPlatform (integration)
//!                                          │
//!                                          ├─ DeviceLookup (device registry)
//!                                          └─ EventTriggerFacility (event bus)
//! ```
//!
//! # Key Types
//!
//! - [`DeviceTriggerConfig`] - Base schema shared by all device triggers
//! - [`DeviceTriggerPlatform`] - Implemented by integrations
//! - [`EventTriggerFacility`] - Generic event trigger device triggers delegate to
//! - [`Unsubscribe`] - Idempotent cancellation handle

pub mod error;
pub mod event_trigger;
pub mod lookup;
pub mod platform;
pub mod schema;
pub mod trigger;
pub mod unsubscribe;

pub use error::{DeviceAutomationError, DeviceAutomationResult};
pub use event_trigger::{json_matches, BusEventTrigger, EventTriggerConfig, EventTriggerFacility};
pub use lookup::{DeviceInfo, DeviceLookup};
pub use platform::{DeviceTriggerPlatform, DeviceTriggerPlatforms};
pub use schema::{DeviceTriggerConfig, DEVICE_PLATFORM};
pub use trigger::{action_fn, TriggerAction, TriggerData, TriggerInfo};
pub use unsubscribe::Unsubscribe;
