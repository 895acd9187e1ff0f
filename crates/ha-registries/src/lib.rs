//! Home Assistant Registries
//!
//! Integrations register their devices here; device automations resolve a
//! `device_id` to its entry (and model) through the device registry.

pub mod device_registry;

pub use device_registry::{DeviceEntry, DeviceIdentifier, DeviceRegistry};
