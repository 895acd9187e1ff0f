//! LIVISI Smart Home integration
//!
//! Exposes the physical buttons and motion sensors of LIVISI (formerly
//! RWE/innogy SmartHome) devices as device triggers.
//!
//! # Key Types
//!
//! - [`CapabilityTable`] - Which triggers each device model offers
//! - [`LivisiDeviceTriggers`] - Lists and attaches device triggers
//! - [`TriggerDescriptor`] - A trigger as stored in automation configs
//! - [`EventPayload`] - Data of the `livisi_event` the triggers match on
//! - [`LivisiConfig`] - Integration configuration

pub mod capabilities;
pub mod config;
pub mod constants;
pub mod device_trigger;
pub mod error;
pub mod event;
pub mod setup;
pub mod trigger;

pub use capabilities::{CapabilityTable, ModelCapabilities};
pub use config::{ControllerKind, LivisiConfig};
pub use constants::{DOMAIN, LIVISI_EVENT};
pub use device_trigger::{event_trigger_config, LivisiDeviceTriggers};
pub use error::{ConfigError, ConfigResult};
pub use event::{fire_event, EventPayload, PressType};
pub use setup::{register_device, setup_device_triggers};
pub use trigger::{TriggerDescriptor, TriggerKind, TriggerType};
