//! Integration setup

use ha_device_automation::{DeviceLookup, DeviceTriggerPlatforms, EventTriggerFacility};
use ha_registries::{DeviceEntry, DeviceIdentifier, DeviceRegistry};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::LivisiConfig;
use crate::constants::{DOMAIN, MANUFACTURER};
use crate::device_trigger::LivisiDeviceTriggers;

/// Build the device trigger platform from the config and register it
pub fn setup_device_triggers(
    config: &LivisiConfig,
    devices: Arc<dyn DeviceLookup>,
    event_trigger: Arc<dyn EventTriggerFacility>,
    platforms: &DeviceTriggerPlatforms,
) -> Arc<LivisiDeviceTriggers> {
    let table = config.capability_table();
    let configured = table.configured_models().count();

    let triggers =
        Arc::new(LivisiDeviceTriggers::new(devices, event_trigger).with_capabilities(table));
    platforms.register(triggers.clone());

    info!(
        host = %config.host,
        port = config.port(),
        configured_models = configured,
        "LIVISI device triggers set up"
    );
    triggers
}

/// Register a controller device in the device registry
///
/// Devices are keyed by their LIVISI id, so registering the same device
/// again returns the existing entry with its model refreshed.
pub fn register_device(
    registry: &DeviceRegistry,
    livisi_id: &str,
    model: &str,
    name: Option<&str>,
    config_entry_id: Option<&str>,
) -> Arc<DeviceEntry> {
    let identifiers = [DeviceIdentifier::new(DOMAIN, livisi_id)];
    let entry = registry.get_or_create(&identifiers, config_entry_id, name);

    if entry.model.as_deref() == Some(model) && entry.manufacturer.is_some() {
        return entry;
    }

    debug!(device_id = %entry.id, livisi_id, model, "Updating LIVISI device model");
    registry
        .update(&entry.id, |device| {
            device.model = Some(model.to_string());
            device.manufacturer = Some(MANUFACTURER.to_string());
        })
        .unwrap_or(entry)
}
