//! Device triggers for LIVISI Smart Home
//!
//! Lists the button and motion triggers of a device based on its model and
//! attaches them as generic event triggers on `livisi_event`.

use async_trait::async_trait;
use ha_core::const_keys::{CONF_DEVICE_ID, CONF_TYPE};
use ha_device_automation::{
    DeviceAutomationError, DeviceAutomationResult, DeviceLookup, DeviceTriggerConfig,
    DeviceTriggerPlatform, EventTriggerConfig, EventTriggerFacility, TriggerAction, TriggerInfo,
    Unsubscribe, DEVICE_PLATFORM,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::capabilities::{CapabilityTable, ModelCapabilities};
use crate::constants::{ATTR_BUTTON_INDEX, ATTR_PRESS_TYPE, DOMAIN, LIVISI_EVENT};
use crate::event::PressType;
use crate::trigger::TriggerDescriptor;

/// Device trigger platform of the LIVISI integration
pub struct LivisiDeviceTriggers {
    devices: Arc<dyn DeviceLookup>,
    event_trigger: Arc<dyn EventTriggerFacility>,
    capabilities: CapabilityTable,
}

impl LivisiDeviceTriggers {
    /// Platform using only the built-in model knowledge
    pub fn new(
        devices: Arc<dyn DeviceLookup>,
        event_trigger: Arc<dyn EventTriggerFacility>,
    ) -> Self {
        Self {
            devices,
            event_trigger,
            capabilities: CapabilityTable::builtin(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capability_table(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Resolve a device and look up its model
    ///
    /// A device without a model resolves to no capabilities.
    async fn device_capabilities(
        &self,
        device_id: &str,
    ) -> DeviceAutomationResult<ModelCapabilities> {
        let device = self.devices.resolve(device_id).await?;
        Ok(device
            .model
            .as_deref()
            .map(|model| self.capabilities.capabilities(model))
            .unwrap_or_default())
    }

    /// List every trigger the device supports
    ///
    /// Fails with `DeviceNotFound` for unknown devices; a known device
    /// without buttons or motion sensor yields an empty list.
    pub async fn list_triggers(
        &self,
        device_id: &str,
    ) -> DeviceAutomationResult<Vec<TriggerDescriptor>> {
        let capabilities = self.device_capabilities(device_id).await?;

        let triggers: Vec<TriggerDescriptor> = capabilities
            .trigger_kinds()
            .into_iter()
            .map(|kind| TriggerDescriptor::new(device_id, kind))
            .collect();

        debug!(
            device_id,
            buttons = capabilities.buttons,
            motion = capabilities.motion,
            count = triggers.len(),
            "Listed LIVISI device triggers"
        );
        Ok(triggers)
    }

    /// Parse a raw config into a descriptor
    pub fn validate_trigger_config(
        &self,
        config: serde_json::Value,
    ) -> DeviceAutomationResult<TriggerDescriptor> {
        TriggerDescriptor::from_value(config)
    }

    /// Attach a trigger and return its cancellation handle
    ///
    /// The descriptor must refer to a button or sensor the device's model
    /// actually has.
    pub async fn attach_trigger(
        &self,
        descriptor: &TriggerDescriptor,
        action: TriggerAction,
        info: TriggerInfo,
    ) -> DeviceAutomationResult<Unsubscribe> {
        let capabilities = self.device_capabilities(&descriptor.device_id).await?;
        if !capabilities.supports(descriptor.kind) {
            return Err(DeviceAutomationError::invalid_config(format!(
                "device {} has no {}{}",
                descriptor.device_id,
                descriptor.trigger_type(),
                descriptor
                    .subtype()
                    .map(|s| format!(" on {}", s))
                    .unwrap_or_default()
            )));
        }

        let event_config = event_trigger_config(descriptor);
        debug!(
            device_id = %descriptor.device_id,
            trigger_type = %descriptor.trigger_type(),
            automation = %info.name,
            "Attaching LIVISI device trigger"
        );

        self.event_trigger
            .attach(event_config, action, info, DEVICE_PLATFORM)
            .await
    }
}

/// Translate a descriptor into the event trigger matching its events
pub fn event_trigger_config(descriptor: &TriggerDescriptor) -> EventTriggerConfig {
    let trigger_type = descriptor.trigger_type();
    let mut config = EventTriggerConfig::new(LIVISI_EVENT)
        .with_data(CONF_TYPE, json!(trigger_type.as_str()))
        .with_data(CONF_DEVICE_ID, json!(descriptor.device_id));

    if let Some(button) = descriptor.kind.button() {
        config = config.with_data(ATTR_BUTTON_INDEX, json!(button));
    }
    if let Some(press_type) = PressType::for_trigger_type(trigger_type) {
        config = config.with_data(ATTR_PRESS_TYPE, json!(press_type.as_str()));
    }
    config
}

#[async_trait]
impl DeviceTriggerPlatform for LivisiDeviceTriggers {
    fn domain(&self) -> &str {
        DOMAIN
    }

    async fn get_triggers(
        &self,
        device_id: &str,
    ) -> DeviceAutomationResult<Vec<DeviceTriggerConfig>> {
        Ok(self
            .list_triggers(device_id)
            .await?
            .into_iter()
            .map(DeviceTriggerConfig::from)
            .collect())
    }

    async fn validate_trigger_config(
        &self,
        config: DeviceTriggerConfig,
    ) -> DeviceAutomationResult<DeviceTriggerConfig> {
        TriggerDescriptor::try_from(config).map(DeviceTriggerConfig::from)
    }

    async fn attach_trigger(
        &self,
        config: DeviceTriggerConfig,
        action: TriggerAction,
        info: TriggerInfo,
    ) -> DeviceAutomationResult<Unsubscribe> {
        let descriptor = TriggerDescriptor::try_from(config)?;
        LivisiDeviceTriggers::attach_trigger(self, &descriptor, action, info).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerKind;

    #[test]
    fn test_event_config_for_long_press() {
        let descriptor = TriggerDescriptor::new("dev1", TriggerKind::ButtonLongPress(2));
        let config = event_trigger_config(&descriptor);

        assert_eq!(config.event_type, LIVISI_EVENT);
        assert_eq!(
            serde_json::Value::Object(config.event_data),
            json!({
                "type": "button_long_press",
                "device_id": "dev1",
                "button_index": 2,
                "press_type": "LongPress"
            })
        );
    }

    #[test]
    fn test_event_config_for_short_press() {
        let descriptor = TriggerDescriptor::new("dev1", TriggerKind::ButtonPress(1));
        let config = event_trigger_config(&descriptor);

        assert_eq!(config.event_data["press_type"], "ShortPress");
        assert_eq!(config.event_data["button_index"], 1);
    }

    #[test]
    fn test_event_config_for_motion() {
        let descriptor = TriggerDescriptor::new("dev1", TriggerKind::MotionDetected);
        let config = event_trigger_config(&descriptor);

        assert_eq!(
            serde_json::Value::Object(config.event_data),
            json!({"type": "motion_detected", "device_id": "dev1"})
        );
    }
}
