//! Base schema shared by all device triggers
//!
//! Every device trigger config carries `platform: device`, the `device_id`
//! and the `domain` of the integration that provides it. Integrations
//! validate the remaining keys themselves.

use ha_core::const_keys::{CONF_DEVICE_ID, CONF_DOMAIN, CONF_PLATFORM};
use serde::{Deserialize, Serialize};

use crate::error::{DeviceAutomationError, DeviceAutomationResult};

/// Platform tag of device triggers
pub const DEVICE_PLATFORM: &str = "device";

/// A device trigger config split into base fields and integration fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTriggerConfig {
    pub platform: String,

    pub device_id: String,

    pub domain: String,

    /// Integration specific keys (e.g. `type`, `subtype`)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceTriggerConfig {
    pub fn new(device_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            platform: DEVICE_PLATFORM.to_string(),
            device_id: device_id.into(),
            domain: domain.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add an integration specific key
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Parse a raw config and check the base fields
    pub fn from_value(value: serde_json::Value) -> DeviceAutomationResult<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| DeviceAutomationError::invalid_config(e.to_string()))?;
        config.validate_base()?;
        Ok(config)
    }

    /// Check the base fields
    pub fn validate_base(&self) -> DeviceAutomationResult<()> {
        if self.platform != DEVICE_PLATFORM {
            return Err(DeviceAutomationError::invalid_config(format!(
                "{} must be '{}', got '{}'",
                CONF_PLATFORM, DEVICE_PLATFORM, self.platform
            )));
        }
        if self.device_id.is_empty() {
            return Err(DeviceAutomationError::invalid_config(format!(
                "{} must not be empty",
                CONF_DEVICE_ID
            )));
        }
        if self.domain.is_empty() {
            return Err(DeviceAutomationError::invalid_config(format!(
                "{} must not be empty",
                CONF_DOMAIN
            )));
        }
        Ok(())
    }

    /// Get an integration specific string field
    pub fn extra_str(&self, key: &str) -> DeviceAutomationResult<Option<&str>> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(DeviceAutomationError::invalid_config(format!(
                "{} must be a string, got {}",
                key, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_splits_extra_keys() {
        let config = DeviceTriggerConfig::from_value(json!({
            "platform": "device",
            "device_id": "abc",
            "domain": "livisi",
            "type": "button_press",
            "subtype": "button_1"
        }))
        .unwrap();

        assert_eq!(config.device_id, "abc");
        assert_eq!(config.domain, "livisi");
        assert_eq!(config.extra_str("type").unwrap(), Some("button_press"));
        assert_eq!(config.extra_str("subtype").unwrap(), Some("button_1"));
        assert_eq!(config.extra_str("missing").unwrap(), None);
    }

    #[test]
    fn test_wrong_platform_rejected() {
        let err = DeviceTriggerConfig::from_value(json!({
            "platform": "state",
            "device_id": "abc",
            "domain": "livisi"
        }))
        .unwrap_err();

        assert!(matches!(err, DeviceAutomationError::InvalidTriggerConfig(_)));
    }

    #[test]
    fn test_missing_device_id_rejected() {
        let result = DeviceTriggerConfig::from_value(json!({
            "platform": "device",
            "domain": "livisi"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_string_extra_rejected() {
        let config = DeviceTriggerConfig::new("abc", "livisi").with_extra("type", json!(3));
        assert!(config.extra_str("type").is_err());
    }

    #[test]
    fn test_serialize_flattens_extra() {
        let config = DeviceTriggerConfig::new("abc", "livisi")
            .with_extra("type", json!("motion_detected"));

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "platform": "device",
                "device_id": "abc",
                "domain": "livisi",
                "type": "motion_detected"
            })
        );
    }
}
