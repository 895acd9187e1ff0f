//! Device lookup for device automations

use async_trait::async_trait;
use ha_registries::DeviceRegistry;
use serde::{Deserialize, Serialize};

use crate::error::{DeviceAutomationError, DeviceAutomationResult};

/// What device automations need to know about a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,

    /// Vendor model string, if the integration reported one
    pub model: Option<String>,

    pub manufacturer: Option<String>,
}

/// Resolves a `device_id` to its [`DeviceInfo`]
#[async_trait]
pub trait DeviceLookup: Send + Sync {
    /// Fails with [`DeviceAutomationError::DeviceNotFound`] for unknown ids
    /// and with [`DeviceAutomationError::Registry`] when the lookup itself
    /// could not be answered
    async fn resolve(&self, device_id: &str) -> DeviceAutomationResult<DeviceInfo>;
}

#[async_trait]
impl DeviceLookup for DeviceRegistry {
    async fn resolve(&self, device_id: &str) -> DeviceAutomationResult<DeviceInfo> {
        let entry = self
            .get(device_id)
            .ok_or_else(|| DeviceAutomationError::DeviceNotFound(device_id.to_string()))?;

        Ok(DeviceInfo {
            id: entry.id.clone(),
            model: entry.model.clone(),
            manufacturer: entry.manufacturer.clone(),
        })
    }
}
