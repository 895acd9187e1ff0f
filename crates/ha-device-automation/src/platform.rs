//! Device trigger platforms
//!
//! Integrations implement [`DeviceTriggerPlatform`]; the automation layer
//! only sees raw configs and dispatches them by their `domain`.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{DeviceAutomationError, DeviceAutomationResult};
use crate::schema::DeviceTriggerConfig;
use crate::trigger::{TriggerAction, TriggerInfo};
use crate::unsubscribe::Unsubscribe;

/// Device trigger support provided by one integration
#[async_trait]
pub trait DeviceTriggerPlatform: Send + Sync {
    /// Integration domain the configs of this platform carry
    fn domain(&self) -> &str;

    /// List all triggers a device supports
    async fn get_triggers(&self, device_id: &str)
        -> DeviceAutomationResult<Vec<DeviceTriggerConfig>>;

    /// Validate the integration specific part of a config
    async fn validate_trigger_config(
        &self,
        config: DeviceTriggerConfig,
    ) -> DeviceAutomationResult<DeviceTriggerConfig>;

    /// Attach a validated trigger
    async fn attach_trigger(
        &self,
        config: DeviceTriggerConfig,
        action: TriggerAction,
        info: TriggerInfo,
    ) -> DeviceAutomationResult<Unsubscribe>;
}

/// Registered device trigger platforms, keyed by domain
#[derive(Default)]
pub struct DeviceTriggerPlatforms {
    platforms: DashMap<String, Arc<dyn DeviceTriggerPlatform>>,
}

impl DeviceTriggerPlatforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, platform: Arc<dyn DeviceTriggerPlatform>) {
        let domain = platform.domain().to_string();
        info!(domain = %domain, "Registered device trigger platform");
        self.platforms.insert(domain, platform);
    }

    pub fn get(&self, domain: &str) -> Option<Arc<dyn DeviceTriggerPlatform>> {
        self.platforms.get(domain).map(|p| Arc::clone(p.value()))
    }

    fn require(&self, domain: &str) -> DeviceAutomationResult<Arc<dyn DeviceTriggerPlatform>> {
        self.get(domain)
            .ok_or_else(|| DeviceAutomationError::IntegrationNotFound(domain.to_string()))
    }

    /// List the triggers one integration offers for a device
    pub async fn get_triggers(
        &self,
        domain: &str,
        device_id: &str,
    ) -> DeviceAutomationResult<Vec<DeviceTriggerConfig>> {
        self.require(domain)?.get_triggers(device_id).await
    }

    /// Validate a raw trigger config
    pub async fn validate(
        &self,
        config: serde_json::Value,
    ) -> DeviceAutomationResult<DeviceTriggerConfig> {
        let config = DeviceTriggerConfig::from_value(config)?;
        self.require(&config.domain)?
            .validate_trigger_config(config)
            .await
    }

    /// Validate and attach a raw trigger config
    pub async fn attach(
        &self,
        config: serde_json::Value,
        action: TriggerAction,
        info: TriggerInfo,
    ) -> DeviceAutomationResult<Unsubscribe> {
        let config = self.validate(config).await?;
        debug!(
            domain = %config.domain,
            device_id = %config.device_id,
            automation = %info.name,
            "Attaching device trigger"
        );
        self.require(&config.domain)?
            .attach_trigger(config, action, info)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::action_fn;
    use serde_json::json;

    struct DoorbellPlatform;

    #[async_trait]
    impl DeviceTriggerPlatform for DoorbellPlatform {
        fn domain(&self) -> &str {
            "doorbell"
        }

        async fn get_triggers(
            &self,
            device_id: &str,
        ) -> DeviceAutomationResult<Vec<DeviceTriggerConfig>> {
            Ok(vec![DeviceTriggerConfig::new(device_id, "doorbell")
                .with_extra("type", json!("ring"))])
        }

        async fn validate_trigger_config(
            &self,
            config: DeviceTriggerConfig,
        ) -> DeviceAutomationResult<DeviceTriggerConfig> {
            match config.extra_str("type")? {
                Some("ring") => Ok(config),
                other => Err(DeviceAutomationError::invalid_config(format!(
                    "unknown type {:?}",
                    other
                ))),
            }
        }

        async fn attach_trigger(
            &self,
            _config: DeviceTriggerConfig,
            _action: TriggerAction,
            _info: TriggerInfo,
        ) -> DeviceAutomationResult<Unsubscribe> {
            Ok(Unsubscribe::new(|| {}))
        }
    }

    fn platforms() -> DeviceTriggerPlatforms {
        let platforms = DeviceTriggerPlatforms::new();
        platforms.register(Arc::new(DoorbellPlatform));
        platforms
    }

    #[tokio::test]
    async fn test_dispatch_by_domain() {
        let platforms = platforms();

        let triggers = platforms.get_triggers("doorbell", "dev1").await.unwrap();
        assert_eq!(triggers.len(), 1);

        let unsub = platforms
            .attach(
                json!({"platform": "device", "device_id": "dev1", "domain": "doorbell", "type": "ring"}),
                action_fn(|_| async {}),
                TriggerInfo::new("test"),
            )
            .await
            .unwrap();
        assert!(unsub.is_active());
    }

    #[tokio::test]
    async fn test_unknown_domain() {
        let err = platforms().get_triggers("hue", "dev1").await.unwrap_err();
        assert!(matches!(err, DeviceAutomationError::IntegrationNotFound(_)));
    }

    #[tokio::test]
    async fn test_platform_validation_runs_before_attach() {
        let err = platforms()
            .attach(
                json!({"platform": "device", "device_id": "dev1", "domain": "doorbell", "type": "knock"}),
                action_fn(|_| async {}),
                TriggerInfo::new("test"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DeviceAutomationError::InvalidTriggerConfig(_)));
    }
}
