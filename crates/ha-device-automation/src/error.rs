//! Error types for device automations

use thiserror::Error;

/// Result type for device automation operations
pub type DeviceAutomationResult<T> = Result<T, DeviceAutomationError>;

/// Device automation errors
///
/// Surfaced to the caller unchanged; nothing in this layer retries.
#[derive(Debug, Error)]
pub enum DeviceAutomationError {
    /// The device registry has no device with this id
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A trigger config failed schema or capability validation
    #[error("Invalid trigger configuration: {0}")]
    InvalidTriggerConfig(String),

    /// A device lookup could not be answered (registry unavailable)
    #[error("Device registry error: {0}")]
    Registry(String),

    /// The event trigger facility rejected the subscription
    #[error("Failed to attach trigger: {0}")]
    Attach(String),

    /// No device trigger platform is registered for the domain
    #[error("Integration not found: {0}")]
    IntegrationNotFound(String),
}

impl DeviceAutomationError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidTriggerConfig(msg.into())
    }
}
