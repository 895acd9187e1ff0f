//! LIVISI trigger vocabulary and descriptors
//!
//! A [`TriggerDescriptor`] is what the host stores in automation configs:
//!
//! ```json
//! {"platform": "device", "device_id": "…", "domain": "livisi",
//!  "type": "button_long_press", "subtype": "button_2"}
//! ```
//!
//! `subtype` is present exactly for the button trigger types.

use ha_core::const_keys::{
    CONF_DEVICE_ID, CONF_DOMAIN, CONF_PLATFORM, CONF_SUBTYPE, CONF_TYPE,
};
use ha_device_automation::{DeviceAutomationError, DeviceAutomationResult, DeviceTriggerConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DOMAIN, EVENT_BUTTON_LONG_PRESSED, EVENT_BUTTON_PRESSED, EVENT_MOTION_DETECTED,
};

const SUBTYPE_PREFIX: &str = "button_";

/// Closed vocabulary of trigger types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    ButtonPress,
    ButtonLongPress,
    MotionDetected,
}

impl TriggerType {
    pub const ALL: [TriggerType; 3] = [
        TriggerType::ButtonPress,
        TriggerType::ButtonLongPress,
        TriggerType::MotionDetected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::ButtonPress => EVENT_BUTTON_PRESSED,
            TriggerType::ButtonLongPress => EVENT_BUTTON_LONG_PRESSED,
            TriggerType::MotionDetected => EVENT_MOTION_DETECTED,
        }
    }

    /// Button types require a subtype
    pub fn is_button(&self) -> bool {
        match self {
            TriggerType::ButtonPress | TriggerType::ButtonLongPress => true,
            TriggerType::MotionDetected => false,
        }
    }
}

impl FromStr for TriggerType {
    type Err = DeviceAutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                DeviceAutomationError::invalid_config(format!(
                    "{} must be one of button_press, button_long_press, motion_detected, got '{}'",
                    CONF_TYPE, s
                ))
            })
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trigger a device can offer, with the button it refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    ButtonPress(u8),
    ButtonLongPress(u8),
    MotionDetected,
}

impl TriggerKind {
    /// Combine a type and an optional subtype, enforcing that the subtype
    /// is present exactly for button types
    pub fn from_parts(
        trigger_type: TriggerType,
        subtype: Option<&str>,
    ) -> DeviceAutomationResult<Self> {
        match (trigger_type, subtype) {
            (TriggerType::ButtonPress, Some(s)) => {
                Ok(TriggerKind::ButtonPress(parse_subtype(s)?))
            }
            (TriggerType::ButtonLongPress, Some(s)) => {
                Ok(TriggerKind::ButtonLongPress(parse_subtype(s)?))
            }
            (TriggerType::MotionDetected, None) => Ok(TriggerKind::MotionDetected),
            (t, None) => Err(DeviceAutomationError::invalid_config(format!(
                "{} is required for {}",
                CONF_SUBTYPE, t
            ))),
            (t, Some(_)) => Err(DeviceAutomationError::invalid_config(format!(
                "{} is not allowed for {}",
                CONF_SUBTYPE, t
            ))),
        }
    }

    pub fn trigger_type(&self) -> TriggerType {
        match self {
            TriggerKind::ButtonPress(_) => TriggerType::ButtonPress,
            TriggerKind::ButtonLongPress(_) => TriggerType::ButtonLongPress,
            TriggerKind::MotionDetected => TriggerType::MotionDetected,
        }
    }

    /// Index of the physical button, starting at 1
    pub fn button(&self) -> Option<u8> {
        match self {
            TriggerKind::ButtonPress(n) | TriggerKind::ButtonLongPress(n) => Some(*n),
            TriggerKind::MotionDetected => None,
        }
    }

    pub fn subtype(&self) -> Option<String> {
        self.button().map(format_subtype)
    }
}

/// `button_<n>` for button index `n`
pub fn format_subtype(button: u8) -> String {
    format!("{}{}", SUBTYPE_PREFIX, button)
}

/// Parse `button_<n>` into a positive button index
pub fn parse_subtype(subtype: &str) -> DeviceAutomationResult<u8> {
    let invalid = || {
        DeviceAutomationError::invalid_config(format!(
            "{} must look like button_<n> with n >= 1, got '{}'",
            CONF_SUBTYPE, subtype
        ))
    };

    let digits = subtype.strip_prefix(SUBTYPE_PREFIX).ok_or_else(invalid)?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    digits.parse::<u8>().map_err(|_| invalid())
}

/// A LIVISI device trigger as exchanged with the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DeviceTriggerConfig", into = "DeviceTriggerConfig")]
pub struct TriggerDescriptor {
    pub device_id: String,
    pub kind: TriggerKind,
}

impl TriggerDescriptor {
    pub fn new(device_id: impl Into<String>, kind: TriggerKind) -> Self {
        Self {
            device_id: device_id.into(),
            kind,
        }
    }

    pub fn trigger_type(&self) -> TriggerType {
        self.kind.trigger_type()
    }

    pub fn subtype(&self) -> Option<String> {
        self.kind.subtype()
    }

    /// Parse and validate a raw trigger config
    pub fn from_value(value: serde_json::Value) -> DeviceAutomationResult<Self> {
        DeviceTriggerConfig::from_value(value)?.try_into()
    }

    pub fn to_config(&self) -> DeviceTriggerConfig {
        self.clone().into()
    }

    /// Flat JSON form, as listed to the host
    pub fn to_value(&self) -> serde_json::Value {
        let config = self.to_config();
        let mut map = serde_json::Map::new();
        map.insert(CONF_PLATFORM.into(), config.platform.into());
        map.insert(CONF_DEVICE_ID.into(), config.device_id.into());
        map.insert(CONF_DOMAIN.into(), config.domain.into());
        map.extend(config.extra);
        serde_json::Value::Object(map)
    }
}

impl From<TriggerDescriptor> for DeviceTriggerConfig {
    fn from(descriptor: TriggerDescriptor) -> Self {
        let mut config = DeviceTriggerConfig::new(descriptor.device_id.clone(), DOMAIN)
            .with_extra(CONF_TYPE, descriptor.trigger_type().as_str().into());
        if let Some(subtype) = descriptor.subtype() {
            config = config.with_extra(CONF_SUBTYPE, subtype.into());
        }
        config
    }
}

impl TryFrom<DeviceTriggerConfig> for TriggerDescriptor {
    type Error = DeviceAutomationError;

    fn try_from(config: DeviceTriggerConfig) -> Result<Self, Self::Error> {
        config.validate_base()?;

        if config.domain != DOMAIN {
            return Err(DeviceAutomationError::invalid_config(format!(
                "{} must be '{}', got '{}'",
                CONF_DOMAIN, DOMAIN, config.domain
            )));
        }

        if let Some(key) = config
            .extra
            .keys()
            .find(|k| k.as_str() != CONF_TYPE && k.as_str() != CONF_SUBTYPE)
        {
            return Err(DeviceAutomationError::invalid_config(format!(
                "extra key '{}' not allowed",
                key
            )));
        }

        let trigger_type: TriggerType = config
            .extra_str(CONF_TYPE)?
            .ok_or_else(|| {
                DeviceAutomationError::invalid_config(format!("{} is required", CONF_TYPE))
            })?
            .parse()?;
        let kind = TriggerKind::from_parts(trigger_type, config.extra_str(CONF_SUBTYPE)?)?;

        Ok(Self {
            device_id: config.device_id,
            kind,
        })
    }
}
