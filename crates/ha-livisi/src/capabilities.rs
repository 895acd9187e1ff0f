//! Device model capabilities
//!
//! Which triggers a device offers depends only on its model string: how many
//! physical buttons it has and whether it reports motion. The built-in
//! knowledge is static; a [`CapabilityTable`] can add models from the
//! integration config.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BATTERY_POWERED_DEVICES, BUTTON_COUNT, MOTION_DEVICE_TYPES, SWITCH_DEVICE_TYPES,
};
use crate::trigger::TriggerKind;

/// Number of buttons of a built-in model, 0 for unknown models
pub fn button_count(model: &str) -> u8 {
    BUTTON_COUNT
        .iter()
        .find(|(m, _)| *m == model)
        .map(|(_, count)| *count)
        .unwrap_or(0)
}

/// Whether a built-in model is a motion detector
pub fn supports_motion(model: &str) -> bool {
    MOTION_DEVICE_TYPES.contains(&model)
}

/// Whether a model is a switch actuator
pub fn is_switch(model: &str) -> bool {
    SWITCH_DEVICE_TYPES.contains(&model)
}

pub fn is_battery_powered(model: &str) -> bool {
    BATTERY_POWERED_DEVICES.contains(&model)
}

/// Trigger capabilities of one model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelCapabilities {
    #[serde(default)]
    pub buttons: u8,

    #[serde(default)]
    pub motion: bool,
}

impl ModelCapabilities {
    /// Capabilities of a built-in model
    pub fn builtin(model: &str) -> Self {
        Self {
            buttons: button_count(model),
            motion: supports_motion(model),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buttons == 0 && !self.motion
    }

    /// Check that a trigger refers to something the model physically has
    pub fn supports(&self, kind: TriggerKind) -> bool {
        match kind {
            TriggerKind::ButtonPress(n) | TriggerKind::ButtonLongPress(n) => {
                n >= 1 && n <= self.buttons
            }
            TriggerKind::MotionDetected => self.motion,
        }
    }

    /// Every trigger of the model
    ///
    /// Press and long press per button in button order, then motion.
    pub fn trigger_kinds(&self) -> Vec<TriggerKind> {
        let mut kinds: Vec<TriggerKind> = (1..=self.buttons)
            .flat_map(|n| [TriggerKind::ButtonPress(n), TriggerKind::ButtonLongPress(n)])
            .collect();
        if self.motion {
            kinds.push(TriggerKind::MotionDetected);
        }
        kinds
    }
}

/// Built-in capabilities plus models added by configuration
///
/// Configured models replace built-in knowledge for the same model string.
/// The table is built once during setup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    configured: IndexMap<String, ModelCapabilities>,
}

impl CapabilityTable {
    /// Table with only the built-in models
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Add or override a model
    pub fn with_model(mut self, model: impl Into<String>, capabilities: ModelCapabilities) -> Self {
        self.configured.insert(model.into(), capabilities);
        self
    }

    pub fn capabilities(&self, model: &str) -> ModelCapabilities {
        self.configured
            .get(model)
            .copied()
            .unwrap_or_else(|| ModelCapabilities::builtin(model))
    }

    pub fn button_count(&self, model: &str) -> u8 {
        self.capabilities(model).buttons
    }

    pub fn supports_motion(&self, model: &str) -> bool {
        self.capabilities(model).motion
    }

    /// Models added by configuration, in configuration order
    pub fn configured_models(&self) -> impl Iterator<Item = (&str, &ModelCapabilities)> {
        self.configured.iter().map(|(m, c)| (m.as_str(), c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        assert_eq!(button_count("ISS2"), 2);
        assert_eq!(button_count("BRC8"), 8);
        assert_eq!(button_count("WMD"), 0);
        assert_eq!(button_count("PSS"), 0);
        assert_eq!(button_count("unknown"), 0);

        assert!(supports_motion("WMD"));
        assert!(supports_motion("WMDO"));
        assert!(!supports_motion("ISS2"));
        assert!(!supports_motion(""));
    }

    #[test]
    fn test_model_groups() {
        assert!(is_switch("PSSO"));
        assert!(!is_switch("WMD"));
        assert!(is_battery_powered("WDS"));
        assert!(!is_battery_powered("PSS"));
    }

    #[test]
    fn test_trigger_kinds_order() {
        let caps = ModelCapabilities {
            buttons: 2,
            motion: true,
        };
        assert_eq!(
            caps.trigger_kinds(),
            vec![
                TriggerKind::ButtonPress(1),
                TriggerKind::ButtonLongPress(1),
                TriggerKind::ButtonPress(2),
                TriggerKind::ButtonLongPress(2),
                TriggerKind::MotionDetected,
            ]
        );
        assert!(ModelCapabilities::default().trigger_kinds().is_empty());
    }

    #[test]
    fn test_supports() {
        let caps = ModelCapabilities::builtin("ISS2");
        assert!(caps.supports(TriggerKind::ButtonPress(1)));
        assert!(caps.supports(TriggerKind::ButtonLongPress(2)));
        assert!(!caps.supports(TriggerKind::ButtonPress(3)));
        assert!(!caps.supports(TriggerKind::ButtonPress(0)));
        assert!(!caps.supports(TriggerKind::MotionDetected));

        assert!(ModelCapabilities::builtin("WMD").supports(TriggerKind::MotionDetected));
    }

    #[test]
    fn test_configured_models_override_builtin() {
        let table = CapabilityTable::builtin()
            .with_model(
                "WRC8",
                ModelCapabilities {
                    buttons: 8,
                    motion: false,
                },
            )
            .with_model(
                "ISS2",
                ModelCapabilities {
                    buttons: 1,
                    motion: false,
                },
            );

        assert_eq!(table.button_count("WRC8"), 8);
        assert_eq!(table.button_count("ISS2"), 1);
        assert_eq!(table.button_count("BRC8"), 8);
        assert!(table.supports_motion("WMD"));
        assert_eq!(
            table.configured_models().map(|(m, _)| m).collect::<Vec<_>>(),
            vec!["WRC8", "ISS2"]
        );
    }
}
