//! Integration configuration
//!
//! ```yaml
//! host: 192.168.1.20
//! password: secret
//! controller: avatar
//! polling_delay: 60
//! device_models:
//!   WRC8:
//!     buttons: 8
//! ```

use ha_core::const_keys::CONF_HOST;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::capabilities::{CapabilityTable, ModelCapabilities};
use crate::constants::{AVATAR_PORT, CLASSIC_PORT, DEVICE_POLLING_DELAY, MAX_BUTTONS};
use crate::error::{ConfigError, ConfigResult};

/// Kind of central controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Second generation SHC running the Avatar API
    #[default]
    #[serde(alias = "Avatar")]
    Avatar,
    #[serde(alias = "Classic")]
    Classic,
}

impl ControllerKind {
    /// Default API port of the controller
    pub fn default_port(&self) -> u16 {
        match self {
            ControllerKind::Avatar => AVATAR_PORT,
            ControllerKind::Classic => CLASSIC_PORT,
        }
    }
}

fn default_polling_delay() -> u64 {
    DEVICE_POLLING_DELAY
}

/// LIVISI integration config
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LivisiConfig {
    pub host: String,

    pub password: String,

    #[serde(default)]
    pub controller: ControllerKind,

    /// Overrides the controller's default port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Seconds between device state polls
    #[serde(default = "default_polling_delay")]
    pub polling_delay: u64,

    /// Models to add to (or override in) the built-in capability table
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub device_models: IndexMap<String, ModelCapabilities>,
}

impl fmt::Debug for LivisiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivisiConfig")
            .field("host", &self.host)
            .field("password", &"**REDACTED**")
            .field("controller", &self.controller)
            .field("port", &self.port)
            .field("polling_delay", &self.polling_delay)
            .field("device_models", &self.device_models)
            .finish()
    }
}

impl LivisiConfig {
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            password: password.into(),
            controller: ControllerKind::default(),
            port: None,
            polling_delay: DEVICE_POLLING_DELAY,
            device_models: IndexMap::new(),
        }
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading LIVISI config: {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, source_path: &Path) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: PathBuf::from(source_path),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid(CONF_HOST, "must not be empty"));
        }
        if self.port == Some(0) {
            return Err(ConfigError::invalid("port", "must not be 0"));
        }
        if self.polling_delay == 0 {
            return Err(ConfigError::invalid(
                "polling_delay",
                "must be at least 1 second",
            ));
        }

        for (model, capabilities) in &self.device_models {
            let key = format!("device_models.{}", model);
            if model.trim().is_empty() {
                return Err(ConfigError::invalid("device_models", "model must not be empty"));
            }
            if capabilities.buttons > MAX_BUTTONS {
                return Err(ConfigError::invalid(
                    key,
                    format!("at most {} buttons are supported", MAX_BUTTONS),
                ));
            }
            if capabilities.is_empty() {
                return Err(ConfigError::invalid(
                    key,
                    "needs at least one button or a motion sensor",
                ));
            }
        }
        Ok(())
    }

    /// API port, falling back to the controller default
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.controller.default_port())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_delay)
    }

    /// Built-in capabilities extended with the configured models
    pub fn capability_table(&self) -> CapabilityTable {
        self.device_models
            .iter()
            .fold(CapabilityTable::builtin(), |table, (model, caps)| {
                table.with_model(model.clone(), *caps)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_minimal_config_defaults() {
        let config = LivisiConfig::from_yaml_str("host: 10.0.0.2\npassword: pw\n").unwrap();

        assert_eq!(config.controller, ControllerKind::Avatar);
        assert_eq!(config.port(), AVATAR_PORT);
        assert_eq!(config.polling_interval(), Duration::from_secs(60));
        assert!(config.device_models.is_empty());
    }

    #[test]
    fn test_classic_controller_port() {
        let config =
            LivisiConfig::from_yaml_str("host: shc\npassword: pw\ncontroller: classic\n").unwrap();
        assert_eq!(config.port(), CLASSIC_PORT);

        let config = LivisiConfig::from_yaml_str(
            "host: shc\npassword: pw\ncontroller: Classic\nport: 8443\n",
        )
        .unwrap();
        assert_eq!(config.port(), 8443);
    }

    #[test]
    fn test_device_models_extend_capabilities() {
        let yaml = r#"
host: shc
password: pw
device_models:
  WRC8:
    buttons: 8
  WMD3:
    motion: true
"#;
        let config = LivisiConfig::from_yaml_str(yaml).unwrap();
        let table = config.capability_table();

        assert_eq!(table.button_count("WRC8"), 8);
        assert!(table.supports_motion("WMD3"));
        assert_eq!(table.button_count("ISS2"), 2);
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("host: ''\npassword: pw\n", "host"),
            ("host: shc\npassword: pw\npolling_delay: 0\n", "polling_delay"),
            ("host: shc\npassword: pw\nport: 0\n", "port"),
            (
                "host: shc\npassword: pw\ndevice_models:\n  X:\n    buttons: 9\n",
                "device_models.X",
            ),
            (
                "host: shc\npassword: pw\ndevice_models:\n  X: {}\n",
                "device_models.X",
            ),
        ];

        for (yaml, expected_key) in cases {
            match LivisiConfig::from_yaml_str(yaml) {
                Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
                other => panic!("expected InvalidValue for {}, got {:?}", expected_key, other),
            }
        }
    }

    #[test]
    fn test_parse_errors() {
        let result = LivisiConfig::from_yaml_str("host: shc\n");
        assert!(matches!(result, Err(ConfigError::ParseYaml { .. })));

        let result = LivisiConfig::from_yaml_str("host: shc\npassword: pw\nusername: admin\n");
        assert!(matches!(result, Err(ConfigError::ParseYaml { .. })));

        let result =
            LivisiConfig::from_yaml_str("host: shc\npassword: pw\ncontroller: gen3\n");
        assert!(matches!(result, Err(ConfigError::ParseYaml { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "host: shc.local\npassword: pw\npolling_delay: 15").unwrap();

        let config = LivisiConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "shc.local");
        assert_eq!(config.polling_delay, 15);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livisi.yaml");

        match LivisiConfig::from_file(&path) {
            Err(ConfigError::ReadFile { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ReadFile, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = LivisiConfig::new("shc", "hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }
}
