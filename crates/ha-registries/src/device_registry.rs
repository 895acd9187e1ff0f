//! Device Registry
//!
//! Tracks registered devices with identifier and config entry indexes
//! for fast lookups.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A device identifier (domain, id) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentifier(pub String, pub String);

impl DeviceIdentifier {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self(domain.into(), id.into())
    }

    pub fn domain(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> &str {
        &self.1
    }

    /// Create a key for indexing
    pub fn key(&self) -> String {
        format!("{}:{}", self.0, self.1)
    }
}

/// A registered device entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Internal UUID, the `device_id` used by device automations
    pub id: String,

    /// Unique identifiers by domain (e.g., [["livisi", "9a47b6ef..."]])
    #[serde(default)]
    pub identifiers: Vec<DeviceIdentifier>,

    #[serde(default)]
    pub config_entries: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_by_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    /// Vendor model string (e.g., "ISS2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,

    /// Parent device (e.g., the controller a sensor is paired with)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_device_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl DeviceEntry {
    pub fn new(name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            identifiers: Vec::new(),
            config_entries: Vec::new(),
            name: name.map(|s| s.to_string()),
            name_by_user: None,
            manufacturer: None,
            model: None,
            sw_version: None,
            via_device_id: None,
            area_id: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Get display name (user name or device name)
    pub fn display_name(&self) -> &str {
        self.name_by_user
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }

    pub fn with_identifier(mut self, domain: impl Into<String>, id: impl Into<String>) -> Self {
        self.identifiers.push(DeviceIdentifier::new(domain, id));
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_config_entry(mut self, config_entry_id: impl Into<String>) -> Self {
        let id = config_entry_id.into();
        if !self.config_entries.contains(&id) {
            self.config_entries.push(id);
        }
        self
    }
}

/// Device Registry with multi-index support
///
/// Provides O(1) lookups by id, by identifier and by config entry.
/// Entries are stored as `Arc<DeviceEntry>` to avoid cloning on reads.
///
/// A registered device stays in the primary index until it is removed;
/// updates swap the stored `Arc` in place. Locks are taken in the order
/// `by_identifier`, `by_config_entry_id`, `by_id`, and a `by_id` guard is
/// never held while another index is locked.
pub struct DeviceRegistry {
    /// Primary index: device_id -> DeviceEntry
    by_id: DashMap<String, Arc<DeviceEntry>>,

    /// Index: identifier key -> device_id
    by_identifier: DashMap<String, String>,

    /// Index: config_entry_id -> set of device_ids
    by_config_entry_id: DashMap<String, HashSet<String>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            by_identifier: DashMap::new(),
            by_config_entry_id: DashMap::new(),
        }
    }

    /// Move the secondary index keys of a device from `previous` to `current`
    ///
    /// Keys present in both are left alone, and a stale identifier is only
    /// dropped while it still points at this device.
    fn reindex(
        &self,
        device_id: &str,
        previous: Option<&DeviceEntry>,
        current: Option<&DeviceEntry>,
    ) {
        let old_identifiers = previous.map(|e| e.identifiers.as_slice()).unwrap_or_default();
        let new_identifiers = current.map(|e| e.identifiers.as_slice()).unwrap_or_default();
        let old_entries = previous.map(|e| e.config_entries.as_slice()).unwrap_or_default();
        let new_entries = current.map(|e| e.config_entries.as_slice()).unwrap_or_default();

        for identifier in old_identifiers {
            if !new_identifiers.contains(identifier) {
                self.by_identifier
                    .remove_if(&identifier.key(), |_, owner| owner == device_id);
            }
        }
        for identifier in new_identifiers {
            self.by_identifier
                .insert(identifier.key(), device_id.to_string());
        }

        for config_entry_id in old_entries {
            if !new_entries.contains(config_entry_id) {
                if let Some(mut ids) = self.by_config_entry_id.get_mut(config_entry_id) {
                    ids.remove(device_id);
                }
            }
        }
        for config_entry_id in new_entries {
            self.by_config_entry_id
                .entry(config_entry_id.clone())
                .or_default()
                .insert(device_id.to_string());
        }
    }

    /// Register a fully built entry, replacing any entry with the same id
    pub fn register(&self, entry: DeviceEntry) -> Arc<DeviceEntry> {
        let entry = Arc::new(entry);
        info!(
            device_id = %entry.id,
            model = entry.model.as_deref().unwrap_or("-"),
            "Registered device"
        );

        let previous = self.by_id.insert(entry.id.clone(), Arc::clone(&entry));
        self.reindex(&entry.id, previous.as_deref(), Some(&entry));
        entry
    }

    /// Get device by ID
    pub fn get(&self, device_id: &str) -> Option<Arc<DeviceEntry>> {
        self.by_id.get(device_id).map(|r| Arc::clone(r.value()))
    }

    /// Get device by identifier
    pub fn get_by_identifier(&self, domain: &str, id: &str) -> Option<Arc<DeviceEntry>> {
        let key = format!("{}:{}", domain, id);
        let device_id = self.by_identifier.get(&key)?.value().clone();
        self.get(&device_id)
    }

    /// Get all devices for a config entry
    pub fn get_by_config_entry_id(&self, config_entry_id: &str) -> Vec<Arc<DeviceEntry>> {
        let ids: Vec<String> = self
            .by_config_entry_id
            .get(config_entry_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Get or create a device
    ///
    /// Looks up by identifiers first and creates a new entry if none match.
    /// The first identifier is claimed before the entry becomes visible, so
    /// concurrent calls with the same identifiers agree on one device.
    pub fn get_or_create(
        &self,
        identifiers: &[DeviceIdentifier],
        config_entry_id: Option<&str>,
        name: Option<&str>,
    ) -> Arc<DeviceEntry> {
        for identifier in identifiers {
            if let Some(existing) = self.get_by_identifier(identifier.domain(), identifier.id()) {
                debug!(device_id = %existing.id, "Found existing device by identifier");
                return existing;
            }
        }

        let mut entry = DeviceEntry::new(name);
        entry.identifiers = identifiers.to_vec();
        if let Some(config_entry_id) = config_entry_id {
            entry = entry.with_config_entry(config_entry_id);
        }

        let Some(primary) = identifiers.first() else {
            return self.register(entry);
        };

        let entry = Arc::new(entry);
        match self.by_identifier.entry(primary.key()) {
            Entry::Occupied(mut claimed) => {
                if let Some(existing) = self.get(claimed.get()) {
                    debug!(device_id = %existing.id, "Device created concurrently");
                    return existing;
                }
                self.by_id.insert(entry.id.clone(), Arc::clone(&entry));
                claimed.insert(entry.id.clone());
            }
            Entry::Vacant(vacant) => {
                self.by_id.insert(entry.id.clone(), Arc::clone(&entry));
                vacant.insert(entry.id.clone());
            }
        }

        info!(
            device_id = %entry.id,
            identifier = %primary.key(),
            "Registered device"
        );
        self.reindex(&entry.id, None, Some(&entry));
        entry
    }

    /// Update a device in place
    ///
    /// `f` runs while the device is locked and must not call back into the
    /// registry.
    pub fn update<F>(&self, device_id: &str, f: F) -> Option<Arc<DeviceEntry>>
    where
        F: FnOnce(&mut DeviceEntry),
    {
        let (previous, updated) = {
            let mut slot = self.by_id.get_mut(device_id)?;
            let previous = Arc::clone(slot.value());

            let mut updated = (*previous).clone();
            f(&mut updated);
            updated.id = previous.id.clone();
            updated.modified_at = Utc::now();

            let updated = Arc::new(updated);
            *slot.value_mut() = Arc::clone(&updated);
            (previous, updated)
        };

        self.reindex(device_id, Some(&previous), Some(&updated));
        Some(updated)
    }

    /// Remove a device
    pub fn remove(&self, device_id: &str) -> Option<Arc<DeviceEntry>> {
        let entry = self.get(device_id)?;
        self.reindex(device_id, Some(&entry), None);
        let (_, entry) = self.by_id.remove(device_id)?;
        debug!(device_id, "Removed device");
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_reuses_identifier() {
        let registry = DeviceRegistry::new();
        let ident = DeviceIdentifier::new("livisi", "abc");

        let first = registry.get_or_create(&[ident.clone()], Some("entry1"), Some("Switch"));
        let second = registry.get_or_create(&[ident], Some("entry1"), Some("Other"));

        assert_eq!(first.id, second.id);
        assert_eq!(registry.len(), 1);
        assert_eq!(second.display_name(), "Switch");
    }

    #[test]
    fn test_lookup_indexes() {
        let registry = DeviceRegistry::new();
        let entry = registry.register(
            DeviceEntry::new(Some("Hall switch"))
                .with_identifier("livisi", "serial-1")
                .with_config_entry("entry1")
                .with_manufacturer("RWE")
                .with_model("ISS2"),
        );

        assert!(registry.get(&entry.id).is_some());
        assert_eq!(
            registry.get_by_identifier("livisi", "serial-1").unwrap().id,
            entry.id
        );
        assert_eq!(registry.get_by_config_entry_id("entry1").len(), 1);
        assert!(registry.get_by_identifier("livisi", "serial-2").is_none());
    }

    #[test]
    fn test_update_reindexes() {
        let registry = DeviceRegistry::new();
        let entry = registry.register(DeviceEntry::new(None).with_identifier("livisi", "old"));

        let updated = registry
            .update(&entry.id, |e| {
                e.identifiers = vec![DeviceIdentifier::new("livisi", "new")];
                e.model = Some("WMD".to_string());
            })
            .unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.model.as_deref(), Some("WMD"));
        assert!(registry.get_by_identifier("livisi", "old").is_none());
        assert!(registry.get_by_identifier("livisi", "new").is_some());
    }

    #[test]
    fn test_remove() {
        let registry = DeviceRegistry::new();
        let entry = registry.register(
            DeviceEntry::new(None)
                .with_identifier("livisi", "x")
                .with_config_entry("entry1"),
        );

        assert!(registry.remove(&entry.id).is_some());
        assert!(registry.is_empty());
        assert!(registry.get_by_identifier("livisi", "x").is_none());
        assert!(registry.get_by_config_entry_id("entry1").is_empty());
        assert!(registry.remove(&entry.id).is_none());
    }

    #[test]
    fn test_entry_serialization_skips_unset_fields() {
        let entry = DeviceEntry::new(Some("Motion")).with_model("WMD");
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["model"], "WMD");
        assert!(value.get("manufacturer").is_none());
        assert!(value.get("area_id").is_none());
    }

    #[test]
    fn test_register_same_id_replaces_indexes() {
        let registry = DeviceRegistry::new();
        let entry = registry.register(
            DeviceEntry::new(None)
                .with_identifier("livisi", "old")
                .with_config_entry("entry1"),
        );

        let mut replacement = (*entry).clone();
        replacement.identifiers = vec![DeviceIdentifier::new("livisi", "new")];
        replacement.config_entries = vec!["entry2".to_string()];
        registry.register(replacement);

        assert_eq!(registry.len(), 1);
        assert!(registry.get_by_identifier("livisi", "old").is_none());
        assert_eq!(registry.get_by_identifier("livisi", "new").unwrap().id, entry.id);
        assert!(registry.get_by_config_entry_id("entry1").is_empty());
        assert_eq!(registry.get_by_config_entry_id("entry2").len(), 1);
    }

    #[test]
    fn test_update_never_hides_device() {
        let registry = Arc::new(DeviceRegistry::new());
        let entry = registry.register(
            DeviceEntry::new(None)
                .with_identifier("livisi", "abc")
                .with_model("ISS2"),
        );

        let writer = {
            let registry = Arc::clone(&registry);
            let device_id = entry.id.clone();
            std::thread::spawn(move || {
                for round in 0..5_000 {
                    registry.update(&device_id, |e| {
                        e.model = Some(if round % 2 == 0 { "WSC2" } else { "ISS2" }.to_string());
                    });
                }
            })
        };

        let mut missing = 0;
        for _ in 0..5_000 {
            if registry.get(&entry.id).is_none()
                || registry.get_by_identifier("livisi", "abc").is_none()
            {
                missing += 1;
            }
        }
        writer.join().unwrap();

        assert_eq!(missing, 0);
    }
}
