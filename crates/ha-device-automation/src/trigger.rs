//! Trigger data passed to automation actions

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Data provided when a trigger fires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerData {
    /// Optional trigger ID for referencing in conditions/actions
    pub id: Option<String>,

    /// Trigger platform type (e.g., "event", "device")
    pub platform: String,

    /// Additional variables available in templates
    #[serde(flatten)]
    pub variables: HashMap<String, serde_json::Value>,

    /// When the trigger matched
    pub triggered_at: DateTime<Utc>,
}

impl TriggerData {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            id: None,
            platform: platform.into(),
            variables: HashMap::new(),
            triggered_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }
}

/// Information about the automation a trigger is attached for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerInfo {
    /// Automation ID
    pub automation_id: Option<String>,

    /// Automation name, used in log lines
    pub name: String,

    /// Trigger ID copied into the produced TriggerData
    pub trigger_id: Option<String>,
}

impl TriggerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_trigger_id(mut self, id: impl Into<String>) -> Self {
        self.trigger_id = Some(id.into());
        self
    }
}

/// Callback invoked when a trigger fires
pub type TriggerAction = Arc<dyn Fn(TriggerData) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure into a [`TriggerAction`]
pub fn action_fn<F, Fut>(f: F) -> TriggerAction
where
    F: Fn(TriggerData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |data| Box::pin(f(data)))
}
