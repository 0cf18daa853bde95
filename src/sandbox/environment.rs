//! Per-request attribute storage

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Attribute key under which the sandbox stores the outbound call deadline
/// (seconds, as a floating point value).
pub const API_DEADLINE_KEY: &str = "com.google.apphosting.api.ApiProxy.api_deadline_key";

/// Ambient attributes of the current request.
///
/// Cloning is cheap and every clone shares the same attribute map, so a
/// client and the sessions it creates all observe the same deadline.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    attributes: Arc<Mutex<HashMap<String, Value>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of an attribute value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.lock().get(key).cloned()
    }

    /// Store an attribute, returning the value it replaced
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.lock().insert(key.into(), value.into())
    }

    /// Remove an attribute, returning its last value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.attributes.lock().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.lock().contains_key(key)
    }

    /// Current outbound call deadline in seconds, if one is set
    pub fn deadline_secs(&self) -> Option<f64> {
        self.get(API_DEADLINE_KEY).and_then(|v| v.as_f64())
    }

    /// Number of attributes currently stored
    pub fn len(&self) -> usize {
        self.attributes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.lock().is_empty()
    }
}
