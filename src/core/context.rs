//! Shared mutable context for a logger tree
//!
//! One `TreeContext` exists per logger tree. The root logger creates it and
//! every descendant logger and every plugin holds a handle to the same
//! instance; cloning the handle never copies the underlying record.

use super::fields::FieldValue;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical context key controlling automatic time stamping
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Cross-cutting settings shared by reference across a logger tree.
///
/// Plugins read and write these settings through the kernel; the canonical
/// enrichment pattern is set-if-absent, which keeps explicit construction
/// time configuration authoritative over any plugin default.
#[derive(Debug, Clone, Default)]
pub struct TreeContext {
    settings: Arc<RwLock<HashMap<String, FieldValue>>>,
}

impl TreeContext {
    pub fn new() -> Self {
        Self {
            settings: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set a value unconditionally, overwriting any previous one
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.settings.write().insert(key.into(), value.into());
    }

    /// Set a value only if the key is currently unset.
    ///
    /// Returns `true` if the value was written, `false` if an existing
    /// value was left untouched.
    pub fn set_if_absent<K, V>(&self, key: K, value: V) -> bool
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let mut settings = self.settings.write();
        if settings.contains_key(&key) {
            false
        } else {
            settings.insert(key, value.into());
            true
        }
    }

    pub fn get(&self, key: &str) -> Option<FieldValue> {
        self.settings.read().get(key).cloned()
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.settings.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<FieldValue> {
        self.settings.write().remove(key)
    }

    /// Whether entries should be stamped with the current time when they
    /// carry no `time` of their own
    pub fn timestamp_enabled(&self) -> bool {
        matches!(self.get(TIMESTAMP_KEY), Some(FieldValue::Bool(true)))
    }

    /// Explicitly enable or disable time stamping
    pub fn set_timestamp(&self, enabled: bool) {
        self.set(TIMESTAMP_KEY, enabled);
    }
}
