//! Persisted key-value storage.
//!
//! Holds the per-table last-sync timestamps, the push-registration flag and
//! the raw remote configuration object, backed by a single JSON file.
//! Writes are write-through: every mutation flushes to disk, and flush
//! failures are logged rather than surfaced (sync must keep going with
//! whatever state it has).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value as JsonValue;
use tracing::warn;

/// Key under which the push-registration flag is stored.
pub const KEY_PUSH_REGISTERED: &str = "push_registered";

/// Key under which the backend-supplied sync interval (millis) is stored.
pub const KEY_SYNC_INTERVAL_MS: &str = "sync_interval_ms";

/// Key under which the raw remote config object is stored.
pub const KEY_REMOTE_CONFIG: &str = "remote_config";

#[derive(Debug)]
pub struct Prefs {
    path: PathBuf,
    values: BTreeMap<String, JsonValue>,
}

impl Prefs {
    /// Load prefs from `path`. A missing or unreadable file yields empty
    /// prefs; a corrupt file is logged and treated as empty.
    pub fn load(path: PathBuf) -> Self {
        let values = match std::fs::read(&path) {
            Ok(data) => match serde_json::from_slice(&data) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt prefs file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self { path, values }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(JsonValue::as_i64)
    }

    pub fn set_i64(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), JsonValue::from(value));
        self.flush();
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(JsonValue::as_bool)
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), JsonValue::from(value));
        self.flush();
    }

    pub fn get_json(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    pub fn set_json(&mut self, key: &str, value: JsonValue) {
        self.values.insert(key.to_string(), value);
        self.flush();
    }

    pub fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }

    fn flush(&self) {
        let payload = match serde_json::to_vec_pretty(&self.values) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize prefs");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), error = %e, "Failed to create prefs directory");
                return;
            }
        }

        if let Err(e) = std::fs::write(&self.path, payload) {
            warn!(path = %self.path.display(), error = %e, "Failed to write prefs");
        }
    }
}
