/**
 * Shared Document Type
 *
 * This module defines the `Document`: the full application state blob that
 * the sync core moves between clients and the server. The core treats the
 * body as opaque structured data; the only fields it interprets are the
 * server-stamped `_version` counter and the per-device keys that must never
 * travel over the wire.
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shared::error::SharedError;

/// Keys that belong to a single device and are excluded from synchronization.
///
/// They are stripped from every pushed document and discarded from every
/// pulled one, then re-applied from local state.
pub const DEVICE_ONLY_FIELDS: [&str; 2] = ["selectedUser", "theme"];

/// The complete shared application state.
///
/// The body is an arbitrary JSON object (rooms, tasks, users, completion
/// entries, settings); the sync core never looks inside it. `_version` is a
/// monotonic counter owned by the server: `0` means "never written".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Server-stamped write counter
    #[serde(rename = "_version", default)]
    pub version: u64,

    /// Opaque application state
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document with the given body fields
    pub fn with_fields(fields: Map<String, Value>) -> Self {
        Self { version: 0, fields }
    }

    /// Parse a document from raw JSON bytes.
    ///
    /// Fails with [`SharedError::Serialization`] unless the payload is a
    /// JSON object.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SharedError> {
        serde_json::from_slice(bytes).map_err(SharedError::from)
    }

    /// Serialize the document to a JSON string
    pub fn to_json_string(&self) -> Result<String, SharedError> {
        serde_json::to_string(self).map_err(SharedError::from)
    }

    /// Return a copy of this document stamped with a new version
    pub fn stamped(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Whether the body carries any of the device-only keys
    pub fn has_device_fields(&self) -> bool {
        DEVICE_ONLY_FIELDS.iter().any(|k| self.fields.contains_key(*k))
    }

    /// Copy out the device-only keys currently present in the body
    pub fn device_fields(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for key in DEVICE_ONLY_FIELDS {
            if let Some(value) = self.fields.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
        out
    }

    /// Remove the device-only keys from the body, returning what was removed
    pub fn strip_device_fields(&mut self) -> Map<String, Value> {
        let mut removed = Map::new();
        for key in DEVICE_ONLY_FIELDS {
            if let Some(value) = self.fields.remove(key) {
                removed.insert(key.to_string(), value);
            }
        }
        removed
    }

    /// Re-apply previously stripped device-only keys to the body
    pub fn apply_device_fields(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    /// Structural equality of the bodies, ignoring the version stamp
    pub fn body_eq(&self, other: &Document) -> bool {
        self.fields == other.fields
    }
}
