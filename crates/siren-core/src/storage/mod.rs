//! Persistence adapter: the incident collection in a local key-value store.
//!
//! The whole collection lives under one key as a JSON array, rewritten in
//! full on every change. There is no version field and no incremental write.

pub mod file;
pub mod lock;

pub use file::FileStorage;
pub use lock::{LockError, StorageLock};

use crate::error::ErrorCode;
use crate::model::Incident;
use crate::seed::seed_incidents;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Key under which the incident array is stored.
pub const INCIDENTS_KEY: &str = "emergency-incidents";

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to access storage at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("stored value under '{key}' is not a valid incident list: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize incidents: {0}")]
    Encode(#[source] serde_json::Error),
}

impl PersistError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::StorageWriteFailed,
            Self::Lock(err) => err.code(),
            Self::Corrupt { .. } => ErrorCode::CorruptStorage,
            Self::Encode(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// String key-value store holding persisted state.
pub trait Storage {
    /// Read the value under `key`, or `None` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Replace the value under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Process-local storage; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. with a hand-written fixture.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).set(key, value)
    }
}

/// What to do when the stored collection cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Log a warning and start from the seed set.
    #[default]
    Seed,
    /// Surface [`PersistError::Corrupt`].
    Fail,
}

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    Seed,
    /// Stored data was malformed and replaced by the seed set.
    RecoveredFromCorrupt,
}

/// Decode an incident array.
pub fn decode_incidents(key: &str, raw: &str) -> Result<Vec<Incident>, PersistError> {
    serde_json::from_str(raw).map_err(|source| PersistError::Corrupt {
        key: key.to_string(),
        source,
    })
}

/// Encode an incident array in the persisted format.
pub fn encode_incidents(incidents: &[Incident]) -> Result<String, PersistError> {
    serde_json::to_string(incidents).map_err(PersistError::Encode)
}

/// Load the collection under `key`, falling back to the seed set when absent.
pub fn load_incidents<S: Storage + ?Sized>(
    storage: &S,
    key: &str,
    policy: LoadPolicy,
) -> Result<(Vec<Incident>, LoadSource), PersistError> {
    let Some(raw) = storage.get(key)? else {
        debug!(key, "no stored incidents; using seed set");
        return Ok((seed_incidents(), LoadSource::Seed));
    };

    match decode_incidents(key, &raw) {
        Ok(incidents) => {
            debug!(key, count = incidents.len(), "loaded stored incidents");
            Ok((incidents, LoadSource::Stored))
        }
        Err(err) if policy == LoadPolicy::Seed => {
            warn!(key, error = %err, "stored incidents are malformed; falling back to seed set");
            Ok((seed_incidents(), LoadSource::RecoveredFromCorrupt))
        }
        Err(err) => Err(err),
    }
}

/// Serialize the full collection under `key`.
pub fn save_incidents<S: Storage + ?Sized>(
    storage: &mut S,
    key: &str,
    incidents: &[Incident],
) -> Result<(), PersistError> {
    let encoded = encode_incidents(incidents)?;
    storage.set(key, &encoded)?;
    debug!(key, count = incidents.len(), bytes = encoded.len(), "saved incidents");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_seed() {
        let storage = MemoryStorage::new();
        let (incidents, source) =
            load_incidents(&storage, INCIDENTS_KEY, LoadPolicy::Fail).unwrap();
        assert_eq!(source, LoadSource::Seed);
        assert_eq!(incidents.len(), 5);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let mut storage = MemoryStorage::new();
        let mut incidents = seed_incidents();
        incidents.truncate(2);
        save_incidents(&mut storage, INCIDENTS_KEY, &incidents).unwrap();

        let (loaded, source) =
            load_incidents(&storage, INCIDENTS_KEY, LoadPolicy::Fail).unwrap();
        assert_eq!(source, LoadSource::Stored);
        assert_eq!(loaded, incidents);
        assert_eq!(
            storage.raw(INCIDENTS_KEY).unwrap(),
            encode_incidents(&loaded).unwrap()
        );
    }

    #[test]
    fn timestamp_text_survives_reencoding() {
        let raw = r#"[
            {"id":"1","tipo":"Otro","ubicacion":"a","estado":"Pendiente",
             "fechaHora":"2024-01-15T09:15:00","recursos":[],"operador":"x"},
            {"id":"2","tipo":"Otro","ubicacion":"b","estado":"Pendiente",
             "fechaHora":"2024-01-15T09:15:00+00:00","recursos":[],"operador":"x"},
            {"id":"3","tipo":"Otro","ubicacion":"c","estado":"Pendiente",
             "fechaHora":"2024-01-15T09:15:00.000Z","recursos":[],"operador":"x"}
        ]"#;
        let incidents = decode_incidents(INCIDENTS_KEY, raw).unwrap();
        let reencoded: serde_json::Value =
            serde_json::from_str(&encode_incidents(&incidents).unwrap()).unwrap();
        let stamps: Vec<&str> = reencoded
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["fechaHora"].as_str().unwrap())
            .collect();
        assert_eq!(
            stamps,
            [
                "2024-01-15T09:15:00",
                "2024-01-15T09:15:00+00:00",
                "2024-01-15T09:15:00.000Z"
            ]
        );
    }

    #[test]
    fn empty_array_is_a_valid_collection() {
        let storage = MemoryStorage::new().with_entry(INCIDENTS_KEY, "[]");
        let (loaded, source) =
            load_incidents(&storage, INCIDENTS_KEY, LoadPolicy::Fail).unwrap();
        assert_eq!(source, LoadSource::Stored);
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_data_follows_policy() {
        let storage = MemoryStorage::new().with_entry(INCIDENTS_KEY, "{not json");

        let (loaded, source) =
            load_incidents(&storage, INCIDENTS_KEY, LoadPolicy::Seed).unwrap();
        assert_eq!(source, LoadSource::RecoveredFromCorrupt);
        assert_eq!(loaded.len(), 5);

        let err = load_incidents(&storage, INCIDENTS_KEY, LoadPolicy::Fail).unwrap_err();
        assert!(matches!(err, PersistError::Corrupt { .. }));
        assert_eq!(err.code(), ErrorCode::CorruptStorage);
    }

    #[test]
    fn unknown_status_literal_is_corrupt() {
        let raw = r#"[{"id":"1","tipo":"Otro","ubicacion":"x","estado":"Cerrado",
            "fechaHora":"2024-01-15T09:15:00","recursos":[],"operador":"a"}]"#;
        let storage = MemoryStorage::new().with_entry(INCIDENTS_KEY, raw);
        assert!(load_incidents(&storage, INCIDENTS_KEY, LoadPolicy::Fail).is_err());
    }

    #[test]
    fn persisted_array_uses_original_field_names() {
        let mut storage = MemoryStorage::new();
        save_incidents(&mut storage, INCIDENTS_KEY, &seed_incidents()[..1]).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(storage.raw(INCIDENTS_KEY).unwrap()).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "001");
        assert_eq!(first["tipo"], "Incendio");
        assert_eq!(first["estado"], "Pendiente");
        assert_eq!(first["fechaHora"], "2024-01-15T10:30:00");
        assert_eq!(first["lat"], 4.6097);
        assert_eq!(first["lng"], -74.0817);
    }
}
