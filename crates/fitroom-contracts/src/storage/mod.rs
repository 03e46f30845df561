mod local;

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::PersistenceError;

pub use local::LocalStorage;

/// Durable home for one value.
///
/// `load` never fails: missing or unreadable data yields `T::default()`.
/// `save` replaces the whole stored representation.
pub trait PersistentStore<T> {
    fn load(&self) -> T;
    fn save(&self, value: &T) -> Result<(), PersistenceError>;
}

/// A value stored under one key of a [`LocalStorage`] file.
#[derive(Debug, Clone)]
pub struct KeyedStore<T> {
    storage: LocalStorage,
    key: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> KeyedStore<T> {
    pub fn new(storage: LocalStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            _value: PhantomData,
        }
    }
}

impl<T> PersistentStore<T> for KeyedStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> T {
        match self.storage.get_item(&self.key) {
            Ok(Some(value)) => decode_or_default(&self.key, value),
            Ok(None) => T::default(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read stored value, using default");
                T::default()
            }
        }
    }

    fn save(&self, value: &T) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_value(value).map_err(|source| PersistenceError::Serialize {
            key: self.key.clone(),
            source,
        })?;
        self.storage.set_item(&self.key, encoded)
    }
}

/// In-process store, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<T> {
    raw: Arc<Mutex<Option<Value>>>,
    reject_writes: bool,
    _value: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            raw: Arc::new(Mutex::new(None)),
            reject_writes: false,
            _value: PhantomData,
        }
    }

    pub fn with_raw(raw: Value) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.raw.lock() {
            *slot = Some(raw);
        }
        store
    }

    /// Store whose writes always fail, for exercising degraded persistence.
    pub fn rejecting() -> Self {
        Self {
            reject_writes: true,
            ..Self::new()
        }
    }

    pub fn raw(&self) -> Option<Value> {
        self.raw.lock().ok().and_then(|slot| slot.clone())
    }
}

impl<T> PersistentStore<T> for MemoryStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> T {
        match self.raw() {
            Some(value) => decode_or_default("memory", value),
            None => T::default(),
        }
    }

    fn save(&self, value: &T) -> Result<(), PersistenceError> {
        if self.reject_writes {
            return Err(PersistenceError::Rejected("memory store is read-only".to_string()));
        }
        let encoded = serde_json::to_value(value).map_err(|source| PersistenceError::Serialize {
            key: "memory".to_string(),
            source,
        })?;
        let mut slot = self.raw.lock().map_err(|_| PersistenceError::Poisoned)?;
        *slot = Some(encoded);
        Ok(())
    }
}

fn decode_or_default<T: DeserializeOwned + Default>(key: &str, value: Value) -> T {
    match serde_json::from_value(value) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "stored value is corrupt, using default");
            T::default()
        }
    }
}
