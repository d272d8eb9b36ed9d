//! Frozen and mutable property stores.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::ConfigError;

/// A loaded set of configuration properties.
///
/// The variant is chosen once at load time and never changes afterwards: a
/// frozen store is a plain snapshot with lock-free reads, a mutable store
/// accepts runtime overrides behind a reader-writer lock (writers serialize,
/// readers overlap).
#[derive(Debug)]
pub enum PropertyStore {
    Frozen(HashMap<String, String>),
    Mutable(RwLock<HashMap<String, String>>),
}

impl PropertyStore {
    /// Build a store of the requested mutability over raw properties.
    pub fn new(values: HashMap<String, String>, mutable: bool) -> Self {
        if mutable {
            PropertyStore::Mutable(RwLock::new(values))
        } else {
            PropertyStore::Frozen(values)
        }
    }

    /// Empty frozen store, the state of a config before it is initialized.
    pub fn empty() -> Self {
        PropertyStore::Frozen(HashMap::new())
    }

    /// Look up a property, cloning the value out.
    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            PropertyStore::Frozen(values) => values.get(key).cloned(),
            PropertyStore::Mutable(values) => values.read().get(key).cloned(),
        }
    }

    /// Overwrite a property, returning the previous value if one existed.
    ///
    /// Fails with [`ConfigError::NotMutable`] on a frozen store.
    pub fn set(&self, key: &str, value: &str) -> Result<Option<String>, ConfigError> {
        match self {
            PropertyStore::Frozen(_) => Err(ConfigError::NotMutable),
            PropertyStore::Mutable(values) => {
                Ok(values.write().insert(key.to_string(), value.to_string()))
            }
        }
    }

    /// Whether runtime overrides are accepted.
    pub fn is_mutable(&self) -> bool {
        matches!(self, PropertyStore::Mutable(_))
    }

    /// Number of properties currently held.
    pub fn len(&self) -> usize {
        match self {
            PropertyStore::Frozen(values) => values.len(),
            PropertyStore::Mutable(values) => values.read().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> HashMap<String, String> {
        HashMap::from([("k".to_string(), "v0".to_string())])
    }

    #[test]
    fn frozen_get_is_stable() {
        let store = PropertyStore::new(seed(), false);
        for _ in 0..10 {
            assert_eq!(store.get("k").as_deref(), Some("v0"));
            assert_eq!(store.get("absent"), None);
        }
    }

    #[test]
    fn frozen_rejects_set() {
        let store = PropertyStore::new(seed(), false);
        assert!(matches!(store.set("k", "v1"), Err(ConfigError::NotMutable)));
        // Unchanged after the rejected write.
        assert_eq!(store.get("k").as_deref(), Some("v0"));
    }

    #[test]
    fn mutable_set_returns_prior_value() {
        let store = PropertyStore::new(HashMap::new(), true);
        assert_eq!(store.set("k", "v1").unwrap(), None);
        assert_eq!(store.set("k", "v2").unwrap().as_deref(), Some("v1"));
        assert_eq!(store.get("k").as_deref(), Some("v2"));
    }

    #[test]
    fn mutability_capability_check() {
        assert!(!PropertyStore::new(HashMap::new(), false).is_mutable());
        assert!(PropertyStore::new(HashMap::new(), true).is_mutable());
        assert!(!PropertyStore::empty().is_mutable());
    }

    #[test]
    fn len_tracks_inserts() {
        let store = PropertyStore::new(HashMap::new(), true);
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();
        assert_eq!(store.len(), 2);
    }
}
