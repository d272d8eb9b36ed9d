//! Shared property-config core: load lifecycle and typed accessors.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ConfigError;
use crate::reader;
use crate::store::PropertyStore;
use crate::system;
use crate::validate;
use crate::value::PropertyValue;

/// Core shared by the config facades: one property store plus the path it
/// was loaded from.
///
/// Starts out empty and frozen; [`initialize`](Self::initialize) replaces
/// the store with one read from disk. The slot lock exists only for that
/// swap; after startup the slot is read-only, and runtime overrides go
/// through the mutable store's own lock.
#[derive(Debug)]
pub struct ConfigBase {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    store: PropertyStore,
    path: Option<PathBuf>,
}

impl ConfigBase {
    pub fn new() -> Self {
        ConfigBase {
            inner: RwLock::new(Inner {
                store: PropertyStore::empty(),
                path: None,
            }),
        }
    }

    /// Load properties from `path`, report them against the relevant
    /// allow-list, and install the store.
    ///
    /// Unknown keys are logged, never rejected. The store becomes mutable
    /// when the loaded data itself sets `mutable-config` to `true`.
    pub fn initialize(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let values = reader::read_properties(path)?;
        validate::report_incoming(path, &values);

        let mutable = match values.get(system::MUTABLE_CONFIG) {
            Some(raw) => {
                bool::parse_property(raw).ok_or_else(|| ConfigError::InvalidPropertyValue {
                    key: system::MUTABLE_CONFIG.to_string(),
                    value: raw.clone(),
                    expected: bool::EXPECTED,
                })?
            }
            None => false,
        };

        info!(
            path = %path.display(),
            properties = values.len(),
            mutable,
            "loaded configuration"
        );

        let mut inner = self.inner.write();
        inner.store = PropertyStore::new(values, mutable);
        inner.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Look up the raw string value of a property.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.read().store.get(key)
    }

    /// Overwrite a property at runtime, returning the prior value.
    ///
    /// Fails with [`ConfigError::NotMutable`] unless the loaded data opted
    /// into mutability.
    pub fn set_value(&self, key: &str, value: &str) -> Result<Option<String>, ConfigError> {
        self.inner.read().store.set(key, value)
    }

    pub fn is_mutable(&self) -> bool {
        self.inner.read().store.is_mutable()
    }

    /// Number of loaded properties.
    pub fn len(&self) -> usize {
        self.inner.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path this config was initialized from, for diagnostics.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.inner.read().path.clone()
    }

    /// Look up and parse a property that must be present.
    pub fn required_property<T: PropertyValue>(&self, key: &str) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Err(ConfigError::MissingRequiredProperty(key.to_string())),
            Some(raw) => {
                T::parse_property(&raw).ok_or_else(|| ConfigError::InvalidPropertyValue {
                    key: key.to_string(),
                    value: raw,
                    expected: T::EXPECTED,
                })
            }
        }
    }

    /// Look up and parse a property that may be absent.
    ///
    /// Absence is `Ok(None)`; a present but unparsable value is still an
    /// error.
    pub fn optional_property<T: PropertyValue>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => match T::parse_property(&raw) {
                Some(parsed) => Ok(Some(parsed)),
                None => Err(ConfigError::InvalidPropertyValue {
                    key: key.to_string(),
                    value: raw,
                    expected: T::EXPECTED,
                }),
            },
        }
    }
}

impl Default for ConfigBase {
    fn default() -> Self {
        Self::new()
    }
}
