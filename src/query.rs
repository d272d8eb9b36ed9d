//! Runtime-tunable query property overlay.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::ConfigError;
use crate::system::SystemConfig;

/// Process-wide overlay of query-level property overrides.
///
/// Holds its own guarded map, independent of any file loading. Whether
/// writes are allowed is captured once from the system config when the
/// instance is created and never re-read.
#[derive(Debug)]
pub struct QueryOverlayConfig {
    mutable: bool,
    values: RwLock<HashMap<String, String>>,
}

static INSTANCE: OnceLock<QueryOverlayConfig> = OnceLock::new();

impl QueryOverlayConfig {
    /// Overlay with explicit mutability, for callers passing their own
    /// instance around.
    pub fn new(mutable: bool) -> Self {
        QueryOverlayConfig {
            mutable,
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide instance; mutability comes from the system config at
    /// first use.
    pub fn instance() -> &'static QueryOverlayConfig {
        INSTANCE.get_or_init(|| QueryOverlayConfig::new(SystemConfig::instance().is_mutable()))
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    /// Override a property, returning the prior value if one existed.
    ///
    /// Fails with [`ConfigError::NotMutable`] when the captured flag is
    /// false.
    pub fn set_value(&self, key: &str, value: &str) -> Result<Option<String>, ConfigError> {
        if !self.mutable {
            return Err(ConfigError::NotMutable);
        }
        Ok(self
            .values
            .write()
            .insert(key.to_string(), value.to_string()))
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Number of overridden properties.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
