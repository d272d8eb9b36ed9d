//! Node identity configuration, loaded from `node.properties`.

use std::path::Path;
use std::sync::OnceLock;
use tracing::error;

use crate::base::ConfigBase;
use crate::error::ConfigError;

pub const NODE_ENVIRONMENT: &str = "node.environment";
pub const NODE_ID: &str = "node.id";
pub const NODE_IP: &str = "node.ip";
pub const NODE_LOCATION: &str = "node.location";
pub const NODE_MEMORY_GB: &str = "node.memory-gb";

/// Keys the node config recognizes. Used only for the startup report.
pub const SUPPORTED_PROPERTIES: &[&str] = &[
    NODE_ENVIRONMENT,
    NODE_ID,
    NODE_IP,
    NODE_LOCATION,
    NODE_MEMORY_GB,
];

/// Process-wide node identity facade.
#[derive(Debug, Default)]
pub struct NodeConfig {
    base: ConfigBase,
}

static INSTANCE: OnceLock<NodeConfig> = OnceLock::new();

impl NodeConfig {
    pub fn new() -> Self {
        NodeConfig {
            base: ConfigBase::new(),
        }
    }

    /// Process-wide instance, created on first use and alive until exit.
    pub fn instance() -> &'static NodeConfig {
        INSTANCE.get_or_init(NodeConfig::new)
    }

    /// Load `node.properties` from `path`. See [`ConfigBase::initialize`].
    pub fn initialize(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.base.initialize(path)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.base.get(key)
    }

    pub fn is_mutable(&self) -> bool {
        self.base.is_mutable()
    }

    pub fn base(&self) -> &ConfigBase {
        &self.base
    }

    /// Deployment environment this node belongs to. Required.
    pub fn node_environment(&self) -> Result<String, ConfigError> {
        self.base.required_property(NODE_ENVIRONMENT)
    }

    /// Stable unique identifier of this node. Required.
    pub fn node_id(&self) -> Result<String, ConfigError> {
        self.base.required_property(NODE_ID)
    }

    /// Rack/region location of this node. Required.
    pub fn node_location(&self) -> Result<String, ConfigError> {
        self.base.required_property(NODE_LOCATION)
    }

    /// Address this node announces, falling back to `fallback` when unset.
    ///
    /// Startup-critical sharp edge: with neither the property nor a fallback
    /// this returns [`ConfigError::Fatal`]. The worker cannot announce
    /// itself without an address, and callers are expected to abort startup.
    pub fn node_ip(&self, fallback: Option<&dyn Fn() -> String>) -> Result<String, ConfigError> {
        if let Some(ip) = self.base.optional_property(NODE_IP)? {
            return Ok(ip);
        }
        match fallback {
            Some(resolve) => Ok(resolve()),
            None => Err(ConfigError::Fatal(format!(
                "'{NODE_IP}' is not set and no fallback address was provided"
            ))),
        }
    }

    /// Memory available to queries on this node in GB, falling back to
    /// `fallback` when unset.
    ///
    /// Startup-critical sharp edge: missing with no fallback, or a resolved
    /// size of zero, returns [`ConfigError::Fatal`].
    pub fn node_memory_gb(
        &self,
        fallback: Option<&dyn Fn() -> u64>,
    ) -> Result<u64, ConfigError> {
        let result = match self.base.optional_property(NODE_MEMORY_GB)? {
            Some(gb) => gb,
            None => match fallback {
                Some(resolve) => resolve(),
                None => {
                    return Err(ConfigError::Fatal(format!(
                        "'{NODE_MEMORY_GB}' is not set and no fallback size was provided"
                    )));
                }
            },
        };
        if result == 0 {
            error!("bad node memory size");
            return Err(ConfigError::Fatal(format!(
                "'{NODE_MEMORY_GB}' resolved to zero"
            )));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn node_from(content: &str) -> (NodeConfig, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let config = NodeConfig::new();
        config.initialize(file.path()).unwrap();
        (config, file)
    }

    #[test]
    fn identity_properties_are_required() {
        let (config, _file) = node_from(
            "node.environment=production\nnode.id=worker-7\nnode.location=rack-b2\n",
        );
        assert_eq!(config.node_environment().unwrap(), "production");
        assert_eq!(config.node_id().unwrap(), "worker-7");
        assert_eq!(config.node_location().unwrap(), "rack-b2");
    }

    #[test]
    fn missing_identity_property_fails() {
        let (config, _file) = node_from("node.environment=production\n");
        assert!(matches!(
            config.node_id(),
            Err(ConfigError::MissingRequiredProperty(_))
        ));
    }

    #[test]
    fn node_ip_prefers_the_property() {
        let (config, _file) = node_from("node.ip=10.0.0.5\n");
        let fallback = || "127.0.0.1".to_string();
        assert_eq!(config.node_ip(Some(&fallback)).unwrap(), "10.0.0.5");
    }

    #[test]
    fn node_ip_uses_fallback_when_unset() {
        let (config, _file) = node_from("node.id=worker-7\n");
        let fallback = || "127.0.0.1".to_string();
        assert_eq!(config.node_ip(Some(&fallback)).unwrap(), "127.0.0.1");
    }

    #[test]
    fn node_ip_without_fallback_is_fatal() {
        let (config, _file) = node_from("node.id=worker-7\n");
        assert!(matches!(config.node_ip(None), Err(ConfigError::Fatal(_))));
    }

    #[test]
    fn node_memory_prefers_the_property() {
        let (config, _file) = node_from("node.memory-gb=64\n");
        assert_eq!(config.node_memory_gb(None).unwrap(), 64);
    }

    #[test]
    fn node_memory_uses_fallback_when_unset() {
        let (config, _file) = node_from("node.id=worker-7\n");
        let fallback = || 32u64;
        assert_eq!(config.node_memory_gb(Some(&fallback)).unwrap(), 32);
    }

    #[test]
    fn node_memory_without_fallback_is_fatal() {
        let (config, _file) = node_from("node.id=worker-7\n");
        assert!(matches!(
            config.node_memory_gb(None),
            Err(ConfigError::Fatal(_))
        ));
    }

    #[test]
    fn zero_node_memory_is_fatal() {
        let (config, _file) = node_from("node.memory-gb=0\n");
        assert!(matches!(
            config.node_memory_gb(None),
            Err(ConfigError::Fatal(_))
        ));
        // A zero from the fallback is just as invalid.
        let (config, _file) = node_from("node.id=worker-7\n");
        let fallback = || 0u64;
        assert!(matches!(
            config.node_memory_gb(Some(&fallback)),
            Err(ConfigError::Fatal(_))
        ));
    }

    #[test]
    fn non_numeric_memory_is_invalid_not_fatal() {
        let (config, _file) = node_from("node.memory-gb=plenty\n");
        assert!(matches!(
            config.node_memory_gb(None),
            Err(ConfigError::InvalidPropertyValue { .. })
        ));
    }
}
