//! System-wide worker configuration, loaded from `config.properties`.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::sync::OnceLock;
use std::thread;

use crate::base::ConfigBase;
use crate::capacity::{self, CapacityUnit};
use crate::error::ConfigError;

// ============================================================================
// Property keys
// ============================================================================

/// Reflexive flag: when the loaded file sets this to `true`, the resulting
/// store accepts runtime overrides.
pub const MUTABLE_CONFIG: &str = "mutable-config";
pub const VERSION: &str = "queryd.version";
pub const HTTP_SERVER_HTTP_PORT: &str = "http-server.http.port";
pub const HTTP_SERVER_REUSE_PORT: &str = "http-server.reuse-port";
pub const HTTP_SERVER_HTTPS_PORT: &str = "http-server.https.port";
pub const HTTP_SERVER_HTTPS_ENABLED: &str = "http-server.https.enabled";
pub const HTTPS_SUPPORTED_CIPHERS: &str = "https-supported-ciphers";
pub const HTTPS_CERT_PATH: &str = "https-cert-path";
pub const HTTPS_KEY_PATH: &str = "https-key-path";
pub const HTTPS_CLIENT_CERT_KEY_PATH: &str = "https-client-cert-key-path";
pub const DISCOVERY_URI: &str = "discovery.uri";
pub const MAX_DRIVERS_PER_TASK: &str = "task.max-drivers-per-task";
pub const CONCURRENT_LIFESPANS_PER_TASK: &str = "task.concurrent-lifespans-per-task";
pub const HTTP_EXEC_THREADS: &str = "http-server.num-exec-threads";
pub const NUM_IO_THREADS: &str = "num-io-threads";
pub const NUM_CONNECTOR_IO_THREADS: &str = "num-connector-io-threads";
pub const NUM_QUERY_THREADS: &str = "num-query-threads";
pub const NUM_SPILL_THREADS: &str = "num-spill-threads";
pub const SPILLER_SPILL_PATH: &str = "spiller.spill-path";
pub const SHUTDOWN_ONSET_SEC: &str = "shutdown-onset-sec";
pub const SYSTEM_MEMORY_GB: &str = "system-memory-gb";
pub const ASYNC_CACHE_SSD_GB: &str = "async-cache-ssd-gb";
pub const ASYNC_CACHE_SSD_CHECKPOINT_GB: &str = "async-cache-ssd-checkpoint-gb";
pub const ASYNC_CACHE_SSD_PATH: &str = "async-cache-ssd-path";
pub const ASYNC_CACHE_SSD_DISABLE_FILE_COW: &str = "async-cache-ssd-disable-file-cow";
pub const ENABLE_SERIALIZED_PAGE_CHECKSUM: &str = "enable-serialized-page-checksum";
pub const ENABLE_TASK_LOGGING: &str = "enable-task-logging";
pub const ENABLE_EXPRESSION_LOGGING: &str = "enable-expression-logging";
pub const USE_MMAP_ARENA: &str = "use-mmap-arena";
pub const MMAP_ARENA_CAPACITY_RATIO: &str = "mmap-arena-capacity-ratio";
pub const USE_MMAP_ALLOCATOR: &str = "use-mmap-allocator";
pub const LOCAL_SHUFFLE_MAX_PARTITION_BYTES: &str = "local-shuffle.max-partition-bytes";
pub const SHUFFLE_NAME: &str = "shuffle.name";
pub const HTTP_ENABLE_ACCESS_LOG: &str = "http-server.enable-access-log";
pub const HTTP_ENABLE_STATS_FILTER: &str = "http-server.enable-stats-filter";
pub const REGISTER_TEST_FUNCTIONS: &str = "register-test-functions";
pub const HTTP_MAX_ALLOCATE_BYTES: &str = "http-server.max-response-allocate-bytes";
pub const QUERY_MAX_MEMORY_PER_NODE: &str = "query.max-memory-per-node";
pub const ENABLE_MEMORY_LEAK_CHECK: &str = "enable-memory-leak-check";
pub const REMOTE_FUNCTION_SERVER_PORT: &str = "remote-function-server.port";

/// Keys the system config recognizes. Used only for the startup report;
/// unknown keys still load.
pub const SUPPORTED_PROPERTIES: &[&str] = &[
    MUTABLE_CONFIG,
    VERSION,
    HTTP_SERVER_HTTP_PORT,
    HTTP_SERVER_REUSE_PORT,
    HTTP_SERVER_HTTPS_PORT,
    HTTP_SERVER_HTTPS_ENABLED,
    HTTPS_SUPPORTED_CIPHERS,
    HTTPS_CERT_PATH,
    HTTPS_KEY_PATH,
    HTTPS_CLIENT_CERT_KEY_PATH,
    DISCOVERY_URI,
    MAX_DRIVERS_PER_TASK,
    CONCURRENT_LIFESPANS_PER_TASK,
    HTTP_EXEC_THREADS,
    NUM_IO_THREADS,
    NUM_CONNECTOR_IO_THREADS,
    NUM_QUERY_THREADS,
    NUM_SPILL_THREADS,
    SPILLER_SPILL_PATH,
    SHUTDOWN_ONSET_SEC,
    SYSTEM_MEMORY_GB,
    ASYNC_CACHE_SSD_GB,
    ASYNC_CACHE_SSD_CHECKPOINT_GB,
    ASYNC_CACHE_SSD_PATH,
    ASYNC_CACHE_SSD_DISABLE_FILE_COW,
    ENABLE_SERIALIZED_PAGE_CHECKSUM,
    ENABLE_TASK_LOGGING,
    ENABLE_EXPRESSION_LOGGING,
    USE_MMAP_ARENA,
    MMAP_ARENA_CAPACITY_RATIO,
    USE_MMAP_ALLOCATOR,
    LOCAL_SHUFFLE_MAX_PARTITION_BYTES,
    SHUFFLE_NAME,
    HTTP_ENABLE_ACCESS_LOG,
    HTTP_ENABLE_STATS_FILTER,
    REGISTER_TEST_FUNCTIONS,
    HTTP_MAX_ALLOCATE_BYTES,
    QUERY_MAX_MEMORY_PER_NODE,
    ENABLE_MEMORY_LEAK_CHECK,
    REMOTE_FUNCTION_SERVER_PORT,
];

// ============================================================================
// Facade
// ============================================================================

/// Process-wide system configuration facade.
///
/// Usually accessed through [`SystemConfig::instance`]; construct with
/// [`SystemConfig::new`] to pass an explicit instance around instead (tests
/// do this).
#[derive(Debug, Default)]
pub struct SystemConfig {
    base: ConfigBase,
}

static INSTANCE: OnceLock<SystemConfig> = OnceLock::new();

impl SystemConfig {
    pub fn new() -> Self {
        SystemConfig {
            base: ConfigBase::new(),
        }
    }

    /// Process-wide instance, created on first use and alive until exit.
    pub fn instance() -> &'static SystemConfig {
        INSTANCE.get_or_init(SystemConfig::new)
    }

    /// Load `config.properties` from `path`. See [`ConfigBase::initialize`].
    pub fn initialize(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.base.initialize(path)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.base.get(key)
    }

    /// Override a property at runtime, returning the prior value.
    pub fn set_value(&self, key: &str, value: &str) -> Result<Option<String>, ConfigError> {
        self.base.set_value(key, value)
    }

    pub fn is_mutable(&self) -> bool {
        self.base.is_mutable()
    }

    pub fn base(&self) -> &ConfigBase {
        &self.base
    }

    // ------------------------------------------------------------------------
    // Identity and HTTP surface
    // ------------------------------------------------------------------------

    /// Worker software version announced to the coordinator. Required.
    pub fn version(&self) -> Result<String, ConfigError> {
        self.base.required_property(VERSION)
    }

    /// Whether the loaded store accepts runtime overrides (default: false).
    pub fn mutable_config(&self) -> Result<bool, ConfigError> {
        Ok(self.base.optional_property(MUTABLE_CONFIG)?.unwrap_or(false))
    }

    /// HTTP port the worker serves on. Required.
    pub fn http_server_http_port(&self) -> Result<i32, ConfigError> {
        self.base.required_property(HTTP_SERVER_HTTP_PORT)
    }

    /// Whether to set SO_REUSEPORT on the HTTP listener (default: false).
    pub fn http_server_reuse_port(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(HTTP_SERVER_REUSE_PORT)?
            .unwrap_or(false))
    }

    /// HTTPS port. Required when TLS is enabled.
    pub fn http_server_https_port(&self) -> Result<i32, ConfigError> {
        self.base.required_property(HTTP_SERVER_HTTPS_PORT)
    }

    /// Whether the HTTPS listener is enabled (default: false).
    pub fn http_server_https_enabled(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(HTTP_SERVER_HTTPS_ENABLED)?
            .unwrap_or(false))
    }

    /// Cipher list offered on the HTTPS listener.
    pub fn https_supported_ciphers(&self) -> Result<String, ConfigError> {
        Ok(self
            .base
            .optional_property(HTTPS_SUPPORTED_CIPHERS)?
            .unwrap_or_else(|| {
                "ECDHE-ECDSA-AES256-GCM-SHA384,ECDHE-RSA-AES256-GCM-SHA384".to_string()
            }))
    }

    pub fn https_cert_path(&self) -> Result<Option<String>, ConfigError> {
        self.base.optional_property(HTTPS_CERT_PATH)
    }

    pub fn https_key_path(&self) -> Result<Option<String>, ConfigError> {
        self.base.optional_property(HTTPS_KEY_PATH)
    }

    pub fn https_client_cert_key_path(&self) -> Result<Option<String>, ConfigError> {
        self.base.optional_property(HTTPS_CLIENT_CERT_KEY_PATH)
    }

    /// Coordinator discovery endpoint, if announced.
    pub fn discovery_uri(&self) -> Result<Option<String>, ConfigError> {
        self.base.optional_property(DISCOVERY_URI)
    }

    /// Location of the remote function execution server, if one is
    /// configured.
    ///
    /// Built from the optional port property on the IPv6 loopback host;
    /// absence is not an error.
    pub fn remote_function_server_location(&self) -> Result<Option<SocketAddr>, ConfigError> {
        let port: Option<u16> = self.base.optional_property(REMOTE_FUNCTION_SERVER_PORT)?;
        Ok(port.map(|port| SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), port)))
    }

    // ------------------------------------------------------------------------
    // Task execution
    // ------------------------------------------------------------------------

    /// Maximum drivers scheduled per task (default: 16).
    pub fn max_drivers_per_task(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(MAX_DRIVERS_PER_TASK)?
            .unwrap_or(16))
    }

    /// Concurrent lifespans per task (default: 1, meaning unlimited for
    /// ungrouped execution).
    pub fn concurrent_lifespans_per_task(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(CONCURRENT_LIFESPANS_PER_TASK)?
            .unwrap_or(1))
    }

    // ------------------------------------------------------------------------
    // Thread pools
    // ------------------------------------------------------------------------

    /// HTTP executor threads (default: 8).
    pub fn http_exec_threads(&self) -> Result<i32, ConfigError> {
        Ok(self.base.optional_property(HTTP_EXEC_THREADS)?.unwrap_or(8))
    }

    /// General IO threads (default: 30).
    pub fn num_io_threads(&self) -> Result<i32, ConfigError> {
        Ok(self.base.optional_property(NUM_IO_THREADS)?.unwrap_or(30))
    }

    /// Connector IO threads (default: 30).
    pub fn num_connector_io_threads(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(NUM_CONNECTOR_IO_THREADS)?
            .unwrap_or(30))
    }

    /// Query execution threads (default: 4x available parallelism).
    pub fn num_query_threads(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(NUM_QUERY_THREADS)?
            .unwrap_or_else(|| available_parallelism() * 4))
    }

    /// Spill threads (default: available parallelism).
    pub fn num_spill_threads(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(NUM_SPILL_THREADS)?
            .unwrap_or_else(available_parallelism))
    }

    // ------------------------------------------------------------------------
    // Memory and spill
    // ------------------------------------------------------------------------

    /// Directory the spiller writes to (default: empty, spilling disabled).
    pub fn spiller_spill_path(&self) -> Result<String, ConfigError> {
        Ok(self
            .base
            .optional_property(SPILLER_SPILL_PATH)?
            .unwrap_or_default())
    }

    /// Seconds between receiving a shutdown request and draining tasks
    /// (default: 10).
    pub fn shutdown_onset_sec(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(SHUTDOWN_ONSET_SEC)?
            .unwrap_or(10))
    }

    /// Memory reserved for the process in GB (default: 40).
    pub fn system_memory_gb(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(SYSTEM_MEMORY_GB)?
            .unwrap_or(40))
    }

    /// Per-query memory cap on this node, in bytes.
    ///
    /// The raw value is a capacity string like `"10GB"`; absent means no cap
    /// (0).
    pub fn query_max_memory_per_node(&self) -> Result<u64, ConfigError> {
        match self
            .base
            .optional_property::<String>(QUERY_MAX_MEMORY_PER_NODE)?
        {
            Some(raw) => Ok(capacity::parse_capacity(&raw, CapacityUnit::Byte)?),
            None => Ok(0),
        }
    }

    // ------------------------------------------------------------------------
    // Async data cache
    // ------------------------------------------------------------------------

    /// SSD cache size in GB (default: 0, disabled).
    pub fn async_cache_ssd_gb(&self) -> Result<u64, ConfigError> {
        Ok(self
            .base
            .optional_property(ASYNC_CACHE_SSD_GB)?
            .unwrap_or(0))
    }

    /// SSD cache checkpoint size in GB (default: 0, disabled).
    pub fn async_cache_ssd_checkpoint_gb(&self) -> Result<u64, ConfigError> {
        Ok(self
            .base
            .optional_property(ASYNC_CACHE_SSD_CHECKPOINT_GB)?
            .unwrap_or(0))
    }

    /// SSD cache file path prefix (default: `/mnt/flash/async_cache.`).
    pub fn async_cache_ssd_path(&self) -> Result<String, ConfigError> {
        Ok(self
            .base
            .optional_property(ASYNC_CACHE_SSD_PATH)?
            .unwrap_or_else(|| "/mnt/flash/async_cache.".to_string()))
    }

    /// Whether to disable copy-on-write for SSD cache files (default: false).
    pub fn async_cache_ssd_disable_file_cow(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(ASYNC_CACHE_SSD_DISABLE_FILE_COW)?
            .unwrap_or(false))
    }

    // ------------------------------------------------------------------------
    // Shuffle
    // ------------------------------------------------------------------------

    /// Max bytes per partition for the local shuffle (default: 256 MB).
    pub fn local_shuffle_max_partition_bytes(&self) -> Result<u64, ConfigError> {
        Ok(self
            .base
            .optional_property(LOCAL_SHUFFLE_MAX_PARTITION_BYTES)?
            .unwrap_or(1 << 28))
    }

    /// Registered shuffle implementation to use (default: `local`).
    pub fn shuffle_name(&self) -> Result<String, ConfigError> {
        Ok(self
            .base
            .optional_property(SHUFFLE_NAME)?
            .unwrap_or_else(|| "local".to_string()))
    }

    // ------------------------------------------------------------------------
    // Diagnostics and tuning knobs
    // ------------------------------------------------------------------------

    /// Checksum serialized exchange pages (default: true).
    pub fn enable_serialized_page_checksum(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(ENABLE_SERIALIZED_PAGE_CHECKSUM)?
            .unwrap_or(true))
    }

    /// Verbose per-task logging (default: false).
    pub fn enable_task_logging(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(ENABLE_TASK_LOGGING)?
            .unwrap_or(false))
    }

    /// Verbose expression-evaluation logging (default: false).
    pub fn enable_expression_logging(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(ENABLE_EXPRESSION_LOGGING)?
            .unwrap_or(false))
    }

    /// Allocate query memory from an mmap arena (default: false).
    pub fn use_mmap_arena(&self) -> Result<bool, ConfigError> {
        Ok(self.base.optional_property(USE_MMAP_ARENA)?.unwrap_or(false))
    }

    /// Ratio of system memory to arena capacity (default: 10).
    pub fn mmap_arena_capacity_ratio(&self) -> Result<i32, ConfigError> {
        Ok(self
            .base
            .optional_property(MMAP_ARENA_CAPACITY_RATIO)?
            .unwrap_or(10))
    }

    /// Use the mmap allocator instead of malloc (default: false).
    pub fn use_mmap_allocator(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(USE_MMAP_ALLOCATOR)?
            .unwrap_or(false))
    }

    /// HTTP access logging (default: false).
    pub fn enable_http_access_log(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(HTTP_ENABLE_ACCESS_LOG)?
            .unwrap_or(false))
    }

    /// Per-endpoint HTTP stats collection (default: false).
    pub fn enable_http_stats_filter(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(HTTP_ENABLE_STATS_FILTER)?
            .unwrap_or(false))
    }

    /// Register built-in test functions at startup (default: false).
    pub fn register_test_functions(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(REGISTER_TEST_FUNCTIONS)?
            .unwrap_or(false))
    }

    /// Cap on per-response HTTP allocations in bytes (default: 64 kB).
    pub fn http_max_allocate_bytes(&self) -> Result<u64, ConfigError> {
        Ok(self
            .base
            .optional_property(HTTP_MAX_ALLOCATE_BYTES)?
            .unwrap_or(64 << 10))
    }

    /// Check for leaked query memory at task teardown (default: true).
    pub fn enable_memory_leak_check(&self) -> Result<bool, ConfigError> {
        Ok(self
            .base
            .optional_property(ENABLE_MEMORY_LEAK_CHECK)?
            .unwrap_or(true))
    }
}

fn available_parallelism() -> i32 {
    thread::available_parallelism()
        .map(|n| n.get() as i32)
        .unwrap_or(1)
}
