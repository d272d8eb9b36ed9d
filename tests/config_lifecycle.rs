//! End-to-end load lifecycle across the config facades.

use std::io::Write;
use tempfile::Builder;
use tempfile::NamedTempFile;

use queryd_config::{ConfigError, NodeConfig, QueryOverlayConfig, SystemConfig};

/// Write `content` to a temp file whose name ends in `suffix` so the
/// validation reporter recognizes the source.
fn properties_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn mutable_system_config_round_trip() {
    let file = properties_file(
        "config.properties",
        "mutable-config=true\nhttp-server.http.port=8080\n",
    );
    let config = SystemConfig::new();
    config.initialize(file.path()).unwrap();

    assert_eq!(config.http_server_http_port().unwrap(), 8080);
    assert!(config.is_mutable());

    // Runtime override returns the previous raw value.
    let prior = config
        .set_value("http-server.http.port", "9090")
        .unwrap();
    assert_eq!(prior.as_deref(), Some("8080"));
    assert_eq!(config.http_server_http_port().unwrap(), 9090);
}

#[test]
fn frozen_system_config_rejects_overrides() {
    let file = properties_file("config.properties", "http-server.http.port=8080\n");
    let config = SystemConfig::new();
    config.initialize(file.path()).unwrap();

    assert!(!config.is_mutable());
    assert!(matches!(
        config.set_value("http-server.http.port", "9090"),
        Err(ConfigError::NotMutable)
    ));
    assert_eq!(config.http_server_http_port().unwrap(), 8080);
}

#[test]
fn unsupported_keys_load_and_stay_queryable() {
    let file = properties_file(
        "config.properties",
        "http-server.http.port=8080\nsome-experimental-knob=on\n",
    );
    let config = SystemConfig::new();
    config.initialize(file.path()).unwrap();

    // The unknown key was only flagged in the log, not dropped.
    assert_eq!(
        config.get("some-experimental-knob").as_deref(),
        Some("on")
    );
    assert_eq!(config.http_server_http_port().unwrap(), 8080);
}

#[test]
fn node_config_full_lifecycle() {
    let file = properties_file(
        "node.properties",
        "node.environment=production\n\
         node.id=worker-7\n\
         node.location=rack-b2\n\
         node.ip=10.0.0.5\n\
         node.memory-gb=64\n",
    );
    let config = NodeConfig::new();
    config.initialize(file.path()).unwrap();

    assert_eq!(config.node_environment().unwrap(), "production");
    assert_eq!(config.node_id().unwrap(), "worker-7");
    assert_eq!(config.node_location().unwrap(), "rack-b2");
    assert_eq!(config.node_ip(None).unwrap(), "10.0.0.5");
    assert_eq!(config.node_memory_gb(None).unwrap(), 64);
}

#[test]
fn overlay_follows_system_mutability() {
    let file = properties_file(
        "config.properties",
        "mutable-config=true\nhttp-server.http.port=8080\n",
    );
    let system = SystemConfig::new();
    system.initialize(file.path()).unwrap();

    let overlay = QueryOverlayConfig::new(system.is_mutable());
    assert_eq!(overlay.set_value("query.max-run-time", "2h").unwrap(), None);
    assert_eq!(overlay.get_value("query.max-run-time").as_deref(), Some("2h"));

    let frozen_file = properties_file("config.properties", "http-server.http.port=8080\n");
    let frozen_system = SystemConfig::new();
    frozen_system.initialize(frozen_file.path()).unwrap();

    let frozen_overlay = QueryOverlayConfig::new(frozen_system.is_mutable());
    assert!(matches!(
        frozen_overlay.set_value("query.max-run-time", "2h"),
        Err(ConfigError::NotMutable)
    ));
}

#[test]
fn reinitialize_replaces_the_store() {
    let first = properties_file("config.properties", "http-server.http.port=8080\n");
    let second = properties_file(
        "config.properties",
        "mutable-config=true\nhttp-server.http.port=9090\n",
    );

    let config = SystemConfig::new();
    config.initialize(first.path()).unwrap();
    assert_eq!(config.http_server_http_port().unwrap(), 8080);
    assert!(!config.is_mutable());

    config.initialize(second.path()).unwrap();
    assert_eq!(config.http_server_http_port().unwrap(), 9090);
    assert!(config.is_mutable());
}
