//! Startup validation of incoming property sets.
//!
//! Purely diagnostic: keys are partitioned against the supported list for
//! their source and reported, but unsupported keys still load and remain
//! queryable.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::node;
use crate::system;

/// Partition incoming keys into supported and unsupported sets.
///
/// Both sides come back sorted so the startup report is stable across runs.
pub fn partition<'a>(
    values: &'a HashMap<String, String>,
    supported: &[&str],
) -> (Vec<(&'a str, &'a str)>, Vec<(&'a str, &'a str)>) {
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    for (key, value) in values {
        if supported.contains(&key.as_str()) {
            known.push((key.as_str(), value.as_str()));
        } else {
            unknown.push((key.as_str(), value.as_str()));
        }
    }
    known.sort_unstable();
    unknown.sort_unstable();
    (known, unknown)
}

fn format_block(entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("  {key}={value}\n"))
        .collect()
}

/// Log the supported/unsupported partition for a freshly read property set.
///
/// The allow-list is chosen by file naming convention: system properties
/// live in `config.properties`, node properties in `node.properties`.
/// Other sources are not checked.
pub fn report_incoming(path: &Path, values: &HashMap<String, String>) {
    let name = path.to_string_lossy();
    let (label, supported) = if name.contains("config.properties") {
        ("system", system::SUPPORTED_PROPERTIES)
    } else if name.contains("node.properties") {
        ("node", node::SUPPORTED_PROPERTIES)
    } else {
        return;
    };

    let (known, unknown) = partition(values, supported);
    if !known.is_empty() {
        info!(
            "startup: supported {label} properties:\n{}",
            format_block(&known)
        );
    }
    if !unknown.is_empty() {
        warn!(
            "startup: unsupported {label} properties:\n{}",
            format_block(&unknown)
        );
    }
}
