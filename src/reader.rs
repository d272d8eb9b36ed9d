//! Flat `key=value` properties file reading.
//!
//! The rest of the crate only sees the resulting string map; file syntax
//! stops here.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

/// Read a properties file into a key/value map.
///
/// Lines are trimmed before interpretation. Blank lines and lines starting
/// with `#` or `!` are skipped. Everything before the first `=` is the key,
/// everything after is the value, both trimmed. A non-comment line without
/// `=` is an error naming the offending line. Duplicate keys keep the last
/// occurrence.
pub fn read_properties(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut values = HashMap::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::MalformedLine {
                path: path.to_path_buf(),
                line: idx + 1,
            });
        };
        values.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(values)
}
