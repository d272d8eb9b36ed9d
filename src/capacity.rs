//! Human-readable capacity strings and unit conversion.
//!
//! Operators write memory limits as strings like `"10GB"` or `"1.5TB"`;
//! [`parse_capacity`] converts them into a count of the requested unit.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Capacity string parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("invalid capacity string '{0}'")]
    MalformedInput(String),

    #[error("invalid capacity unit '{0}'")]
    UnknownUnit(String),
}

/// Units a capacity string can be expressed in.
///
/// Multipliers are powers of 1024: `Kilobyte` is 2^10 bytes, `Petabyte`
/// is 2^50.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityUnit {
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
    Terabyte,
    Petabyte,
}

impl CapacityUnit {
    /// All supported units, in ascending order.
    pub const ALL: [CapacityUnit; 6] = [
        CapacityUnit::Byte,
        CapacityUnit::Kilobyte,
        CapacityUnit::Megabyte,
        CapacityUnit::Gigabyte,
        CapacityUnit::Terabyte,
        CapacityUnit::Petabyte,
    ];

    /// Bytes per one of this unit.
    fn bytes(self) -> f64 {
        match self {
            CapacityUnit::Byte => 1.0,
            CapacityUnit::Kilobyte => (1u64 << 10) as f64,
            CapacityUnit::Megabyte => (1u64 << 20) as f64,
            CapacityUnit::Gigabyte => (1u64 << 30) as f64,
            CapacityUnit::Terabyte => (1u64 << 40) as f64,
            CapacityUnit::Petabyte => (1u64 << 50) as f64,
        }
    }

    /// The unit's suffix token as written in capacity strings.
    pub fn token(self) -> &'static str {
        match self {
            CapacityUnit::Byte => "B",
            CapacityUnit::Kilobyte => "kB",
            CapacityUnit::Megabyte => "MB",
            CapacityUnit::Gigabyte => "GB",
            CapacityUnit::Terabyte => "TB",
            CapacityUnit::Petabyte => "PB",
        }
    }

    /// Parse a suffix token. Tokens are case-sensitive: `kB`, not `KB`.
    fn from_token(token: &str) -> Result<Self, CapacityError> {
        match token {
            "B" => Ok(CapacityUnit::Byte),
            "kB" => Ok(CapacityUnit::Kilobyte),
            "MB" => Ok(CapacityUnit::Megabyte),
            "GB" => Ok(CapacityUnit::Gigabyte),
            "TB" => Ok(CapacityUnit::Terabyte),
            "PB" => Ok(CapacityUnit::Petabyte),
            _ => Err(CapacityError::UnknownUnit(token.to_string())),
        }
    }
}

static PATTERN: OnceLock<Regex> = OnceLock::new();

fn pattern() -> &'static Regex {
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([a-zA-Z]+)\s*$").expect("capacity pattern is valid")
    })
}

/// Convert a capacity string like `"10GB"` into a count of `target` units.
///
/// Accepts a non-negative decimal number (integer or fractional) followed by
/// a unit suffix, with optional surrounding whitespace. The conversion runs
/// in floating point and truncates on return, so extreme unit ratios (say a
/// fractional petabyte count read out in bytes) are subject to `f64`
/// rounding.
pub fn parse_capacity(input: &str, target: CapacityUnit) -> Result<u64, CapacityError> {
    let caps = pattern()
        .captures(input)
        .ok_or_else(|| CapacityError::MalformedInput(input.to_string()))?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|_| CapacityError::MalformedInput(input.to_string()))?;
    let unit = CapacityUnit::from_token(&caps[2])?;
    Ok((value * (unit.bytes() / target.bytes())) as u64)
}
