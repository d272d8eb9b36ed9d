//! Typed parsing of raw property values.

/// A type that can be parsed out of a raw property string.
///
/// Implemented for the closed set of types the config facades expose. The
/// accessor layer turns a `None` from [`parse_property`](Self::parse_property)
/// into an `InvalidPropertyValue` error carrying [`EXPECTED`](Self::EXPECTED).
pub trait PropertyValue: Sized {
    /// Human-readable type name used in error reports.
    const EXPECTED: &'static str;

    fn parse_property(raw: &str) -> Option<Self>;
}

impl PropertyValue for String {
    const EXPECTED: &'static str = "string";

    fn parse_property(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl PropertyValue for bool {
    const EXPECTED: &'static str = "bool";

    // Only the canonical spellings; "1"/"yes"/"TRUE" are rejected.
    fn parse_property(raw: &str) -> Option<Self> {
        match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

macro_rules! numeric_property_value {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl PropertyValue for $ty {
                const EXPECTED: &'static str = $name;

                fn parse_property(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }
            }
        )*
    };
}

numeric_property_value! {
    i32 => "32-bit integer",
    u16 => "16-bit unsigned integer",
    u32 => "32-bit unsigned integer",
    u64 => "64-bit unsigned integer",
}
