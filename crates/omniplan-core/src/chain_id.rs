//! Chain id parsing and serialization.
//!
//! Chain ids are `u64` internally. At the input boundary they may be given as
//! a decimal string, a `0x`-prefixed hex string or a JSON integer; at the
//! output boundary they are always decimal strings, so hosts with 53-bit
//! integers never lose precision.

use std::num::IntErrorKind;

use crate::error::{Error, Result};

/// Largest integer a double-precision host represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Parse a chain id from its decimal or `0x`-hex string form.
pub fn parse_chain_id(input: &str) -> Result<u64> {
    let value = input.trim();
    let malformed = |reason: &str| Error::MalformedChainId {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let (digits, radix) = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex_digits) => (hex_digits, 16),
        None => (value, 10),
    };

    if let Some(magnitude) = digits.strip_prefix('-') {
        if radix == 10 && !magnitude.is_empty() && magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::ChainIdOutOfRange {
                value: value.to_string(),
            });
        }
        return Err(malformed("unexpected sign"));
    }
    if digits.is_empty() {
        return Err(malformed("no digits"));
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(malformed(if radix == 16 {
            "expected hex digits after 0x"
        } else {
            "expected decimal digits or a 0x prefix"
        }));
    }

    u64::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => Error::ChainIdOutOfRange {
            value: value.to_string(),
        },
        _ => malformed("not an integer"),
    })
}

/// Serde adapter: serialize as a decimal string, deserialize from any accepted form.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Entry {
///     #[serde(with = "omniplan_core::chain_id::as_decimal")]
///     chain_id: u64,
/// }
///
/// let entry: Entry = serde_json::from_str(r#"{"chain_id":"0x2a"}"#).unwrap();
/// assert_eq!(entry.chain_id, 42);
/// assert_eq!(serde_json::to_string(&entry).unwrap(), r#"{"chain_id":"42"}"#);
/// ```
pub mod as_decimal {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use super::{parse_chain_id, MAX_SAFE_INTEGER};
    use crate::error::Error;

    pub fn serialize<S: Serializer>(chain_id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(chain_id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(ChainIdVisitor)
    }

    struct ChainIdVisitor;

    impl<'de> Visitor<'de> for ChainIdVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a chain id as a decimal string, 0x-hex string or safe integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            parse_chain_id(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            if v > MAX_SAFE_INTEGER {
                return Err(E::custom(format!(
                    "chain id {v} exceeds the safe integer range; pass it as a decimal string"
                )));
            }
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            match u64::try_from(v) {
                Ok(v) => self.visit_u64(v),
                Err(_) => Err(E::custom(Error::ChainIdOutOfRange {
                    value: v.to_string(),
                })),
            }
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            if v.is_finite() && (v < 0.0 || v >= u64::MAX as f64) {
                return Err(E::custom(Error::ChainIdOutOfRange {
                    value: v.to_string(),
                }));
            }
            Err(E::custom(Error::MalformedChainId {
                value: v.to_string(),
                reason: "not an integer".to_string(),
            }))
        }
    }
}
