//! Hex encoding for byte strings and fixed-width words.
//!
//! Output is always `0x`-prefixed lowercase hex. Input may omit the prefix.
//! Fixed-width fields must have exactly the expected length: nothing is
//! truncated or zero-padded.

use crate::error::{Error, Result};
use crate::precomputed::{Address, H256};

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn strip_prefix(input: &str) -> &str {
    let input = input.trim();
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Decode a variable-length hex byte string. The empty string decodes to no bytes.
pub fn parse_bytes(field: &str, input: &str) -> Result<Vec<u8>> {
    hex::decode(strip_prefix(input)).map_err(|e| Error::MalformedHex {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Decode an exactly `N`-byte hex value.
pub fn parse_fixed<const N: usize>(field: &str, input: &str) -> Result<[u8; N]> {
    let bytes = parse_bytes(field, input)?;
    bytes.try_into().map_err(|bytes: Vec<u8>| Error::InvalidLength {
        field: field.to_string(),
        expected: N,
        actual: bytes.len(),
    })
}

pub fn parse_h256(field: &str, input: &str) -> Result<H256> {
    parse_fixed(field, input)
}

pub fn parse_address(field: &str, input: &str) -> Result<Address> {
    parse_fixed(field, input)
}

/// Serde adapter for `Vec<u8>` fields.
pub mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_bytes("bytes", &s).map_err(de::Error::custom)
    }
}

/// Serde adapter for fixed-width `[u8; N]` fields (hashes, salts, addresses).
pub mod hex_fixed {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_fixed(&format!("{N}-byte value"), &s).map_err(de::Error::custom)
    }
}

/// Serde adapter for optional fixed-width fields; pair it with `#[serde(default)]`.
pub mod hex_fixed_opt {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &Option<[u8; N]>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&super::to_hex(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<Option<[u8; N]>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::parse_fixed(&format!("{N}-byte value"), &s))
            .transpose()
            .map_err(de::Error::custom)
    }
}

/// Serde adapter for sequences of 32-byte words (Merkle proofs).
pub mod hex_seq {
    use serde::ser::SerializeSeq;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::precomputed::H256;

    pub fn serialize<S: Serializer>(words: &[H256], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(words.len()))?;
        for word in words {
            seq.serialize_element(&super::to_hex(word))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<H256>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| super::parse_h256("proof element", s))
            .collect::<crate::Result<Vec<_>>>()
            .map_err(de::Error::custom)
    }
}
