//! Leaf encoding.
//!
//! A leaf commits to one chain's init code (or to the fallback init code).
//! Its prefix is a 32-byte big-endian word with the layout
//!
//! ```text
//! bit 248        : fallback flag
//! bits 64..=127  : successor chain id
//! bits 0..=63    : chain id
//! ```
//!
//! with every other bit zero. The leaf hash is `keccak256(prefix ‖ initCodeHash)`.

use std::fmt;

use crate::error::{Error, Result};
use crate::hash::{hash_pair, keccak256};
use crate::precomputed::{FALLBACK_PREFIX, H256};

const FALLBACK_BYTE: usize = 0;
const NEXT_CHAIN_ID_BYTES: std::ops::Range<usize> = 16..24;
const CHAIN_ID_BYTES: std::ops::Range<usize> = 24..32;

/// The three fields packed into a leaf prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafPrefix {
    pub chain_id: u64,
    pub next_chain_id: u64,
    pub is_fallback: bool,
}

impl LeafPrefix {
    /// Prefix of the distinguished fallback leaf.
    pub const FALLBACK: LeafPrefix = LeafPrefix {
        chain_id: 0,
        next_chain_id: 0,
        is_fallback: true,
    };

    /// Prefix of a regular (non-fallback) chain leaf.
    pub fn chain(chain_id: u64, next_chain_id: u64) -> Self {
        Self {
            chain_id,
            next_chain_id,
            is_fallback: false,
        }
    }

    pub fn encode(&self) -> H256 {
        encode(self.chain_id, self.next_chain_id, self.is_fallback)
    }

    pub fn decode(word: &H256) -> Result<Self> {
        let (chain_id, next_chain_id, is_fallback) = decode(word)?;
        Ok(Self {
            chain_id,
            next_chain_id,
            is_fallback,
        })
    }
}

impl fmt::Display for LeafPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fallback {
            write!(f, "fallback({} -> {})", self.chain_id, self.next_chain_id)
        } else {
            write!(f, "{} -> {}", self.chain_id, self.next_chain_id)
        }
    }
}

/// Pack a leaf prefix into its canonical 32-byte word.
pub fn encode(chain_id: u64, next_chain_id: u64, is_fallback: bool) -> H256 {
    let mut word = [0u8; 32];
    word[FALLBACK_BYTE] = is_fallback as u8;
    word[NEXT_CHAIN_ID_BYTES].copy_from_slice(&next_chain_id.to_be_bytes());
    word[CHAIN_ID_BYTES].copy_from_slice(&chain_id.to_be_bytes());
    word
}

/// Unpack a leaf prefix, rejecting any word [`encode`] could not have produced.
pub fn decode(word: &H256) -> Result<(u64, u64, bool)> {
    let non_canonical = |reason| Error::NonCanonicalPrefix {
        word: hex::encode(word),
        reason,
    };

    let is_fallback = match word[FALLBACK_BYTE] {
        0 => false,
        1 => true,
        _ => return Err(non_canonical("fallback byte must be 0x00 or 0x01")),
    };
    if word[1..NEXT_CHAIN_ID_BYTES.start].iter().any(|b| *b != 0) {
        return Err(non_canonical("reserved bits 128..=247 must be zero"));
    }

    let mut next_chain_id = [0u8; 8];
    next_chain_id.copy_from_slice(&word[NEXT_CHAIN_ID_BYTES]);
    let mut chain_id = [0u8; 8];
    chain_id.copy_from_slice(&word[CHAIN_ID_BYTES]);

    Ok((
        u64::from_be_bytes(chain_id),
        u64::from_be_bytes(next_chain_id),
        is_fallback,
    ))
}

/// Hash a packed prefix together with an init-code hash.
pub fn leaf_hash(prefix: &H256, init_code_hash: &H256) -> H256 {
    hash_pair(prefix, init_code_hash)
}

/// A fully derived leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub prefix: LeafPrefix,
    pub init_code_hash: H256,
    pub packed_prefix: H256,
    pub leaf_hash: H256,
}

impl Leaf {
    pub fn new(prefix: LeafPrefix, init_code: &[u8]) -> Self {
        Self::from_init_code_hash(prefix, keccak256(init_code))
    }

    pub fn from_init_code_hash(prefix: LeafPrefix, init_code_hash: H256) -> Self {
        let packed_prefix = prefix.encode();
        Self {
            prefix,
            init_code_hash,
            packed_prefix,
            leaf_hash: leaf_hash(&packed_prefix, &init_code_hash),
        }
    }

    /// The fallback leaf for the given fallback init code.
    pub fn fallback(init_code: &[u8]) -> Self {
        Self::new(LeafPrefix::FALLBACK, init_code)
    }

    pub fn is_fallback(&self) -> bool {
        self.prefix.is_fallback
    }
}

/// Leaf hash of the fallback leaf for `init_code`, using the baked-in prefix.
pub fn fallback_leaf_hash(init_code: &[u8]) -> H256 {
    leaf_hash(&FALLBACK_PREFIX, &keccak256(init_code))
}
