//! Hashing primitives.
//!
//! All commitments in a plan are built from Keccak-256 and two pairwise
//! compositions: a plain 64-byte hash and a commutative variant that orders
//! its inputs before hashing.

use sha3::{Digest, Keccak256};

use crate::precomputed::H256;

/// Compute the Keccak-256 hash of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    hasher.finalize().into()
}

/// Hash the 64-byte concatenation `a ‖ b`.
pub fn hash_pair(a: &H256, b: &H256) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(a);
    hasher.update(b);
    hasher.finalize().into()
}

/// Hash two nodes in ascending order, so `commutative_hash(a, b) == commutative_hash(b, a)`.
///
/// Byte-array ordering is lexicographic, which is the unsigned big-endian
/// comparison of the two words.
pub fn commutative_hash(a: &H256, b: &H256) -> H256 {
    if a <= b {
        hash_pair(a, b)
    } else {
        hash_pair(b, a)
    }
}
