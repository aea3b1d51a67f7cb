//! Core primitives for omniplan deployment plans.
//!
//! A deployment plan commits, once, to one init code per chain plus a fallback
//! init code, such that the same address results on every chain whichever
//! payload executes there. This crate holds the protocol pieces every other
//! crate builds on:
//!
//! - [`hash`] - Keccak-256 and the pairwise / commutative compositions
//! - [`leaf`] - packing `(chainId, nextChainId, isFallback)` into a leaf prefix
//! - [`merkle`] - the commutative tree, its proofs and root re-derivation
//! - [`gap`] - which chain ids a leaf lets fall back
//! - [`address`] - deployment salt and the two-phase address formula
//! - [`chain_id`], [`encoding`] - input parsing and canonical output encoding
//!
//! Every function here is pure and every type is immutable once built.

pub mod address;
pub mod chain_id;
pub mod encoding;
pub mod error;
pub mod gap;
pub mod hash;
pub mod leaf;
pub mod merkle;
pub mod precomputed;

pub use error::{Error, ErrorCategory, Result};
pub use leaf::{Leaf, LeafPrefix};
pub use merkle::{fold_proof, verify_proof, MerkleTree};
pub use precomputed::{Address, H256};
