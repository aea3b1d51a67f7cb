//! Precomputed protocol constants.
//!
//! These values are baked into every implementation of the deployment-plan
//! protocol (off-chain tooling and the on-chain deployer alike) and must
//! byte-match across all of them. None of them is runtime configuration.

use hex_literal::hex;

/// 256-bit hash type.
pub type H256 = [u8; 32];

/// 160-bit account address.
pub type Address = [u8; 20];

/// Size of a hash in bytes (Keccak-256).
pub const HASH_SIZE: usize = 32;

/// Size of an account address in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// The all-zero word. Default user salt when a plan author gives none.
pub const ZERO_HASH: H256 = [0u8; 32];

/// Keccak-256 of the empty byte string.
pub const KECCAK_EMPTY: H256 =
    hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// Init code of the first-stage proxy used by the two-phase deployment.
///
/// The proxy forwards its calldata to `CREATE`, so the final contract address
/// only depends on the proxy address and the proxy nonce.
pub const PROXY_INITCODE: [u8; 16] = hex!("67363d3d37363d34f03d5260086018f3");

/// Keccak-256 of [`PROXY_INITCODE`].
pub const PROXY_INITCODE_HASH: H256 =
    hex!("21c35dbe1b344a2488cf3321d6ce542f8e9f305544ff09e4993a62319a497c1f");

/// Leading byte of a `CREATE2` address preimage.
pub const CREATE2_PREFIX: u8 = 0xff;

/// RLP list header for `[address(20 bytes), nonce(1 byte)]`: `0xc0 + 22`, `0x80 + 20`.
pub const PROXY_RLP_PREFIX: [u8; 2] = hex!("d694");

/// Nonce of the proxy when it creates the final contract.
pub const PROXY_NONCE: u8 = 0x01;

/// Packed prefix of the distinguished fallback leaf: chain ids zero, fallback bit set.
pub const FALLBACK_PREFIX: H256 =
    hex!("0100000000000000000000000000000000000000000000000000000000000000");
