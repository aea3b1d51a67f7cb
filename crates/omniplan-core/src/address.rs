//! Two-phase deterministic address derivation.
//!
//! The factory first deploys a fixed proxy with `CREATE2`:
//!
//! ```text
//! proxy   = keccak256(0xff ‖ factory ‖ deploymentSalt ‖ keccak256(PROXY_INITCODE))[12..]
//! ```
//!
//! and the proxy, at nonce 1, creates the real contract with `CREATE`:
//!
//! ```text
//! address = keccak256(0xd6 ‖ 0x94 ‖ proxy ‖ 0x01)[12..]
//! ```
//!
//! The result depends on the factory and the deployment salt only, never on
//! the deployed init code. The deployment salt binds the plan root (or any
//! node re-derived from a proof) to the caller's salt.

use crate::hash::{hash_pair, keccak256};
use crate::precomputed::{
    Address, ADDRESS_SIZE, CREATE2_PREFIX, H256, HASH_SIZE, PROXY_INITCODE_HASH, PROXY_NONCE,
    PROXY_RLP_PREFIX,
};

/// `keccak256(root ‖ salt)`: the salt actually handed to the deployment primitive.
pub fn deployment_salt(root: &H256, salt: &H256) -> H256 {
    hash_pair(root, salt)
}

/// Address of the first-stage proxy.
pub fn proxy_address(factory: &Address, deployment_salt: &H256) -> Address {
    let mut preimage = [0u8; 1 + ADDRESS_SIZE + HASH_SIZE + HASH_SIZE];
    preimage[0] = CREATE2_PREFIX;
    preimage[1..21].copy_from_slice(factory);
    preimage[21..53].copy_from_slice(deployment_salt);
    preimage[53..85].copy_from_slice(&PROXY_INITCODE_HASH);
    truncate(&keccak256(preimage))
}

/// Final contract address for `deployment_salt` under `factory`.
pub fn derive_address(factory: &Address, deployment_salt: &H256) -> Address {
    let proxy = proxy_address(factory, deployment_salt);

    let mut preimage = [0u8; 2 + ADDRESS_SIZE + 1];
    preimage[..2].copy_from_slice(&PROXY_RLP_PREFIX);
    preimage[2..22].copy_from_slice(&proxy);
    preimage[22] = PROXY_NONCE;
    truncate(&keccak256(preimage))
}

/// Address a plan with `root` deploys to under `factory` and the user `salt`.
pub fn predict_address(factory: &Address, root: &H256, salt: &H256) -> Address {
    derive_address(factory, &deployment_salt(root, salt))
}

fn truncate(hash: &H256) -> Address {
    let mut address = [0u8; ADDRESS_SIZE];
    address.copy_from_slice(&hash[HASH_SIZE - ADDRESS_SIZE..]);
    address
}
