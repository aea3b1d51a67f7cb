//! Deploy entry points, as the on-chain deployer runs them.
//!
//! Neither path knows the plan root. The primary path folds the caller's proof
//! and uses whatever node comes out. The fallback path folds two proofs, one
//! for a gap leaf and one for the fallback leaf, and only proceeds when both
//! land on the same node.

use omniplan_core::address::deployment_salt;
use omniplan_core::gap::require_in_gap;
use omniplan_core::leaf::{fallback_leaf_hash, leaf_hash};
use omniplan_core::{fold_proof, Address, Leaf, LeafPrefix, H256};
use tracing::{debug, warn};

use crate::deployer::Deployer;
use crate::error::{Result, VerifyError};

/// Outcome of a successful deploy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    /// The node re-derived from the supplied proof(s).
    pub node: H256,
    pub deployment_salt: H256,
}

/// The verifying deployer of one chain.
#[derive(Debug)]
pub struct DeploymentVerifier<D> {
    chain_id: u64,
    deployer: D,
}

impl<D: Deployer> DeploymentVerifier<D> {
    pub fn new(chain_id: u64, deployer: D) -> Self {
        Self { chain_id, deployer }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn deployer(&self) -> &D {
        &self.deployer
    }

    pub fn into_deployer(self) -> D {
        self.deployer
    }

    /// Primary path: deploy this chain's own init code.
    ///
    /// The leaf is rebuilt from the current chain id, the caller's
    /// `next_chain_id` and the init code. An unrelated proof is not an error;
    /// it yields a different address.
    pub fn deploy(
        &mut self,
        proof: &[H256],
        init_code: &[u8],
        next_chain_id: u64,
        salt: &H256,
    ) -> Result<Deployment> {
        let leaf = Leaf::new(LeafPrefix::chain(self.chain_id, next_chain_id), init_code);
        let node = fold_proof(&leaf.leaf_hash, proof);
        debug!(
            chain_id = self.chain_id,
            next_chain_id,
            proof_len = proof.len(),
            "primary deploy"
        );
        self.finish(node, salt, init_code)
    }

    /// Fallback path: deploy the fallback init code on a chain inside the
    /// gap of the supplied leaf.
    ///
    /// `gap_leaf_hash` is the gap leaf's init-code hash. Checks run in order:
    /// the prefix decodes, is not the fallback leaf, the current chain is in
    /// its gap, and both proofs fold to the same node.
    pub fn deploy_fallback(
        &mut self,
        gap_leaf_prefix: &H256,
        gap_leaf_hash: &H256,
        gap_proof: &[H256],
        fallback_proof: &[H256],
        init_code: &[u8],
        salt: &H256,
    ) -> Result<Deployment> {
        let gap = LeafPrefix::decode(gap_leaf_prefix).inspect_err(|err| {
            warn!(chain_id = self.chain_id, %err, "rejected gap leaf prefix");
        })?;

        if gap.is_fallback {
            warn!(chain_id = self.chain_id, "rejected fallback leaf as gap");
            return Err(VerifyError::FallbackLeafAsGap {
                chain_id: gap.chain_id,
            });
        }

        require_in_gap(gap.chain_id, gap.next_chain_id, self.chain_id).inspect_err(|_| {
            warn!(
                chain_id = self.chain_id,
                gap_leaf = %gap,
                "chain is not in the gap"
            );
        })?;

        let gap_node = fold_proof(&leaf_hash(gap_leaf_prefix, gap_leaf_hash), gap_proof);
        let fallback_node = fold_proof(&fallback_leaf_hash(init_code), fallback_proof);
        if gap_node != fallback_node {
            warn!(chain_id = self.chain_id, gap_leaf = %gap, "proof mismatch");
            return Err(VerifyError::ProofMismatch {
                gap_node,
                fallback_node,
            });
        }

        debug!(chain_id = self.chain_id, gap_leaf = %gap, "fallback deploy");
        self.finish(fallback_node, salt, init_code)
    }

    fn finish(&mut self, node: H256, salt: &H256, init_code: &[u8]) -> Result<Deployment> {
        let deployment_salt = deployment_salt(&node, salt);
        let address = self.deployer.deploy(&deployment_salt, init_code)?;
        Ok(Deployment {
            address,
            node,
            deployment_salt,
        })
    }
}
