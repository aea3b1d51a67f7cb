//! Read-only queries over a built plan.
//!
//! Each query produces a self-contained, serializable answer: everything a
//! caller needs to hand to a deploy entry point on one chain, or to predict
//! the shared address.

use omniplan_core::address::{deployment_salt, derive_address};
use omniplan_core::encoding::{hex_bytes, hex_fixed, hex_seq};
use omniplan_core::gap::describe_gap;
use omniplan_core::{chain_id, Address, Error, Result, H256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plan::Plan;

/// One chain's leaf and proof, as handed to an independent verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofQuery {
    #[serde(with = "hex_fixed")]
    pub root: H256,
    #[serde(with = "chain_id::as_decimal")]
    pub chain_id: u64,
    #[serde(with = "chain_id::as_decimal")]
    pub next_chain_id: u64,
    #[serde(with = "hex_fixed")]
    pub prefix: H256,
    #[serde(with = "hex_bytes")]
    pub init_code: Vec<u8>,
    #[serde(with = "hex_fixed")]
    pub init_code_hash: H256,
    #[serde(with = "hex_fixed")]
    pub leaf_hash: H256,
    #[serde(with = "hex_seq")]
    pub proof: Vec<H256>,
    #[serde(with = "hex_fixed")]
    pub salt: H256,
}

/// Arguments of the primary deploy entry point on `chain_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryCall {
    #[serde(with = "chain_id::as_decimal")]
    pub chain_id: u64,
    #[serde(with = "hex_seq")]
    pub proof: Vec<H256>,
    #[serde(with = "hex_bytes")]
    pub init_code: Vec<u8>,
    #[serde(with = "chain_id::as_decimal")]
    pub next_chain_id: u64,
    #[serde(with = "hex_fixed")]
    pub salt: H256,
}

/// Arguments of the fallback deploy entry point on a chain without a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackCall {
    #[serde(with = "chain_id::as_decimal")]
    pub target_chain_id: u64,
    /// Which ids the chosen gap leaf covers.
    pub gap: String,
    #[serde(with = "hex_fixed")]
    pub gap_leaf_prefix: H256,
    /// Init-code hash of the gap leaf; the entry point rebuilds the leaf hash.
    #[serde(with = "hex_fixed")]
    pub gap_leaf_hash: H256,
    #[serde(with = "hex_seq")]
    pub gap_proof: Vec<H256>,
    #[serde(with = "hex_seq")]
    pub fallback_proof: Vec<H256>,
    #[serde(with = "hex_bytes")]
    pub init_code: Vec<u8>,
    #[serde(with = "hex_fixed")]
    pub salt: H256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressComputation {
    #[serde(with = "hex_fixed")]
    pub factory: Address,
    #[serde(with = "hex_fixed")]
    pub plan_root: H256,
    #[serde(with = "hex_fixed")]
    pub salt: H256,
    #[serde(with = "hex_fixed")]
    pub deployment_salt: H256,
    #[serde(with = "hex_fixed")]
    pub address: Address,
}

impl Plan {
    pub fn proof_for(&self, chain_id: u64) -> Result<ProofQuery> {
        let leaf = self.leaf(chain_id).ok_or(Error::ChainNotInPlan(chain_id))?;
        Ok(ProofQuery {
            root: self.root,
            chain_id: leaf.chain_id,
            next_chain_id: leaf.next_chain_id,
            prefix: leaf.prefix,
            init_code: leaf.init_code.clone(),
            init_code_hash: leaf.init_code_hash,
            leaf_hash: leaf.leaf_hash,
            proof: leaf.proof.clone(),
            salt: self.salt,
        })
    }

    /// Primary deploy arguments for `chain_id`, under `salt` or the plan salt.
    pub fn primary_call(&self, chain_id: u64, salt: Option<H256>) -> Result<PrimaryCall> {
        let leaf = self.leaf(chain_id).ok_or(Error::ChainNotInPlan(chain_id))?;
        Ok(PrimaryCall {
            chain_id,
            proof: leaf.proof.clone(),
            init_code: leaf.init_code.clone(),
            next_chain_id: leaf.next_chain_id,
            salt: salt.unwrap_or(self.salt),
        })
    }

    /// Fallback deploy arguments for a chain the plan does not list.
    pub fn fallback_call(&self, target: u64, salt: Option<H256>) -> Result<FallbackCall> {
        let gap_leaf = self.gap_leaf_for(target)?;
        debug!(
            target,
            gap_leaf = gap_leaf.chain_id,
            next_chain_id = gap_leaf.next_chain_id,
            "resolved gap leaf"
        );
        Ok(FallbackCall {
            target_chain_id: target,
            gap: describe_gap(gap_leaf.chain_id, gap_leaf.next_chain_id),
            gap_leaf_prefix: gap_leaf.prefix,
            gap_leaf_hash: gap_leaf.init_code_hash,
            gap_proof: gap_leaf.proof.clone(),
            fallback_proof: self.fallback.proof.clone(),
            init_code: self.fallback.init_code.clone(),
            salt: salt.unwrap_or(self.salt),
        })
    }

    /// The address every chain deploys to; `salt` overrides the plan salt.
    pub fn address(&self, factory: &Address, salt: Option<H256>) -> AddressComputation {
        let salt = salt.unwrap_or(self.salt);
        let deployment_salt = deployment_salt(&self.root, &salt);
        AddressComputation {
            factory: *factory,
            plan_root: self.root,
            salt,
            deployment_salt,
            address: derive_address(factory, &deployment_salt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::build;
    use crate::spec::{ChainEntry, PlanSpec};
    use hex_literal::hex;
    use omniplan_core::leaf::{fallback_leaf_hash, leaf_hash};
    use omniplan_core::{fold_proof, ErrorCategory};

    fn reference_plan() -> Plan {
        build(
            &[
                ChainEntry::new(1, vec![0x60, 0x01]),
                ChainEntry::new(25, vec![0x60, 0x02]),
            ],
            &[0x60, 0x03],
        )
        .unwrap()
    }

    #[test]
    fn should_answer_proof_query() {
        let plan = reference_plan();
        let query = plan.proof_for(1).unwrap();
        assert_eq!(query.root, plan.root);
        assert_eq!(query.next_chain_id, 25);
        assert_eq!(
            query.proof,
            vec![
                hex!("17d112e6268019b295807a3bec3a6d95790bc15fc82105ac324a855356e2c2b0"),
                hex!("ec8ecb44ad3413ef7211ba306a4704079ca49612077897a99b688561bc9822eb"),
            ]
        );
        assert_eq!(fold_proof(&query.leaf_hash, &query.proof), plan.root);

        let err = plan.proof_for(2).unwrap_err();
        assert!(matches!(err, Error::ChainNotInPlan(2)));
        assert_eq!(err.category(), ErrorCategory::Lookup);
    }

    #[test]
    fn fallback_call_folds_both_proofs_to_root() {
        let plan = build(
            &[
                ChainEntry::new(10, vec![0x60, 0x0a]),
                ChainEntry::new(25, vec![0x60, 0x19]),
            ],
            &[0x60, 0xff],
        )
        .unwrap();

        let call = plan.fallback_call(120, None).unwrap();
        assert_eq!(call.target_chain_id, 120);
        assert!(call.gap.contains("wraps"));
        let gap_node = fold_proof(
            &leaf_hash(&call.gap_leaf_prefix, &call.gap_leaf_hash),
            &call.gap_proof,
        );
        let fallback_node = fold_proof(&fallback_leaf_hash(&call.init_code), &call.fallback_proof);
        assert_eq!(gap_node, plan.root);
        assert_eq!(fallback_node, plan.root);

        assert!(matches!(
            plan.fallback_call(10, None),
            Err(Error::ChainInPlan(10))
        ));
    }

    #[test]
    fn primary_call_uses_salt_override() {
        let plan = reference_plan();
        assert_eq!(plan.primary_call(25, None).unwrap().salt, plan.salt);
        let call = plan.primary_call(25, Some([0x07; 32])).unwrap();
        assert_eq!(call.salt, [0x07; 32]);
        assert_eq!(call.next_chain_id, 1);
        assert_eq!(call.init_code, vec![0x60, 0x02]);
    }

    #[test]
    fn address_matches_reference_vector() {
        let plan = reference_plan();
        let computed = plan.address(&[0x11; 20], None);
        assert_eq!(
            computed.deployment_salt,
            hex!("5a43f0005e3efa35956c1e1887a1c564e156ff50e95fe72e6057957e46a8af19")
        );
        assert_eq!(
            computed.address,
            hex!("42f52d23a4d43096c1471590e65fc7370fc8cd8f")
        );

        let overridden = plan.address(&[0x11; 20], Some([0x01; 32]));
        assert_eq!(overridden.plan_root, plan.root);
        assert_ne!(overridden.address, computed.address);
    }

    #[test]
    fn plan_salt_flows_into_queries() {
        let spec = PlanSpec::new(vec![ChainEntry::new(77, vec![0x60, 0x77])], vec![0x60, 0xff])
            .with_salt([0x09; 32]);
        let plan = Plan::build(&spec).unwrap();
        assert_eq!(
            plan.root,
            hex!("a9179637576b61890f4f756abfe9273ce89f67051e65d0e9f71264d31d0a6fd0")
        );
        assert_eq!(plan.proof_for(77).unwrap().salt, [0x09; 32]);
        assert_eq!(plan.fallback_call(1, None).unwrap().salt, [0x09; 32]);
        assert_eq!(plan.address(&[0u8; 20], None).salt, [0x09; 32]);
    }

    #[test]
    fn should_serialize_camel_case() {
        let plan = reference_plan();
        let json = serde_json::to_value(plan.fallback_call(30, None).unwrap()).unwrap();
        assert_eq!(json["targetChainId"], "30");
        assert!(json.get("gapLeafPrefix").is_some());
        assert!(json.get("fallbackProof").is_some());

        let json = serde_json::to_value(plan.address(&[0x11; 20], None)).unwrap();
        assert_eq!(json["factory"], "0x1111111111111111111111111111111111111111");
        assert!(json.get("planRoot").is_some());
    }
}
