//! Plan assembly.
//!
//! [`build`] canonicalizes an unordered set of chain entries into a plan:
//! entries are sorted by chain id, each leaf points at the next entry's chain
//! id (the last one wraps to the first), the fallback leaf is appended after
//! the sorted leaves, and every leaf gets its proof against the shared root.

use itertools::Itertools;
use omniplan_core::encoding::{hex_bytes, hex_fixed, hex_seq, to_hex};
use omniplan_core::hash::keccak256;
use omniplan_core::precomputed::ZERO_HASH;
use omniplan_core::{chain_id, fold_proof, Error, Leaf, LeafPrefix, MerkleTree, Result, H256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spec::{ChainEntry, PlanMetadata, PlanSpec};

/// A leaf of a built plan together with its proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLeaf {
    #[serde(with = "chain_id::as_decimal")]
    pub chain_id: u64,
    #[serde(with = "chain_id::as_decimal")]
    pub next_chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(with = "hex_bytes")]
    pub init_code: Vec<u8>,
    #[serde(with = "hex_fixed")]
    pub init_code_hash: H256,
    #[serde(with = "hex_fixed")]
    pub prefix: H256,
    #[serde(with = "hex_fixed")]
    pub leaf_hash: H256,
    #[serde(with = "hex_seq")]
    pub proof: Vec<H256>,
}

impl PlanLeaf {
    fn new(leaf: Leaf, init_code: Vec<u8>, label: Option<String>, proof: Vec<H256>) -> Self {
        Self {
            chain_id: leaf.prefix.chain_id,
            next_chain_id: leaf.prefix.next_chain_id,
            label,
            init_code,
            init_code_hash: leaf.init_code_hash,
            prefix: leaf.packed_prefix,
            leaf_hash: leaf.leaf_hash,
            proof,
        }
    }

    /// Decode the packed prefix.
    pub fn leaf_prefix(&self) -> Result<LeafPrefix> {
        LeafPrefix::decode(&self.prefix)
    }

    /// The node this leaf's proof folds to; equals the plan root for a sound plan.
    pub fn folded_root(&self) -> H256 {
        fold_proof(&self.leaf_hash, &self.proof)
    }
}

/// A built deployment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(with = "hex_fixed")]
    pub root: H256,
    #[serde(with = "hex_fixed")]
    pub salt: H256,
    pub leaves: Vec<PlanLeaf>,
    pub fallback: PlanLeaf,
    #[serde(flatten)]
    pub metadata: PlanMetadata,
}

/// Assemble a plan from chain entries and the fallback init code.
///
/// The result has the zero salt and no metadata; see [`Plan::build`] for the
/// full input spec.
pub fn build(entries: &[ChainEntry], fallback_init_code: &[u8]) -> Result<Plan> {
    if entries.is_empty() {
        return Err(Error::EmptyChainSet);
    }
    if let Some(entry) = entries.iter().find(|e| e.init_code.is_empty()) {
        return Err(Error::MissingInitCode {
            chain_id: entry.chain_id,
        });
    }
    if let Some(chain_id) = entries.iter().map(|e| e.chain_id).duplicates().next() {
        return Err(Error::DuplicateChainId(chain_id));
    }
    if fallback_init_code.is_empty() {
        return Err(Error::MissingFallbackInitCode);
    }

    let sorted: Vec<&ChainEntry> = entries.iter().sorted_by_key(|e| e.chain_id).collect();
    let successors = sorted.iter().cycle().skip(1).map(|e| e.chain_id);

    let mut leaves: Vec<Leaf> = sorted
        .iter()
        .zip(successors)
        .map(|(entry, next_chain_id)| {
            Leaf::new(
                LeafPrefix::chain(entry.chain_id, next_chain_id),
                &entry.init_code,
            )
        })
        .collect();
    leaves.push(Leaf::fallback(fallback_init_code));

    let tree = MerkleTree::from_leaves(leaves.iter().map(|l| l.leaf_hash).collect())?;
    let mut proofs = tree.proofs();

    let fallback = PlanLeaf::new(
        leaves.pop().ok_or(Error::EmptyTree)?,
        fallback_init_code.to_vec(),
        None,
        proofs.pop().ok_or(Error::EmptyTree)?,
    );
    let leaves = leaves
        .into_iter()
        .zip(sorted)
        .zip(proofs)
        .map(|((leaf, entry), proof)| {
            PlanLeaf::new(leaf, entry.init_code.clone(), entry.label.clone(), proof)
        })
        .collect();

    let plan = Plan {
        root: tree.root(),
        salt: ZERO_HASH,
        leaves,
        fallback,
        metadata: PlanMetadata::default(),
    };
    debug!(
        chains = plan.leaves.len(),
        root = %to_hex(plan.root),
        "assembled deployment plan"
    );
    Ok(plan)
}

impl Plan {
    /// Assemble a plan from a full input spec, carrying its salt and metadata.
    pub fn build(spec: &PlanSpec) -> Result<Self> {
        let mut plan = build(&spec.chains, &spec.fallback_init_code)?;
        plan.salt = spec.salt.unwrap_or(ZERO_HASH);
        plan.metadata = spec.metadata.clone();
        Ok(plan)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The leaf for `chain_id`, if the plan lists it.
    ///
    /// Assumes the leaves are sorted by chain id, as [`build`] produces them;
    /// run [`Plan::verify`] first on a plan loaded from elsewhere.
    pub fn leaf(&self, chain_id: u64) -> Option<&PlanLeaf> {
        self.leaves
            .binary_search_by_key(&chain_id, |l| l.chain_id)
            .ok()
            .map(|index| &self.leaves[index])
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.leaves.iter().map(|l| l.chain_id)
    }

    /// The unique leaf whose gap contains `target`.
    ///
    /// Chains listed in the plan have no gap leaf: they deploy their own init
    /// code through the primary path.
    pub fn gap_leaf_for(&self, target: u64) -> Result<&PlanLeaf> {
        if self.leaf(target).is_some() {
            return Err(Error::ChainInPlan(target));
        }
        self.leaves
            .iter()
            .find(|l| omniplan_core::gap::in_gap(l.chain_id, l.next_chain_id, target))
            .ok_or(Error::NoGapLeaf(target))
    }

    /// Re-derive everything a published plan claims and compare.
    ///
    /// Checks, in order: sort order and uniqueness, successor cycle, each
    /// leaf's init-code hash, prefix and leaf hash, the fallback leaf, that
    /// every proof folds to the root, and finally that a fresh rebuild from the
    /// listed init codes yields the same root.
    pub fn verify(&self) -> Result<()> {
        if self.leaves.is_empty() {
            return Err(Error::EmptyChainSet);
        }
        for (leaf, next) in self.leaves.iter().tuple_windows() {
            if leaf.chain_id >= next.chain_id {
                return Err(Error::PlanMismatch {
                    field: "chainId order",
                    chain_id: next.chain_id,
                });
            }
        }

        let n = self.leaves.len();
        for (index, leaf) in self.leaves.iter().enumerate() {
            let expected_next = self.leaves[(index + 1) % n].chain_id;
            if leaf.next_chain_id != expected_next {
                return Err(mismatch("nextChainId", leaf));
            }
            let expected = Leaf::new(
                LeafPrefix::chain(leaf.chain_id, leaf.next_chain_id),
                &leaf.init_code,
            );
            check_leaf(leaf, &expected)?;
            if leaf.folded_root() != self.root {
                return Err(mismatch("proof", leaf));
            }
        }

        if self.fallback.chain_id != 0 || self.fallback.next_chain_id != 0 {
            return Err(mismatch("chainId", &self.fallback));
        }
        check_leaf(&self.fallback, &Leaf::fallback(&self.fallback.init_code))?;
        if self.fallback.folded_root() != self.root {
            return Err(mismatch("proof", &self.fallback));
        }

        let entries: Vec<ChainEntry> = self
            .leaves
            .iter()
            .map(|l| ChainEntry::new(l.chain_id, l.init_code.clone()))
            .collect();
        let rebuilt = build(&entries, &self.fallback.init_code)?;
        if rebuilt.root != self.root {
            return Err(Error::PlanMismatch {
                field: "root",
                chain_id: 0,
            });
        }
        Ok(())
    }
}

fn mismatch(field: &'static str, leaf: &PlanLeaf) -> Error {
    Error::PlanMismatch {
        field,
        chain_id: leaf.chain_id,
    }
}

fn check_leaf(leaf: &PlanLeaf, expected: &Leaf) -> Result<()> {
    if keccak256(&leaf.init_code) != leaf.init_code_hash
        || leaf.init_code_hash != expected.init_code_hash
    {
        return Err(mismatch("initCodeHash", leaf));
    }
    if leaf.prefix != expected.packed_prefix {
        return Err(mismatch("prefix", leaf));
    }
    if leaf.leaf_hash != expected.leaf_hash {
        return Err(mismatch("leafHash", leaf));
    }
    Ok(())
}
