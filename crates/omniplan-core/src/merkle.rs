//! Commutative Merkle tree over leaf hashes.
//!
//! Layers are built bottom-up by hashing adjacent pairs `(2i, 2i + 1)` with
//! [`commutative_hash`]. When a layer has odd length its last node is paired
//! with itself, at every layer and not only at the leaves. Proofs reproduce the
//! same rule: the sibling of an unpaired node is the node itself.
//!
//! Because the combinator sorts its inputs, a proof is just the ordered list of
//! siblings, with no left/right markers, and the root depends only on the
//! multiset of sibling pairs.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::commutative_hash;
use crate::precomputed::H256;

/// A fully materialized Merkle tree. `layers[0]` holds the leaves, the last
/// layer holds the root alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<H256>>,
}

impl MerkleTree {
    /// Build the tree from an ordered, non-empty list of leaf hashes.
    ///
    /// A single leaf is its own root and no layer above it is built.
    pub fn from_leaves(leaves: Vec<H256>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(Error::EmptyTree);
        }

        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let parent = parent_layer(layer);
            layers.push(parent);
        }

        let tree = Self { layers };
        debug!(
            leaves = tree.len(),
            depth = tree.depth(),
            root = %hex::encode(tree.root()),
            "built merkle tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> H256 {
        // Construction guarantees a last layer with exactly one node.
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaves(&self) -> &[H256] {
        &self.layers[0]
    }

    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    /// Number of hashing layers above the leaves, i.e. the proof length.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Ordered sibling list from leaf `index` up to the root.
    pub fn proof(&self, index: usize) -> Result<Vec<H256>> {
        if index >= self.len() {
            return Err(Error::LeafIndexOutOfBounds {
                index,
                len: self.len(),
            });
        }

        let mut proof = Vec::with_capacity(self.depth());
        let mut index = index;
        for layer in &self.layers[..self.depth()] {
            proof.push(sibling(layer, index));
            index /= 2;
        }
        Ok(proof)
    }

    /// Proofs for every leaf, in leaf order.
    pub fn proofs(&self) -> Vec<Vec<H256>> {
        (0..self.len())
            .into_par_iter()
            .map(|index| {
                let mut index = index;
                self.layers[..self.depth()]
                    .iter()
                    .map(|layer| {
                        let node = sibling(layer, index);
                        index /= 2;
                        node
                    })
                    .collect()
            })
            .collect()
    }
}

/// Hash adjacent pairs of `layer`; an unpaired last node is hashed with itself.
fn parent_layer(layer: &[H256]) -> Vec<H256> {
    layer
        .par_chunks(2)
        .map(|pair| {
            // For a trailing single-node chunk, first and last are the same node.
            commutative_hash(&pair[0], &pair[pair.len() - 1])
        })
        .collect()
}

fn sibling(layer: &[H256], index: usize) -> H256 {
    if index % 2 == 1 {
        layer[index - 1]
    } else {
        // Self-duplication for the unpaired last node.
        *layer.get(index + 1).unwrap_or(&layer[index])
    }
}

/// Fold `proof` into `leaf` with the commutative combinator, in proof order.
///
/// This is the only root re-derivation function: off-chain verification and
/// the on-chain deployer both use it.
pub fn fold_proof(leaf: &H256, proof: &[H256]) -> H256 {
    proof
        .iter()
        .fold(*leaf, |node, sibling| commutative_hash(&node, sibling))
}

/// Check that `proof` folds `leaf` into `root`.
pub fn verify_proof(root: &H256, leaf: &H256, proof: &[H256]) -> bool {
    fold_proof(leaf, proof) == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{hash_pair, keccak256};
    use proptest::prelude::*;

    fn make_leaves(count: usize) -> Vec<H256> {
        (0..count as u64).map(|i| keccak256(i.to_be_bytes())).collect()
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        assert!(matches!(
            MerkleTree::from_leaves(vec![]),
            Err(Error::EmptyTree)
        ));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaves = make_leaves(1);
        let tree = MerkleTree::from_leaves(leaves.clone()).unwrap();
        assert_eq!(tree.root(), leaves[0]);
        assert_eq!(tree.depth(), 0);
        assert!(tree.proof(0).unwrap().is_empty());
    }

    #[test]
    fn test_two_leaves() {
        let leaves = make_leaves(2);
        let tree = MerkleTree::from_leaves(leaves.clone()).unwrap();
        assert_eq!(tree.root(), commutative_hash(&leaves[0], &leaves[1]));
        assert_eq!(tree.proof(0).unwrap(), vec![leaves[1]]);
        assert_eq!(tree.proof(1).unwrap(), vec![leaves[0]]);
    }

    #[test]
    fn test_three_leaves_duplicate_last() {
        let l = make_leaves(3);
        let tree = MerkleTree::from_leaves(l.clone()).unwrap();

        let left = commutative_hash(&l[0], &l[1]);
        let right = commutative_hash(&l[2], &l[2]);
        assert_eq!(tree.root(), commutative_hash(&left, &right));
        assert_eq!(tree.proof(2).unwrap(), vec![l[2], left]);
    }

    #[test]
    fn test_odd_upper_layer_duplicates_too() {
        // 5 leaves -> 3 nodes -> 2 nodes -> root. The middle layer is odd.
        let l = make_leaves(5);
        let tree = MerkleTree::from_leaves(l.clone()).unwrap();

        let a = commutative_hash(&l[0], &l[1]);
        let b = commutative_hash(&l[2], &l[3]);
        let c = commutative_hash(&l[4], &l[4]);
        let ab = commutative_hash(&a, &b);
        let cc = commutative_hash(&c, &c);
        assert_eq!(tree.root(), commutative_hash(&ab, &cc));
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.proof(4).unwrap(), vec![l[4], c, ab]);
    }

    #[test]
    fn test_self_duplication_differs_from_skipping() {
        let l = make_leaves(3);
        let tree = MerkleTree::from_leaves(l.clone()).unwrap();
        let promoted = commutative_hash(&commutative_hash(&l[0], &l[1]), &l[2]);
        assert_ne!(tree.root(), promoted);
    }

    #[test]
    fn test_commutative_pairs_use_sorted_order() {
        let l = make_leaves(2);
        let (lo, hi) = if l[0] <= l[1] { (l[0], l[1]) } else { (l[1], l[0]) };
        let tree = MerkleTree::from_leaves(l).unwrap();
        assert_eq!(tree.root(), hash_pair(&lo, &hi));
    }

    #[test]
    fn test_proof_index_out_of_bounds() {
        let tree = MerkleTree::from_leaves(make_leaves(4)).unwrap();
        assert!(matches!(
            tree.proof(4),
            Err(Error::LeafIndexOutOfBounds { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_proofs_match_individual_proofs() {
        let tree = MerkleTree::from_leaves(make_leaves(11)).unwrap();
        let all = tree.proofs();
        for (index, proof) in all.iter().enumerate() {
            assert_eq!(proof, &tree.proof(index).unwrap());
        }
    }

    #[test]
    fn test_wrong_proof_folds_elsewhere() {
        let l = make_leaves(4);
        let tree = MerkleTree::from_leaves(l.clone()).unwrap();
        let proof = tree.proof(1).unwrap();
        assert!(verify_proof(&tree.root(), &l[1], &proof));
        assert!(!verify_proof(&tree.root(), &l[2], &proof));
    }

    proptest! {
        #[test]
        fn every_proof_folds_to_root(count in 1usize..70) {
            let leaves = make_leaves(count);
            let tree = MerkleTree::from_leaves(leaves.clone()).unwrap();
            for (index, leaf) in leaves.iter().enumerate() {
                let proof = tree.proof(index).unwrap();
                prop_assert_eq!(proof.len(), tree.depth());
                prop_assert_eq!(fold_proof(leaf, &proof), tree.root());
            }
        }
    }
}
