// crates/lattice-commit/src/merkle.rs
//
// Binary Merkle tree over opaque 32-byte leaf hashes.
//
// Layer 0 holds the leaf hashes in the order given. Each next layer pairs
// adjacent nodes with `hash_nodes`; an odd layer pairs its last node with a
// copy of itself (never with a zero leaf). The root of an empty tree is the
// all-zero sentinel.

use serde::{Deserialize, Serialize};

use lattice_core::crypto::{hash_nodes, Hash32, ZERO_HASH};
use lattice_core::error::LatticeError;

/// Sibling path for one leaf, ordered bottom (leaf level) to top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling hashes from the leaf layer up to just below the root.
    pub siblings: Vec<Hash32>,
    /// Position of the proven leaf in layer 0.
    pub leaf_index: u32,
}

impl MerkleProof {
    /// Check this proof for `leaf` against `root`.
    pub fn verify(&self, root: &Hash32, leaf: &Hash32) -> bool {
        verify_proof(&self.siblings, root, leaf, self.leaf_index)
    }
}

/// A fully materialized Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `layers[0]` are the leaves, the last layer holds the single root.
    /// Empty for a tree with no leaves.
    layers: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree over the given leaf hashes.
    pub fn from_leaves(leaves: Vec<Hash32>) -> Self {
        if leaves.is_empty() {
            return Self { layers: Vec::new() };
        }

        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let current = &layers[layers.len() - 1];
            let next: Vec<Hash32> = current
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    hash_nodes(left, right)
                })
                .collect();
            layers.push(next);
        }

        Self { layers }
    }

    /// Root hash, or `ZERO_HASH` for an empty tree.
    pub fn root(&self) -> Hash32 {
        self.layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(ZERO_HASH)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    /// Number of levels above the leaves: `ceil(log2(leaf_count))`.
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Build the sibling path for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, LatticeError> {
        let len = self.leaf_count();
        if index >= len {
            return Err(LatticeError::IndexOutOfRange { index, len });
        }
        let leaf_index = u32::try_from(index).map_err(|_| LatticeError::EdgeCountOverflow)?;

        let mut siblings = Vec::with_capacity(self.depth());
        let mut idx = index;
        for layer in &self.layers[..self.depth()] {
            let sibling = idx ^ 1;
            // The last node of an odd layer is paired with itself.
            siblings.push(*layer.get(sibling).unwrap_or(&layer[idx]));
            idx /= 2;
        }

        Ok(MerkleProof {
            siblings,
            leaf_index,
        })
    }
}

/// Verify a Merkle inclusion proof.
///
/// Folds `proof` from `leaf` upward: at an even index the running node is the
/// left child, at an odd index the right child; the index halves every level.
/// Returns `true` only if the result equals `root`. Never panics.
pub fn verify_proof(proof: &[Hash32], root: &Hash32, leaf: &Hash32, index: u32) -> bool {
    let mut computed = *leaf;
    let mut idx = index;

    for sibling in proof {
        computed = if idx % 2 == 0 {
            hash_nodes(&computed, sibling)
        } else {
            hash_nodes(sibling, &computed)
        };
        idx /= 2;
    }

    computed == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::crypto::hash_leaf;

    fn leaves(n: usize) -> Vec<Hash32> {
        (0..n).map(|i| hash_leaf(format!("leaf_{}", i).as_bytes())).collect()
    }

    #[test]
    fn test_empty_tree_has_zero_root() {
        let tree = MerkleTree::from_leaves(Vec::new());
        assert_eq!(tree.root(), ZERO_HASH);
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.depth(), 0);
        assert_eq!(
            tree.proof(0),
            Err(LatticeError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_single_leaf_tree() {
        let l = leaves(1);
        let tree = MerkleTree::from_leaves(l.clone());
        assert_eq!(tree.root(), l[0]);

        let proof = tree.proof(0).unwrap();
        assert!(proof.siblings.is_empty());
        assert!(verify_proof(&[], &tree.root(), &l[0], 0));
    }

    #[test]
    fn test_two_leaf_tree() {
        let l = leaves(2);
        let root = hash_nodes(&l[0], &l[1]);
        let tree = MerkleTree::from_leaves(l.clone());
        assert_eq!(tree.root(), root);

        assert!(verify_proof(&[l[1]], &root, &l[0], 0));
        assert!(verify_proof(&[l[0]], &root, &l[1], 1));
    }

    #[test]
    fn test_four_leaf_tree_matches_hand_built_root() {
        let l = leaves(4);
        let n01 = hash_nodes(&l[0], &l[1]);
        let n23 = hash_nodes(&l[2], &l[3]);
        let root = hash_nodes(&n01, &n23);

        let tree = MerkleTree::from_leaves(l.clone());
        assert_eq!(tree.root(), root);
        assert_eq!(tree.depth(), 2);

        assert_eq!(tree.proof(0).unwrap().siblings, vec![l[1], n23]);
        assert_eq!(tree.proof(2).unwrap().siblings, vec![l[3], n01]);
        assert_eq!(tree.proof(3).unwrap().siblings, vec![l[2], n01]);
    }

    #[test]
    fn test_odd_layer_duplicates_last_node() {
        let l = leaves(3);
        let n01 = hash_nodes(&l[0], &l[1]);
        let n22 = hash_nodes(&l[2], &l[2]);
        let root = hash_nodes(&n01, &n22);

        let tree = MerkleTree::from_leaves(l.clone());
        assert_eq!(tree.root(), root);

        // The lone leaf's sibling is itself.
        let proof = tree.proof(2).unwrap();
        assert_eq!(proof.siblings, vec![l[2], n01]);
        assert!(proof.verify(&root, &l[2]));
    }

    #[test]
    fn test_every_leaf_verifies_for_many_sizes() {
        for n in 1..=17 {
            let l = leaves(n);
            let tree = MerkleTree::from_leaves(l.clone());
            let expected_depth = (n as f64).log2().ceil() as usize;
            for (i, leaf) in l.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert_eq!(proof.siblings.len(), expected_depth, "n={} i={}", n, i);
                assert!(proof.verify(&tree.root(), leaf), "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_tampered_sibling_fails() {
        let l = leaves(4);
        let tree = MerkleTree::from_leaves(l.clone());
        let mut proof = tree.proof(0).unwrap();
        proof.siblings[1][0] ^= 0x01;
        assert!(!proof.verify(&tree.root(), &l[0]));
    }

    #[test]
    fn test_wrong_index_fails() {
        let l = leaves(4);
        let tree = MerkleTree::from_leaves(l.clone());
        let proof = tree.proof(1).unwrap();
        assert!(!verify_proof(&proof.siblings, &tree.root(), &l[1], 0));
    }

    #[test]
    fn test_out_of_range_index() {
        let tree = MerkleTree::from_leaves(leaves(3));
        assert_eq!(
            tree.proof(3),
            Err(LatticeError::IndexOutOfRange { index: 3, len: 3 })
        );
    }
}
