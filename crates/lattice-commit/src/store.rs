// crates/lattice-commit/src/store.rs
//
// EdgeCommitmentStore: one owner's live trust edges plus a lazily built
// Merkle tree over them.
//
// Edges are kept in append order. Adding an edge whose `(trustee, dimension)`
// already exists removes the old edge and appends the new one, so a leaf
// index is only stable until the next mutation: removing or replacing an
// earlier edge shifts every later edge down by one.
//
// The tree cache is an explicit two-state machine. Every mutation moves it
// to `Dirty`; every read rebuilds it if `Dirty` and leaves it `Clean`.
//
// Serialized format:
// ```text
// [2 bytes: edge_count u16 LE]
// [edge_count * 43 bytes: canonical edges in current order]
// ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use lattice_core::crypto::Hash32;
use lattice_core::edge::{Dimension, TrustEdge};
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;

use crate::merkle::{self, MerkleProof, MerkleTree};

/// Root and size of a committed edge set, as published to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub root: Hash32,
    pub edge_count: u16,
}

/// Everything a third party needs to check one edge against a published root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeInclusion {
    pub edge: TrustEdge,
    pub proof: Vec<Hash32>,
    pub leaf_index: u32,
}

impl EdgeInclusion {
    /// Check this inclusion claim against a previously published root.
    pub fn verify(&self, root: &Hash32) -> bool {
        self.edge.validate().is_ok()
            && merkle::verify_proof(&self.proof, root, &self.edge.leaf_hash(), self.leaf_index)
    }
}

#[derive(Debug, Clone)]
enum TreeCache {
    Dirty,
    Clean(MerkleTree),
}

/// Canonical edge set of one owner with a cached commitment tree.
///
/// No internal locking: callers that share a store across tasks must
/// serialize mutations against reads themselves.
#[derive(Debug, Clone)]
pub struct EdgeCommitmentStore {
    /// Live edges in append order. Never holds two edges with the same key.
    edges: Vec<TrustEdge>,
    cache: TreeCache,
}

impl EdgeCommitmentStore {
    /// Largest edge set that can be committed (the published count is a u16).
    pub const MAX_EDGES: usize = u16::MAX as usize;

    const COUNT_PREFIX: usize = 2;

    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            cache: TreeCache::Dirty,
        }
    }

    /// Number of live edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the store holds no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Live edges in current (commitment) order.
    pub fn edges(&self) -> &[TrustEdge] {
        &self.edges
    }

    /// Look up the edge for `(trustee, dimension)`.
    pub fn get(&self, trustee: &Wallet, dimension: Dimension) -> Option<&TrustEdge> {
        self.position(trustee, dimension).map(|i| &self.edges[i])
    }

    /// Current leaf index of `(trustee, dimension)`.
    pub fn position(&self, trustee: &Wallet, dimension: Dimension) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.trustee == *trustee && e.dimension == dimension)
    }

    /// Whether the cached tree is current. Exposed for diagnostics.
    pub fn is_cache_clean(&self) -> bool {
        matches!(self.cache, TreeCache::Clean(_))
    }

    /// Insert or replace the edge keyed by `(edge.trustee, edge.dimension)`.
    ///
    /// Any existing edge with that key is removed and the new edge is
    /// appended. Returns the replaced edge, if any. Validation happens before
    /// any mutation.
    pub fn add_edge(&mut self, edge: TrustEdge) -> Result<Option<TrustEdge>, LatticeError> {
        edge.validate()?;

        let existing = self.position(&edge.trustee, edge.dimension);
        if existing.is_none() && self.edges.len() >= Self::MAX_EDGES {
            return Err(LatticeError::EdgeCountOverflow);
        }

        let replaced = existing.map(|i| self.edges.remove(i));
        self.edges.push(edge);
        self.cache = TreeCache::Dirty;

        debug!(
            trustee = %edge.trustee,
            dimension = ?edge.dimension,
            weight = edge.weight,
            replaced = replaced.is_some(),
            "Trust edge added"
        );
        Ok(replaced)
    }

    /// Remove the edge keyed by `(trustee, dimension)`.
    ///
    /// Returns `true` if an edge was removed. Removing an absent key leaves
    /// the store (and its root) untouched.
    pub fn remove_edge(&mut self, trustee: &Wallet, dimension: Dimension) -> bool {
        match self.position(trustee, dimension) {
            Some(i) => {
                self.edges.remove(i);
                self.cache = TreeCache::Dirty;
                debug!(trustee = %trustee, dimension = ?dimension, "Trust edge removed");
                true
            }
            None => false,
        }
    }

    /// The commitment tree, rebuilt first if any mutation happened since the
    /// last read.
    pub fn tree(&mut self) -> &MerkleTree {
        if let TreeCache::Dirty = self.cache {
            let leaves: Vec<Hash32> = self.edges.iter().map(TrustEdge::leaf_hash).collect();
            debug!(leaves = leaves.len(), "Rebuilding commitment tree");
            self.cache = TreeCache::Clean(MerkleTree::from_leaves(leaves));
        }
        match &self.cache {
            TreeCache::Clean(tree) => tree,
            TreeCache::Dirty => unreachable!("commitment tree rebuilt above"),
        }
    }

    /// Commitment root. All-zero for an empty store.
    pub fn root(&mut self) -> Hash32 {
        self.tree().root()
    }

    /// Root and edge count, ready to publish.
    pub fn commitment(&mut self) -> Commitment {
        Commitment {
            root: self.root(),
            // Bounded by MAX_EDGES in add_edge/from_bytes.
            edge_count: self.edges.len() as u16,
        }
    }

    /// Inclusion proof for `(trustee, dimension)`, or `None` if no such edge.
    pub fn proof(&mut self, trustee: &Wallet, dimension: Dimension) -> Option<MerkleProof> {
        let index = self.position(trustee, dimension)?;
        self.tree().proof(index).ok()
    }

    /// Edge, proof and index bundled for a third-party verifier.
    pub fn inclusion(&mut self, trustee: &Wallet, dimension: Dimension) -> Option<EdgeInclusion> {
        let edge = *self.get(trustee, dimension)?;
        let proof = self.proof(trustee, dimension)?;
        Some(EdgeInclusion {
            edge,
            proof: proof.siblings,
            leaf_index: proof.leaf_index,
        })
    }

    /// Verify an inclusion proof. Pure; never fails, only answers.
    pub fn verify_proof(proof: &[Hash32], root: &Hash32, leaf: &Hash32, index: u32) -> bool {
        merkle::verify_proof(proof, root, leaf, index)
    }

    /// Serialize the live edge set in commitment order.
    ///
    /// # Panics
    ///
    /// Panics if two live edges share a `(trustee, dimension)` key. `add_edge`
    /// and `from_bytes` never produce such a set.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut seen = HashSet::with_capacity(self.edges.len());
        assert!(
            self.edges.iter().all(|e| seen.insert(e.key())),
            "duplicate (trustee, dimension) in edge store"
        );

        let mut buf =
            Vec::with_capacity(Self::COUNT_PREFIX + self.edges.len() * TrustEdge::SERIALIZED_SIZE);
        buf.extend_from_slice(&(self.edges.len() as u16).to_le_bytes());
        for edge in &self.edges {
            buf.extend_from_slice(&edge.to_bytes());
        }
        buf
    }

    /// Restore a store from `to_bytes` output.
    ///
    /// Rejects wrong lengths, unknown dimension tags, out-of-range weights,
    /// and duplicate keys. Nothing is built unless the whole input is valid.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LatticeError> {
        if data.len() < Self::COUNT_PREFIX {
            return Err(LatticeError::Serialization(format!(
                "edge store data too short: expected at least {} bytes, got {}",
                Self::COUNT_PREFIX,
                data.len()
            )));
        }

        let count = u16::from_le_bytes([data[0], data[1]]) as usize;
        let expected = Self::COUNT_PREFIX + count * TrustEdge::SERIALIZED_SIZE;
        if data.len() != expected {
            return Err(LatticeError::Serialization(format!(
                "edge store declares {} edges ({} bytes), got {} bytes",
                count,
                expected,
                data.len()
            )));
        }

        let mut edges = Vec::with_capacity(count);
        let mut seen = HashSet::with_capacity(count);
        for chunk in data[Self::COUNT_PREFIX..].chunks_exact(TrustEdge::SERIALIZED_SIZE) {
            let edge = TrustEdge::from_bytes(chunk)?;
            if !seen.insert(edge.key()) {
                return Err(LatticeError::Serialization(format!(
                    "duplicate edge for trustee {} in dimension {:?}",
                    edge.trustee, edge.dimension
                )));
            }
            edges.push(edge);
        }

        Ok(Self {
            edges,
            cache: TreeCache::Dirty,
        })
    }
}

impl Default for EdgeCommitmentStore {
    fn default() -> Self {
        Self::new()
    }
}
