// crates/lattice-commit/src/anchor.rs
//
// TrustAnchor: the published side of an edge commitment.
//
// An anchor records one owner's latest root and edge count. Third parties
// holding an anchor can check a single claimed edge against it without ever
// seeing the owner's full edge set.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lattice_core::crypto::{Hash32, ZERO_HASH};
use lattice_core::edge::TrustEdge;
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;

use crate::merkle::verify_proof;
use crate::store::{Commitment, EdgeInclusion};

/// Published commitment to one owner's trust edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAnchor {
    /// The wallet whose edges are committed.
    pub owner: Wallet,
    /// Merkle root of all of the owner's edges.
    pub merkle_root: Hash32,
    /// Number of edges under the root.
    pub edge_count: u16,
    /// Unix timestamp of the last root update.
    pub last_updated: i64,
    /// Unix timestamp of anchor creation.
    pub created_at: i64,
}

impl TrustAnchor {
    /// Create an anchor for `owner` committing to the empty edge set.
    pub fn initialize(owner: Wallet, now: i64) -> Self {
        info!(owner = %owner, "Trust anchor initialized");
        Self {
            owner,
            merkle_root: ZERO_HASH,
            edge_count: 0,
            last_updated: now,
            created_at: now,
        }
    }

    /// Replace the published root after the owner changed their edges.
    ///
    /// The zero root and a zero count only make sense together. This is
    /// stricter than the on-chain check, which only rejects a non-zero root
    /// published with a zero count.
    pub fn update_root(&mut self, new_root: Hash32, new_count: u16, now: i64) -> Result<(), LatticeError> {
        let empty_root = new_root == ZERO_HASH;
        if empty_root != (new_count == 0) {
            return Err(LatticeError::EdgeCountOverflow);
        }

        self.merkle_root = new_root;
        self.edge_count = new_count;
        self.last_updated = now;

        info!(owner = %self.owner, edges = new_count, "Trust anchor root updated");
        Ok(())
    }

    /// Publish a store commitment.
    pub fn publish(&mut self, commitment: Commitment, now: i64) -> Result<(), LatticeError> {
        self.update_root(commitment.root, commitment.edge_count, now)
    }

    /// Check that `edge` is part of the committed set.
    ///
    /// Fails with `InvalidTrustWeight` for an out-of-range weight and with
    /// `InvalidMerkleProof` if the proof does not lead to the anchored root.
    pub fn verify_edge(&self, edge: &TrustEdge, proof: &[Hash32], leaf_index: u32) -> Result<(), LatticeError> {
        edge.validate()?;

        if !verify_proof(proof, &self.merkle_root, &edge.leaf_hash(), leaf_index) {
            return Err(LatticeError::InvalidMerkleProof);
        }

        debug!(
            owner = %self.owner,
            trustee = %edge.trustee,
            dimension = ?edge.dimension,
            weight = edge.weight,
            "Trust edge verified"
        );
        Ok(())
    }

    /// `verify_edge` over a bundled inclusion claim.
    pub fn verify_inclusion(&self, inclusion: &EdgeInclusion) -> Result<(), LatticeError> {
        self.verify_edge(&inclusion.edge, &inclusion.proof, inclusion.leaf_index)
    }
}
