// crates/lattice-commit/src/lib.rs
//
// lattice-commit: Merkle commitments over a participant's declared trust
// edges.
//
// An owner's edge set is committed to a single 32-byte root. Any one edge can
// then be shown to belong to the committed set with a sibling-hash path,
// without revealing the rest of the set beyond those sibling hashes.

pub mod anchor;
pub mod merkle;
pub mod store;

// Re-export key types for ergonomic access from downstream crates.
pub use anchor::TrustAnchor;
pub use merkle::{verify_proof, MerkleProof, MerkleTree};
pub use store::{Commitment, EdgeCommitmentStore, EdgeInclusion};
