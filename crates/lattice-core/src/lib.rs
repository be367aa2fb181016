// crates/lattice-core/src/lib.rs
//
// lattice-core: Core types, collaborator traits, and hashing primitives for
// the Lattice trust graph.
//
// This is the leaf crate that the commitment store and the trust engine both
// depend on. It defines wallets, trust dimensions, trust edges and their
// canonical encoding, reputation scores, the shared error type, and the
// capability traits through which the engine reaches external data.

pub mod crypto;
pub mod edge;
pub mod error;
pub mod identity;
pub mod scores;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use lattice_core::TrustEdge;`

pub use crypto::{hash_leaf, hash_nodes, keccak256, Hash32, ZERO_HASH};
pub use edge::{Dimension, TrustEdge, MAX_WEIGHT_BPS};
pub use error::LatticeError;
pub use identity::Wallet;
pub use scores::{Tier, WalletScores};
pub use traits::{EdgeSource, ScoreOracle, SourceKind, WeightedEdge};
