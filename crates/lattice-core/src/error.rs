use thiserror::Error;

/// Error type shared by every Lattice crate.
///
/// Absence of data (no score, no edges, no proof target) is never reported
/// through this type; callers see empty collections or `None` instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LatticeError {
    /// An edge source failed while fetching edges.
    #[error("Edge source error: {0}")]
    Source(String),

    /// The score oracle failed while resolving a wallet's scores.
    #[error("Score oracle error: {0}")]
    Oracle(String),

    /// A trust weight outside 0..=10000 basis points.
    #[error("Trust weight must be between 0 and 10000, got {0}")]
    InvalidTrustWeight(u16),

    /// A relation weight outside [0, 1] (or not a finite number).
    #[error("Edge weight must be within [0, 1], got {0}")]
    InvalidEdgeWeight(f64),

    /// A dimension tag that does not name a known trust dimension.
    #[error("Unknown dimension tag: {0}")]
    UnknownDimension(u8),

    /// Malformed serialized bytes.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A leaf index past the end of the tree.
    #[error("Leaf index {index} out of range for {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },

    /// The edge set (or a published count) does not fit the u16 edge counter.
    #[error("Edge count overflow")]
    EdgeCountOverflow,

    /// An inclusion proof did not fold to the committed root.
    #[error("Invalid merkle proof")]
    InvalidMerkleProof,

    /// Traversal configuration outside its allowed ranges.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The per-call deadline elapsed at a collaborator suspension point.
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}
