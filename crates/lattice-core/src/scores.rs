// crates/lattice-core/src/scores.rs
//
// Reputation scores as published by the external score oracle.
// The trust engine only consumes these; it never computes them.

use serde::{Deserialize, Serialize};

use crate::edge::Dimension;

/// Reputation tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Tier {
    /// No standing yet. Also used when the oracle has no record.
    #[default]
    Unranked,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Per-dimension and composite scores for one wallet, in basis points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletScores {
    /// Score per dimension, indexed by `Dimension::index()`.
    pub dimension_scores: [u16; Dimension::COUNT],
    /// Composite score across all dimensions.
    pub composite: u16,
    /// Reputation tier.
    pub tier: Tier,
}

impl WalletScores {
    /// Score in a single dimension.
    pub fn dimension_score(&self, dimension: Dimension) -> u16 {
        self.dimension_scores[dimension.index()]
    }
}
