// crates/lattice-core/src/traits.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::edge::Dimension;
use crate::error::LatticeError;
use crate::identity::Wallet;
use crate::scores::WalletScores;

/// Which kind of relation an edge source reports.
///
/// The trust engine tags every discovered node with the kind of the source
/// that produced its final hop, and restricts expansion beyond the first hop
/// to the high-signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Explicitly declared trust edges.
    Explicit,
    /// Co-membership in the same group.
    Group,
    /// Endorsements / nominations.
    Endorsement,
    /// Aligned activity on shared events.
    Alignment,
    /// Granted access permissions.
    AccessGrant,
}

impl SourceKind {
    /// Sources that keep propagating past the first hop.
    pub fn is_high_signal(self) -> bool {
        matches!(
            self,
            SourceKind::Explicit | SourceKind::Group | SourceKind::Endorsement
        )
    }
}

/// A weighted directed relation returned by an edge source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge {
    /// The wallet the relation points to.
    pub neighbor: Wallet,
    /// Relation strength in [0, 1].
    pub weight: f64,
}

impl WeightedEdge {
    pub fn new(neighbor: Wallet, weight: f64) -> Self {
        Self { neighbor, weight }
    }
}

/// A pluggable provider of weighted trust relations.
///
/// Implementations must be safe to call concurrently and must not mutate
/// anything the traversal observes. "No data" is an empty `Vec`, never an
/// error; an `Err` means an I/O fault and aborts the caller's query.
#[async_trait]
pub trait EdgeSource: Send + Sync {
    /// The kind of relation this source reports.
    fn kind(&self) -> SourceKind;

    /// Outgoing relations of `wallet` in `dimension`, in a deterministic order.
    async fn get_edges(
        &self,
        wallet: &Wallet,
        dimension: Dimension,
    ) -> Result<Vec<WeightedEdge>, LatticeError>;
}

/// Read-only access to externally maintained reputation scores.
///
/// Implemented outside the core (e.g. by an on-chain account reader).
#[async_trait]
pub trait ScoreOracle: Send + Sync {
    /// Scores for `wallet`, or `None` if the oracle has no record of it.
    async fn get_scores(&self, wallet: &Wallet) -> Result<Option<WalletScores>, LatticeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_signal_subset() {
        assert!(SourceKind::Explicit.is_high_signal());
        assert!(SourceKind::Group.is_high_signal());
        assert!(SourceKind::Endorsement.is_high_signal());
        assert!(!SourceKind::Alignment.is_high_signal());
        assert!(!SourceKind::AccessGrant.is_high_signal());
    }
}
