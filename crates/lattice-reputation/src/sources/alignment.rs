// crates/lattice-reputation/src/sources/alignment.rs
//
// Trust implied by aligned co-activity: two wallets that repeatedly took the
// same side of shared events, and were usually right.
//
// Co-activity is symmetric, so recording a pair makes it visible from both
// wallets. Only pairs with accuracy >= 6000 bps over at least three shared
// events produce a relation, weighted accuracy / 10000 * 0.5.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lattice_core::edge::Dimension;
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::traits::{EdgeSource, SourceKind, WeightedEdge};

use super::{bps_fraction, check_bps, poisoned};

/// Minimum joint accuracy (bps) for a pair to count.
pub const MIN_ALIGNMENT_ACCURACY: u16 = 6_000;
/// Minimum number of shared events for a pair to count.
pub const MIN_SHARED_EVENTS: u32 = 3;
const ALIGNMENT_FACTOR: f64 = 0.5;

/// Co-activity statistics between a wallet and one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoActivity {
    pub peer: Wallet,
    pub dimension: Dimension,
    /// Joint accuracy in basis points.
    pub accuracy: u16,
    pub shared_events: u32,
}

impl CoActivity {
    fn qualifies(&self) -> bool {
        self.accuracy >= MIN_ALIGNMENT_ACCURACY && self.shared_events >= MIN_SHARED_EVENTS
    }
}

/// Edge source over aligned co-activity.
#[derive(Debug, Default)]
pub struct AlignmentEdgeSource {
    activity: RwLock<HashMap<Wallet, Vec<CoActivity>>>,
}

impl AlignmentEdgeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the co-activity of `a` and `b` in `dimension`.
    pub fn record(
        &self,
        a: Wallet,
        b: Wallet,
        dimension: Dimension,
        accuracy: u16,
        shared_events: u32,
    ) -> Result<(), LatticeError> {
        check_bps(accuracy)?;
        if a == b {
            return Ok(());
        }

        let mut activity = self.activity.write().map_err(|_| poisoned("alignment"))?;
        for (from, to) in [(a, b), (b, a)] {
            let list = activity.entry(from).or_default();
            let entry = CoActivity {
                peer: to,
                dimension,
                accuracy,
                shared_events,
            };
            match list
                .iter_mut()
                .find(|c| c.peer == to && c.dimension == dimension)
            {
                Some(existing) => *existing = entry,
                None => list.push(entry),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EdgeSource for AlignmentEdgeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Alignment
    }

    async fn get_edges(&self, wallet: &Wallet, dimension: Dimension) -> Result<Vec<WeightedEdge>, LatticeError> {
        let activity = self.activity.read().map_err(|_| poisoned("alignment"))?;
        Ok(activity
            .get(wallet)
            .map(|list| {
                list.iter()
                    .filter(|c| c.dimension == dimension && c.qualifies())
                    .map(|c| WeightedEdge::new(c.peer, bps_fraction(c.accuracy) * ALIGNMENT_FACTOR))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(b: u8) -> Wallet {
        Wallet::new([b; 32])
    }

    #[tokio::test]
    async fn qualifying_pair_is_symmetric() {
        let source = AlignmentEdgeSource::new();
        source.record(wallet(0), wallet(1), Dimension::Trading, 8_000, 5).unwrap();

        let from_a = source.get_edges(&wallet(0), Dimension::Trading).await.unwrap();
        let from_b = source.get_edges(&wallet(1), Dimension::Trading).await.unwrap();
        assert_eq!(from_a, vec![WeightedEdge::new(wallet(1), 0.4)]);
        assert_eq!(from_b, vec![WeightedEdge::new(wallet(0), 0.4)]);
    }

    #[tokio::test]
    async fn thresholds_are_inclusive() {
        let source = AlignmentEdgeSource::new();
        source.record(wallet(0), wallet(1), Dimension::Trading, 6_000, 3).unwrap();
        source.record(wallet(0), wallet(2), Dimension::Trading, 5_999, 10).unwrap();
        source.record(wallet(0), wallet(3), Dimension::Trading, 9_000, 2).unwrap();

        let edges = source.get_edges(&wallet(0), Dimension::Trading).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].neighbor, wallet(1));
        assert!((edges[0].weight - 0.3).abs() < 1e-12);
    }

    #[tokio::test]
    async fn rerecording_overwrites_and_self_pairs_ignored() {
        let source = AlignmentEdgeSource::new();
        source.record(wallet(0), wallet(1), Dimension::Trading, 9_000, 9).unwrap();
        source.record(wallet(1), wallet(0), Dimension::Trading, 5_000, 9).unwrap();
        source.record(wallet(4), wallet(4), Dimension::Trading, 9_000, 9).unwrap();

        assert!(source.get_edges(&wallet(0), Dimension::Trading).await.unwrap().is_empty());
        assert!(source.get_edges(&wallet(4), Dimension::Trading).await.unwrap().is_empty());
    }
}
