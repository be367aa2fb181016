// crates/lattice-reputation/src/sources/endorsement.rs
//
// Trust implied by endorsements (nominations).
//
// An endorsement carries the endorser's historical accuracy in the
// dimension. The relation weight is 0.7 * accuracy / 10000: even a perfectly
// accurate endorser counts for less than an explicit declaration.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lattice_core::edge::Dimension;
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::traits::{EdgeSource, SourceKind, WeightedEdge};

use super::{bps_fraction, check_bps, poisoned};

/// Discount applied to every endorsement relative to explicit trust.
const ENDORSEMENT_FACTOR: f64 = 0.7;

/// One endorsement made by a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub nominee: Wallet,
    pub dimension: Dimension,
    /// Endorser accuracy in basis points.
    pub accuracy: u16,
}

/// Edge source over endorsements.
#[derive(Debug, Default)]
pub struct EndorsementEdgeSource {
    endorsements: RwLock<HashMap<Wallet, Vec<Endorsement>>>,
}

impl EndorsementEdgeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `endorser` nominates `nominee` in `dimension`.
    /// A repeat nomination updates the accuracy in place.
    pub fn endorse(
        &self,
        endorser: Wallet,
        nominee: Wallet,
        dimension: Dimension,
        accuracy: u16,
    ) -> Result<(), LatticeError> {
        check_bps(accuracy)?;
        let mut endorsements = self.endorsements.write().map_err(|_| poisoned("endorsement"))?;
        let list = endorsements.entry(endorser).or_default();
        match list
            .iter_mut()
            .find(|e| e.nominee == nominee && e.dimension == dimension)
        {
            Some(existing) => existing.accuracy = accuracy,
            None => list.push(Endorsement {
                nominee,
                dimension,
                accuracy,
            }),
        }
        Ok(())
    }

    /// Withdraw a nomination. Returns whether it existed.
    pub fn withdraw(&self, endorser: &Wallet, nominee: &Wallet, dimension: Dimension) -> Result<bool, LatticeError> {
        let mut endorsements = self.endorsements.write().map_err(|_| poisoned("endorsement"))?;
        let Some(list) = endorsements.get_mut(endorser) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|e| !(e.nominee == *nominee && e.dimension == dimension));
        Ok(list.len() != before)
    }
}

#[async_trait]
impl EdgeSource for EndorsementEdgeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Endorsement
    }

    async fn get_edges(&self, wallet: &Wallet, dimension: Dimension) -> Result<Vec<WeightedEdge>, LatticeError> {
        let endorsements = self.endorsements.read().map_err(|_| poisoned("endorsement"))?;
        Ok(endorsements
            .get(wallet)
            .map(|list| {
                list.iter()
                    .filter(|e| e.dimension == dimension && e.nominee != *wallet)
                    .map(|e| WeightedEdge::new(e.nominee, ENDORSEMENT_FACTOR * bps_fraction(e.accuracy)))
                    .collect()
            })
            .unwrap_or_default())
    }
}
