// crates/lattice-reputation/src/sources/access.rs
//
// Trust implied by granted access permissions. The weight stored with the
// grant is reported as-is.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lattice_core::edge::Dimension;
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::traits::{EdgeSource, SourceKind, WeightedEdge};

use super::poisoned;

/// A permission granted by one wallet to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub grantee: Wallet,
    pub dimension: Dimension,
    /// Permission weight in [0, 1].
    pub weight: f64,
}

/// Edge source over access grants.
#[derive(Debug, Default)]
pub struct AccessGrantEdgeSource {
    grants: RwLock<HashMap<Wallet, Vec<AccessGrant>>>,
}

impl AccessGrantEdgeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant (or re-grant with a new weight) access from `grantor` to `grantee`.
    pub fn grant(
        &self,
        grantor: Wallet,
        grantee: Wallet,
        dimension: Dimension,
        weight: f64,
    ) -> Result<(), LatticeError> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(LatticeError::InvalidEdgeWeight(weight));
        }

        let mut grants = self.grants.write().map_err(|_| poisoned("access"))?;
        let list = grants.entry(grantor).or_default();
        match list
            .iter_mut()
            .find(|g| g.grantee == grantee && g.dimension == dimension)
        {
            Some(existing) => existing.weight = weight,
            None => list.push(AccessGrant {
                grantee,
                dimension,
                weight,
            }),
        }
        Ok(())
    }

    /// Revoke a grant. Returns whether it existed.
    pub fn revoke(&self, grantor: &Wallet, grantee: &Wallet, dimension: Dimension) -> Result<bool, LatticeError> {
        let mut grants = self.grants.write().map_err(|_| poisoned("access"))?;
        let Some(list) = grants.get_mut(grantor) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|g| !(g.grantee == *grantee && g.dimension == dimension));
        Ok(list.len() != before)
    }
}

#[async_trait]
impl EdgeSource for AccessGrantEdgeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::AccessGrant
    }

    async fn get_edges(&self, wallet: &Wallet, dimension: Dimension) -> Result<Vec<WeightedEdge>, LatticeError> {
        let grants = self.grants.read().map_err(|_| poisoned("access"))?;
        Ok(grants
            .get(wallet)
            .map(|list| {
                list.iter()
                    .filter(|g| g.dimension == dimension)
                    .map(|g| WeightedEdge::new(g.grantee, g.weight))
                    .collect()
            })
            .unwrap_or_default())
    }
}
