// crates/lattice-reputation/src/sources/explicit.rs
//
// Explicitly declared trust edges, one commitment store per owner.
//
// Because the declarations live in `EdgeCommitmentStore`s, the same source
// that feeds the traversal can also produce each owner's commitment root and
// per-edge inclusion proofs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use lattice_commit::{Commitment, EdgeCommitmentStore, EdgeInclusion};
use lattice_core::edge::{Dimension, TrustEdge};
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::traits::{EdgeSource, SourceKind, WeightedEdge};

use super::poisoned;

/// Edge source over owners' declared trust edges.
#[derive(Debug, Default)]
pub struct ExplicitEdgeSource {
    stores: RwLock<HashMap<Wallet, EdgeCommitmentStore>>,
}

impl ExplicitEdgeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) `owner`'s edge to `edge.trustee` in `edge.dimension`.
    ///
    /// Returns the replaced edge, if any.
    pub fn declare(&self, owner: Wallet, edge: TrustEdge) -> Result<Option<TrustEdge>, LatticeError> {
        let mut stores = self.stores.write().map_err(|_| poisoned("explicit"))?;
        stores.entry(owner).or_default().add_edge(edge)
    }

    /// Withdraw `owner`'s edge to `trustee` in `dimension`. Returns whether one existed.
    pub fn revoke(&self, owner: &Wallet, trustee: &Wallet, dimension: Dimension) -> Result<bool, LatticeError> {
        let mut stores = self.stores.write().map_err(|_| poisoned("explicit"))?;
        Ok(stores
            .get_mut(owner)
            .map(|store| store.remove_edge(trustee, dimension))
            .unwrap_or(false))
    }

    /// `owner`'s current commitment. An owner with no declarations commits to
    /// the empty set.
    pub fn commitment(&self, owner: &Wallet) -> Result<Commitment, LatticeError> {
        let mut stores = self.stores.write().map_err(|_| poisoned("explicit"))?;
        Ok(match stores.get_mut(owner) {
            Some(store) => store.commitment(),
            None => EdgeCommitmentStore::new().commitment(),
        })
    }

    /// Inclusion claim for one of `owner`'s edges.
    pub fn inclusion(
        &self,
        owner: &Wallet,
        trustee: &Wallet,
        dimension: Dimension,
    ) -> Result<Option<EdgeInclusion>, LatticeError> {
        let mut stores = self.stores.write().map_err(|_| poisoned("explicit"))?;
        Ok(stores
            .get_mut(owner)
            .and_then(|store| store.inclusion(trustee, dimension)))
    }

    /// Serialized edge set of `owner`, for persistence.
    pub fn export(&self, owner: &Wallet) -> Result<Vec<u8>, LatticeError> {
        let stores = self.stores.read().map_err(|_| poisoned("explicit"))?;
        Ok(match stores.get(owner) {
            Some(store) => store.to_bytes(),
            None => EdgeCommitmentStore::new().to_bytes(),
        })
    }

    /// Replace `owner`'s edge set with previously exported bytes.
    ///
    /// Malformed bytes leave the current set untouched.
    pub fn import(&self, owner: Wallet, data: &[u8]) -> Result<(), LatticeError> {
        let store = EdgeCommitmentStore::from_bytes(data)?;
        let mut stores = self.stores.write().map_err(|_| poisoned("explicit"))?;
        stores.insert(owner, store);
        Ok(())
    }
}

#[async_trait]
impl EdgeSource for ExplicitEdgeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Explicit
    }

    async fn get_edges(&self, wallet: &Wallet, dimension: Dimension) -> Result<Vec<WeightedEdge>, LatticeError> {
        let stores = self.stores.read().map_err(|_| poisoned("explicit"))?;
        Ok(stores
            .get(wallet)
            .map(|store| {
                store
                    .edges()
                    .iter()
                    .filter(|e| e.dimension == dimension)
                    .map(|e| WeightedEdge::new(e.trustee, e.weight_fraction()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
