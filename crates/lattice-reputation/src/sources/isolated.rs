// crates/lattice-reputation/src/sources/isolated.rs
//
// Per-source fault isolation.
//
// By default any edge source fault aborts the whole query. Wrapping a source
// in `IsolatedSource` turns its faults into "no edges" for that one call, so
// a flaky source degrades results instead of failing them.

use async_trait::async_trait;
use tracing::warn;

use lattice_core::edge::Dimension;
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::traits::{EdgeSource, SourceKind, WeightedEdge};

/// Wraps an edge source and swallows its faults.
#[derive(Debug)]
pub struct IsolatedSource<S> {
    inner: S,
}

impl<S: EdgeSource> IsolatedSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: EdgeSource> EdgeSource for IsolatedSource<S> {
    fn kind(&self) -> SourceKind {
        self.inner.kind()
    }

    async fn get_edges(&self, wallet: &Wallet, dimension: Dimension) -> Result<Vec<WeightedEdge>, LatticeError> {
        match self.inner.get_edges(wallet, dimension).await {
            Ok(edges) => Ok(edges),
            Err(e) => {
                warn!(
                    source = ?self.inner.kind(),
                    wallet = %wallet,
                    error = %e,
                    "Edge source failed; treating as no edges"
                );
                Ok(Vec::new())
            }
        }
    }
}
