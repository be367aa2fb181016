// crates/lattice-reputation/src/oracle.rs
//
// In-memory score oracle.
//
// Production deployments read scores from the external reputation program;
// this map-backed oracle serves local development, tests, and hosts that
// mirror scores into memory themselves.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::scores::WalletScores;
use lattice_core::traits::ScoreOracle;

/// Score oracle backed by a local map.
#[derive(Debug, Default)]
pub struct InMemoryScoreOracle {
    scores: RwLock<HashMap<Wallet, WalletScores>>,
}

impl InMemoryScoreOracle {
    /// Create an oracle with no scores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the scores of `wallet`.
    pub fn set_scores(&self, wallet: Wallet, scores: WalletScores) -> Result<(), LatticeError> {
        self.scores
            .write()
            .map_err(|_| LatticeError::Oracle("score map lock poisoned".to_string()))?
            .insert(wallet, scores);
        Ok(())
    }

    /// Forget the scores of `wallet`. Returns whether any were stored.
    pub fn remove_scores(&self, wallet: &Wallet) -> Result<bool, LatticeError> {
        Ok(self
            .scores
            .write()
            .map_err(|_| LatticeError::Oracle("score map lock poisoned".to_string()))?
            .remove(wallet)
            .is_some())
    }
}

#[async_trait]
impl ScoreOracle for InMemoryScoreOracle {
    async fn get_scores(&self, wallet: &Wallet) -> Result<Option<WalletScores>, LatticeError> {
        let scores = self
            .scores
            .read()
            .map_err(|_| LatticeError::Oracle("score map lock poisoned".to_string()))?;
        Ok(scores.get(wallet).cloned())
    }
}
