// crates/lattice-reputation/src/assessment.rs
//
// Pairwise trust assessment: how much does an origin trust a target in one
// dimension, and how much weight should a caller put on that answer.

use serde::{Deserialize, Serialize};
use tracing::info;

use lattice_core::edge::Dimension;
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::scores::Tier;
use lattice_core::traits::SourceKind;

use crate::config::TraversalConfig;
use crate::engine::TrustGraphEngine;

/// How reliable an assessed trust weight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// No trust path reached the target.
    None,
}

impl Confidence {
    /// Classify a discovered path by its length and decayed weight.
    pub fn classify(depth: usize, trust_weight: f64) -> Self {
        if depth <= 1 && trust_weight >= 0.5 {
            Confidence::High
        } else if depth <= 3 && trust_weight >= 0.1 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Outcome of `TrustGraphEngine::assess`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustAssessment {
    pub origin: Wallet,
    pub target: Wallet,
    pub dimension: Dimension,
    pub dimension_score: u16,
    pub composite_score: u16,
    pub tier: Tier,
    /// Zero when the target was not reached.
    pub trust_weight: f64,
    pub depth: usize,
    /// Empty when the target was not reached.
    pub path: Vec<Wallet>,
    /// Source of the final hop, if the target was reached.
    pub source: Option<SourceKind>,
    pub confidence: Confidence,
}

impl TrustAssessment {
    /// Whether any trust path reached the target.
    pub fn is_reachable(&self) -> bool {
        self.confidence != Confidence::None
    }
}

impl TrustGraphEngine {
    /// Assess `origin`'s trust in `target` using the engine's configuration.
    pub async fn assess(
        &self,
        origin: &Wallet,
        target: &Wallet,
        dimension: Dimension,
    ) -> Result<TrustAssessment, LatticeError> {
        let config = self.config().clone();
        self.assess_with(origin, target, dimension, &config).await
    }

    /// Assess `origin`'s trust in `target`.
    ///
    /// The walk keeps the caller's decay, trust floor, deadline and visited
    /// cap but always searches to the maximum depth, with no result limit
    /// and no score floor. The origin itself is never part of a walk, so
    /// self-assessment takes the unreachable branch.
    pub async fn assess_with(
        &self,
        origin: &Wallet,
        target: &Wallet,
        dimension: Dimension,
        config: &TraversalConfig,
    ) -> Result<TrustAssessment, LatticeError> {
        config.validate()?;
        let walk = config.for_assessment();
        // One deadline covers the walk and the fallback score lookup.
        let deadline = walk.deadline().map(|d| tokio::time::Instant::now() + d);

        let result = self.traverse(origin, dimension, &walk, deadline).await?;

        let assessment = match result.node(target) {
            Some(node) => TrustAssessment {
                origin: *origin,
                target: *target,
                dimension,
                dimension_score: node.dimension_score,
                composite_score: node.composite_score,
                tier: node.tier,
                trust_weight: node.trust_weight,
                depth: node.depth,
                path: node.path.clone(),
                source: Some(node.source),
                confidence: Confidence::classify(node.depth, node.trust_weight),
            },
            None => {
                let scores = self.resolve_scores(target, deadline).await?;
                TrustAssessment {
                    origin: *origin,
                    target: *target,
                    dimension,
                    dimension_score: scores.dimension_score(dimension),
                    composite_score: scores.composite,
                    tier: scores.tier,
                    trust_weight: 0.0,
                    depth: 0,
                    path: Vec::new(),
                    source: None,
                    confidence: Confidence::None,
                }
            }
        };

        info!(
            origin = %origin,
            target = %target,
            dimension = ?dimension,
            trust_weight = assessment.trust_weight,
            depth = assessment.depth,
            confidence = ?assessment.confidence,
            "Trust assessment complete"
        );

        Ok(assessment)
    }
}
