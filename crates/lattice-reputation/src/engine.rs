// crates/lattice-reputation/src/engine.rs
//
// TrustGraphEngine: bounded breadth-first trust propagation across multiple
// edge sources.
//
// Algorithm:
// 1. Seed: mark the origin visited, fetch its edges from every source (in
//    registration order) and enqueue each unvisited neighbor at depth 1 with
//    the raw edge weight as its trust.
// 2. Drain the queue strictly FIFO. An entry is skipped if its wallet is
//    already visited, it is deeper than `max_depth`, or its trust is below
//    `min_trust_weight`. Otherwise the wallet is finalized: the first entry
//    dequeued for a wallet wins, even if a stronger path arrives later.
// 3. Each finalized wallet is enriched with oracle scores and recorded if it
//    clears `min_dimension_score`. Below `max_depth` it is expanded; past the
//    first hop only the high-signal sources are consulted.
// 4. Rank recorded nodes by combined score (stable, so ties keep discovery
//    order) and truncate to `result_limit`.
//
// Every call owns its own queue and visited set. Collaborator faults abort the
// call; wrap a source in `IsolatedSource` to tolerate its faults instead.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use lattice_core::edge::{Dimension, MAX_WEIGHT_BPS};
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::scores::{Tier, WalletScores};
use lattice_core::traits::{EdgeSource, ScoreOracle, SourceKind, WeightedEdge};

use crate::config::TraversalConfig;
use crate::decay::{apply_hop_decay, sanitize_weight};

/// A wallet discovered by a traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustNode {
    pub wallet: Wallet,
    pub dimension: Dimension,
    /// Oracle score in the queried dimension (bps).
    pub dimension_score: u16,
    /// Oracle composite score (bps).
    pub composite_score: u16,
    pub tier: Tier,
    /// Decayed trust along the discovering path, in [0, 1].
    pub trust_weight: f64,
    /// Hops from the origin (>= 1).
    pub depth: usize,
    /// Wallets from the origin to this node inclusive; `depth + 1` long.
    pub path: Vec<Wallet>,
    /// Kind of source that produced the final hop.
    pub source: SourceKind,
    /// `trust_weight * dimension_score / 10000`.
    pub combined_score: f64,
}

/// Ranked outcome of one traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustQueryResult {
    pub origin: Wallet,
    pub dimension: Dimension,
    /// Recorded nodes, best first, at most `result_limit` of them.
    pub nodes: Vec<TrustNode>,
    /// Number of nodes recorded before truncation.
    pub total_discovered: usize,
    /// Deepest hop among recorded nodes (0 if none).
    pub max_depth_reached: usize,
    pub elapsed: Duration,
}

impl TrustQueryResult {
    /// The ranked node for `wallet`, if it made the result set.
    pub fn node(&self, wallet: &Wallet) -> Option<&TrustNode> {
        self.nodes.iter().find(|n| n.wallet == *wallet)
    }
}

/// A queued, not yet finalized arrival at a wallet.
#[derive(Debug)]
struct Frontier {
    wallet: Wallet,
    trust_weight: f64,
    depth: usize,
    path: Vec<Wallet>,
    source: SourceKind,
}

/// Multi-source trust propagation engine.
///
/// Holds the edge sources in registration order, which fixes the order in
/// which a hop's edges are enqueued and therefore which path first claims a
/// wallet.
pub struct TrustGraphEngine {
    sources: Vec<Arc<dyn EdgeSource>>,
    oracle: Arc<dyn ScoreOracle>,
    config: TraversalConfig,
}

impl TrustGraphEngine {
    /// Create an engine with no sources and the default configuration.
    pub fn new(oracle: Arc<dyn ScoreOracle>) -> Self {
        Self {
            sources: Vec::new(),
            oracle,
            config: TraversalConfig::default(),
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: TraversalConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an edge source after those already registered.
    pub fn with_source(mut self, source: Arc<dyn EdgeSource>) -> Self {
        self.register_source(source);
        self
    }

    /// Register an edge source after those already registered.
    pub fn register_source(&mut self, source: Arc<dyn EdgeSource>) {
        debug!(kind = ?source.kind(), position = self.sources.len(), "Edge source registered");
        self.sources.push(source);
    }

    /// Default configuration used by `query` and `assess`.
    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Kinds of the registered sources, in registration order.
    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Rank wallets trusted by `origin` in `dimension` using the default configuration.
    pub async fn query(&self, origin: &Wallet, dimension: Dimension) -> Result<TrustQueryResult, LatticeError> {
        self.query_with(origin, dimension, &self.config).await
    }

    /// Rank wallets trusted by `origin` in `dimension` with per-call settings.
    pub async fn query_with(
        &self,
        origin: &Wallet,
        dimension: Dimension,
        config: &TraversalConfig,
    ) -> Result<TrustQueryResult, LatticeError> {
        config.validate()?;
        let deadline = config.deadline().map(|d| tokio::time::Instant::now() + d);
        self.traverse(origin, dimension, config, deadline).await
    }

    /// Breadth-first walk, shared by queries and assessments.
    pub(crate) async fn traverse(
        &self,
        origin: &Wallet,
        dimension: Dimension,
        config: &TraversalConfig,
        deadline: Option<tokio::time::Instant>,
    ) -> Result<TrustQueryResult, LatticeError> {
        let started = Instant::now();
        let mut visited: HashSet<Wallet> = HashSet::new();
        let mut queue: VecDeque<Frontier> = VecDeque::new();
        let mut recorded: Vec<TrustNode> = Vec::new();
        let mut finalized = 0usize;

        visited.insert(*origin);

        // Seed: hop 1 carries the raw edge weight, no decay.
        let all_sources: Vec<&Arc<dyn EdgeSource>> = self.sources.iter().collect();
        for (kind, edges) in self.fetch_edges(&all_sources, origin, dimension, deadline).await? {
            for edge in edges {
                if visited.contains(&edge.neighbor) {
                    continue;
                }
                queue.push_back(Frontier {
                    wallet: edge.neighbor,
                    trust_weight: sanitize_weight(edge.weight),
                    depth: 1,
                    path: vec![*origin, edge.neighbor],
                    source: kind,
                });
            }
        }

        while let Some(entry) = queue.pop_front() {
            if visited.contains(&entry.wallet)
                || entry.depth > config.max_depth
                || entry.trust_weight < config.min_trust_weight
            {
                debug!(
                    wallet = %entry.wallet,
                    depth = entry.depth,
                    trust_weight = entry.trust_weight,
                    "Queue entry skipped"
                );
                continue;
            }

            if let Some(cap) = config.max_visited {
                if finalized >= cap {
                    warn!(
                        origin = %origin,
                        cap,
                        pending = queue.len() + 1,
                        "Visited cap reached; traversal truncated"
                    );
                    break;
                }
            }

            visited.insert(entry.wallet);
            finalized += 1;

            let scores = self.resolve_scores(&entry.wallet, deadline).await?;
            let dimension_score = scores.dimension_score(dimension);

            debug!(
                wallet = %entry.wallet,
                depth = entry.depth,
                trust_weight = entry.trust_weight,
                dimension_score,
                source = ?entry.source,
                "Wallet finalized"
            );

            if entry.depth < config.max_depth {
                // Past the first hop only high-signal sources keep branching.
                let active: Vec<&Arc<dyn EdgeSource>> = self
                    .sources
                    .iter()
                    .filter(|s| entry.depth == 1 || s.kind().is_high_signal())
                    .collect();

                for (kind, edges) in self.fetch_edges(&active, &entry.wallet, dimension, deadline).await? {
                    for edge in edges {
                        if visited.contains(&edge.neighbor) {
                            continue;
                        }
                        let mut path = Vec::with_capacity(entry.path.len() + 1);
                        path.extend_from_slice(&entry.path);
                        path.push(edge.neighbor);
                        queue.push_back(Frontier {
                            wallet: edge.neighbor,
                            trust_weight: apply_hop_decay(entry.trust_weight, config.decay_per_hop, edge.weight),
                            depth: entry.depth + 1,
                            path,
                            source: kind,
                        });
                    }
                }
            }

            if dimension_score >= config.min_dimension_score {
                recorded.push(TrustNode {
                    wallet: entry.wallet,
                    dimension,
                    dimension_score,
                    composite_score: scores.composite,
                    tier: scores.tier,
                    trust_weight: entry.trust_weight,
                    depth: entry.depth,
                    combined_score: entry.trust_weight * f64::from(dimension_score) / f64::from(MAX_WEIGHT_BPS),
                    path: entry.path,
                    source: entry.source,
                });
            }
        }

        // Stable sort: equal scores keep discovery order.
        recorded.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
        let total_discovered = recorded.len();
        let max_depth_reached = recorded.iter().map(|n| n.depth).max().unwrap_or(0);
        recorded.truncate(config.result_limit);

        let elapsed = started.elapsed();
        info!(
            origin = %origin,
            dimension = ?dimension,
            finalized,
            total_discovered,
            returned = recorded.len(),
            max_depth_reached,
            elapsed_ms = elapsed.as_millis() as u64,
            "Trust query complete"
        );

        Ok(TrustQueryResult {
            origin: *origin,
            dimension,
            nodes: recorded,
            total_discovered,
            max_depth_reached,
            elapsed,
        })
    }

    /// Scores of `wallet`; an unknown wallet scores zero at the lowest tier.
    pub(crate) async fn resolve_scores(
        &self,
        wallet: &Wallet,
        deadline: Option<tokio::time::Instant>,
    ) -> Result<WalletScores, LatticeError> {
        let scores = with_deadline(deadline, self.oracle.get_scores(wallet)).await?;
        Ok(scores.unwrap_or_default())
    }

    /// Query `sources` for `wallet`'s edges concurrently.
    ///
    /// Results come back in the order of `sources`, whatever order the calls
    /// complete in. The first fault fails the whole fetch.
    async fn fetch_edges(
        &self,
        sources: &[&Arc<dyn EdgeSource>],
        wallet: &Wallet,
        dimension: Dimension,
        deadline: Option<tokio::time::Instant>,
    ) -> Result<Vec<(SourceKind, Vec<WeightedEdge>)>, LatticeError> {
        try_join_all(sources.iter().map(|source| async move {
            let edges = with_deadline(deadline, source.get_edges(wallet, dimension)).await?;
            Ok::<_, LatticeError>((source.kind(), edges))
        }))
        .await
    }
}

/// Await `call`, failing with `DeadlineExceeded` if `deadline` passes first.
async fn with_deadline<T, F>(deadline: Option<tokio::time::Instant>, call: F) -> Result<T, LatticeError>
where
    F: Future<Output = Result<T, LatticeError>>,
{
    match deadline {
        Some(at) => tokio::time::timeout_at(at, call)
            .await
            .map_err(|_| LatticeError::DeadlineExceeded)?,
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::InMemoryScoreOracle;
    use crate::sources::{AlignmentEdgeSource, ExplicitEdgeSource};
    use lattice_core::edge::TrustEdge;

    fn wallet(b: u8) -> Wallet {
        Wallet::new([b; 32])
    }

    fn scores(dimension_score: u16) -> WalletScores {
        WalletScores {
            dimension_scores: [dimension_score; 5],
            composite: dimension_score,
            tier: Tier::Silver,
        }
    }

    fn declare(source: &ExplicitEdgeSource, from: u8, to: u8, weight: u16) {
        source
            .declare(wallet(from), TrustEdge::new(wallet(to), Dimension::Civic, weight, 0).unwrap())
            .unwrap();
    }

    #[tokio::test]
    async fn no_sources_yields_empty_result() {
        let engine = TrustGraphEngine::new(Arc::new(InMemoryScoreOracle::new()));
        let result = engine.query(&wallet(0), Dimension::Civic).await.unwrap();
        assert!(result.nodes.is_empty());
        assert_eq!(result.total_discovered, 0);
        assert_eq!(result.max_depth_reached, 0);
    }

    #[tokio::test]
    async fn invalid_config_fails_before_traversal() {
        let engine = TrustGraphEngine::new(Arc::new(InMemoryScoreOracle::new()));
        let config = TraversalConfig {
            max_depth: 9,
            ..TraversalConfig::default()
        };
        assert!(matches!(
            engine.query_with(&wallet(0), Dimension::Civic, &config).await,
            Err(LatticeError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn origin_is_never_reported() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        declare(&explicit, 0, 1, 10_000);
        declare(&explicit, 1, 0, 10_000);
        let engine = TrustGraphEngine::new(Arc::new(InMemoryScoreOracle::new())).with_source(explicit);

        let result = engine.query(&wallet(0), Dimension::Civic).await.unwrap();
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.nodes[0].wallet, wallet(1));
    }

    #[tokio::test]
    async fn combined_score_ranks_results() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        declare(&explicit, 0, 1, 9_000);
        declare(&explicit, 0, 2, 5_000);
        let oracle = Arc::new(InMemoryScoreOracle::new());
        oracle.set_scores(wallet(1), scores(2_000)).unwrap();
        oracle.set_scores(wallet(2), scores(8_000)).unwrap();

        let engine = TrustGraphEngine::new(oracle).with_source(explicit);
        let result = engine.query(&wallet(0), Dimension::Civic).await.unwrap();

        assert_eq!(result.nodes[0].wallet, wallet(2));
        assert!((result.nodes[0].combined_score - 0.4).abs() < 1e-12);
        assert_eq!(result.nodes[0].tier, Tier::Silver);
        assert_eq!(result.nodes[1].wallet, wallet(1));
        assert!((result.nodes[1].combined_score - 0.18).abs() < 1e-12);
    }

    #[tokio::test]
    async fn min_dimension_score_filters_but_still_traverses() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        declare(&explicit, 0, 1, 10_000);
        declare(&explicit, 1, 2, 10_000);
        let oracle = Arc::new(InMemoryScoreOracle::new());
        oracle.set_scores(wallet(1), scores(100)).unwrap();
        oracle.set_scores(wallet(2), scores(9_000)).unwrap();

        let engine = TrustGraphEngine::new(oracle).with_source(explicit);
        let config = TraversalConfig {
            min_dimension_score: 1_000,
            ..TraversalConfig::default()
        };
        let result = engine.query_with(&wallet(0), Dimension::Civic, &config).await.unwrap();

        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.nodes[0].wallet, wallet(2));
        assert_eq!(result.nodes[0].path, vec![wallet(0), wallet(1), wallet(2)]);
    }

    #[tokio::test]
    async fn weak_entries_below_threshold_are_skipped() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        declare(&explicit, 0, 1, 50);
        declare(&explicit, 0, 2, 10_000);
        let engine = TrustGraphEngine::new(Arc::new(InMemoryScoreOracle::new())).with_source(explicit);

        let result = engine.query(&wallet(0), Dimension::Civic).await.unwrap();
        assert_eq!(result.total_discovered, 1);
        assert_eq!(result.nodes[0].wallet, wallet(2));
    }

    #[tokio::test]
    async fn low_signal_sources_only_branch_from_first_hop() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        declare(&explicit, 0, 1, 10_000);
        declare(&explicit, 1, 2, 10_000);
        let alignment = Arc::new(AlignmentEdgeSource::new());
        // 1 <-> 3 aligned: reachable from hop 1.
        alignment.record(wallet(1), wallet(3), Dimension::Civic, 10_000, 10).unwrap();
        // 2 <-> 4 aligned: 2 sits at hop 2, so this is never consulted.
        alignment.record(wallet(2), wallet(4), Dimension::Civic, 10_000, 10).unwrap();

        let engine = TrustGraphEngine::new(Arc::new(InMemoryScoreOracle::new()))
            .with_source(explicit)
            .with_source(alignment)
            .with_config(TraversalConfig {
                max_depth: 4,
                ..TraversalConfig::default()
            });
        let result = engine.query(&wallet(0), Dimension::Civic).await.unwrap();

        assert!(result.node(&wallet(3)).is_some());
        assert_eq!(result.node(&wallet(3)).unwrap().source, SourceKind::Alignment);
        assert!(result.node(&wallet(4)).is_none());
    }

    #[tokio::test]
    async fn visited_cap_truncates_traversal() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        for i in 1..=10 {
            declare(&explicit, 0, i, 10_000);
        }
        let engine = TrustGraphEngine::new(Arc::new(InMemoryScoreOracle::new())).with_source(explicit);
        let config = TraversalConfig {
            max_visited: Some(4),
            ..TraversalConfig::default()
        };

        let result = engine.query_with(&wallet(0), Dimension::Civic, &config).await.unwrap();
        assert_eq!(result.total_discovered, 4);
        assert_eq!(
            result.nodes.iter().map(|n| n.wallet).collect::<Vec<_>>(),
            vec![wallet(1), wallet(2), wallet(3), wallet(4)]
        );
    }

    #[tokio::test]
    async fn result_limit_truncates_after_counting() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        for i in 1..=5 {
            declare(&explicit, 0, i, 1_000 * i as u16);
        }
        let oracle = Arc::new(InMemoryScoreOracle::new());
        for i in 1..=5 {
            oracle.set_scores(wallet(i), scores(10_000)).unwrap();
        }
        let engine = TrustGraphEngine::new(oracle).with_source(explicit);
        let config = TraversalConfig {
            result_limit: 2,
            ..TraversalConfig::default()
        };

        let result = engine.query_with(&wallet(0), Dimension::Civic, &config).await.unwrap();
        assert_eq!(result.total_discovered, 5);
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.nodes[0].wallet, wallet(5));
        assert_eq!(result.nodes[1].wallet, wallet(4));
    }

    #[tokio::test]
    async fn equal_scores_keep_discovery_order() {
        let explicit = Arc::new(ExplicitEdgeSource::new());
        for i in [3u8, 1, 2] {
            declare(&explicit, 0, i, 5_000);
        }
        let engine = TrustGraphEngine::new(Arc::new(InMemoryScoreOracle::new())).with_source(explicit);

        let result = engine.query(&wallet(0), Dimension::Civic).await.unwrap();
        assert_eq!(
            result.nodes.iter().map(|n| n.wallet).collect::<Vec<_>>(),
            vec![wallet(3), wallet(1), wallet(2)]
        );
    }
}
