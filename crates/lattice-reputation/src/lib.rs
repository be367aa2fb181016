// crates/lattice-reputation/src/lib.rs
//
// lattice-reputation: Trust propagation across pluggable edge sources for
// the Lattice trust graph.
//
// The engine walks outward from an origin wallet breadth-first, pulling
// weighted relations from every registered edge source, decaying trust per
// hop, enriching each discovered wallet with its externally published
// reputation scores, and ranking the result. Assessment runs the same walk
// to answer "how much does A trust B in this dimension, and how sure are we".

pub mod assessment;
pub mod config;
pub mod decay;
pub mod engine;
pub mod oracle;
pub mod sources;

pub use assessment::{Confidence, TrustAssessment};
pub use config::{TraversalConfig, MAX_TRAVERSAL_DEPTH};
pub use engine::{TrustGraphEngine, TrustNode, TrustQueryResult};
pub use oracle::InMemoryScoreOracle;
