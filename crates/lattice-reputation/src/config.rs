// crates/lattice-reputation/src/config.rs
//
// Traversal configuration for the trust engine.
// Loaded from a TOML file or populated with the documented defaults; every
// field can also be overridden per call.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lattice_core::error::LatticeError;

/// Hard ceiling on traversal depth. Assessments always walk this deep.
pub const MAX_TRAVERSAL_DEPTH: usize = 6;

/// Knobs for one trust traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Multiplier applied per hop beyond the first, in (0, 1].
    #[serde(default = "default_decay_per_hop")]
    pub decay_per_hop: f64,

    /// Deepest hop to explore, in [1, 6].
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Entries whose trust weight falls below this are dropped when dequeued.
    #[serde(default = "default_min_trust_weight")]
    pub min_trust_weight: f64,

    /// Maximum number of ranked nodes returned.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Wallets scoring below this in the queried dimension are traversed
    /// through but not reported.
    #[serde(default)]
    pub min_dimension_score: u16,

    /// Wall-clock budget for the whole call, in milliseconds.
    /// Checked at every edge source and oracle call. `None` means unbounded.
    #[serde(default)]
    pub deadline_ms: Option<u64>,

    /// Cap on how many wallets one traversal may finalize.
    #[serde(default)]
    pub max_visited: Option<usize>,
}

fn default_decay_per_hop() -> f64 {
    0.6
}

fn default_max_depth() -> usize {
    3
}

fn default_min_trust_weight() -> f64 {
    0.01
}

fn default_result_limit() -> usize {
    50
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            decay_per_hop: default_decay_per_hop(),
            max_depth: default_max_depth(),
            min_trust_weight: default_min_trust_weight(),
            result_limit: default_result_limit(),
            min_dimension_score: 0,
            deadline_ms: None,
            max_visited: None,
        }
    }
}

impl TraversalConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Missing keys take their defaults. The result is validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LatticeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            LatticeError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text. The result is validated.
    pub fn from_toml_str(contents: &str) -> Result<Self, LatticeError> {
        let config: TraversalConfig =
            toml::from_str(contents).map_err(|e| LatticeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), LatticeError> {
        if !(self.decay_per_hop > 0.0 && self.decay_per_hop <= 1.0) {
            return Err(LatticeError::InvalidConfig(format!(
                "decay_per_hop must be in (0, 1], got {}",
                self.decay_per_hop
            )));
        }
        if !(1..=MAX_TRAVERSAL_DEPTH).contains(&self.max_depth) {
            return Err(LatticeError::InvalidConfig(format!(
                "max_depth must be in [1, {}], got {}",
                MAX_TRAVERSAL_DEPTH, self.max_depth
            )));
        }
        if !(0.0..=1.0).contains(&self.min_trust_weight) {
            return Err(LatticeError::InvalidConfig(format!(
                "min_trust_weight must be in [0, 1], got {}",
                self.min_trust_weight
            )));
        }
        if self.result_limit == 0 {
            return Err(LatticeError::InvalidConfig(
                "result_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The per-call deadline as a duration.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Settings used by assessments: full depth, no result limit, no score floor.
    pub fn for_assessment(&self) -> Self {
        Self {
            max_depth: MAX_TRAVERSAL_DEPTH,
            result_limit: usize::MAX,
            min_dimension_score: 0,
            ..self.clone()
        }
    }
}
