// crates/lattice-reputation/src/sources/mod.rs
//
// Reference edge sources.
//
// Each source owns a local registry mapping a wallet to the data registered
// for it; the registry lives exactly as long as the source instance. All
// registries sit behind a `RwLock` so sources can be shared with the engine
// and mutated concurrently with traversals.
//
// Weight rules:
//   explicit     declared_weight / 10000
//   group        by group size: <=10 0.9, <=30 0.7, <=80 0.5, <=150 0.35, else 0.2
//   endorsement  0.7 * accuracy / 10000
//   alignment    accuracy / 10000 * 0.5, only if accuracy >= 6000 and shared_events >= 3
//   access       stored permission weight, verbatim

pub mod access;
pub mod alignment;
pub mod endorsement;
pub mod explicit;
pub mod group;
pub mod isolated;

pub use access::AccessGrantEdgeSource;
pub use alignment::AlignmentEdgeSource;
pub use endorsement::EndorsementEdgeSource;
pub use explicit::ExplicitEdgeSource;
pub use group::GroupEdgeSource;
pub use isolated::IsolatedSource;

use lattice_core::edge::MAX_WEIGHT_BPS;
use lattice_core::error::LatticeError;

/// Error for a registry whose lock was poisoned by a panicking writer.
pub(crate) fn poisoned(registry: &str) -> LatticeError {
    LatticeError::Source(format!("{} registry lock poisoned", registry))
}

/// Reject basis-point values above 10000.
pub(crate) fn check_bps(value: u16) -> Result<(), LatticeError> {
    if value > MAX_WEIGHT_BPS {
        return Err(LatticeError::InvalidTrustWeight(value));
    }
    Ok(())
}

/// Basis points as a fraction in [0, 1].
pub(crate) fn bps_fraction(value: u16) -> f64 {
    f64::from(value) / f64::from(MAX_WEIGHT_BPS)
}
