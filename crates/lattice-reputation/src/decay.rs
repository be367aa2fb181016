// crates/lattice-reputation/src/decay.rs
//
// Per-hop trust decay for the breadth-first trust walk.
//
// Trust reached at hop 1 is the raw relation weight. Every later hop
// multiplies the parent's trust by the configured decay and by the relation
// weight, so trust never grows along a path.

/// Clamp a relation weight reported by an edge source into [0, 1].
///
/// Non-finite weights count as no trust.
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Trust carried to a child one hop beyond its parent.
///
/// `parent * decay_per_hop * edge_weight`, with the edge weight sanitized.
pub fn apply_hop_decay(parent: f64, decay_per_hop: f64, edge_weight: f64) -> f64 {
    parent * decay_per_hop * sanitize_weight(edge_weight)
}
