// crates/lattice-reputation/src/sources/group.rs
//
// Trust implied by co-membership in a group.
//
// Smaller groups imply closer ties, so the weight between two members falls
// off with group size. Groups are not scoped to a dimension: co-membership
// yields the same relation in every dimension.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use lattice_core::edge::Dimension;
use lattice_core::error::LatticeError;
use lattice_core::identity::Wallet;
use lattice_core::traits::{EdgeSource, SourceKind, WeightedEdge};

use super::poisoned;

/// Weight between two members of a group of `size` members (self included).
pub fn group_prestige(size: usize) -> f64 {
    match size {
        0..=10 => 0.9,
        11..=30 => 0.7,
        31..=80 => 0.5,
        81..=150 => 0.35,
        _ => 0.2,
    }
}

#[derive(Debug, Default)]
struct GroupRegistry {
    /// Groups in registration order: (group id, members in join order).
    groups: Vec<(String, Vec<Wallet>)>,
    /// Wallet -> indices into `groups`, ascending.
    memberships: HashMap<Wallet, Vec<usize>>,
}

impl GroupRegistry {
    fn reindex(&mut self) {
        self.memberships.clear();
        for (idx, (_, members)) in self.groups.iter().enumerate() {
            for member in members {
                self.memberships.entry(*member).or_default().push(idx);
            }
        }
    }
}

/// Edge source over group co-membership.
#[derive(Debug, Default)]
pub struct GroupEdgeSource {
    registry: RwLock<GroupRegistry>,
}

impl GroupEdgeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group, or replace the members of an existing group with
    /// the same id. Duplicate members are collapsed, keeping join order.
    pub fn register_group(&self, group_id: impl Into<String>, members: Vec<Wallet>) -> Result<(), LatticeError> {
        let group_id = group_id.into();
        let mut seen = HashSet::with_capacity(members.len());
        let unique: Vec<Wallet> = members.into_iter().filter(|m| seen.insert(*m)).collect();

        let mut registry = self.registry.write().map_err(|_| poisoned("group"))?;
        match registry.groups.iter_mut().find(|(id, _)| *id == group_id) {
            Some((_, existing)) => *existing = unique,
            None => registry.groups.push((group_id, unique)),
        }
        registry.reindex();
        Ok(())
    }

    /// Drop a group. Returns whether it existed.
    pub fn remove_group(&self, group_id: &str) -> Result<bool, LatticeError> {
        let mut registry = self.registry.write().map_err(|_| poisoned("group"))?;
        let before = registry.groups.len();
        registry.groups.retain(|(id, _)| id != group_id);
        let removed = registry.groups.len() != before;
        if removed {
            registry.reindex();
        }
        Ok(removed)
    }
}

#[async_trait]
impl EdgeSource for GroupEdgeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Group
    }

    /// Every co-member of `wallet`, each once. A wallet sharing several groups
    /// keeps the strongest weight at the position it was first seen.
    async fn get_edges(&self, wallet: &Wallet, _dimension: Dimension) -> Result<Vec<WeightedEdge>, LatticeError> {
        let registry = self.registry.read().map_err(|_| poisoned("group"))?;
        let Some(group_indices) = registry.memberships.get(wallet) else {
            return Ok(Vec::new());
        };

        let mut edges: Vec<WeightedEdge> = Vec::new();
        // Neighbor -> position in `edges`.
        let mut positions: HashMap<Wallet, usize> = HashMap::new();
        for &idx in group_indices {
            let members = &registry.groups[idx].1;
            let weight = group_prestige(members.len());
            for member in members.iter().filter(|m| *m != wallet) {
                match positions.get(member) {
                    Some(&pos) => edges[pos].weight = edges[pos].weight.max(weight),
                    None => {
                        positions.insert(*member, edges.len());
                        edges.push(WeightedEdge::new(*member, weight));
                    }
                }
            }
        }
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(b: u8) -> Wallet {
        Wallet::new([b; 32])
    }

    #[test]
    fn prestige_brackets() {
        assert_eq!(group_prestige(2), 0.9);
        assert_eq!(group_prestige(10), 0.9);
        assert_eq!(group_prestige(11), 0.7);
        assert_eq!(group_prestige(30), 0.7);
        assert_eq!(group_prestige(80), 0.5);
        assert_eq!(group_prestige(150), 0.35);
        assert_eq!(group_prestige(151), 0.2);
    }

    #[tokio::test]
    async fn five_member_group_yields_point_nine_to_others() {
        let source = GroupEdgeSource::new();
        source
            .register_group("guild", (0..5).map(wallet).collect())
            .unwrap();

        let edges = source.get_edges(&wallet(0), Dimension::Civic).await.unwrap();
        assert_eq!(edges.len(), 4);
        assert!(edges.iter().all(|e| e.neighbor != wallet(0)));
        assert!(edges.iter().all(|e| (e.weight - 0.9).abs() < 1e-12));
        assert_eq!(
            edges.iter().map(|e| e.neighbor).collect::<Vec<_>>(),
            vec![wallet(1), wallet(2), wallet(3), wallet(4)]
        );
    }

    #[tokio::test]
    async fn overlapping_groups_keep_strongest_weight() {
        let source = GroupEdgeSource::new();
        // 40 members -> 0.5
        source
            .register_group("large", (0..40).map(wallet).collect())
            .unwrap();
        // 3 members -> 0.9
        source
            .register_group("small", vec![wallet(0), wallet(1), wallet(200)])
            .unwrap();

        let edges = source.get_edges(&wallet(0), Dimension::Trading).await.unwrap();
        assert_eq!(edges.len(), 40);
        assert_eq!(edges[0].neighbor, wallet(1));
        assert!((edges[0].weight - 0.9).abs() < 1e-12);
        assert!((edges[1].weight - 0.5).abs() < 1e-12);
        assert_eq!(edges[39].neighbor, wallet(200));
    }

    fn numbered(i: u16) -> Wallet {
        let mut bytes = [0u8; 32];
        bytes[..2].copy_from_slice(&i.to_le_bytes());
        Wallet::new(bytes)
    }

    #[tokio::test]
    async fn large_overlapping_groups_dedupe_in_first_seen_order() {
        let source = GroupEdgeSource::new();
        // 400 distinct members, each listed twice.
        let members: Vec<Wallet> = (0..400u16).chain(0..400u16).map(numbered).collect();
        source.register_group("crowd", members).unwrap();
        source
            .register_group("crowd-2", (0..300u16).rev().map(numbered).collect())
            .unwrap();
        source
            .register_group("pair", vec![numbered(0), numbered(399)])
            .unwrap();

        let edges = source.get_edges(&numbered(0), Dimension::Civic).await.unwrap();
        assert_eq!(edges.len(), 399);
        assert_eq!(
            edges.iter().map(|e| e.neighbor).collect::<Vec<_>>(),
            (1..400u16).map(numbered).collect::<Vec<_>>()
        );
        assert!((edges[0].weight - 0.2).abs() < 1e-12);
        assert!((edges[398].weight - 0.9).abs() < 1e-12);
    }

    #[tokio::test]
    async fn reregistering_replaces_members_and_remove_drops_group() {
        let source = GroupEdgeSource::new();
        source.register_group("g", vec![wallet(0), wallet(1)]).unwrap();
        source.register_group("g", vec![wallet(0), wallet(2), wallet(2)]).unwrap();

        let edges = source.get_edges(&wallet(0), Dimension::Civic).await.unwrap();
        assert_eq!(edges, vec![WeightedEdge::new(wallet(2), 0.9)]);
        assert!(source.get_edges(&wallet(1), Dimension::Civic).await.unwrap().is_empty());

        assert!(source.remove_group("g").unwrap());
        assert!(!source.remove_group("g").unwrap());
        assert!(source.get_edges(&wallet(0), Dimension::Civic).await.unwrap().is_empty());
    }
}
