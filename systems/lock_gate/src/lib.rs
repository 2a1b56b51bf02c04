#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Lock predicate consumed by movement and interaction gating.

use waylock_core::Position;
use waylock_world::{query, World};

/// Stateless predicate over the world's containment query.
///
/// Evaluated once per movement or interaction intent; at that call
/// frequency no caching is warranted, so every answer reflects the current
/// unlocked set.
#[derive(Clone, Copy, Debug, Default)]
pub struct LockGate;

impl LockGate {
    /// Creates a new gate instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reports whether the position lies inside an unlocked area.
    #[must_use]
    pub fn is_permitted(&self, world: &World, position: Position) -> bool {
        query::is_unlocked(world, position)
    }

    /// Filters intent targets down to permitted positions, preserving
    /// order.
    #[must_use]
    pub fn permitted_targets(&self, world: &World, targets: &[Position]) -> Vec<Position> {
        targets
            .iter()
            .copied()
            .filter(|target| self.is_permitted(world, *target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::LockGate;
    use waylock_core::{AreaId, AreaRecord, Position, ProgressionConfig};
    use waylock_world::{query, World};

    fn two_area_world() -> World {
        let records = vec![
            AreaRecord {
                id: "meadowvale".to_owned(),
                display_name: "Meadowvale".to_owned(),
                polygon: vec![[0, 0, 0], [64, 0, 0], [64, 64, 0], [0, 64, 0]],
                includes: Vec::new(),
                neighbors: vec!["thornwood".to_owned()],
                unlock_cost: 0,
                points_to_complete: None,
            },
            AreaRecord {
                id: "thornwood".to_owned(),
                display_name: "Thornwood".to_owned(),
                polygon: vec![[64, 0, 0], [128, 0, 0], [128, 64, 0], [64, 64, 0]],
                includes: Vec::new(),
                neighbors: vec!["meadowvale".to_owned()],
                unlock_cost: 40,
                points_to_complete: None,
            },
        ];
        let mut world = World::with_catalog(ProgressionConfig::default(), &records)
            .expect("test catalog is valid");
        assert!(world.add_unlocked(AreaId::new("meadowvale")));
        world
    }

    #[test]
    fn predicate_matches_the_world_containment_query() {
        let world = two_area_world();
        let gate = LockGate::new();

        for position in [
            Position::new(30, 30, 0),
            Position::new(90, 30, 0),
            Position::new(30, 30, 1),
            Position::new(-5, 30, 0),
        ] {
            assert_eq!(
                gate.is_permitted(&world, position),
                query::is_unlocked(&world, position),
            );
        }
    }

    #[test]
    fn filter_drops_targets_in_locked_areas() {
        let world = two_area_world();
        let gate = LockGate::new();

        let targets = [
            Position::new(10, 10, 0),
            Position::new(90, 10, 0),
            Position::new(50, 50, 0),
        ];
        assert_eq!(
            gate.permitted_targets(&world, &targets),
            vec![Position::new(10, 10, 0), Position::new(50, 50, 0)],
        );
    }

    #[test]
    fn nothing_is_permitted_before_any_unlock() {
        let records = vec![AreaRecord {
            id: "meadowvale".to_owned(),
            display_name: "Meadowvale".to_owned(),
            polygon: vec![[0, 0, 0], [64, 0, 0], [64, 64, 0], [0, 64, 0]],
            includes: Vec::new(),
            neighbors: Vec::new(),
            unlock_cost: 0,
            points_to_complete: None,
        }];
        let world = World::with_catalog(ProgressionConfig::default(), &records)
            .expect("test catalog is valid");

        assert!(!LockGate::new().is_permitted(&world, Position::new(30, 30, 0)));
    }
}
