//! Task grid lattice and derived per-tile state.

use std::collections::{BTreeMap, BTreeSet};

use waylock_core::{AreaId, TileId, TileState, GRID_RADIUS};

/// Total number of tiles in one area's grid.
pub(crate) const TILE_COUNT: usize = {
    let side = (GRID_RADIUS * 2 + 1) as usize;
    side * side
};

/// Enumerates every tile of the fixed lattice in row-major order.
///
/// The lattice is never persisted; it is regenerated from the fixed radius
/// whenever a grid is inspected.
pub(crate) fn grid_tiles() -> impl Iterator<Item = TileId> {
    let radius = GRID_RADIUS as i32;
    (-radius..=radius)
        .flat_map(move |row| (-radius..=radius).map(move |col| TileId::new(row, col)))
}

/// Derives the state of a tile from the two persisted id sets.
///
/// The precedence order is fixed: claimed beats completed beats revealed
/// beats locked. Reveal is implied by a claimed cardinal neighbor or by
/// being the grid center, so claiming a tile reveals its neighbors on the
/// next query without any propagation step.
pub(crate) fn derive_state(
    tile: TileId,
    claimed: &BTreeSet<TileId>,
    completed: &BTreeSet<TileId>,
) -> TileState {
    if claimed.contains(&tile) {
        return TileState::Claimed;
    }
    if completed.contains(&tile) {
        return TileState::CompletedUnclaimed;
    }
    let revealed = tile.is_center()
        || tile
            .cardinal_neighbors()
            .iter()
            .any(|neighbor| claimed.contains(neighbor));
    if revealed {
        TileState::Revealed
    } else {
        TileState::Locked
    }
}

/// Persisted claim/completion sets for every area's task grid.
#[derive(Clone, Debug, Default)]
pub(crate) struct TaskBoard {
    claimed: BTreeMap<AreaId, BTreeSet<TileId>>,
    completed: BTreeMap<AreaId, BTreeSet<TileId>>,
}

static EMPTY: BTreeSet<TileId> = BTreeSet::new();

impl TaskBoard {
    #[allow(dead_code)]
    pub(crate) const fn new() -> Self {
        Self {
            claimed: BTreeMap::new(),
            completed: BTreeMap::new(),
        }
    }

    /// Rebuilds the board from persisted entries, dropping tile ids that
    /// fall outside the fixed grid radius.
    pub(crate) fn restore(
        claimed: Vec<(AreaId, Vec<TileId>)>,
        completed: Vec<(AreaId, Vec<TileId>)>,
    ) -> Self {
        let filter = |entries: Vec<(AreaId, Vec<TileId>)>| {
            let mut map: BTreeMap<AreaId, BTreeSet<TileId>> = BTreeMap::new();
            for (area, tiles) in entries {
                let set: BTreeSet<TileId> =
                    tiles.into_iter().filter(TileId::in_grid).collect();
                if !set.is_empty() {
                    let _ = map.insert(area, set);
                }
            }
            map
        };
        Self {
            claimed: filter(claimed),
            completed: filter(completed),
        }
    }

    /// Records a tile's in-game condition as satisfied.
    ///
    /// Returns `true` only on the first insertion; repeats are no-ops.
    pub(crate) fn set_completed(&mut self, area: &AreaId, tile: TileId) -> bool {
        self.completed.entry(area.clone()).or_default().insert(tile)
    }

    /// Banks a tile into the claimed set.
    ///
    /// Returns `true` only on the first insertion; repeats are no-ops so a
    /// double claim can never award points twice.
    pub(crate) fn claim(&mut self, area: &AreaId, tile: TileId) -> bool {
        self.claimed.entry(area.clone()).or_default().insert(tile)
    }

    /// Derived state of a single tile.
    pub(crate) fn state(&self, area: &AreaId, tile: TileId) -> TileState {
        let claimed = self.claimed.get(area).unwrap_or(&EMPTY);
        let completed = self.completed.get(area).unwrap_or(&EMPTY);
        derive_state(tile, claimed, completed)
    }

    /// Reports whether every tile of the area's grid is claimed.
    pub(crate) fn is_fully_claimed(&self, area: &AreaId) -> bool {
        // Claim filters to in-grid tiles, so cardinality equality suffices.
        self.claimed
            .get(area)
            .is_some_and(|set| set.len() == TILE_COUNT)
    }

    pub(crate) fn claimed_entries(&self) -> Vec<(AreaId, Vec<TileId>)> {
        self.claimed
            .iter()
            .map(|(area, tiles)| (area.clone(), tiles.iter().copied().collect()))
            .collect()
    }

    pub(crate) fn completed_entries(&self) -> Vec<(AreaId, Vec<TileId>)> {
        self.completed
            .iter()
            .map(|(area, tiles)| (area.clone(), tiles.iter().copied().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_state, grid_tiles, TaskBoard, TILE_COUNT};
    use std::collections::BTreeSet;
    use waylock_core::{AreaId, TileId, TileState};

    #[test]
    fn lattice_has_expected_cardinality() {
        assert_eq!(grid_tiles().count(), TILE_COUNT);
        assert!(grid_tiles().all(|tile| tile.in_grid()));
    }

    #[test]
    fn center_is_never_locked_for_any_small_set_combination() {
        // Exhaust every subset of a handful of candidate tiles for both
        // persisted sets; the center must never derive to locked.
        let candidates = [
            TileId::CENTER,
            TileId::new(0, 1),
            TileId::new(1, 0),
            TileId::new(2, 2),
        ];
        for claimed_bits in 0u32..16 {
            for completed_bits in 0u32..16 {
                let claimed: BTreeSet<TileId> = candidates
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| claimed_bits & (1 << bit) != 0)
                    .map(|(_, tile)| *tile)
                    .collect();
                let completed: BTreeSet<TileId> = candidates
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| completed_bits & (1 << bit) != 0)
                    .map(|(_, tile)| *tile)
                    .collect();

                let state = derive_state(TileId::CENTER, &claimed, &completed);
                assert_ne!(
                    state,
                    TileState::Locked,
                    "center locked for claimed={claimed:?} completed={completed:?}",
                );
            }
        }
    }

    #[test]
    fn derivation_precedence_is_claimed_completed_revealed_locked() {
        let mut claimed = BTreeSet::new();
        let mut completed = BTreeSet::new();
        let tile = TileId::new(0, 1);

        assert_eq!(derive_state(tile, &claimed, &completed), TileState::Locked);

        let _ = claimed.insert(TileId::CENTER);
        assert_eq!(derive_state(tile, &claimed, &completed), TileState::Revealed);

        let _ = completed.insert(tile);
        assert_eq!(
            derive_state(tile, &claimed, &completed),
            TileState::CompletedUnclaimed,
        );

        let _ = claimed.insert(tile);
        assert_eq!(derive_state(tile, &claimed, &completed), TileState::Claimed);
    }

    #[test]
    fn claiming_center_reveals_cardinal_neighbors_only() {
        let mut board = TaskBoard::new();
        let area = AreaId::new("meadowvale");

        assert_eq!(board.state(&area, TileId::new(1, 0)), TileState::Locked);
        assert!(board.claim(&area, TileId::CENTER));

        for tile in [
            TileId::new(1, 0),
            TileId::new(-1, 0),
            TileId::new(0, 1),
            TileId::new(0, -1),
        ] {
            assert_eq!(board.state(&area, tile), TileState::Revealed);
        }
        assert_eq!(board.state(&area, TileId::new(1, 1)), TileState::Locked);
        assert_eq!(board.state(&area, TileId::new(2, 0)), TileState::Locked);
    }

    #[test]
    fn claim_reports_first_insertion_only() {
        let mut board = TaskBoard::new();
        let area = AreaId::new("meadowvale");
        let tile = TileId::new(0, 1);

        assert!(board.claim(&area, tile));
        assert!(!board.claim(&area, tile));
        assert!(board.set_completed(&area, tile));
        assert!(!board.set_completed(&area, tile));
    }

    #[test]
    fn full_claim_requires_every_tile() {
        let mut board = TaskBoard::new();
        let area = AreaId::new("meadowvale");

        for tile in grid_tiles().skip(1) {
            let _ = board.claim(&area, tile);
        }
        assert!(!board.is_fully_claimed(&area));

        let mut remaining = grid_tiles();
        let first = remaining.next().expect("lattice is non-empty");
        let _ = board.claim(&area, first);
        assert!(board.is_fully_claimed(&area));
    }

    #[test]
    fn restore_drops_out_of_grid_tiles() {
        let area = AreaId::new("meadowvale");
        let board = TaskBoard::restore(
            vec![(area.clone(), vec![TileId::new(0, 1), TileId::new(9, 9)])],
            Vec::new(),
        );

        assert_eq!(board.state(&area, TileId::new(0, 1)), TileState::Claimed);
        let entries = board.claimed_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, vec![TileId::new(0, 1)]);
    }
}
