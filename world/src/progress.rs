//! Per-area earned points and the persisted completed-area set.

use std::collections::{BTreeMap, BTreeSet};

use waylock_core::AreaId;

/// Bookkeeping behind the area-completion coordinator.
///
/// Earned-in-area counters only grow; the completed set only gains members.
/// Policy evaluation lives in the world, which owns the catalog and the
/// task board this data is reconciled against.
#[derive(Clone, Debug, Default)]
pub(crate) struct ProgressTracker {
    earned: BTreeMap<AreaId, i64>,
    completed: BTreeSet<AreaId>,
}

impl ProgressTracker {
    #[allow(dead_code)]
    pub(crate) const fn new() -> Self {
        Self {
            earned: BTreeMap::new(),
            completed: BTreeSet::new(),
        }
    }

    /// Rebuilds the tracker from persisted entries, dropping corrupt
    /// negative counters.
    pub(crate) fn restore(earned: Vec<(AreaId, i64)>, completed: Vec<AreaId>) -> Self {
        Self {
            earned: earned
                .into_iter()
                .filter(|(_, points)| *points > 0)
                .collect(),
            completed: completed.into_iter().collect(),
        }
    }

    /// Credits points earned inside an area, returning the new counter.
    ///
    /// Non-positive amounts leave the counter untouched.
    pub(crate) fn add_earned(&mut self, area: &AreaId, amount: i64) -> i64 {
        let counter = self.earned.entry(area.clone()).or_insert(0);
        if amount > 0 {
            *counter = counter.saturating_add(amount);
        }
        *counter
    }

    pub(crate) fn earned_in(&self, area: &AreaId) -> i64 {
        self.earned.get(area).copied().unwrap_or(0)
    }

    /// Inserts the area into the completed set.
    ///
    /// Returns `true` only on first insertion, giving threshold crossings
    /// their at-most-once semantics. Nothing ever removes an entry.
    pub(crate) fn mark_completed(&mut self, area: AreaId) -> bool {
        self.completed.insert(area)
    }

    pub(crate) fn is_completed(&self, area: &AreaId) -> bool {
        self.completed.contains(area)
    }

    pub(crate) fn completed_ids(&self) -> &BTreeSet<AreaId> {
        &self.completed
    }

    pub(crate) fn earned_entries(&self) -> Vec<(AreaId, i64)> {
        self.earned
            .iter()
            .map(|(area, points)| (area.clone(), *points))
            .collect()
    }
}
