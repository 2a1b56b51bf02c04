//! Area catalog, unlock set, and spatial containment.

use std::collections::{BTreeMap, BTreeSet};

use waylock_core::{AreaId, AreaRecord, Position, RegionId, ValidationError};

/// Internal catalog entry for a single area.
#[derive(Clone, Debug)]
pub(crate) struct AreaDefinition {
    id: AreaId,
    display_name: String,
    polygon: Vec<Position>,
    includes: BTreeSet<RegionId>,
    neighbors: BTreeSet<AreaId>,
    unlock_cost: i64,
    points_to_complete: Option<i64>,
}

impl AreaDefinition {
    /// Converts a validated record into a catalog entry.
    fn from_record(record: &AreaRecord) -> Self {
        Self {
            id: AreaId::new(record.id.clone()),
            display_name: record.display_name.clone(),
            polygon: record
                .polygon
                .iter()
                .map(|[x, y, plane]| Position::new(*x, *y, *plane))
                .collect(),
            includes: record.includes.iter().map(|id| RegionId::new(*id)).collect(),
            neighbors: record.neighbors.iter().map(AreaId::new).collect(),
            unlock_cost: record.unlock_cost,
            points_to_complete: record.points_to_complete,
        }
    }

    pub(crate) fn to_record(&self) -> AreaRecord {
        AreaRecord {
            id: self.id.as_str().to_owned(),
            display_name: self.display_name.clone(),
            polygon: self
                .polygon
                .iter()
                .map(|p| [p.x(), p.y(), p.plane()])
                .collect(),
            includes: self.includes.iter().map(RegionId::get).collect(),
            neighbors: self.neighbors.iter().map(|id| id.as_str().to_owned()).collect(),
            unlock_cost: self.unlock_cost,
            points_to_complete: self.points_to_complete,
        }
    }

    pub(crate) const fn id(&self) -> &AreaId {
        &self.id
    }

    pub(crate) fn display_name(&self) -> &str {
        &self.display_name
    }

    pub(crate) const fn neighbors(&self) -> &BTreeSet<AreaId> {
        &self.neighbors
    }

    pub(crate) const fn unlock_cost(&self) -> i64 {
        self.unlock_cost
    }

    /// Points required to complete the area; defaults to the unlock cost.
    pub(crate) fn threshold(&self) -> i64 {
        self.points_to_complete.unwrap_or(self.unlock_cost)
    }

    /// Membership test combining the coarse region grant and the polygon.
    pub(crate) fn contains(&self, position: Position) -> bool {
        if self.includes.contains(&position.region()) {
            return true;
        }
        polygon_contains(&self.polygon, position)
    }

    /// Axis-aligned bounds of the polygon vertices on the given plane.
    fn polygon_bounds(&self, plane: i32) -> Option<(i32, i32, i32, i32)> {
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for vertex in self.polygon.iter().filter(|v| v.plane() == plane) {
            bounds = Some(match bounds {
                None => (vertex.x(), vertex.y(), vertex.x(), vertex.y()),
                Some((min_x, min_y, max_x, max_y)) => (
                    min_x.min(vertex.x()),
                    min_y.min(vertex.y()),
                    max_x.max(vertex.x()),
                    max_y.max(vertex.y()),
                ),
            });
        }
        bounds
    }
}

/// Even-odd ray-casting containment over same-plane polygon vertices.
///
/// The crossing test uses half-open vertical intervals and a strict
/// rightward intersection, evaluated in integer arithmetic: edges on the
/// left/bottom boundary count as inside, edges on the right/top do not.
pub(crate) fn polygon_contains(polygon: &[Position], position: Position) -> bool {
    let ring: Vec<(i64, i64)> = polygon
        .iter()
        .filter(|vertex| vertex.plane() == position.plane())
        .map(|vertex| (i64::from(vertex.x()), i64::from(vertex.y())))
        .collect();
    if ring.len() < 3 {
        return false;
    }

    let px = i64::from(position.x());
    let py = i64::from(position.y());
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > py) != (yj > py) {
            // px < xi + (py - yi) * (xj - xi) / (yj - yi), kept in integers
            // by multiplying through with the signed denominator.
            let dy = yj - yi;
            let numerator = (py - yi) * (xj - xi);
            let lhs = (px - xi) * dy;
            let crossed = if dy > 0 { lhs < numerator } else { lhs > numerator };
            if crossed {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Area catalog layered from built-ins and custom overrides, plus the
/// unlocked-area set.
///
/// Built-ins come from the static definition source at startup; the custom
/// layer overrides or extends them by id and is the only part import
/// replaces. Removed built-ins park in a hidden set so they stay
/// restorable.
#[derive(Clone, Debug, Default)]
pub(crate) struct AreaGraph {
    builtin: BTreeMap<AreaId, AreaDefinition>,
    custom: BTreeMap<AreaId, AreaDefinition>,
    hidden: BTreeSet<AreaId>,
    unlocked: BTreeSet<AreaId>,
}

impl AreaGraph {
    /// Parses the built-in area list. On duplicate ids the later entry
    /// wins; each record is validated before any is admitted.
    pub(crate) fn load(records: &[AreaRecord]) -> Result<Self, ValidationError> {
        let mut builtin = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
            let definition = AreaDefinition::from_record(record);
            let _ = builtin.insert(definition.id.clone(), definition);
        }
        Ok(Self {
            builtin,
            custom: BTreeMap::new(),
            hidden: BTreeSet::new(),
            unlocked: BTreeSet::new(),
        })
    }

    /// Resolves an id through the custom layer, then visible built-ins.
    pub(crate) fn area(&self, id: &AreaId) -> Option<&AreaDefinition> {
        if let Some(custom) = self.custom.get(id) {
            return Some(custom);
        }
        if self.hidden.contains(id) {
            return None;
        }
        self.builtin.get(id)
    }

    /// Iterates every active area: custom entries plus built-ins that are
    /// neither hidden nor overridden.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &AreaDefinition> {
        self.custom.values().chain(self.builtin.values().filter(|definition| {
            !self.hidden.contains(&definition.id) && !self.custom.contains_key(&definition.id)
        }))
    }

    pub(crate) const fn unlocked_ids(&self) -> &BTreeSet<AreaId> {
        &self.unlocked
    }

    pub(crate) fn is_unlocked_id(&self, id: &AreaId) -> bool {
        self.unlocked.contains(id)
    }

    /// Replaces the unlocked set, silently dropping unknown ids to keep
    /// the subset-of-known invariant.
    pub(crate) fn set_unlocked<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = AreaId>,
    {
        self.unlocked = ids
            .into_iter()
            .filter(|id| self.area(id).is_some())
            .collect();
    }

    /// Adds an id to the unlocked set. Idempotent; unknown ids are refused.
    pub(crate) fn add_unlocked(&mut self, id: AreaId) -> bool {
        if self.area(&id).is_none() {
            return false;
        }
        self.unlocked.insert(id)
    }

    /// Finds the unlocked area containing the position, if any.
    pub(crate) fn contains_position(&self, position: Position) -> Option<&AreaDefinition> {
        self.unlocked.iter().find_map(|id| {
            let definition = self.area(id)?;
            definition.contains(position).then_some(definition)
        })
    }

    pub(crate) fn is_unlocked(&self, position: Position) -> bool {
        self.contains_position(position).is_some()
    }

    /// Union over unlocked areas of their not-yet-unlocked neighbors,
    /// restricted to ids the catalog can resolve.
    pub(crate) fn unlockable_neighbors(&self) -> BTreeSet<AreaId> {
        let mut out = BTreeSet::new();
        for id in &self.unlocked {
            let Some(definition) = self.area(id) else {
                continue;
            };
            for neighbor in &definition.neighbors {
                if !self.unlocked.contains(neighbor) && self.area(neighbor).is_some() {
                    let _ = out.insert(neighbor.clone());
                }
            }
        }
        out
    }

    /// Unlock cost of the area, or zero when the id is unknown.
    pub(crate) fn cost(&self, id: &AreaId) -> i64 {
        self.area(id).map_or(0, AreaDefinition::unlock_cost)
    }

    /// Every integer position on the plane covered by a locked area's
    /// polygon.
    ///
    /// Uses the same containment test as [`AreaGraph::is_unlocked`], and
    /// re-checks the unlocked side so no position is ever reported both
    /// locked-tile and unlocked when areas overlap.
    pub(crate) fn tiles_in_locked_areas(&self, plane: i32) -> BTreeSet<Position> {
        let mut tiles = BTreeSet::new();
        for definition in self.iter() {
            if self.unlocked.contains(&definition.id) {
                continue;
            }
            let Some((min_x, min_y, max_x, max_y)) = definition.polygon_bounds(plane) else {
                continue;
            };
            for x in min_x..=max_x {
                for y in min_y..=max_y {
                    let position = Position::new(x, y, plane);
                    if polygon_contains(&definition.polygon, position)
                        && !self.is_unlocked(position)
                    {
                        let _ = tiles.insert(position);
                    }
                }
            }
        }
        tiles
    }

    /// Inserts or replaces a single custom area.
    pub(crate) fn add_or_replace_custom(
        &mut self,
        record: &AreaRecord,
    ) -> Result<(), ValidationError> {
        record.validate(0)?;
        let definition = AreaDefinition::from_record(record);
        let _ = self.custom.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Removes an area: custom entries are deleted (revealing any built-in
    /// underneath), built-ins move to the restorable hidden set.
    pub(crate) fn remove_area(&mut self, id: &AreaId) -> bool {
        let removed = if self.custom.remove(id).is_some() {
            true
        } else if self.builtin.contains_key(id) {
            self.hidden.insert(id.clone())
        } else {
            false
        };
        if removed && self.area(id).is_none() {
            let _ = self.unlocked.remove(id);
        }
        removed
    }

    /// Restores a previously removed built-in.
    pub(crate) fn restore_area(&mut self, id: &AreaId) -> bool {
        self.hidden.remove(id)
    }

    /// Replaces the entire custom layer with the imported records.
    ///
    /// All-or-nothing: every record is validated before the first is
    /// admitted, so a malformed entry leaves the previous layer in place.
    pub(crate) fn import_custom(&mut self, records: &[AreaRecord]) -> Result<(), ValidationError> {
        let mut staged = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
            let definition = AreaDefinition::from_record(record);
            let _ = staged.insert(definition.id.clone(), definition);
        }
        self.custom = staged;
        let known: BTreeSet<AreaId> = self
            .unlocked
            .iter()
            .filter(|id| self.area(id).is_some())
            .cloned()
            .collect();
        self.unlocked = known;
        Ok(())
    }

    /// Exports every active area, ordered by id.
    pub(crate) fn export_records(&self) -> Vec<AreaRecord> {
        let mut records: Vec<AreaRecord> = self.iter().map(AreaDefinition::to_record).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Exports the custom layer alone, ordered by id, for persistence.
    pub(crate) fn custom_records(&self) -> Vec<AreaRecord> {
        self.custom.values().map(AreaDefinition::to_record).collect()
    }
}
