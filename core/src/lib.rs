#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waylock progression engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. It also defines the
//! identifier, position, and tile vocabulary every crate in the workspace
//! speaks, together with the area record used by the import/export transfer
//! format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Radius of the task grid measured in rings around the center tile.
pub const GRID_RADIUS: u32 = 5;

/// Number of point-bearing tiers in a task grid (tier 0 is the free center).
pub const TIER_COUNT: usize = GRID_RADIUS as usize;

/// Unique slug identifying an area within the unlock graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(String);

impl AreaId {
    /// Creates a new area identifier from the provided slug.
    #[must_use]
    pub fn new<T>(slug: T) -> Self
    where
        T: Into<String>,
    {
        Self(slug.into())
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AreaId {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

/// World position expressed as integer tile coordinates on a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    x: i32,
    y: i32,
    plane: i32,
}

impl Position {
    /// Creates a new position from its coordinate triple.
    #[must_use]
    pub const fn new(x: i32, y: i32, plane: i32) -> Self {
        Self { x, y, plane }
    }

    /// Horizontal world coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical world coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Plane (floor) the position sits on.
    #[must_use]
    pub const fn plane(&self) -> i32 {
        self.plane
    }

    /// Coarse region that contains this position.
    #[must_use]
    pub const fn region(&self) -> RegionId {
        RegionId::containing(self.x, self.y)
    }
}

/// Coarse 64x64-tile chunk identifier derived from world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(i32);

impl RegionId {
    /// Wraps a raw region identifier value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Derives the region containing the provided world coordinates.
    ///
    /// Regions tile the world in 64x64 chunks: the chunk indices are the
    /// coordinates shifted right by six bits, packed as
    /// `chunk_x << 8 | chunk_y`.
    #[must_use]
    pub const fn containing(x: i32, y: i32) -> Self {
        Self((x >> 6) << 8 | (y >> 6))
    }

    /// Retrieves the packed numeric representation of the region.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

/// Identifier of a single task tile within an area's grid.
///
/// Tiles are addressed relative to the grid center, so both coordinates
/// range over `[-GRID_RADIUS, GRID_RADIUS]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    row: i32,
    col: i32,
}

impl TileId {
    /// The center tile of every task grid.
    pub const CENTER: Self = Self::new(0, 0);

    /// Creates a new tile identifier from signed grid coordinates.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Row offset from the grid center.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column offset from the grid center.
    #[must_use]
    pub const fn col(&self) -> i32 {
        self.col
    }

    /// Chebyshev distance from the grid center, which selects the tile's
    /// point tier.
    #[must_use]
    pub const fn tier(&self) -> u32 {
        let row = self.row.unsigned_abs();
        let col = self.col.unsigned_abs();
        if row > col {
            row
        } else {
            col
        }
    }

    /// Reports whether the tile is the grid center.
    #[must_use]
    pub const fn is_center(&self) -> bool {
        self.row == 0 && self.col == 0
    }

    /// Reports whether the tile lies within the fixed grid radius.
    #[must_use]
    pub const fn in_grid(&self) -> bool {
        self.tier() <= GRID_RADIUS
    }

    /// The four cardinally adjacent tiles, without bounds filtering.
    #[must_use]
    pub const fn cardinal_neighbors(&self) -> [Self; 4] {
        [
            Self::new(self.row - 1, self.col),
            Self::new(self.row + 1, self.col),
            Self::new(self.row, self.col - 1),
            Self::new(self.row, self.col + 1),
        ]
    }

    /// Parses a tile identifier from its `row,col` textual form.
    ///
    /// Returns `None` for malformed text; persistence treats such entries
    /// as absent rather than failing.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (row, col) = text.split_once(',')?;
        let row = row.trim().parse::<i32>().ok()?;
        let col = col.trim().parse::<i32>().ok()?;
        Some(Self::new(row, col))
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Derived presentation state of a single task tile.
///
/// Tile state is a pure function of the persisted claimed/completed id sets
/// and the fixed grid topology; it is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileState {
    /// Neither claimed nor completed, with no claimed cardinal neighbor.
    Locked,
    /// Visible to the player because a cardinal neighbor was claimed, or
    /// because the tile is the grid center.
    Revealed,
    /// The in-game condition is satisfied but the reward is unbanked.
    CompletedUnclaimed,
    /// Banked for points; claimed tiles reveal their cardinal neighbors.
    Claimed,
}

/// Progression status of an area as surfaced to presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AreaStatus {
    /// The area is not in the unlocked set.
    Locked,
    /// The area is unlocked but not yet complete under the active policy.
    Unlocked,
    /// The area satisfies the active completion policy.
    Complete,
}

/// Selects how area completion is judged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// An area is complete once its accumulated points reach its threshold.
    /// Completion is persisted and never revoked.
    #[default]
    Threshold,
    /// An area is complete only while every tile of its task grid is
    /// claimed. Recomputed on demand, never persisted.
    FullClaim,
}

/// Per-tier point values for task tiles.
///
/// Tier 0 (the grid center) is always worth zero points; tiers `1..=5` take
/// their values from this table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    values: [i64; TIER_COUNT],
}

impl TierTable {
    /// Creates a tier table from explicit per-tier values for tiers 1..=5.
    #[must_use]
    pub const fn new(values: [i64; TIER_COUNT]) -> Self {
        Self { values }
    }

    /// Point value awarded for claiming a tile of the provided tier.
    #[must_use]
    pub const fn value(&self, tier: u32) -> i64 {
        if tier == 0 || tier > GRID_RADIUS {
            return 0;
        }
        self.values[(tier - 1) as usize]
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::new([10, 20, 30, 40, 50])
    }
}

/// Configuration selected by the player profile before the world boots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Active area-completion policy.
    pub mode: CompletionMode,
    /// Balance granted to a fresh profile by the bootstrap system.
    pub starting_points: i64,
    /// Point values per task tier.
    pub tiers: TierTable,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            mode: CompletionMode::Threshold,
            starting_points: 0,
            tiers: TierTable::default(),
        }
    }
}

/// Commands that express all permissible simulation mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Destructively resets the ledger to the provided starting balance.
    ///
    /// Reserved for first-run preparation and explicit profile resets; it is
    /// never an incremental grant.
    SetStartingPoints {
        /// Balance the ledger holds after the reset.
        points: i64,
    },
    /// Requests that an area be purchased and added to the unlocked set.
    UnlockArea {
        /// Identifier of the area to unlock.
        area: AreaId,
    },
    /// Marks a task tile's in-game condition as satisfied.
    CompleteTile {
        /// Area whose grid contains the tile.
        area: AreaId,
        /// Tile whose condition was met.
        tile: TileId,
    },
    /// Banks a task tile for points and neighbor reveal.
    ClaimTile {
        /// Area whose grid contains the tile.
        area: AreaId,
        /// Tile being claimed.
        tile: TileId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the ledger was reset to a starting balance.
    PointsReset {
        /// Balance the ledger now holds.
        points: i64,
    },
    /// Confirms that an area joined the unlocked set.
    AreaUnlocked {
        /// Identifier of the unlocked area.
        area: AreaId,
        /// Points spent to perform the unlock.
        cost: i64,
    },
    /// Reports that an unlock request was rejected.
    UnlockRejected {
        /// Identifier of the area that stayed locked.
        area: AreaId,
        /// Specific reason the unlock failed.
        reason: UnlockError,
    },
    /// Confirms that a tile's in-game condition was recorded.
    ///
    /// Emitted only on the first completion of a tile; repeats are silent.
    TileCompleted {
        /// Area whose grid contains the tile.
        area: AreaId,
        /// Tile whose condition was met.
        tile: TileId,
    },
    /// Confirms that a tile was banked for points.
    TileClaimed {
        /// Area whose grid contains the tile.
        area: AreaId,
        /// Tile that was claimed.
        tile: TileId,
        /// Points awarded for the claim; zero for the center tier.
        points: i64,
    },
    /// Reports that the ledger's earned total grew.
    PointsEarned {
        /// Amount credited by the originating claim.
        amount: i64,
        /// Earned total after the credit.
        earned_total: i64,
    },
    /// Reports that spendable points were consumed.
    PointsSpent {
        /// Amount debited by the originating unlock.
        amount: i64,
        /// Spendable balance after the debit.
        spendable: i64,
    },
    /// Announces that an area satisfied the active completion policy.
    ///
    /// In threshold mode this fires at most once per area.
    AreaCompleted {
        /// Identifier of the completed area.
        area: AreaId,
    },
}

/// Reasons an unlock request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnlockError {
    /// No area with the requested identifier exists.
    UnknownArea,
    /// The area is already in the unlocked set.
    AlreadyUnlocked,
    /// No unlocked, effectively complete neighbor grants access yet.
    NoCompletedNeighbor,
    /// The spendable balance does not cover the unlock cost.
    InsufficientPoints,
}

/// Transferable description of a single area.
///
/// This is the record shape of the import/export payload; the world converts
/// validated records into its internal catalog entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    /// Unique slug identifying the area.
    #[serde(default)]
    pub id: String,
    /// Human-readable name shown by presentation layers.
    #[serde(default)]
    pub display_name: String,
    /// Closed polygon as `[x, y, plane]` triples; empty or length >= 3.
    #[serde(default)]
    pub polygon: Vec<[i32; 3]>,
    /// Coarse regions granting containment without polygon geometry.
    #[serde(default)]
    pub includes: Vec<i32>,
    /// Identifiers of adjacent areas; asymmetry is tolerated.
    #[serde(default)]
    pub neighbors: Vec<String>,
    /// Points required to unlock the area.
    #[serde(default)]
    pub unlock_cost: i64,
    /// Points required to complete the area; defaults to the unlock cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_to_complete: Option<i64>,
}

impl AreaRecord {
    /// Validates the record, reporting the first defect found.
    ///
    /// `index` is the record's position within the imported list and is
    /// echoed into the error so callers can point at the offending entry.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingId { index });
        }
        let len = self.polygon.len();
        if len == 1 || len == 2 {
            return Err(ValidationError::DegeneratePolygon {
                index,
                id: self.id.clone(),
                len,
            });
        }
        if self.unlock_cost < 0 {
            return Err(ValidationError::NegativeCost {
                index,
                id: self.id.clone(),
            });
        }
        if matches!(self.points_to_complete, Some(threshold) if threshold < 0) {
            return Err(ValidationError::NegativeThreshold {
                index,
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Errors raised when an imported area record fails validation.
///
/// Import is all-or-nothing: the first malformed entry aborts the whole
/// import and no partial state change occurs.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The record carries no identifier.
    #[error("area record {index} is missing an id")]
    MissingId {
        /// Position of the record within the imported list.
        index: usize,
    },
    /// A polygon of one or two points cannot describe a closed region.
    #[error("area '{id}' (record {index}) has a degenerate polygon of {len} points")]
    DegeneratePolygon {
        /// Position of the record within the imported list.
        index: usize,
        /// Identifier of the offending area.
        id: String,
        /// Number of polygon points supplied.
        len: usize,
    },
    /// Unlock costs are measured in points and cannot be negative.
    #[error("area '{id}' (record {index}) has a negative unlock cost")]
    NegativeCost {
        /// Position of the record within the imported list.
        index: usize,
        /// Identifier of the offending area.
        id: String,
    },
    /// Completion thresholds are measured in points and cannot be negative.
    #[error("area '{id}' (record {index}) has a negative completion threshold")]
    NegativeThreshold {
        /// Position of the record within the imported list.
        index: usize,
        /// Identifier of the offending area.
        id: String,
    },
}

/// Exact game condition that completes a task tile when observed.
///
/// Triggers are data, not code: task lists bind tiles to trigger values and
/// the `task_events` system performs plain table lookups against incoming
/// notifications. Fuzzy matching heuristics are deliberately out of scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskTrigger {
    /// Fires when the game emits this exact chat line.
    ChatLine {
        /// Chat message text compared verbatim.
        text: String,
    },
    /// Fires when the named stat reaches the given level.
    StatReached {
        /// Stat (skill) name compared verbatim.
        skill: String,
        /// Level that satisfies the task.
        level: i32,
    },
    /// Fires when the named item enters the player's possession.
    ItemObtained {
        /// Item name compared verbatim.
        item: String,
    },
}

/// Binding of a task tile to the trigger that completes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBinding {
    /// Tile completed when the trigger fires.
    pub tile: TileId,
    /// Condition observed in the game event stream.
    pub trigger: TaskTrigger,
}

impl TaskBinding {
    /// Creates a new binding of a tile to its completing trigger.
    #[must_use]
    pub const fn new(tile: TileId, trigger: TaskTrigger) -> Self {
        Self { tile, trigger }
    }
}

/// Notifications delivered by the surrounding game client.
///
/// These arrive as plain data; the core never registers callbacks with the
/// game and never blocks waiting for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameNotification {
    /// A chat line was printed to the player.
    ChatLine {
        /// Verbatim message text.
        text: String,
    },
    /// A stat changed, reporting its new level.
    StatChanged {
        /// Stat (skill) name.
        skill: String,
        /// Level after the change.
        level: i32,
    },
    /// An item entered the player's possession.
    ItemObtained {
        /// Item name.
        item: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        AreaRecord, Position, RegionId, TierTable, TileId, UnlockError, ValidationError,
        GRID_RADIUS,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn region_id_packs_chunk_coordinates() {
        let position = Position::new(3222, 3218, 0);
        assert_eq!(position.region(), RegionId::new((50 << 8) | 50));
    }

    #[test]
    fn region_id_ignores_plane() {
        let ground = Position::new(100, 200, 0);
        let upstairs = Position::new(100, 200, 2);
        assert_eq!(ground.region(), upstairs.region());
    }

    #[test]
    fn tile_tier_is_chebyshev_distance() {
        assert_eq!(TileId::CENTER.tier(), 0);
        assert_eq!(TileId::new(1, 0).tier(), 1);
        assert_eq!(TileId::new(-3, 2).tier(), 3);
        assert_eq!(TileId::new(4, -5).tier(), 5);
    }

    #[test]
    fn tile_in_grid_matches_radius() {
        assert!(TileId::new(GRID_RADIUS as i32, -(GRID_RADIUS as i32)).in_grid());
        assert!(!TileId::new(GRID_RADIUS as i32 + 1, 0).in_grid());
    }

    #[test]
    fn tile_text_form_round_trips() {
        let tile = TileId::new(-4, 3);
        let parsed = TileId::parse(&tile.to_string()).expect("well-formed tile text");
        assert_eq!(parsed, tile);
    }

    #[test]
    fn tile_parse_rejects_malformed_text() {
        assert!(TileId::parse("").is_none());
        assert!(TileId::parse("3").is_none());
        assert!(TileId::parse("a,b").is_none());
        assert!(TileId::parse("1;2").is_none());
    }

    #[test]
    fn tier_table_returns_zero_outside_configured_tiers() {
        let table = TierTable::new([10, 20, 30, 40, 50]);
        assert_eq!(table.value(0), 0);
        assert_eq!(table.value(1), 10);
        assert_eq!(table.value(5), 50);
        assert_eq!(table.value(6), 0);
    }

    #[test]
    fn record_validation_accepts_empty_and_closed_polygons() {
        let mut record = AreaRecord {
            id: "lumbridge".to_owned(),
            display_name: "Lumbridge".to_owned(),
            polygon: Vec::new(),
            includes: vec![12850],
            neighbors: vec!["varrock".to_owned()],
            unlock_cost: 0,
            points_to_complete: None,
        };
        record.validate(0).expect("empty polygon is allowed");

        record.polygon = vec![[0, 0, 0], [8, 0, 0], [8, 8, 0]];
        record.validate(0).expect("triangle is allowed");
    }

    #[test]
    fn record_validation_reports_missing_id_first() {
        let record = AreaRecord {
            id: String::new(),
            display_name: String::new(),
            polygon: vec![[0, 0, 0], [4, 4, 0]],
            includes: Vec::new(),
            neighbors: Vec::new(),
            unlock_cost: -1,
            points_to_complete: None,
        };
        assert_eq!(
            record.validate(3),
            Err(ValidationError::MissingId { index: 3 }),
        );
    }

    #[test]
    fn record_validation_rejects_degenerate_polygons() {
        let record = AreaRecord {
            id: "varrock".to_owned(),
            display_name: "Varrock".to_owned(),
            polygon: vec![[0, 0, 0], [4, 4, 0]],
            includes: Vec::new(),
            neighbors: Vec::new(),
            unlock_cost: 50,
            points_to_complete: None,
        };
        assert_eq!(
            record.validate(1),
            Err(ValidationError::DegeneratePolygon {
                index: 1,
                id: "varrock".to_owned(),
                len: 2,
            }),
        );
    }

    #[test]
    fn record_serialization_uses_camel_case_keys() {
        let record = AreaRecord {
            id: "varrock".to_owned(),
            display_name: "Varrock".to_owned(),
            polygon: vec![[3200, 3400, 0], [3264, 3400, 0], [3264, 3456, 0]],
            includes: Vec::new(),
            neighbors: vec!["lumbridge".to_owned()],
            unlock_cost: 50,
            points_to_complete: Some(100),
        };

        let json = serde_json::to_string(&record).expect("serialize record");
        assert!(json.contains("\"displayName\""));
        assert!(json.contains("\"unlockCost\""));
        assert!(json.contains("\"pointsToComplete\""));

        let restored: AreaRecord = serde_json::from_str(&json).expect("deserialize record");
        assert_eq!(restored, record);
    }

    #[test]
    fn record_deserialization_defaults_missing_threshold() {
        let json = r#"{"id":"edgeville","displayName":"Edgeville","polygon":[],
            "includes":[],"neighbors":[],"unlockCost":30}"#;
        let record: AreaRecord = serde_json::from_str(json).expect("deserialize record");
        assert_eq!(record.points_to_complete, None);
    }

    #[test]
    fn tile_id_round_trips_through_bincode() {
        assert_round_trip(&TileId::new(-2, 5));
    }

    #[test]
    fn unlock_error_round_trips_through_bincode() {
        assert_round_trip(&UnlockError::InsufficientPoints);
    }
}
