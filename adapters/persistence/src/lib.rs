#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Key-value persistence adapter for Waylock profiles.
//!
//! The engine persists through a single logical key-value namespace,
//! abstracted as [`ProfileStore`]. This crate provides the entry codecs
//! (delimiter-joined lists and pairs), the [`load`]/[`save`] functions that
//! move a [`SavedState`] through a store, an in-memory store for tests,
//! and a JSON-file-backed store for real profiles. Corrupt or missing
//! values always decode to empty state; persistence is never a reason the
//! engine cannot boot.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{info, warn};
use waylock_core::{AreaId, AreaRecord, TileId};
use waylock_world::SavedState;

/// Keys of the persisted namespace.
pub mod keys {
    /// Comma-joined unlocked area id list.
    pub const UNLOCKED_AREAS: &str = "unlocked_areas";
    /// Global earned-points total.
    pub const POINTS_EARNED: &str = "points_earned";
    /// Global spent-points total.
    pub const POINTS_SPENT: &str = "points_spent";
    /// Per-area earned points as `id:points` pairs.
    pub const AREA_POINTS: &str = "area_points";
    /// Comma-joined completed area id list (threshold policy).
    pub const COMPLETED_AREAS: &str = "completed_areas";
    /// Per-area claimed tile lists, one key per area.
    pub const CLAIMED_PREFIX: &str = "tasks_claimed.";
    /// Per-area completed tile lists, one key per area.
    pub const COMPLETED_PREFIX: &str = "tasks_completed.";
    /// Custom-area layer as a JSON record list.
    pub const CUSTOM_AREAS: &str = "custom_areas";
}

// Tile ids already use a comma between coordinates, so tile and pair lists
// join on a distinct delimiter.
const ID_DELIMITER: char = ',';
const ENTRY_DELIMITER: char = ';';
const PAIR_DELIMITER: char = ':';

/// Single logical key-value namespace the engine persists through.
pub trait ProfileStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &str);

    /// Deletes the entry under `key`, if present.
    fn remove(&mut self, key: &str);

    /// Enumerates every stored key.
    fn keys(&self) -> Vec<String>;
}

/// Decodes the full persisted state from a store.
///
/// Every corrupt or missing entry degrades to its empty/zero equivalent.
pub fn load<S>(store: &S) -> SavedState
where
    S: ProfileStore + ?Sized,
{
    let unlocked = store
        .get(keys::UNLOCKED_AREAS)
        .map_or_else(Vec::new, |value| decode_id_list(&value));
    let completed_areas = store
        .get(keys::COMPLETED_AREAS)
        .map_or_else(Vec::new, |value| decode_id_list(&value));
    let earned_total = decode_points(store.get(keys::POINTS_EARNED), keys::POINTS_EARNED);
    let spent_total = decode_points(store.get(keys::POINTS_SPENT), keys::POINTS_SPENT);
    let area_points = store
        .get(keys::AREA_POINTS)
        .map_or_else(Vec::new, |value| decode_area_points(&value));

    let mut claimed_tiles = Vec::new();
    let mut completed_tiles = Vec::new();
    for key in store.keys() {
        if let Some(area) = key.strip_prefix(keys::CLAIMED_PREFIX) {
            if let Some(value) = store.get(&key) {
                claimed_tiles.push((AreaId::new(area), decode_tile_list(&value)));
            }
        } else if let Some(area) = key.strip_prefix(keys::COMPLETED_PREFIX) {
            if let Some(value) = store.get(&key) {
                completed_tiles.push((AreaId::new(area), decode_tile_list(&value)));
            }
        }
    }

    let custom_areas = store
        .get(keys::CUSTOM_AREAS)
        .map_or_else(Vec::new, |value| {
            serde_json::from_str::<Vec<AreaRecord>>(&value).unwrap_or_else(|error| {
                warn!("discarding corrupt custom-area layer: {error}");
                Vec::new()
            })
        });

    SavedState {
        unlocked,
        earned_total,
        spent_total,
        area_points,
        completed_areas,
        claimed_tiles,
        completed_tiles,
        custom_areas,
    }
}

/// Encodes the full persisted state into a store.
///
/// Stale per-area tile keys are removed first so an emptied grid does not
/// resurrect on the next load.
pub fn save<S>(store: &mut S, state: &SavedState)
where
    S: ProfileStore + ?Sized,
{
    for key in store.keys() {
        if key.starts_with(keys::CLAIMED_PREFIX) || key.starts_with(keys::COMPLETED_PREFIX) {
            store.remove(&key);
        }
    }

    store.put(keys::UNLOCKED_AREAS, &encode_id_list(&state.unlocked));
    store.put(keys::POINTS_EARNED, &state.earned_total.to_string());
    store.put(keys::POINTS_SPENT, &state.spent_total.to_string());
    store.put(keys::AREA_POINTS, &encode_area_points(&state.area_points));
    store.put(
        keys::COMPLETED_AREAS,
        &encode_id_list(&state.completed_areas),
    );

    for (area, tiles) in &state.claimed_tiles {
        let key = format!("{}{}", keys::CLAIMED_PREFIX, area);
        store.put(&key, &encode_tile_list(tiles));
    }
    for (area, tiles) in &state.completed_tiles {
        let key = format!("{}{}", keys::COMPLETED_PREFIX, area);
        store.put(&key, &encode_tile_list(tiles));
    }

    if state.custom_areas.is_empty() {
        store.remove(keys::CUSTOM_AREAS);
    } else {
        match serde_json::to_string(&state.custom_areas) {
            Ok(json) => store.put(keys::CUSTOM_AREAS, &json),
            Err(error) => warn!("could not encode custom-area layer: {error}"),
        }
    }
}

fn encode_id_list(ids: &[AreaId]) -> String {
    let mut out = String::new();
    for id in ids {
        if !out.is_empty() {
            out.push(ID_DELIMITER);
        }
        out.push_str(id.as_str());
    }
    out
}

fn decode_id_list(value: &str) -> Vec<AreaId> {
    value
        .split(ID_DELIMITER)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(AreaId::new)
        .collect()
}

fn decode_points(value: Option<String>, key: &str) -> i64 {
    let Some(value) = value else {
        return 0;
    };
    value.trim().parse::<i64>().unwrap_or_else(|_| {
        warn!("treating corrupt value for '{key}' as zero");
        0
    })
}

fn encode_area_points(entries: &[(AreaId, i64)]) -> String {
    let mut out = String::new();
    for (area, points) in entries {
        if !out.is_empty() {
            out.push(ENTRY_DELIMITER);
        }
        out.push_str(area.as_str());
        out.push(PAIR_DELIMITER);
        out.push_str(&points.to_string());
    }
    out
}

fn decode_area_points(value: &str) -> Vec<(AreaId, i64)> {
    value
        .split(ENTRY_DELIMITER)
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let (id, points) = entry.split_once(PAIR_DELIMITER)?;
            let points = points.trim().parse::<i64>().ok()?;
            if id.is_empty() {
                return None;
            }
            Some((AreaId::new(id), points))
        })
        .collect()
}

fn encode_tile_list(tiles: &[TileId]) -> String {
    let mut out = String::new();
    for tile in tiles {
        if !out.is_empty() {
            out.push(ENTRY_DELIMITER);
        }
        out.push_str(&tile.to_string());
    }
    out
}

fn decode_tile_list(value: &str) -> Vec<TileId> {
    value
        .split(ENTRY_DELIMITER)
        .filter_map(|entry| TileId::parse(entry.trim()))
        .collect()
}

/// In-memory store used by tests and the scripted demo.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty in-memory namespace.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl ProfileStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        let _ = self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        let _ = self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// JSON-file-backed store for real profiles.
///
/// The whole namespace lives in one JSON object on disk. Reads happen once
/// at open; writes stay in memory until [`FileStore::persist`] flushes
/// them, keeping every engine-facing operation synchronous and total.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing or corrupt file yields an empty namespace; the engine must
    /// always be able to start with empty progress.
    #[must_use]
    pub fn open<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(
                        "profile {} is corrupt ({error}); starting with empty progress",
                        path.display(),
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => {
                info!(
                    "no profile at {}; starting with empty progress",
                    path.display(),
                );
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Flushes the namespace to disk.
    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .context("encoding profile namespace")?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing profile {}", self.path.display()))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        let _ = self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        let _ = self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
