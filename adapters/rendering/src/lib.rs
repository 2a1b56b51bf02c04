#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Waylock adapters.
//!
//! Concrete backends are out of scope for the engine; this crate only
//! defines the presentation descriptors a backend consumes — the locked-
//! area overlay, per-area task grid panels, unlock shop rows, and the
//! points HUD — together with the camera that projects world tiles into
//! screen space. Everything here is captured from world query snapshots,
//! so a backend thread never touches simulation state.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt};
use waylock_core::{AreaId, AreaStatus, Position, TileId, TileState};
use waylock_world::{query, World};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

/// Colors assigned to each derived tile state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileStatePalette {
    /// Fill for tiles not yet revealed.
    pub locked: Color,
    /// Fill for revealed, incomplete tiles.
    pub revealed: Color,
    /// Fill for completed tiles awaiting their claim.
    pub completed_unclaimed: Color,
    /// Fill for claimed tiles.
    pub claimed: Color,
}

impl TileStatePalette {
    /// Resolves the fill color for a tile state.
    #[must_use]
    pub const fn color_for(&self, state: TileState) -> Color {
        match state {
            TileState::Locked => self.locked,
            TileState::Revealed => self.revealed,
            TileState::CompletedUnclaimed => self.completed_unclaimed,
            TileState::Claimed => self.claimed,
        }
    }
}

impl Default for TileStatePalette {
    fn default() -> Self {
        Self {
            locked: Color::from_rgb_u8(0x2b, 0x2b, 0x2b),
            revealed: Color::from_rgb_u8(0x4f, 0x6d, 0x8f),
            completed_unclaimed: Color::from_rgb_u8(0xd9, 0xa4, 0x3b),
            claimed: Color::from_rgb_u8(0x3f, 0x9d, 0x4f),
        }
    }
}

/// Projects world tile coordinates into screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    origin: Vec2,
    tile_size: f32,
}

impl Camera {
    /// Creates a camera anchored at a world-space origin.
    ///
    /// Returns an error when `tile_size` is not positive.
    pub fn new(origin: Vec2, tile_size: f32) -> Result<Self, RenderingError> {
        if tile_size <= 0.0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }
        Ok(Self { origin, tile_size })
    }

    /// Screen-space position of a world tile's lower-left corner.
    #[must_use]
    pub fn project(&self, position: Position) -> Vec2 {
        (Vec2::new(position.x() as f32, position.y() as f32) - self.origin) * self.tile_size
    }

    /// Side length of a projected tile in screen units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }
}

/// Screen-space quad shading one locked world tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayQuad {
    /// Lower-left corner of the quad in screen space.
    pub min: Vec2,
    /// Quad extent in screen space.
    pub size: Vec2,
}

/// Shaded overlay covering every locked-area tile on one plane.
#[derive(Clone, Debug, PartialEq)]
pub struct LockedOverlayPresentation {
    /// Plane the overlay was captured for.
    pub plane: i32,
    /// Fill color shared by all quads.
    pub fill: Color,
    /// One quad per locked world tile.
    pub quads: Vec<OverlayQuad>,
}

/// Single tile within a task grid panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaskTilePresentation {
    /// Tile identifier within the grid.
    pub tile: TileId,
    /// Points a claim would award.
    pub points: i64,
    /// Derived state driving the fill color.
    pub state: TileState,
    /// Fill resolved through the palette.
    pub fill: Color,
}

/// Task grid panel for one area.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskPanelPresentation {
    /// Area the panel describes.
    pub area: AreaId,
    /// Display name shown in the panel header.
    pub title: String,
    /// Progression status shown next to the title.
    pub status: AreaStatus,
    /// Tiles in row-major order.
    pub tiles: Vec<TaskTilePresentation>,
}

/// Unlock-shop row shown to the player.
#[derive(Clone, Debug, PartialEq)]
pub struct ShopRowPresentation {
    /// Candidate area.
    pub area: AreaId,
    /// Display name of the candidate.
    pub title: String,
    /// Points the unlock costs.
    pub cost: i64,
    /// Whether the completion gate admits the unlock.
    pub eligible: bool,
    /// Whether the balance covers the cost.
    pub affordable: bool,
}

/// Points HUD summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Spendable balance.
    pub spendable: i64,
    /// Lifetime earned total.
    pub earned_total: i64,
    /// Lifetime spent total.
    pub spent_total: i64,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Locked-area overlay for the captured plane.
    pub overlay: LockedOverlayPresentation,
    /// One task panel per unlocked area, ordered by id.
    pub panels: Vec<TaskPanelPresentation>,
    /// Unlock-shop rows, ordered by id.
    pub shop: Vec<ShopRowPresentation>,
    /// Points HUD.
    pub hud: HudPresentation,
}

/// Captures a presentation snapshot of the world for one plane.
///
/// Every field is owned data cloned out of the query surface, so the
/// returned value may cross to a render thread while the simulation keeps
/// writing.
#[must_use]
pub fn capture(
    world: &World,
    plane: i32,
    camera: &Camera,
    palette: &TileStatePalette,
) -> Presentation {
    let quads = query::tiles_in_locked_areas(world, plane)
        .into_iter()
        .map(|position| OverlayQuad {
            min: camera.project(position),
            size: Vec2::splat(camera.tile_size()),
        })
        .collect();

    let mut panels = Vec::new();
    for id in query::unlocked_ids(world) {
        let Some(grid) = query::task_grid(world, &id) else {
            continue;
        };
        let Some(status) = query::area_status(world, &id) else {
            continue;
        };
        let title = query::area(world, &id)
            .map(|snapshot| snapshot.display_name)
            .unwrap_or_else(|| id.to_string());
        panels.push(TaskPanelPresentation {
            area: id,
            title,
            status,
            tiles: grid
                .iter()
                .map(|tile| TaskTilePresentation {
                    tile: tile.tile,
                    points: tile.points,
                    state: tile.state,
                    fill: palette.color_for(tile.state),
                })
                .collect(),
        });
    }

    let shop = query::unlock_candidates(world)
        .into_iter()
        .map(|candidate| ShopRowPresentation {
            area: candidate.id,
            title: candidate.display_name,
            cost: candidate.cost,
            eligible: candidate.eligible,
            affordable: candidate.affordable,
        })
        .collect();

    Presentation {
        window_title: "Waylock".to_owned(),
        clear_color: Color::from_rgb_u8(0x10, 0x10, 0x12),
        overlay: LockedOverlayPresentation {
            plane,
            fill: Color::from_rgb_u8(0x8f, 0x1f, 0x1f).with_alpha(0.45),
            quads,
        },
        panels,
        shop,
        hud: HudPresentation {
            spendable: query::spendable(world),
            earned_total: query::earned_total(world),
            spent_total: query::spent_total(world),
        },
    }
}

/// Rendering backend capable of presenting Waylock scenes.
pub trait RenderingBackend {
    /// Runs the backend until it is requested to exit.
    ///
    /// The `update` closure re-captures the presentation between frames so
    /// the backend always draws the latest snapshot.
    fn run<F>(self, presentation: Presentation, update: F) -> AnyResult<()>
    where
        F: FnMut(&mut Presentation) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile size must be positive to avoid a degenerate projection.
    InvalidTileSize {
        /// Provided size that failed validation.
        tile_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile_size must be positive (received {tile_size})")
            }
        }
    }
}

impl Error for RenderingError {}
