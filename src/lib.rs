//! Engine-agnostic simulation core for a pixel-painting ablation puzzle.
//!
//! A painting is a grid of colored pixels. Collector units orbit the painting
//! and shoot perimeter pixels matching their assigned color; pipes, walls and
//! keys layered over the grid react to each destruction. Everything here is
//! single-threaded and tick-driven: a [`Simulation`] advances collectors in a
//! fixed order, and every destruction cascade resolves fully before the next
//! collector runs.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

pub mod collector;
pub mod config;
pub mod events;
pub mod grid;
pub mod mechanic;
pub mod path;
pub mod simulation;

pub use collector::{Collector, CollectorId};
pub use config::{
    ColorPalette, KeySetup, LevelCollectorsConfig, PaintingConfig, PipeSetup, SetupError,
    WallSetup,
};
pub use events::{EventBus, GameplayEvent};
pub use grid::PaintingGrid;
pub use mechanic::{Key, Pipe, Wall};
pub use path::{CachedPath, MovementType, PathMover, PathSample};
pub use simulation::Simulation;

/// Reserved color code for key pixels; key pixels are targetable by every
/// collector regardless of its own color.
pub const KEY_COLOR_CODE: &str = "KeyColor";

/// Color code assigned to freshly generated pixels before a painting
/// configuration is applied.
pub const DEFAULT_COLOR_CODE: &str = "WhiteDefault";

/// Display color, pass-through for logic: only the `color_code` string ever
/// participates in matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Handle into a [`PaintingGrid`]'s pixel arena. Indices, mechanic objects
/// and collectors all refer to pixels by id, never by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelId(pub usize);

/// Where a pixel came from. Painting pixels are the destructible picture
/// itself; pipe parts are generated by pipe setups and may lie outside the
/// painting footprint. Both kinds participate in outline and occlusion
/// queries, but totals and config export cover painting pixels only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelSource {
    Painting,
    PipePart,
}

/// The atomic destructible unit.
#[derive(Debug, Clone)]
pub struct Pixel {
    pub column: i32,
    pub row: i32,
    pub color: Color,
    pub color_code: String,
    pub world_pos: Vec3,
    /// Hit points; only consulted when a wall derives its default hearts.
    pub hearts: u32,
    pub destroyed: bool,
    /// Hidden pixels are excluded from targeting, outline queries and
    /// remaining-pixel totals.
    pub hidden: bool,
    pub source: PixelSource,
}

impl Pixel {
    pub fn new(column: i32, row: i32, world_pos: Vec3) -> Self {
        Self {
            column,
            row,
            color: Color::WHITE,
            color_code: DEFAULT_COLOR_CODE.to_string(),
            world_pos,
            hearts: 1,
            destroyed: false,
            hidden: false,
            source: PixelSource::Painting,
        }
    }

    /// Applies a painting configuration record to this pixel. A hidden pixel
    /// is also marked destroyed so it can never be targeted.
    pub fn setup(&mut self, color: Color, color_code: String, hidden: bool) {
        self.color = color;
        self.color_code = color_code;
        self.hidden = hidden;
        if hidden {
            self.destroyed = true;
        }
    }

    /// A pixel is a legal target iff it is neither destroyed nor hidden.
    pub fn targetable(&self) -> bool {
        !self.destroyed && !self.hidden
    }
}

/// Primary axis of a collector's travel. Keys the per-axis processed-lane
/// sets that implement the "fire each lane once per direction-run" rule.
#[derive(Debug, PartialEq, Eq, Hash, Display, EnumIter, enum_map::Enum, Clone, Copy)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Travel direction classified from a path tangent. Each named direction
/// corresponds to one side of the orbit around the painting and carries its
/// own occlusion rule; `Unknown` falls back to plain distance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum MoveDirection {
    HorizontalLeftToRight,
    HorizontalRightToLeft,
    VerticalBottomToTop,
    VerticalTopToBottom,
    Unknown,
}

impl MoveDirection {
    /// Classifies a tangent vector: the dominant of |x| and |z| picks the
    /// axis (ties go horizontal), the sign picks the direction along it.
    pub fn from_tangent(tangent: Vec3) -> Self {
        if tangent == Vec3::ZERO {
            return Self::Unknown;
        }
        if tangent.x.abs() >= tangent.z.abs() {
            if tangent.x > 0.0 {
                Self::HorizontalLeftToRight
            } else {
                Self::HorizontalRightToLeft
            }
        } else if tangent.z > 0.0 {
            Self::VerticalBottomToTop
        } else {
            Self::VerticalTopToBottom
        }
    }

    pub fn orientation(self) -> Option<Orientation> {
        match self {
            Self::HorizontalLeftToRight | Self::HorizontalRightToLeft => {
                Some(Orientation::Horizontal)
            }
            Self::VerticalBottomToTop | Self::VerticalTopToBottom => Some(Orientation::Vertical),
            Self::Unknown => None,
        }
    }
}
