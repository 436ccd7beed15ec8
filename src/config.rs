//! Configuration records and their validation.
//!
//! These are the in-memory shapes the surrounding tooling feeds into the core
//! and reads back out of it (round-trip). JSON support is a transport
//! convenience on top; the records themselves are the source of truth.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Color, KEY_COLOR_CODE};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SetupError {
    #[error("mechanic setup covers no pixels")]
    EmptyCoverage,

    #[error("pipe needs at least 2 covered pixels")]
    PipeTooShort,

    #[error("pipe pixels are not a straight contiguous line")]
    PipeNotCollinear,

    #[error("wall needs at least 2 covered pixels")]
    WallTooSmall,

    #[error("covered pixels do not form a filled rectangle")]
    NotRectangle,

    #[error("no pixel at ({column}, {row})")]
    MissingPixel { column: i32, row: i32 },
}

/// A grid coordinate inside a setup record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub column: i32,
    pub row: i32,
}

impl From<(i32, i32)> for GridPos {
    fn from(value: (i32, i32)) -> Self {
        Self {
            column: value.0,
            row: value.1,
        }
    }
}

/// One pixel record of a painting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelConfig {
    pub column: i32,
    pub row: i32,
    pub color_code: String,
    #[serde(default)]
    pub hidden: bool,
}

/// Pipe setup: covered coordinates ordered head to tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeSetup {
    pub covered: Vec<GridPos>,
    pub color_code: String,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// Wall setup: a filled rectangle of covered coordinates. `hearts == 0`
/// means "derive from the covered pixels' hearts".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSetup {
    pub covered: Vec<GridPos>,
    pub color_code: String,
    #[serde(default)]
    pub hearts: u32,
}

/// Key setup. Keys always use the reserved key color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySetup {
    pub covered: Vec<GridPos>,
}

impl KeySetup {
    pub fn color_code(&self) -> &'static str {
        KEY_COLOR_CODE
    }
}

/// Everything needed to materialize one painting grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintingConfig {
    /// Painting size as (columns, rows).
    pub size: (u32, u32),
    pub pixels: Vec<PixelConfig>,
    #[serde(default)]
    pub pipes: Vec<PipeSetup>,
    #[serde(default)]
    pub walls: Vec<WallSetup>,
    #[serde(default)]
    pub keys: Vec<KeySetup>,
}

impl PaintingConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Marks every pixel record lying under a pipe setup hidden, so the base
    /// painting never competes with the pipe parts generated over it.
    pub fn hide_pixels_under_pipes(&mut self) {
        let covered: HashSet<GridPos> = self
            .pipes
            .iter()
            .flat_map(|pipe| pipe.covered.iter().copied())
            .collect();
        for pixel in &mut self.pixels {
            if covered.contains(&GridPos::from((pixel.column, pixel.row))) {
                pixel.hidden = true;
            }
        }
    }
}

/// True iff the coordinates tile a filled axis-aligned rectangle with no
/// holes and no duplicates. Pure, usable both for UI enablement and for hard
/// validation at apply time.
pub fn is_filled_rectangle(covered: &[GridPos]) -> bool {
    if covered.is_empty() {
        return false;
    }
    let min_row = covered.iter().map(|p| p.row).min().unwrap();
    let max_row = covered.iter().map(|p| p.row).max().unwrap();
    let min_col = covered.iter().map(|p| p.column).min().unwrap();
    let max_col = covered.iter().map(|p| p.column).max().unwrap();

    let width = (max_col - min_col + 1) as usize;
    let height = (max_row - min_row + 1) as usize;
    if covered.len() != width * height {
        return false;
    }

    let points: HashSet<GridPos> = covered.iter().copied().collect();
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            if !points.contains(&GridPos::from((col, row))) {
                return false;
            }
        }
    }
    true
}

/// True iff the coordinates form a straight contiguous head-to-tail span
/// along one row or one column.
pub fn is_collinear_span(covered: &[GridPos]) -> bool {
    if covered.len() < 2 {
        return false;
    }
    let head = covered[0];
    let same_row = covered.iter().all(|p| p.row == head.row);
    let same_col = covered.iter().all(|p| p.column == head.column);
    if !same_row && !same_col {
        return false;
    }
    let steps: Vec<i32> = covered
        .windows(2)
        .map(|pair| {
            if same_row {
                pair[1].column - pair[0].column
            } else {
                pair[1].row - pair[0].row
            }
        })
        .collect();
    let first = steps[0];
    (first == 1 || first == -1) && steps.iter().all(|&step| step == first)
}

/// Color code lookup table. Logic never needs the display color; this exists
/// so configurations can round-trip through the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorPalette {
    entries: HashMap<String, Color>,
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, color: Color) {
        self.entries.insert(code.into(), color);
    }

    pub fn get_color_by_code(&self, code: &str) -> Option<Color> {
        self.entries.get(code).copied()
    }
}

/// One collector record: color, ammunition and lock state, plus the ids of
/// collectors it is mechanically linked to. Linkage is symmetric and
/// ID-based; the simulation enforces both directions when spawning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub color_code: String,
    pub bullets: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub connected: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorColumnConfig {
    pub collectors: Vec<CollectorConfig>,
}

/// Column-major collector layout for one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCollectorsConfig {
    pub columns: Vec<CollectorColumnConfig>,
}

impl LevelCollectorsConfig {
    pub fn collector_count(&self) -> usize {
        self.columns.iter().map(|col| col.collectors.len()).sum()
    }

    /// Collector records flattened in column-then-row order; this order also
    /// defines the collector ids the `connected` lists refer to.
    pub fn flattened(&self) -> impl Iterator<Item = &CollectorConfig> {
        self.columns.iter().flat_map(|col| col.collectors.iter())
    }
}
