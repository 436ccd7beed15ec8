//! Collector units: the shooters orbiting a painting.
//!
//! A collector never mutates the grid except through
//! [`PaintingGrid::shoot_pixel`]; everything else here is target selection.
//! Selection is driven by the collector's travel direction: the direction
//! picks which side of the painting is "facing" the collector, which in turn
//! picks the occlusion rule and the lane axis for the once-per-run rule.

use std::collections::{BTreeSet, HashSet};

use enum_map::EnumMap;
use glam::Vec3;
use log::debug;

use crate::config::CollectorConfig;
use crate::events::EventBus;
use crate::grid::PaintingGrid;
use crate::{MoveDirection, Orientation, PixelId};

pub const DEFAULT_DETECTION_RADIUS: f32 = 0.75;

/// Stable collector handle; the column-major flattening order of the level
/// config assigns these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectorId(pub u32);

pub struct Collector {
    pub id: CollectorId,
    pub color_code: String,
    pub bullet_capacity: u32,
    bullets_left: u32,
    pub locked: bool,
    pub hidden: bool,
    /// Closeness threshold along the travel-perpendicular axis.
    pub detection_radius: f32,
    /// Ids of collectors mechanically linked to this one; linkage is kept
    /// symmetric by the simulation.
    pub connected: BTreeSet<CollectorId>,
    active: bool,
    direction: MoveDirection,
    /// Lanes already fired at during the current run along each axis:
    /// columns while moving horizontally, rows while moving vertically.
    processed: EnumMap<Orientation, HashSet<i32>>,
    targets: Vec<PixelId>,
}

impl Collector {
    pub fn new(id: CollectorId, color_code: String, bullets: u32) -> Self {
        Self {
            id,
            color_code,
            bullet_capacity: bullets,
            bullets_left: bullets,
            locked: false,
            hidden: false,
            detection_radius: DEFAULT_DETECTION_RADIUS,
            connected: BTreeSet::new(),
            active: true,
            direction: MoveDirection::Unknown,
            processed: EnumMap::default(),
            targets: Vec::new(),
        }
    }

    pub fn from_config(id: CollectorId, config: &CollectorConfig) -> Self {
        let mut collector = Self::new(id, config.color_code.clone(), config.bullets);
        collector.locked = config.locked;
        collector.hidden = config.hidden;
        collector
    }

    pub fn bullets_left(&self) -> u32 {
        self.bullets_left
    }

    pub fn available(&self) -> bool {
        self.bullets_left > 0
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn direction(&self) -> MoveDirection {
        self.direction
    }

    pub fn connect(&mut self, other: CollectorId) {
        if other != self.id {
            self.connected.insert(other);
        }
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Deactivating forgets both lane sets, so a reactivated collector starts
    /// a fresh run.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            for (_, lanes) in self.processed.iter_mut() {
                lanes.clear();
            }
        }
    }

    /// Back to a fresh run with a full magazine. Lock state is left alone;
    /// unlocking is a gameplay event, not a reset.
    pub fn reset(&mut self) {
        self.bullets_left = self.bullet_capacity;
        self.active = true;
        self.direction = MoveDirection::Unknown;
        for (_, lanes) in self.processed.iter_mut() {
            lanes.clear();
        }
        self.targets.clear();
    }

    /// Reclassifies the travel direction from the path tangent. An `Unknown`
    /// tangent keeps the last known direction. Switching axis forgets the
    /// departed axis's processed lanes, so coming back around the painting
    /// can fire at the same lanes again.
    fn update_direction(&mut self, tangent: Vec3) {
        let direction = MoveDirection::from_tangent(tangent);
        if direction == MoveDirection::Unknown || direction == self.direction {
            return;
        }
        if let Some(old_axis) = self.direction.orientation() {
            if Some(old_axis) != direction.orientation() {
                self.processed[old_axis].clear();
            }
        }
        debug!(
            "collector {:?} direction {} -> {}",
            self.id, self.direction, direction
        );
        self.direction = direction;
    }

    /// One tick of collector behavior at the given path position: refresh the
    /// direction and candidate set, then fire at every legal target until
    /// none is left or the magazine runs dry. Cascades resolve inside
    /// `shoot_pixel`, so the candidate set is re-pulled after every shot.
    pub fn update(
        &mut self,
        position: Vec3,
        tangent: Vec3,
        grid: &mut PaintingGrid,
        bus: &mut EventBus,
    ) {
        if !self.active || self.locked || self.hidden {
            return;
        }
        self.update_direction(tangent);
        self.refresh_targets(grid);
        while self.available() {
            let Some(target) = self.find_legal_target(position, grid) else {
                break;
            };
            self.fire(target, grid, bus);
        }
    }

    fn refresh_targets(&mut self, grid: &PaintingGrid) {
        self.targets = grid.select_outline_pixels_with_color(&self.color_code);
    }

    fn fire(&mut self, target: PixelId, grid: &mut PaintingGrid, bus: &mut EventBus) {
        let pixel = grid.pixel(target);
        let lane = self.direction.orientation().map(|axis| match axis {
            Orientation::Horizontal => (axis, pixel.column),
            Orientation::Vertical => (axis, pixel.row),
        });
        self.bullets_left -= 1;
        grid.shoot_pixel(target, bus);
        if let Some((axis, lane)) = lane {
            self.processed[axis].insert(lane);
        }
        self.refresh_targets(grid);
    }

    fn find_legal_target(&self, position: Vec3, grid: &PaintingGrid) -> Option<PixelId> {
        for &id in &self.targets {
            let pixel = grid.pixel(id);
            if !pixel.targetable() {
                continue;
            }
            match self.direction {
                MoveDirection::HorizontalLeftToRight | MoveDirection::HorizontalRightToLeft => {
                    if (position.x - pixel.world_pos.x).abs() > self.detection_radius {
                        continue;
                    }
                    if self.processed[Orientation::Horizontal].contains(&pixel.column) {
                        continue;
                    }
                    if self.has_column_obstacle(grid, pixel.column, pixel.row) {
                        continue;
                    }
                    return Some(id);
                }
                MoveDirection::VerticalBottomToTop | MoveDirection::VerticalTopToBottom => {
                    if (position.z - pixel.world_pos.z).abs() > self.detection_radius {
                        continue;
                    }
                    if self.processed[Orientation::Vertical].contains(&pixel.row) {
                        continue;
                    }
                    if self.has_row_obstacle(grid, pixel.column, pixel.row) {
                        continue;
                    }
                    return Some(id);
                }
                MoveDirection::Unknown => {
                    // No direction yet: plain proximity, no lane bookkeeping.
                    if position.distance(pixel.world_pos) > self.detection_radius {
                        continue;
                    }
                    return Some(id);
                }
            }
        }
        None
    }

    /// Moving horizontally the painting faces the collector with its bottom
    /// or top edge: a live pixel deeper in the same column blocks the shot.
    fn has_column_obstacle(&self, grid: &PaintingGrid, column: i32, row: i32) -> bool {
        grid.pixels_in_column(column).into_iter().any(|other| {
            let pixel = grid.pixel(other);
            pixel.targetable()
                && match self.direction {
                    MoveDirection::HorizontalLeftToRight => pixel.row < row,
                    MoveDirection::HorizontalRightToLeft => pixel.row > row,
                    _ => false,
                }
        })
    }

    fn has_row_obstacle(&self, grid: &PaintingGrid, column: i32, row: i32) -> bool {
        grid.pixels_in_row(row).into_iter().any(|other| {
            let pixel = grid.pixel(other);
            pixel.targetable()
                && match self.direction {
                    MoveDirection::VerticalBottomToTop => pixel.column > column,
                    MoveDirection::VerticalTopToBottom => pixel.column < column,
                    _ => false,
                }
        })
    }
}
