//! Painting grid: pixel arena, row/column indices, outline selection and the
//! destruction dispatch that feeds the mechanic objects.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use log::warn;
use smallvec::SmallVec;

use crate::config::{
    is_collinear_span, is_filled_rectangle, ColorPalette, KeySetup, PaintingConfig, PipeSetup,
    PixelConfig, SetupError, WallSetup,
};
use crate::events::{EventBus, GameplayEvent};
use crate::mechanic::{Key, Pipe, Wall};
use crate::{Color, Pixel, PixelId, PixelSource, KEY_COLOR_CODE};

type IndexBucket = SmallVec<[PixelId; 16]>;

/// The live pixel set of one painting plus its mechanic objects.
///
/// Pixels live in an arena; the row and column indices point into the arena
/// by id so that nothing dangles when the arena grows. Painting pixels and
/// pipe-generated pixels share the arena and both participate in the
/// indices, but totals, coordinate lookups and config export consider
/// painting pixels only.
pub struct PaintingGrid {
    pixels: Vec<Pixel>,
    by_row: HashMap<i32, IndexBucket>,
    by_column: HashMap<i32, IndexBucket>,
    pipes: Vec<Pipe>,
    walls: Vec<Wall>,
    keys: Vec<Key>,
    center: Vec3,
    spacing: f32,
    size: (u32, u32),
}

impl PaintingGrid {
    pub fn new(center: Vec3, spacing: f32) -> Self {
        Self {
            pixels: Vec::new(),
            by_row: HashMap::new(),
            by_column: HashMap::new(),
            pipes: Vec::new(),
            walls: Vec::new(),
            keys: Vec::new(),
            center,
            spacing,
            size: (0, 0),
        }
    }

    /// World position of a grid coordinate. Columns map to X, rows to Z.
    pub fn pixel_position(&self, column: i32, row: i32) -> Vec3 {
        self.center + Vec3::new(column as f32 * self.spacing, 0.0, row as f32 * self.spacing)
    }

    /// Generates the centered coordinate lattice for a painting of
    /// `(columns, rows)`. Indices are centered on the origin; for an even
    /// dimension the extra cell goes to the negative side, so a 4-wide
    /// painting spans columns -2..=1.
    pub fn generate(&mut self, size: (u32, u32)) {
        self.clear();
        self.size = size;
        let (cols, rows) = (size.0 as i32, size.1 as i32);
        let half_cols = cols / 2;
        let half_rows = rows / 2;
        for col in 0..cols {
            for row in 0..rows {
                let mut grid_col = half_cols - col;
                if cols % 2 == 0 {
                    grid_col -= 1;
                }
                let grid_row = row - half_rows;
                let world = self.pixel_position(grid_col, grid_row);
                self.add_pixel(Pixel::new(grid_col, grid_row, world));
            }
        }
    }

    /// Appends a pixel and inserts it into both indices. No duplicate check
    /// across coordinates happens here; callers own that invariant.
    pub fn add_pixel(&mut self, pixel: Pixel) -> PixelId {
        let id = PixelId(self.pixels.len());
        self.by_row.entry(pixel.row).or_default().push(id);
        self.by_column.entry(pixel.column).or_default().push(id);
        self.pixels.push(pixel);
        id
    }

    /// Rebuilds both indices from the arena. Idempotent; meant for use after
    /// bulk edits of pixel coordinates.
    pub fn rebuild_indices(&mut self) {
        self.by_row.clear();
        self.by_column.clear();
        for (idx, pixel) in self.pixels.iter().enumerate() {
            let id = PixelId(idx);
            self.by_row.entry(pixel.row).or_default().push(id);
            self.by_column.entry(pixel.column).or_default().push(id);
        }
    }

    pub fn pixel(&self, id: PixelId) -> &Pixel {
        &self.pixels[id.0]
    }

    pub fn pixel_mut(&mut self, id: PixelId) -> &mut Pixel {
        &mut self.pixels[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PixelId, &Pixel)> {
        self.pixels
            .iter()
            .enumerate()
            .map(|(idx, pixel)| (PixelId(idx), pixel))
    }

    /// Ad-hoc coordinate lookup over painting pixels; a linear scan is fine
    /// at the tens-by-tens sizes paintings come in.
    pub fn pixel_at(&self, column: i32, row: i32) -> Option<PixelId> {
        self.iter()
            .find(|(_, p)| {
                p.source == PixelSource::Painting && p.column == column && p.row == row
            })
            .map(|(id, _)| id)
    }

    /// All pixel ids in a row, as a defensive copy; mutating the result
    /// cannot corrupt the index.
    pub fn pixels_in_row(&self, row: i32) -> Vec<PixelId> {
        self.by_row.get(&row).map(|b| b.to_vec()).unwrap_or_default()
    }

    pub fn pixels_in_column(&self, column: i32) -> Vec<PixelId> {
        self.by_column
            .get(&column)
            .map(|b| b.to_vec())
            .unwrap_or_default()
    }

    pub fn total_pixels(&self) -> usize {
        self.pixels
            .iter()
            .filter(|p| p.source == PixelSource::Painting)
            .count()
    }

    pub fn remaining_pixels(&self) -> usize {
        self.pixels
            .iter()
            .filter(|p| p.source == PixelSource::Painting && p.targetable())
            .count()
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Full teardown: pixel arena, mechanic objects and both indices go
    /// together; no partial state is ever observable.
    pub fn clear(&mut self) {
        self.pixels.clear();
        self.by_row.clear();
        self.by_column.clear();
        self.pipes.clear();
        self.walls.clear();
        self.keys.clear();
    }

    /// The visible perimeter of the remaining painting: for every occupied
    /// row the extreme-column live pixels, and for every occupied column the
    /// extreme-row live pixels, deduplicated. Recomputed on demand since
    /// every destruction changes the perimeter.
    pub fn select_outline_pixels(&self) -> Vec<PixelId> {
        let mut outline = Vec::new();
        let mut added: HashSet<PixelId> = HashSet::new();

        for bucket in self.by_row.values() {
            let mut min_col = i32::MAX;
            let mut max_col = i32::MIN;
            for &id in bucket {
                let pixel = &self.pixels[id.0];
                if pixel.targetable() {
                    min_col = min_col.min(pixel.column);
                    max_col = max_col.max(pixel.column);
                }
            }
            if min_col == i32::MAX {
                continue;
            }
            for &id in bucket {
                let pixel = &self.pixels[id.0];
                if pixel.targetable()
                    && (pixel.column == min_col || pixel.column == max_col)
                    && added.insert(id)
                {
                    outline.push(id);
                }
            }
        }

        for bucket in self.by_column.values() {
            let mut min_row = i32::MAX;
            let mut max_row = i32::MIN;
            for &id in bucket {
                let pixel = &self.pixels[id.0];
                if pixel.targetable() {
                    min_row = min_row.min(pixel.row);
                    max_row = max_row.max(pixel.row);
                }
            }
            if min_row == i32::MAX {
                continue;
            }
            for &id in bucket {
                let pixel = &self.pixels[id.0];
                if pixel.targetable()
                    && (pixel.row == min_row || pixel.row == max_row)
                    && added.insert(id)
                {
                    outline.push(id);
                }
            }
        }

        outline
    }

    /// Outline filtered to a collector's color. Key pixels pass for every
    /// collector once they surface on the perimeter.
    pub fn select_outline_pixels_with_color(&self, color_code: &str) -> Vec<PixelId> {
        self.select_outline_pixels()
            .into_iter()
            .filter(|&id| {
                let code = self.pixels[id.0].color_code.as_str();
                code == color_code || code == KEY_COLOR_CODE
            })
            .collect()
    }

    /// The only sanctioned gameplay mutation path: marks the pixel destroyed,
    /// runs the mechanic dispatch to completion and publishes the grid
    /// change. A destroyed or hidden pixel is a no-op, not an error; a stale
    /// candidate racing a cascade is normal.
    pub fn shoot_pixel(&mut self, id: PixelId, bus: &mut EventBus) {
        if !self.pixels[id.0].targetable() {
            return;
        }
        self.pixels[id.0].destroyed = true;
        bus.publish(GameplayEvent::PixelDestroyed(id));
        self.dispatch_pixel_destroyed(id, bus);
        bus.publish(GameplayEvent::GridPixelsChanged);
    }

    /// At most one mechanic object reacts per destroyed pixel: pipes first,
    /// then walls (both matched by the pixel's color), then keys (reserved
    /// key color only). No match means the destruction is terminal.
    fn dispatch_pixel_destroyed(&mut self, id: PixelId, bus: &mut EventBus) {
        let color = self.pixels[id.0].color_code.clone();

        for pipe in &mut self.pipes {
            if pipe.destroyed() || pipe.color_code != color {
                continue;
            }
            if pipe.covers(id) {
                pipe.on_pixel_destroyed(&mut self.pixels);
                return;
            }
        }

        for wall in &mut self.walls {
            if wall.destroyed() || wall.color_code != color {
                continue;
            }
            if wall.covers(id) {
                wall.on_pixel_destroyed(&mut self.pixels);
                return;
            }
        }

        for key in &mut self.keys {
            if key.collected() || color != KEY_COLOR_CODE {
                continue;
            }
            if key.covers(id) {
                if key.on_pixel_destroyed(&mut self.pixels) {
                    bus.publish(GameplayEvent::KeyCollected);
                }
                return;
            }
        }
    }

    /// Materializes the grid from a painting configuration: lattice, pixel
    /// colors, then walls, pipes and keys in that order. Invalid mechanic
    /// setups are logged and skipped whole; nothing is ever half-built.
    pub fn apply_painting_config(&mut self, config: &PaintingConfig, palette: &ColorPalette) {
        self.generate(config.size);

        for record in &config.pixels {
            let Some(id) = self.pixel_at(record.column, record.row) else {
                warn!(
                    "painting config names missing pixel ({}, {})",
                    record.column, record.row
                );
                continue;
            };
            let color = palette
                .get_color_by_code(&record.color_code)
                .unwrap_or(Color::WHITE);
            self.pixels[id.0].setup(color, record.color_code.clone(), record.hidden);
        }

        for setup in &config.walls {
            if let Err(err) = self.create_wall(setup, palette) {
                warn!("wall setup skipped: {err}");
            }
        }
        for setup in &config.pipes {
            if let Err(err) = self.create_pipe(setup, palette) {
                warn!("pipe setup skipped: {err}");
            }
        }
        for setup in &config.keys {
            if let Err(err) = self.create_key(setup, palette) {
                warn!("key setup skipped: {err}");
            }
        }
    }

    /// Builds a wall over existing painting pixels. All validation and
    /// lookups complete before any pixel is touched.
    pub fn create_wall(
        &mut self,
        setup: &WallSetup,
        palette: &ColorPalette,
    ) -> Result<(), SetupError> {
        if setup.covered.is_empty() {
            return Err(SetupError::EmptyCoverage);
        }
        if setup.covered.len() < 2 {
            return Err(SetupError::WallTooSmall);
        }
        if !is_filled_rectangle(&setup.covered) {
            return Err(SetupError::NotRectangle);
        }
        let covered = self.resolve_covered(&setup.covered)?;

        let color = palette
            .get_color_by_code(&setup.color_code)
            .unwrap_or(Color::WHITE);
        for &id in &covered {
            let pixel = &mut self.pixels[id.0];
            pixel.color = color;
            pixel.color_code = setup.color_code.clone();
        }
        let hearts = if setup.hearts > 0 {
            setup.hearts
        } else {
            covered.iter().map(|&id| self.pixels[id.0].hearts).sum()
        };
        self.walls
            .push(Wall::new(covered, setup.color_code.clone(), hearts));
        Ok(())
    }

    /// Builds a pipe. Base painting pixels under the pipe are hidden and a
    /// fresh pipe-part pixel is generated per covered coordinate (coordinates
    /// outside the painting footprint are allowed).
    pub fn create_pipe(
        &mut self,
        setup: &PipeSetup,
        palette: &ColorPalette,
    ) -> Result<(), SetupError> {
        if setup.covered.len() < 2 {
            return Err(SetupError::PipeTooShort);
        }
        if !is_collinear_span(&setup.covered) {
            return Err(SetupError::PipeNotCollinear);
        }

        let color = palette
            .get_color_by_code(&setup.color_code)
            .unwrap_or(Color::WHITE);
        let mut covered = Vec::with_capacity(setup.covered.len());
        for pos in &setup.covered {
            if let Some(base) = self.pixel_at(pos.column, pos.row) {
                let pixel = &mut self.pixels[base.0];
                pixel.hidden = true;
                pixel.destroyed = true;
            }
            let mut part = Pixel::new(pos.column, pos.row, self.pixel_position(pos.column, pos.row));
            part.source = PixelSource::PipePart;
            part.color = color;
            part.color_code = setup.color_code.clone();
            covered.push(self.add_pixel(part));
        }

        let head = &self.pixels[covered[0].0];
        let tail = &self.pixels[covered[covered.len() - 1].0];
        let horizontal = head.row == tail.row;
        self.pipes.push(Pipe::new(
            covered,
            setup.color_code.clone(),
            horizontal,
            setup.scale,
        ));
        Ok(())
    }

    /// Builds a key over existing painting pixels, recoloring them to the
    /// reserved key color.
    pub fn create_key(
        &mut self,
        setup: &KeySetup,
        palette: &ColorPalette,
    ) -> Result<(), SetupError> {
        if setup.covered.is_empty() {
            return Err(SetupError::EmptyCoverage);
        }
        if !is_filled_rectangle(&setup.covered) {
            return Err(SetupError::NotRectangle);
        }
        let covered = self.resolve_covered(&setup.covered)?;

        let color = palette
            .get_color_by_code(KEY_COLOR_CODE)
            .unwrap_or(Color::WHITE);
        for &id in &covered {
            let pixel = &mut self.pixels[id.0];
            pixel.color = color;
            pixel.color_code = KEY_COLOR_CODE.to_string();
        }
        self.keys.push(Key::new(covered));
        Ok(())
    }

    fn resolve_covered(
        &self,
        covered: &[crate::config::GridPos],
    ) -> Result<Vec<PixelId>, SetupError> {
        covered
            .iter()
            .map(|pos| {
                self.pixel_at(pos.column, pos.row)
                    .ok_or(SetupError::MissingPixel {
                        column: pos.column,
                        row: pos.row,
                    })
            })
            .collect()
    }

    /// Serializes the surviving runtime state back into the configuration
    /// record shapes. With no destruction in between, applying and exporting
    /// reproduces the original pixel set.
    pub fn export_painting_config(&self) -> PaintingConfig {
        let pixels = self
            .pixels
            .iter()
            .filter(|p| p.source == PixelSource::Painting && (!p.destroyed || p.hidden))
            .map(|p| PixelConfig {
                column: p.column,
                row: p.row,
                color_code: p.color_code.clone(),
                hidden: p.hidden,
            })
            .collect();

        let covered_positions = |ids: &[PixelId]| {
            ids.iter()
                .map(|&id| {
                    let p = &self.pixels[id.0];
                    crate::config::GridPos {
                        column: p.column,
                        row: p.row,
                    }
                })
                .collect::<Vec<_>>()
        };

        PaintingConfig {
            size: self.size,
            pixels,
            pipes: self
                .pipes
                .iter()
                .filter(|pipe| !pipe.destroyed())
                .map(|pipe| PipeSetup {
                    covered: covered_positions(pipe.covered()),
                    color_code: pipe.color_code.clone(),
                    scale: pipe.scale,
                })
                .collect(),
            walls: self
                .walls
                .iter()
                .filter(|wall| !wall.destroyed())
                .map(|wall| WallSetup {
                    covered: covered_positions(wall.covered()),
                    color_code: wall.color_code.clone(),
                    hearts: wall.current_heart(),
                })
                .collect(),
            keys: self
                .keys
                .iter()
                .filter(|key| !key.collected())
                .map(|key| KeySetup {
                    covered: covered_positions(key.covered()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GridPos;

    use super::*;

    fn painted_grid(cols: u32, rows: u32, code: &str) -> PaintingGrid {
        let mut grid = PaintingGrid::new(Vec3::ZERO, 1.0);
        grid.generate((cols, rows));
        paint_all(&mut grid, code);
        grid
    }

    fn paint_all(grid: &mut PaintingGrid, code: &str) {
        let ids: Vec<PixelId> = grid.iter().map(|(id, _)| id).collect();
        for id in ids {
            grid.pixel_mut(id)
                .setup(Color::WHITE, code.to_string(), false);
        }
    }

    fn positions(coords: &[(i32, i32)]) -> Vec<GridPos> {
        coords.iter().map(|&c| GridPos::from(c)).collect()
    }

    #[test]
    fn generate_centers_even_and_odd_dimensions() {
        let grid = painted_grid(4, 3, "Red");
        let mut cols: Vec<i32> = grid.iter().map(|(_, p)| p.column).collect();
        let mut rows: Vec<i32> = grid.iter().map(|(_, p)| p.row).collect();
        cols.sort();
        cols.dedup();
        rows.sort();
        rows.dedup();
        assert_eq!(cols, vec![-2, -1, 0, 1]);
        assert_eq!(rows, vec![-1, 0, 1]);
        assert_eq!(grid.total_pixels(), 12);
    }

    #[test]
    fn indices_cover_every_pixel_exactly_once() {
        let mut grid = painted_grid(3, 3, "Red");
        grid.rebuild_indices();
        let mut seen = HashSet::new();
        for row in -1..=1 {
            for id in grid.pixels_in_row(row) {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 9);
        let from_cols: usize = (-1..=1).map(|c| grid.pixels_in_column(c).len()).sum();
        assert_eq!(from_cols, 9);
    }

    #[test]
    fn outline_of_intact_rectangle_is_the_perimeter() {
        let grid = painted_grid(5, 4, "Red");
        assert_eq!(grid.select_outline_pixels().len(), 2 * 5 + 2 * 4 - 4);

        // degenerate widths return everything
        let thin = painted_grid(2, 3, "Red");
        assert_eq!(thin.select_outline_pixels().len(), 6);
        let dot = painted_grid(1, 1, "Red");
        assert_eq!(dot.select_outline_pixels().len(), 1);
    }

    #[test]
    fn outline_shrinks_monotonically_to_empty() {
        let mut grid = painted_grid(4, 4, "Red");
        let mut bus = EventBus::new();
        let mut last_remaining = grid.remaining_pixels();
        loop {
            let outline = grid.select_outline_pixels();
            if outline.is_empty() {
                break;
            }
            for id in outline {
                grid.shoot_pixel(id, &mut bus);
            }
            let remaining = grid.remaining_pixels();
            assert!(remaining < last_remaining);
            last_remaining = remaining;
        }
        assert_eq!(grid.remaining_pixels(), 0);
    }

    #[test]
    fn outline_with_color_includes_key_sentinel() {
        let mut grid = painted_grid(3, 1, "Red");
        let left = grid.pixel_at(-1, 0).unwrap();
        let right = grid.pixel_at(1, 0).unwrap();
        grid.pixel_mut(left)
            .setup(Color::WHITE, "Blue".to_string(), false);
        grid.pixel_mut(right)
            .setup(Color::WHITE, KEY_COLOR_CODE.to_string(), false);

        let red = grid.select_outline_pixels_with_color("Red");
        assert!(red.iter().all(|&id| {
            let code = grid.pixel(id).color_code.as_str();
            code == "Red" || code == KEY_COLOR_CODE
        }));
        assert!(red.contains(&right));
        assert!(!red.contains(&left));
    }

    #[test]
    fn hidden_pixels_never_surface() {
        let mut grid = painted_grid(3, 1, "Red");
        let mid = grid.pixel_at(0, 0).unwrap();
        grid.pixel_mut(mid)
            .setup(Color::WHITE, "Red".to_string(), true);
        assert_eq!(grid.remaining_pixels(), 2);
        assert!(!grid.select_outline_pixels().contains(&mid));

        let mut bus = EventBus::new();
        grid.shoot_pixel(mid, &mut bus);
        assert!(bus.is_empty());
    }

    #[test]
    fn shooting_twice_dispatches_once() {
        let mut grid = painted_grid(2, 2, "Red");
        let id = grid.pixel_at(0, 0).unwrap();
        let mut bus = EventBus::new();

        grid.shoot_pixel(id, &mut bus);
        assert_eq!(bus.pop(), Some(GameplayEvent::PixelDestroyed(id)));
        assert_eq!(bus.pop(), Some(GameplayEvent::GridPixelsChanged));

        grid.shoot_pixel(id, &mut bus);
        assert!(bus.is_empty());
        assert!(grid.pixel(id).destroyed);
    }

    #[test]
    fn wall_absorbs_two_hits_and_breaks_on_the_third() {
        let mut grid = painted_grid(2, 1, "Red");
        let setup = WallSetup {
            covered: positions(&[(-1, 0), (0, 0)]),
            color_code: "Gray".to_string(),
            hearts: 3,
        };
        grid.create_wall(&setup, &ColorPalette::new()).unwrap();
        let target = grid.pixel_at(0, 0).unwrap();
        let mut bus = EventBus::new();

        for expected_heart in [2, 1] {
            grid.shoot_pixel(target, &mut bus);
            assert_eq!(grid.walls()[0].current_heart(), expected_heart);
            assert!(grid.pixel(target).targetable());
        }

        grid.shoot_pixel(target, &mut bus);
        assert!(grid.walls()[0].destroyed());
        assert_eq!(grid.remaining_pixels(), 0);
    }

    #[test]
    fn wall_hearts_default_to_covered_pixel_hearts() {
        let mut grid = painted_grid(2, 1, "Red");
        let setup = WallSetup {
            covered: positions(&[(-1, 0), (0, 0)]),
            color_code: "Gray".to_string(),
            hearts: 0,
        };
        grid.create_wall(&setup, &ColorPalette::new()).unwrap();
        assert_eq!(grid.walls()[0].current_heart(), 2);
    }

    #[test]
    fn wall_setup_validation() {
        let mut grid = painted_grid(3, 3, "Red");
        let palette = ColorPalette::new();

        let l_shape = WallSetup {
            covered: positions(&[(0, 0), (1, 0), (0, 1)]),
            color_code: "Gray".to_string(),
            hearts: 1,
        };
        assert_eq!(
            grid.create_wall(&l_shape, &palette),
            Err(SetupError::NotRectangle)
        );

        let off_grid = WallSetup {
            covered: positions(&[(5, 0), (6, 0)]),
            color_code: "Gray".to_string(),
            hearts: 1,
        };
        assert_eq!(
            grid.create_wall(&off_grid, &palette),
            Err(SetupError::MissingPixel { column: 5, row: 0 })
        );
        assert!(grid.walls().is_empty());
    }

    #[test]
    fn pipe_covers_grid_with_parts_and_hides_the_base() {
        let mut grid = painted_grid(3, 1, "Red");
        let setup = PipeSetup {
            covered: positions(&[(-1, 0), (0, 0), (1, 0)]),
            color_code: "Blue".to_string(),
            scale: 1.0,
        };
        grid.create_pipe(&setup, &ColorPalette::new()).unwrap();

        // base painting is hidden, only pipe parts remain targetable
        assert_eq!(grid.remaining_pixels(), 0);
        assert_eq!(grid.pixels_in_row(0).len(), 6);
        let outline = grid.select_outline_pixels();
        assert_eq!(outline.len(), 3);
        assert!(outline
            .iter()
            .all(|&id| grid.pixel(id).color_code == "Blue"));
    }

    #[test]
    fn pipe_fully_consumed_after_exactly_k_shots() {
        let mut grid = painted_grid(3, 1, "Red");
        let setup = PipeSetup {
            covered: positions(&[(-1, 0), (0, 0), (1, 0)]),
            color_code: "Blue".to_string(),
            scale: 1.0,
        };
        grid.create_pipe(&setup, &ColorPalette::new()).unwrap();
        let mut bus = EventBus::new();

        for shot in 1..=3 {
            let target = grid
                .select_outline_pixels_with_color("Blue")
                .into_iter()
                .next()
                .expect("pipe still has live parts");
            grid.shoot_pixel(target, &mut bus);
            assert_eq!(grid.pipes()[0].pixels_destroyed(), shot);
        }
        assert!(grid.pipes()[0].destroyed());
        assert!(grid.select_outline_pixels_with_color("Blue").is_empty());
    }

    #[test]
    fn pipe_setup_validation() {
        let mut grid = painted_grid(3, 3, "Red");
        let palette = ColorPalette::new();

        let short = PipeSetup {
            covered: positions(&[(0, 0)]),
            color_code: "Blue".to_string(),
            scale: 1.0,
        };
        assert_eq!(
            grid.create_pipe(&short, &palette),
            Err(SetupError::PipeTooShort)
        );

        let bent = PipeSetup {
            covered: positions(&[(0, 0), (1, 0), (1, 1)]),
            color_code: "Blue".to_string(),
            scale: 1.0,
        };
        assert_eq!(
            grid.create_pipe(&bent, &palette),
            Err(SetupError::PipeNotCollinear)
        );
        assert!(grid.pipes().is_empty());
    }

    #[test]
    fn key_collects_once_and_signals_once() {
        let mut grid = painted_grid(2, 2, "Red");
        let setup = KeySetup {
            covered: positions(&[(-1, -1)]),
        };
        grid.create_key(&setup, &ColorPalette::new()).unwrap();
        let target = grid.pixel_at(-1, -1).unwrap();
        assert_eq!(grid.pixel(target).color_code, KEY_COLOR_CODE);

        let mut bus = EventBus::new();
        grid.shoot_pixel(target, &mut bus);
        let events: Vec<_> = std::iter::from_fn(|| bus.pop()).collect();
        assert_eq!(
            events
                .iter()
                .filter(|&&e| e == GameplayEvent::KeyCollected)
                .count(),
            1
        );
        assert!(grid.keys()[0].collected());

        grid.shoot_pixel(target, &mut bus);
        assert!(bus.is_empty());
    }

    #[test]
    fn clear_tears_everything_down_together() {
        let mut grid = painted_grid(3, 1, "Red");
        let setup = PipeSetup {
            covered: positions(&[(-1, 0), (0, 0), (1, 0)]),
            color_code: "Blue".to_string(),
            scale: 1.0,
        };
        grid.create_pipe(&setup, &ColorPalette::new()).unwrap();
        grid.clear();
        assert_eq!(grid.total_pixels(), 0);
        assert!(grid.pipes().is_empty());
        assert!(grid.pixels_in_row(0).is_empty());
        assert!(grid.select_outline_pixels().is_empty());
    }

    #[test]
    fn config_round_trips_without_destruction() {
        let mut config = PaintingConfig {
            size: (3, 3),
            pixels: Vec::new(),
            pipes: vec![],
            walls: vec![WallSetup {
                covered: positions(&[(0, 0), (1, 0)]),
                color_code: "Gray".to_string(),
                hearts: 2,
            }],
            keys: vec![KeySetup {
                covered: positions(&[(-1, 1)]),
            }],
        };
        for col in -1..=1 {
            for row in -1..=1 {
                config.pixels.push(PixelConfig {
                    column: col,
                    row,
                    color_code: "Red".to_string(),
                    hidden: false,
                });
            }
        }
        // wall and key recolor their covered records on application
        for record in &mut config.pixels {
            if (record.column, record.row) == (0, 0) || (record.column, record.row) == (1, 0) {
                record.color_code = "Gray".to_string();
            }
            if (record.column, record.row) == (-1, 1) {
                record.color_code = KEY_COLOR_CODE.to_string();
            }
        }

        let mut grid = PaintingGrid::new(Vec3::ZERO, 1.0);
        grid.apply_painting_config(&config, &ColorPalette::new());
        let exported = grid.export_painting_config();

        let sort_key = |p: &PixelConfig| (p.column, p.row);
        let mut expected = config.pixels.clone();
        let mut actual = exported.pixels.clone();
        expected.sort_by_key(sort_key);
        actual.sort_by_key(sort_key);
        assert_eq!(actual, expected);
        assert_eq!(exported.size, config.size);
        assert_eq!(exported.walls, config.walls);
        assert_eq!(exported.keys, config.keys);
    }
}
