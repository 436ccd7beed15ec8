//! Mechanic objects layered over the painting: pipes, walls and keys.
//!
//! Each variant owns the ids of the pixels it covers and reacts to a single
//! matching destruction event at a time. All destructions performed *inside*
//! a reaction mutate pixels directly and never re-enter the grid's dispatch
//! scan; they are the terminal leaves of a cascade.

use crate::{Pixel, PixelId};

/// A pipe shortens tail-first: each matching destruction consumes the
/// tail-most remaining covered pixel, and the pipe is fully consumed after
/// exactly as many events as it has covered pixels.
#[derive(Debug, Clone)]
pub struct Pipe {
    covered: Vec<PixelId>,
    pub color_code: String,
    pub horizontal: bool,
    /// Visual scale of each pipe part, carried through config round-trips.
    pub scale: f32,
    pixels_destroyed: usize,
}

impl Pipe {
    pub fn new(covered: Vec<PixelId>, color_code: String, horizontal: bool, scale: f32) -> Self {
        Self {
            covered,
            color_code,
            horizontal,
            scale,
            pixels_destroyed: 0,
        }
    }

    pub fn covers(&self, id: PixelId) -> bool {
        self.covered.contains(&id)
    }

    /// Covered pixel ids ordered head to tail.
    pub fn covered(&self) -> &[PixelId] {
        &self.covered
    }

    pub fn pixels_destroyed(&self) -> usize {
        self.pixels_destroyed
    }

    pub fn destroyed(&self) -> bool {
        self.pixels_destroyed >= self.covered.len()
    }

    pub(crate) fn on_pixel_destroyed(&mut self, pixels: &mut [Pixel]) {
        if self.destroyed() {
            return;
        }
        let tail = self.covered.len() - 1 - self.pixels_destroyed;
        pixels[self.covered[tail].0].destroyed = true;
        self.pixels_destroyed += 1;
        // The shortening only ever consumes the tail; whatever the event
        // actually hit, the not-yet-overtaken prefix stays live.
        for &id in &self.covered[..tail] {
            pixels[id.0].destroyed = false;
        }
    }
}

/// A wall is a reusable multi-hit barrier: the wall, not its pixels, tracks
/// health. While hearts remain, every covered pixel is revived after each
/// hit; at zero hearts the covered set is force-destroyed once and the wall
/// deactivates for good.
#[derive(Debug, Clone)]
pub struct Wall {
    covered: Vec<PixelId>,
    pub color_code: String,
    current_heart: u32,
    destroyed: bool,
}

impl Wall {
    pub fn new(covered: Vec<PixelId>, color_code: String, hearts: u32) -> Self {
        Self {
            covered,
            color_code,
            current_heart: hearts,
            destroyed: false,
        }
    }

    pub fn covers(&self, id: PixelId) -> bool {
        self.covered.contains(&id)
    }

    pub fn covered(&self) -> &[PixelId] {
        &self.covered
    }

    pub fn current_heart(&self) -> u32 {
        self.current_heart
    }

    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn on_pixel_destroyed(&mut self, pixels: &mut [Pixel]) {
        self.current_heart = self.current_heart.saturating_sub(1);
        if self.current_heart == 0 {
            for &id in &self.covered {
                pixels[id.0].destroyed = true;
            }
            self.destroyed = true;
            return;
        }
        for &id in &self.covered {
            pixels[id.0].destroyed = false;
        }
    }
}

/// A key is a single-use gate: the first matching destruction latches it,
/// consumes the whole covered set and reports collection exactly once.
#[derive(Debug, Clone)]
pub struct Key {
    covered: Vec<PixelId>,
    collected: bool,
}

impl Key {
    pub fn new(covered: Vec<PixelId>) -> Self {
        Self {
            covered,
            collected: false,
        }
    }

    pub fn covers(&self, id: PixelId) -> bool {
        self.covered.contains(&id)
    }

    pub fn covered(&self) -> &[PixelId] {
        &self.covered
    }

    pub fn collected(&self) -> bool {
        self.collected
    }

    /// Returns true only on the collecting call.
    pub(crate) fn on_pixel_destroyed(&mut self, pixels: &mut [Pixel]) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        for &id in &self.covered {
            pixels[id.0].destroyed = true;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn pixel_strip(count: usize) -> (Vec<Pixel>, Vec<PixelId>) {
        let pixels: Vec<Pixel> = (0..count)
            .map(|i| Pixel::new(i as i32, 0, Vec3::ZERO))
            .collect();
        let ids = (0..count).map(PixelId).collect();
        (pixels, ids)
    }

    #[test]
    fn pipe_consumes_tail_first_and_terminates_after_k_events() {
        let (mut pixels, ids) = pixel_strip(3);
        let mut pipe = Pipe::new(ids.clone(), "Blue".to_string(), true, 1.0);

        pipe.on_pixel_destroyed(&mut pixels);
        assert!(!pipe.destroyed());
        assert!(pixels[2].destroyed);
        assert!(!pixels[0].destroyed && !pixels[1].destroyed);

        pipe.on_pixel_destroyed(&mut pixels);
        assert!(!pipe.destroyed());
        assert!(pixels[1].destroyed && pixels[2].destroyed);
        assert!(!pixels[0].destroyed);

        pipe.on_pixel_destroyed(&mut pixels);
        assert!(pipe.destroyed());
        assert!(pixels.iter().all(|p| p.destroyed));

        // further events are no-ops
        pipe.on_pixel_destroyed(&mut pixels);
        assert_eq!(pipe.pixels_destroyed(), 3);
    }

    #[test]
    fn pipe_revives_prefix_hit_out_of_order() {
        let (mut pixels, ids) = pixel_strip(3);
        let mut pipe = Pipe::new(ids, "Blue".to_string(), true, 1.0);

        // A collector shot the head; the pipe still consumes from the tail
        // and the head comes back.
        pixels[0].destroyed = true;
        pipe.on_pixel_destroyed(&mut pixels);
        assert!(!pixels[0].destroyed);
        assert!(pixels[2].destroyed);
    }

    #[test]
    fn wall_absorbs_until_out_of_hearts() {
        let (mut pixels, ids) = pixel_strip(2);
        let mut wall = Wall::new(ids, "Gray".to_string(), 3);

        pixels[0].destroyed = true;
        wall.on_pixel_destroyed(&mut pixels);
        assert_eq!(wall.current_heart(), 2);
        assert!(!wall.destroyed());
        assert!(!pixels[0].destroyed && !pixels[1].destroyed);

        pixels[1].destroyed = true;
        wall.on_pixel_destroyed(&mut pixels);
        assert_eq!(wall.current_heart(), 1);
        assert!(!pixels[1].destroyed);

        pixels[0].destroyed = true;
        wall.on_pixel_destroyed(&mut pixels);
        assert_eq!(wall.current_heart(), 0);
        assert!(wall.destroyed());
        assert!(pixels.iter().all(|p| p.destroyed));
    }

    #[test]
    fn key_latches_once() {
        let (mut pixels, ids) = pixel_strip(2);
        let mut key = Key::new(ids);

        assert!(key.on_pixel_destroyed(&mut pixels));
        assert!(key.collected());
        assert!(pixels.iter().all(|p| p.destroyed));

        assert!(!key.on_pixel_destroyed(&mut pixels));
    }
}
