//! Arc-length paths and the movers that ride them.
//!
//! A path is a polyline sampled by normalized arc length, so a mover's
//! progress is a single `tf` in `[0, 1]` regardless of how many corners the
//! path has. The orbit around a painting is the closed rectangle path.

use glam::Vec3;

/// One point on a path: where, which way, and which way is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Vec3,
    pub tangent: Vec3,
    pub up: Vec3,
}

/// A polyline with precomputed cumulative segment lengths. Closed paths
/// duplicate the first point at the end internally, so sampling is uniform
/// over one flat list of segments.
#[derive(Debug, Clone)]
pub struct CachedPath {
    points: Vec<Vec3>,
    cumulative: Vec<f32>,
    total: f32,
}

impl CachedPath {
    pub fn new(mut points: Vec<Vec3>, closed: bool) -> Self {
        assert!(points.len() >= 2, "a path needs at least two points");
        if closed {
            points.push(points[0]);
        }
        let mut cumulative = Vec::with_capacity(points.len());
        cumulative.push(0.0);
        let mut total = 0.0;
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }
        Self {
            points,
            cumulative,
            total,
        }
    }

    /// The closed rectangular orbit around a painting centered at `center`.
    /// Starts at the bottom-left corner; the bottom edge runs in +X, so a
    /// mover's initial travel reads as left-to-right.
    pub fn rectangle(center: Vec3, half_width: f32, half_depth: f32) -> Self {
        let bl = center + Vec3::new(-half_width, 0.0, -half_depth);
        let br = center + Vec3::new(half_width, 0.0, -half_depth);
        let tr = center + Vec3::new(half_width, 0.0, half_depth);
        let tl = center + Vec3::new(-half_width, 0.0, half_depth);
        Self::new(vec![bl, br, tr, tl], true)
    }

    pub fn total_distance(&self) -> f32 {
        self.total
    }

    /// Samples the path at normalized arc length `tf`, clamped to `[0, 1]`.
    pub fn sample(&self, tf: f32) -> PathSample {
        let distance = tf.clamp(0.0, 1.0) * self.total;
        let last_segment = self.points.len() - 2;
        let idx = self
            .cumulative
            .partition_point(|&c| c <= distance)
            .saturating_sub(1)
            .min(last_segment);
        let a = self.points[idx];
        let b = self.points[idx + 1];
        let segment_len = self.cumulative[idx + 1] - self.cumulative[idx];
        let local = if segment_len > 0.0 {
            (distance - self.cumulative[idx]) / segment_len
        } else {
            0.0
        };
        PathSample {
            position: a.lerp(b, local),
            tangent: (b - a).normalize_or_zero(),
            up: Vec3::Y,
        }
    }
}

/// What happens to a mover at the ends of its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementType {
    Clamp,
    Loop,
    PingPong,
}

/// Advances a `tf` along a [`CachedPath`] at constant world speed. The
/// reported tangent follows the travel direction, so a ping-ponging mover's
/// tangent flips when it bounces.
#[derive(Debug, Clone)]
pub struct PathMover {
    path: CachedPath,
    pub speed: f32,
    pub movement_type: MovementType,
    tf: f32,
    direction: f32,
}

impl PathMover {
    pub fn new(path: CachedPath, speed: f32, movement_type: MovementType) -> Self {
        Self {
            path,
            speed,
            movement_type,
            tf: 0.0,
            direction: 1.0,
        }
    }

    pub fn tf(&self) -> f32 {
        self.tf
    }

    pub fn set_tf(&mut self, tf: f32) {
        self.tf = tf.clamp(0.0, 1.0);
    }

    pub fn path(&self) -> &CachedPath {
        &self.path
    }

    pub fn advance(&mut self, dt: f32) {
        let total = self.path.total_distance();
        if total <= 0.0 {
            return;
        }
        self.tf += self.speed * dt / total * self.direction;
        match self.movement_type {
            MovementType::Clamp => {
                self.tf = self.tf.clamp(0.0, 1.0);
            }
            MovementType::Loop => {
                self.tf = self.tf.rem_euclid(1.0);
            }
            MovementType::PingPong => {
                // reflect until back in range; a huge dt may bounce more
                // than once
                while self.tf > 1.0 || self.tf < 0.0 {
                    if self.tf > 1.0 {
                        self.tf = 2.0 - self.tf;
                    } else {
                        self.tf = -self.tf;
                    }
                    self.direction = -self.direction;
                }
            }
        }
    }

    pub fn sample(&self) -> PathSample {
        let sample = self.path.sample(self.tf);
        PathSample {
            tangent: sample.tangent * self.direction,
            ..sample
        }
    }
}
