//! Destructible terrain height field
//!
//! The terrain is a polyline of (x, y) samples spaced at a fixed x step.
//! Permanent damage (craters) mutates the base samples; transient effects
//! (post-impact wobble) are time-bounded additive modifiers recomputed on
//! top of the base shape every update. Splitting the two lets many
//! short-lived wobbles stack additively while craters accumulate in
//! O(samples-in-radius) per explosion, independent of the modifier count.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use std::f32::consts::FRAC_PI_2;

use super::collision::{self, LineSegment};
use crate::consts::*;
use crate::events::ExplosionData;

/// A time-bounded additive deformation applied on top of the base shape.
/// Alive while `age <= lifetime`; contributes `func(x, sim_time)` to every
/// sample.
struct TerrainModifier {
    func: Box<dyn Fn(f32, f64) -> f32 + Send + Sync>,
    age: f32,
    lifetime: f32,
}

pub struct Terrain {
    max_depth: f32,
    max_width: f32,
    time: f64,
    /// Permanent shape; sample x coordinates are fixed after construction
    base_points: Vec<Vec2>,
    /// Current polyline: base plus live modifier contributions, fully derived
    points: Vec<Vec2>,
    modifiers: Vec<TerrainModifier>,
}

impl Terrain {
    /// Generate the standard terrain with small random roughness
    pub fn generate(rng: &mut Pcg32) -> Self {
        let mut base_points = Vec::new();
        let mut x = 0.0;
        while x < TERRAIN_MAX_WIDTH {
            base_points.push(Vec2::new(x, -rng.random_range(0.0..TERRAIN_ROUGHNESS)));
            x += TERRAIN_PRECISION;
        }
        Self::from_points(base_points)
    }

    /// Build a terrain from explicit samples.
    ///
    /// Panics if fewer than two samples are given or sample x coordinates
    /// are not strictly increasing - that is a construction bug, not a
    /// runtime condition.
    pub fn from_points(base_points: Vec<Vec2>) -> Self {
        assert!(
            base_points.len() >= 2,
            "terrain needs at least two samples, got {}",
            base_points.len()
        );
        for w in base_points.windows(2) {
            assert!(
                w[0].x < w[1].x,
                "terrain sample x must be strictly increasing ({} then {})",
                w[0].x,
                w[1].x
            );
        }

        let max_width = base_points[base_points.len() - 1].x;
        let points = base_points.clone();
        Self {
            max_depth: TERRAIN_MAX_DEPTH,
            max_width,
            time: 0.0,
            base_points,
            points,
            modifiers: Vec::new(),
        }
    }

    pub fn max_depth(&self) -> f32 {
        self.max_depth
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    /// Current polyline, read-only (for rendering and tests)
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Linearly interpolated height at `x`. Outside the sampled domain this
    /// returns the "far below ground" sentinel so callers treat it as a
    /// bottomless drop.
    pub fn height_at(&self, x: f32) -> f32 {
        for i in 0..self.points.len() {
            let p1 = self.points[i];
            if x < p1.x {
                if i == 0 {
                    return HEIGHT_OUT_OF_DOMAIN;
                }
                let p2 = self.points[i - 1];
                let a = (x - p1.x) / (p2.x - p1.x);
                return p1.y + (p2.y - p1.y) * a;
            }
        }
        HEIGHT_OUT_OF_DOMAIN
    }

    /// Slope angle of the segment ending at the first sample right of `x`;
    /// 0 outside the sampled domain.
    pub fn angle_at(&self, x: f32) -> f32 {
        for i in 0..self.points.len() {
            let p1 = self.points[i];
            if x < p1.x {
                if i == 0 {
                    return 0.0;
                }
                let p2 = self.points[i - 1];
                return ((p2.y - p1.y) / (p2.x - p1.x)).atan();
            }
        }
        0.0
    }

    /// Every current segment whose span overlaps `[min(x1,x2), max(x1,x2)]`,
    /// left to right, reversed when the caller's range runs high-to-low.
    ///
    /// The overlap test is inclusive: a segment endpoint exactly at a range
    /// bound, or a segment strictly inside a wide range, is still a
    /// collision candidate.
    pub fn segments_in_range(&self, x1: f32, x2: f32) -> Vec<LineSegment> {
        let reverse = x1 > x2;
        let (lo, hi) = if reverse { (x2, x1) } else { (x1, x2) };

        let mut segments = Vec::new();
        for w in self.points.windows(2) {
            if w[1].x >= lo && w[0].x <= hi {
                segments.push(LineSegment { a: w[0], b: w[1] });
            }
        }

        if reverse {
            segments.reverse();
        }
        segments
    }

    /// First intersection of the travel path p1->p2 with the current
    /// polyline. Candidate segments are tried in path order.
    pub fn intersect(&self, p1: Vec2, p2: Vec2) -> Option<Vec2> {
        for s in self.segments_in_range(p1.x, p2.x) {
            if let Some(hit) = collision::segment_intersection(s.a, s.b, p1, p2) {
                return Some(hit);
            }
        }
        None
    }

    /// Recompute the current polyline from the base shape and live
    /// modifiers: evict modifiers past their lifetime, age the rest by `dt`
    /// and sum their contributions at `t`.
    pub fn update(&mut self, t: f64, dt: f32) {
        self.time = t;
        self.points.clone_from(&self.base_points);

        self.modifiers.retain(|m| m.age <= m.lifetime);

        for m in &mut self.modifiers {
            m.age += dt;
            for p in &mut self.points {
                p.y += (m.func)(p.x, t);
            }
        }
    }

    /// Enqueue a deformation modifier; the oldest is evicted first when the
    /// cap is exceeded (FIFO bound, not importance-based).
    pub fn add_modifier(
        &mut self,
        func: impl Fn(f32, f64) -> f32 + Send + Sync + 'static,
        lifetime: f32,
    ) {
        while self.modifiers.len() >= MAX_TERRAIN_MODIFIERS {
            self.modifiers.remove(0);
        }
        self.modifiers.push(TerrainModifier {
            func: Box::new(func),
            age: 0.0,
            lifetime,
        });
    }

    /// Damped post-impact oscillation: cosine in time with exponential
    /// decay, exponential falloff with distance from the impact x.
    pub fn wobble(&mut self, x_at_impact: f32, amplitude: f32) {
        let start = self.time;
        self.add_modifier(
            move |x, t| {
                let dt = (t - start) as f32;
                let r = amplitude * (WOBBLE_FREQUENCY * dt + FRAC_PI_2).cos();
                let mt = (-WOBBLE_TIME_DECAY * dt).exp();
                let mx = (-(x - x_at_impact).abs() / WOBBLE_DISTANCE_DECAY).exp();
                r * mx * mt
            },
            WOBBLE_LIFETIME,
        );
    }

    /// Permanently lower every base sample within `radius` of `pos` with a
    /// half-cosine radial falloff, scaled by `depth_modifier` and tapering
    /// off as the ground approaches `max_depth`. Mutates the base shape, so
    /// craters persist independent of modifiers.
    pub fn deform(&mut self, pos: Vec2, radius: f32, depth_modifier: f32) {
        for p in &mut self.base_points {
            let distance = pos.distance(*p);
            if distance < radius {
                p.y -= 0.1
                    * radius
                    * depth_modifier
                    * (FRAC_PI_2 * (distance / radius)).cos()
                    * (1.0 - p.y / self.max_depth);

                if p.y < self.max_depth {
                    p.y = self.max_depth;
                }
            }
        }
    }

    /// Terrain's explosion response: a crater, plus a settling wobble when
    /// the blast went off near the ground relative to its radius. Zero
    /// radius detonations are cosmetic and leave no mark.
    pub fn on_explosion(&mut self, e: &ExplosionData) {
        if e.radius == 0.0 {
            return;
        }

        self.deform(e.position, e.radius, e.terrain_damage_modifier);

        let wobble_amount = WOBBLE_BASE_AMPLITUDE * e.terrain_wobble_modifier;
        if (e.position.y - self.height_at(e.position.x)) / e.radius < 1.0 {
            self.wobble(e.position.x, wobble_amount);
        }
    }
}
