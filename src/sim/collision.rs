//! Segment geometry for terrain collision
//!
//! The terrain is a polyline, so every collision question reduces to
//! segment/segment intersection plus a reflection of the incoming velocity.
//! All functions here are total: out-of-range input yields `None`, never a
//! panic.

use glam::Vec2;

/// One span of the terrain polyline, left point first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub a: Vec2,
    pub b: Vec2,
}

/// Intersection point of segments a1-a2 and b1-b2, if any.
///
/// Endpoint contact counts as an intersection; parallel and degenerate
/// segments do not.
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let r = a2 - a1;
    let s = b2 - b1;

    let denom = r.perp_dot(s);
    if denom.abs() < 1e-6 {
        return None;
    }

    let qp = b1 - a1;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + r * t)
    } else {
        None
    }
}

/// Rotate a vector counter-clockwise by `angle` radians
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Reflect velocity off a surface: v' = v - 2(v.n)n
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_crossing_segments_intersect() {
        let hit = segment_intersection(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
        );
        let p = hit.expect("segments cross");
        assert!(p.x.abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_segments_miss() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, -1.0),
            Vec2::new(2.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_parallel_segments_miss() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_endpoint_contact_counts() {
        // Falling path ends exactly on the segment
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(5.0, 0.0),
        );
        let p = hit.expect("endpoint contact");
        assert!((p.x - 5.0).abs() < 1e-5);
        assert!(p.y.abs() < 1e-5);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_off_vertical_wall() {
        let v = reflect(Vec2::new(100.0, 20.0), Vec2::new(-1.0, 0.0));
        assert!((v.x + 100.0).abs() < 1e-4);
        assert!((v.y - 20.0).abs() < 1e-4);
    }
}
