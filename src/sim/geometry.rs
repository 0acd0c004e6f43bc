//! Segment geometry for blades, walls and bodies
//!
//! Blades and walls are plain line segments; combatants are circles. Every
//! collision question in the duel reduces to the helpers in this file.

use glam::Vec2;

use crate::normalize_angle;

/// Denominators below this are treated as parallel segments
const PARALLEL_EPSILON: f32 = 1e-6;

/// Angle of the direction from `a` to `b`
#[inline]
pub fn angle_to(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}

/// Unit vector from `from` toward `to`, or `fallback` when they coincide
pub fn direction_or(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    let d = to - from;
    if d.length_squared() < PARALLEL_EPSILON {
        fallback
    } else {
        d.normalize()
    }
}

/// Intersection point of segments `p0→p1` and `p2→p3`
///
/// Parallel, collinear and zero-length segments report no intersection
/// instead of dividing by zero.
pub fn segment_intersection(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Option<Vec2> {
    let s1 = p1 - p0;
    let s2 = p3 - p2;
    let denom = -s2.x * s1.y + s1.x * s2.y;
    if denom.abs() < PARALLEL_EPSILON || !denom.is_finite() {
        return None;
    }

    let s = (-s1.y * (p0.x - p2.x) + s1.x * (p0.y - p2.y)) / denom;
    let t = (s2.x * (p0.y - p2.y) - s2.y * (p0.x - p2.x)) / denom;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(p0 + s1 * t)
    } else {
        None
    }
}

/// Shortest distance from point `p` to segment `v→w`
pub fn distance_to_segment(p: Vec2, v: Vec2, w: Vec2) -> f32 {
    let line_vec = w - v;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq < PARALLEL_EPSILON {
        return p.distance(v); // Degenerate segment
    }

    let t = ((p - v).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    p.distance(v + line_vec * t)
}

/// Predict whether a blade heading along `dir` from `p1` threatens `target`
///
/// The target must sit within ~86° of the blade direction and within
/// `radius` of the blade segment.
pub fn blade_threatens(p1: Vec2, p2: Vec2, dir: Vec2, target: Vec2, radius: f32) -> bool {
    let angle_diff = normalize_angle(angle_to(p1, target) - dir.y.atan2(dir.x)).abs();
    if angle_diff > 1.5 {
        return false;
    }
    distance_to_segment(target, p1, p2) < radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_segments_intersect() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        );
        let p = hit.expect("segments cross");
        assert!((p - Vec2::new(5.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_disjoint_segments_miss() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(5.0, -1.0),
            Vec2::new(5.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_parallel_and_degenerate_segments_miss() {
        // Parallel
        assert!(
            segment_intersection(
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(10.0, 1.0),
            )
            .is_none()
        );
        // Collinear and overlapping
        assert!(
            segment_intersection(
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(5.0, 0.0),
                Vec2::new(15.0, 0.0),
            )
            .is_none()
        );
        // Zero length
        assert!(
            segment_intersection(
                Vec2::new(3.0, 3.0),
                Vec2::new(3.0, 3.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(6.0, 6.0),
            )
            .is_none()
        );
    }

    #[test]
    fn test_distance_to_segment() {
        let v = Vec2::new(0.0, 0.0);
        let w = Vec2::new(10.0, 0.0);
        assert!((distance_to_segment(Vec2::new(5.0, 3.0), v, w) - 3.0).abs() < 1e-5);
        // Past the end clamps to the endpoint
        assert!((distance_to_segment(Vec2::new(13.0, 4.0), v, w) - 5.0).abs() < 1e-5);
        // Degenerate segment falls back to point distance
        assert!((distance_to_segment(Vec2::new(3.0, 4.0), v, v) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_blade_threatens_respects_facing() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(230.0, 0.0);
        let dir = Vec2::X;
        assert!(blade_threatens(p1, p2, dir, Vec2::new(150.0, 40.0), 100.0));
        // Behind the blade
        assert!(!blade_threatens(p1, p2, dir, Vec2::new(-30.0, 0.0), 100.0));
        // In front but too far off the segment
        assert!(!blade_threatens(p1, p2, dir, Vec2::new(150.0, 140.0), 100.0));
    }

    #[test]
    fn test_direction_or_fallback() {
        let fallback = Vec2::Y;
        assert_eq!(direction_or(Vec2::ONE, Vec2::ONE, fallback), fallback);
        let d = direction_or(Vec2::ZERO, Vec2::new(3.0, 4.0), fallback);
        assert!((d - Vec2::new(0.6, 0.8)).length() < 1e-5);
    }
}
