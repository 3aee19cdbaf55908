// src/building/placement/curve.rs
//! Anchor smoothing and evenly spaced slot walking for line placement.

use bevy::prelude::*;

/// Smallest slot step; keeps zero spacing on a zero-depth footprint finite.
pub const MIN_SLOT_STEP: f32 = 0.05;

/// Uniform Catmull-Rom point on the p1 -> p2 span.
pub fn catmull_rom_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Dense polyline through every anchor. The first and last anchors are
/// duplicated as outer control points so the curve ends on them exactly.
pub fn smooth_path(anchors: &[Vec3], resolution: u32) -> Vec<Vec3> {
    if anchors.len() < 2 {
        return anchors.to_vec();
    }
    let res = resolution.max(1);
    let n = anchors.len();
    let at = |i: isize| anchors[i.clamp(0, n as isize - 1) as usize];

    let mut out = Vec::with_capacity((n - 1) * res as usize + 1);
    for i in 0..(n - 1) as isize {
        let (p0, p1, p2, p3) = (at(i - 1), at(i), at(i + 1), at(i + 2));
        for s in 0..res {
            out.push(catmull_rom_point(p0, p1, p2, p3, s as f32 / res as f32));
        }
    }
    out.push(anchors[n - 1]);
    out
}

/// A point on the path with its unit direction of travel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSample {
    pub point: Vec3,
    pub tangent: Vec3,
}

/// Walk `path` by arc length, dropping a sample at `k * step + step / 2`
/// for k = 0, 1, ... while the path lasts.
pub fn walk_slots(path: &[Vec3], step: f32) -> Vec<PathSample> {
    let step = step.max(MIN_SLOT_STEP);
    let mut out = Vec::new();
    let mut travelled = 0.0;
    let mut target = step * 0.5;

    for seg in path.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        let len = a.distance(b);
        if len <= f32::EPSILON {
            continue;
        }
        let tangent = (b - a) / len;
        while target <= travelled + len {
            let t = (target - travelled) / len;
            out.push(PathSample { point: a.lerp(b, t), tangent });
            target += step;
        }
        travelled += len;
    }
    out
}

/// Total polyline length.
pub fn path_length(path: &[Vec3]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn two_anchors_give_a_straight_segment() {
        let a = Vec3::new(1.0, 0.0, 2.0);
        let b = Vec3::new(7.0, 3.0, -4.0);
        let path = smooth_path(&[a, b], 8);
        assert_eq!(path.first(), Some(&a));
        assert_eq!(path.last(), Some(&b));
        let dir = (b - a).normalize();
        for p in &path {
            let along = (*p - a).dot(dir);
            assert!((*p - (a + dir * along)).length() < 1e-4);
            assert!(along >= -1e-4 && along <= a.distance(b) + 1e-4);
        }
    }

    #[test]
    fn curve_passes_through_every_anchor() {
        let anchors = [Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0)];
        let path = smooth_path(&anchors, 5);
        assert_eq!(path.len(), 11);
        assert!(path[5].distance(anchors[1]) < 1e-5);
        assert_eq!(path[10], anchors[2]);
    }

    #[test]
    fn fewer_than_two_anchors_pass_through() {
        assert!(smooth_path(&[], 4).is_empty());
        assert_eq!(smooth_path(&[Vec3::X], 4), vec![Vec3::X]);
    }

    #[test]
    fn slots_are_depth_plus_spacing_apart() {
        let (depth, spacing) = (2.0, 1.5);
        let path = smooth_path(&[Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)], 10);
        let slots = walk_slots(&path, depth + spacing);
        assert_eq!(slots.len(), 6);
        assert!(close(slots[0].point.x, 1.75));
        for pair in slots.windows(2) {
            assert!(close(pair[0].point.distance(pair[1].point), depth + spacing));
            assert!(pair[0].tangent.distance(Vec3::X) < 1e-5);
        }
    }

    #[test]
    fn slot_walk_crosses_segment_boundaries() {
        let path = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 3.0)];
        let slots = walk_slots(&path, 1.0);
        assert_eq!(slots.len(), 4);
        assert!(slots[1].point.distance(Vec3::new(1.0, 0.0, 0.5)) < 1e-5);
        assert!(slots[1].tangent.distance(Vec3::Z) < 1e-5);
        assert!(close(path_length(&path), 4.0));
    }

    #[test]
    fn step_never_collapses_to_zero() {
        let path = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let slots = walk_slots(&path, 0.0);
        assert_eq!(slots.len(), (1.0 / MIN_SLOT_STEP).round() as usize);
    }
}
