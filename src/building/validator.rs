// src/building/validator.rs
//! Footprint validator: may a building occupy this pose?
//!
//! Two checks, in order: nothing solid from a placed building overlaps the
//! footprint box, and the terrain under a grid of footprint samples is present
//! everywhere and flat enough.

use bevy::prelude::*;

use super::core::{ColliderLayer, LayerMask, OccupancyQuery, PlacementPose, TerrainSampler};
use super::registry::BuildingTemplate;

/// Probe geometry and overlap box height used for every validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeSettings {
    /// Probes start this far above the candidate position.
    pub probe_height: f32,
    /// Max distance a probe travels down.
    pub probe_distance: f32,
    /// Height of the occupancy box (footprints carry no height).
    pub overlap_height: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self { probe_height: 10.0, probe_distance: 20.0, overlap_height: 4.0 }
    }
}

/// What a footprint check needs from a template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FootprintSpec {
    /// Width (local X) x depth (local Z)
    pub size: Vec2,
    pub grid_density: i32,
    pub max_height_delta: f32,
}

impl From<&BuildingTemplate> for FootprintSpec {
    fn from(t: &BuildingTemplate) -> Self {
        Self {
            size: t.footprint_size(),
            grid_density: t.sample_density() as i32,
            max_height_delta: t.max_height_delta,
        }
    }
}

/// Why a pose was refused. Expected outcome, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    /// A placed building's solid collider intersects the footprint box.
    Occupied { hits: usize },
    /// A terrain probe found nothing (ledge, hole, off the map).
    Unsupported { sample: Vec3 },
    /// No probe hit at all.
    NoTerrain,
    /// Height spread across the samples exceeds the template's tolerance.
    TooUneven { delta: f32, max: f32 },
}

/// Layers an occupancy query never considers: the ground itself and ghosts.
pub const VALIDATION_EXCLUDE: LayerMask =
    LayerMask::NONE.with(ColliderLayer::Terrain).with(ColliderLayer::Preview);

/// Normalized sample offsets in [-0.5, 0.5]^2, row-major.
/// A density of 1 or less yields the single center offset.
pub fn sample_offsets(grid_density: i32) -> Vec<Vec2> {
    let n = grid_density.max(1) as usize;
    if n == 1 {
        return vec![Vec2::ZERO];
    }
    let step = 1.0 / (n - 1) as f32;
    let mut out = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            out.push(Vec2::new(-0.5 + i as f32 * step, -0.5 + j as f32 * step));
        }
    }
    out
}

/// Full check with the reason for a refusal.
pub fn evaluate(
    pose: &PlacementPose,
    footprint: &FootprintSpec,
    probes: &ProbeSettings,
    terrain: &dyn TerrainSampler,
    occupancy: &dyn OccupancyQuery,
) -> Result<(), Rejection> {
    // 1) Overlap against placed buildings
    let half = Vec3::new(
        footprint.size.x * 0.5,
        probes.overlap_height * 0.5,
        footprint.size.y * 0.5,
    );
    let center = pose.position + Vec3::Y * half.y;
    let hits = occupancy
        .overlap_box(center, half, pose.rotation(), VALIDATION_EXCLUDE)
        .into_iter()
        .filter(|h| h.placed_building)
        .count();
    if hits > 0 {
        return Err(Rejection::Occupied { hits });
    }

    // 2) Terrain samples: any miss rejects
    let offsets = sample_offsets(footprint.grid_density);
    let mut heights = Vec::with_capacity(offsets.len());
    for offset in offsets {
        let local = offset * footprint.size;
        let origin = pose.position + pose.rotate_offset(local) + Vec3::Y * probes.probe_height;
        match terrain.probe_down(origin, probes.probe_distance) {
            Some(hit) => heights.push(hit.y),
            None => return Err(Rejection::Unsupported { sample: origin }),
        }
    }

    if heights.is_empty() {
        warn!("Footprint validator: no terrain hits at {:?}", pose.position);
        return Err(Rejection::NoTerrain);
    }

    // 3) Height spread
    let (lo, hi) = heights
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)));
    let delta = hi - lo;
    if delta > footprint.max_height_delta {
        return Err(Rejection::TooUneven { delta, max: footprint.max_height_delta });
    }

    Ok(())
}

/// Go / no-go for a pose.
pub fn can_place(
    pose: &PlacementPose,
    footprint: &FootprintSpec,
    probes: &ProbeSettings,
    terrain: &dyn TerrainSampler,
    occupancy: &dyn OccupancyQuery,
) -> bool {
    evaluate(pose, footprint, probes, terrain, occupancy).is_ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::building::occupancy::{ColliderMode, OccupancySnapshot, OrientedBox};

    /// Terrain backed by a closure over world XZ.
    pub(crate) struct FnTerrain<F: Fn(Vec2) -> Option<f32>>(pub F);

    impl<F: Fn(Vec2) -> Option<f32>> TerrainSampler for FnTerrain<F> {
        fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<Vec3> {
            let h = (self.0)(Vec2::new(origin.x, origin.z))?;
            (origin.y - h >= 0.0 && origin.y - h <= max_distance)
                .then(|| Vec3::new(origin.x, h, origin.z))
        }
    }

    pub(crate) fn flat() -> FnTerrain<impl Fn(Vec2) -> Option<f32>> {
        FnTerrain(|_: Vec2| Some(0.0_f32))
    }

    fn footprint(density: i32, max_delta: f32) -> FootprintSpec {
        FootprintSpec { size: Vec2::new(4.0, 6.0), grid_density: density, max_height_delta: max_delta }
    }

    fn pose(x: f32, z: f32) -> PlacementPose {
        PlacementPose::new(Vec3::new(x, 0.0, z), 0.0)
    }

    #[test]
    fn offsets_cover_the_unit_square() {
        assert_eq!(sample_offsets(1), vec![Vec2::ZERO]);
        assert_eq!(sample_offsets(0), vec![Vec2::ZERO]);
        assert_eq!(sample_offsets(-3), vec![Vec2::ZERO]);

        let o = sample_offsets(3);
        assert_eq!(o.len(), 9);
        assert_eq!(o[0], Vec2::new(-0.5, -0.5));
        assert_eq!(o[4], Vec2::ZERO);
        assert_eq!(o[8], Vec2::new(0.5, 0.5));
    }

    #[test]
    fn flat_empty_ground_accepts_every_density() {
        let empty = OccupancySnapshot::default();
        for density in 1..=6 {
            assert!(can_place(&pose(0.0, 0.0), &footprint(density, 0.0), &ProbeSettings::default(), &flat(), &empty));
        }
    }

    #[test]
    fn any_void_sample_rejects() {
        let empty = OccupancySnapshot::default();
        // one corner hangs over a hole
        let ledge = FnTerrain(|p: Vec2| (!(p.x > 1.9 && p.y > 2.9)).then_some(0.0_f32));
        let verdict = evaluate(&pose(0.0, 0.0), &footprint(2, 5.0), &ProbeSettings::default(), &ledge, &empty);
        assert!(matches!(verdict, Err(Rejection::Unsupported { .. })));

        // the center-only probe does not see that corner
        assert!(can_place(&pose(0.0, 0.0), &footprint(1, 5.0), &ProbeSettings::default(), &ledge, &empty));
    }

    #[test]
    fn height_spread_boundary_is_inclusive() {
        let empty = OccupancySnapshot::default();
        let h = 0.75;
        let step = FnTerrain(move |p: Vec2| Some(if p.x < 0.0 { 0.0_f32 } else { h }));

        assert!(can_place(&pose(0.0, 0.0), &footprint(2, h), &ProbeSettings::default(), &step, &empty));
        assert!(can_place(&pose(0.0, 0.0), &footprint(2, 1.0), &ProbeSettings::default(), &step, &empty));
        let verdict = evaluate(&pose(0.0, 0.0), &footprint(2, 0.5), &ProbeSettings::default(), &step, &empty);
        assert_eq!(verdict, Err(Rejection::TooUneven { delta: h, max: 0.5 }));
    }

    #[test]
    fn yaw_rotates_the_sample_grid() {
        let empty = OccupancySnapshot::default();
        // terrain only exists in a narrow strip along Z; 4 x 6 footprint fits unrotated
        let strip = FnTerrain(|p: Vec2| (p.x.abs() <= 2.5 && p.y.abs() <= 3.5).then_some(0.0_f32));
        let upright = PlacementPose::new(Vec3::ZERO, 0.0);
        let sideways = PlacementPose::new(Vec3::ZERO, 90.0);
        assert!(can_place(&upright, &footprint(3, 0.0), &ProbeSettings::default(), &strip, &empty));
        assert!(!can_place(&sideways, &footprint(3, 0.0), &ProbeSettings::default(), &strip, &empty));
    }

    #[test]
    fn placed_buildings_block_but_ghosts_do_not() {
        let mut occ = OccupancySnapshot::default();
        let shape = OrientedBox::new(Vec3::new(3.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 3.0), Quat::IDENTITY);
        occ.push(None, shape, ColliderLayer::Preview, ColliderMode::Probe);
        assert!(can_place(&pose(0.0, 0.0), &footprint(3, 0.0), &ProbeSettings::default(), &flat(), &occ));

        occ.push(None, shape, ColliderLayer::Building, ColliderMode::Solid);
        let verdict = evaluate(&pose(0.0, 0.0), &footprint(3, 0.0), &ProbeSettings::default(), &flat(), &occ);
        assert_eq!(verdict, Err(Rejection::Occupied { hits: 1 }));

        // side by side, faces touching
        assert!(can_place(&pose(-1.0, 0.0), &footprint(3, 0.0), &ProbeSettings::default(), &flat(), &occ));
    }

    #[test]
    fn terrain_far_below_the_probe_range_rejects() {
        let empty = OccupancySnapshot::default();
        let pit = FnTerrain(|_: Vec2| Some(-50.0_f32));
        assert!(!can_place(&pose(0.0, 0.0), &footprint(2, 1.0), &ProbeSettings::default(), &pit, &empty));
    }
}
