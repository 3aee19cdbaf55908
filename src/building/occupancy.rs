// src/building/occupancy.rs
//! Box colliders on entities and the per-tick snapshot that answers overlap queries.

use bevy::prelude::*;

use super::core::{ColliderHit, ColliderLayer, LayerMask, OccupancyQuery};

/// Faces closer than this are treated as touching, not overlapping.
const TOUCH_TOLERANCE: f32 = 1e-3;

/// Local-space box collider. Pair with `ColliderLayer` and `ColliderMode`.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct BoxCollider {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl BoxCollider {
    /// Footprint box standing on the origin: `size` is width x depth.
    pub fn footprint(size: Vec2, height: f32) -> Self {
        Self {
            center: Vec3::Y * height * 0.5,
            half_extents: Vec3::new(size.x * 0.5, height * 0.5, size.y * 0.5),
        }
    }
}

/// Solid colliders block placement; probes are ignored by overlap queries.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColliderMode {
    #[default]
    Solid,
    Probe,
}

/// World-space box rotated about +Y only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Radians about +Y
    pub yaw: f32,
}

impl OrientedBox {
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
        Self { center, half_extents: half_extents.abs(), yaw }
    }

    fn axes_xz(&self) -> [Vec2; 2] {
        let (s, c) = self.yaw.sin_cos();
        // local +X and +Z after a yaw about +Y, projected to (x, z)
        [Vec2::new(c, -s), Vec2::new(s, c)]
    }

    fn radius_on(&self, axis: Vec2) -> f32 {
        let [ux, uz] = self.axes_xz();
        self.half_extents.x * ux.dot(axis).abs() + self.half_extents.z * uz.dot(axis).abs()
    }

    /// Separating-axis test: vertical interval, then the four XZ face normals.
    pub fn overlaps(&self, other: &OrientedBox) -> bool {
        let dy = (self.center.y - other.center.y).abs();
        if dy >= self.half_extents.y + other.half_extents.y - TOUCH_TOLERANCE {
            return false;
        }

        let d = Vec2::new(other.center.x - self.center.x, other.center.z - self.center.z);
        let [a0, a1] = self.axes_xz();
        let [b0, b1] = other.axes_xz();
        for axis in [a0, a1, b0, b1] {
            let reach = self.radius_on(axis) + other.radius_on(axis);
            if d.dot(axis).abs() >= reach - TOUCH_TOLERANCE {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug)]
struct SnapshotEntry {
    shape: OrientedBox,
    entity: Option<Entity>,
    layer: ColliderLayer,
    mode: ColliderMode,
}

/// Colliders captured once per tick; read-only during validation.
#[derive(Default, Clone, Debug)]
pub struct OccupancySnapshot {
    entries: Vec<SnapshotEntry>,
}

impl OccupancySnapshot {
    pub fn push(
        &mut self,
        entity: Option<Entity>,
        shape: OrientedBox,
        layer: ColliderLayer,
        mode: ColliderMode,
    ) {
        self.entries.push(SnapshotEntry { shape, entity, layer, mode });
    }

    /// Capture a collider from its entity's global transform.
    pub fn push_collider(
        &mut self,
        entity: Entity,
        collider: &BoxCollider,
        layer: ColliderLayer,
        mode: ColliderMode,
        global: &GlobalTransform,
    ) {
        let (scale, rotation, _) = global.to_scale_rotation_translation();
        let center = global.transform_point(collider.center);
        let shape = OrientedBox::new(center, collider.half_extents * scale, rotation);
        self.push(Some(entity), shape, layer, mode);
    }
}

impl OccupancyQuery for OccupancySnapshot {
    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        exclude: LayerMask,
    ) -> Vec<ColliderHit> {
        let query = OrientedBox::new(center, half_extents, rotation);
        self.entries
            .iter()
            .filter(|e| e.mode == ColliderMode::Solid && !exclude.contains(e.layer))
            .filter(|e| e.shape.overlaps(&query))
            .map(|e| ColliderHit {
                entity: e.entity,
                layer: e.layer,
                placed_building: e.layer == ColliderLayer::Building,
            })
            .collect()
    }
}
