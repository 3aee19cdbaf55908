// src/building/core.rs
//! Core types/traits shared by validation, placement and construction.
//! Keep this file dependency-light; the collaborator traits here are what the
//! validator and the placement modes see of the world.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------- Poses ----------

/// Where a building sits: a point on the ground plus yaw in degrees, [0, 360).
/// Buildings only ever turn about +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPose {
    pub position: Vec3,
    pub yaw_deg: f32,
}

impl PlacementPose {
    pub fn new(position: Vec3, yaw_deg: f32) -> Self {
        Self { position, yaw_deg: wrap_degrees(yaw_deg) }
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw_deg.to_radians())
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation())
    }

    /// Rotate a local XZ offset by this pose's yaw (world-space, y = 0).
    #[inline]
    pub fn rotate_offset(&self, offset: Vec2) -> Vec3 {
        self.rotation() * Vec3::new(offset.x, 0.0, offset.y)
    }
}

/// Wrap any angle in degrees into [0, 360).
pub fn wrap_degrees(deg: f32) -> f32 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360
    if w >= 360.0 { 0.0 } else { w }
}

/// Yaw (degrees) that turns local +Z onto `dir` (XZ only).
pub fn yaw_towards(dir: Vec3) -> f32 {
    wrap_degrees(dir.x.atan2(dir.z).to_degrees())
}

// ---------- Collider layers ----------

/// Which layer a collider lives on.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderLayer {
    Terrain,
    Building,
    Preview,
}

impl ColliderLayer {
    #[inline]
    pub const fn bit(self) -> u32 {
        match self {
            ColliderLayer::Terrain => 1 << 0,
            ColliderLayer::Building => 1 << 1,
            ColliderLayer::Preview => 1 << 2,
        }
    }
}

/// Bitmask of collider layers (used to exclude layers from a query).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);

    pub const fn with(self, layer: ColliderLayer) -> Self {
        Self(self.0 | layer.bit())
    }

    pub const fn contains(self, layer: ColliderLayer) -> bool {
        (self.0 & layer.bit()) != 0
    }
}

// ---------- World queries ----------

/// One collider returned by an overlap query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderHit {
    pub entity: Option<Entity>,
    pub layer: ColliderLayer,
    /// True when the collider belongs to a committed building.
    pub placed_building: bool,
}

/// Straight-down terrain probe (required).
pub trait TerrainSampler {
    /// Cast down from `origin`; first surface hit within `max_distance`, if any.
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// Directionless box overlap against solid colliders.
pub trait OccupancyQuery {
    fn overlap_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        exclude: LayerMask,
    ) -> Vec<ColliderHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_into_range() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!(wrap_degrees(-1e-6) < 360.0);
    }

    #[test]
    fn yaw_turns_local_z_onto_direction() {
        let yaw = yaw_towards(Vec3::X);
        assert!((yaw - 90.0).abs() < 1e-4);
        let pose = PlacementPose::new(Vec3::ZERO, yaw);
        let fwd = pose.rotate_offset(Vec2::new(0.0, 1.0));
        assert!(fwd.distance(Vec3::X) < 1e-5);
    }

    #[test]
    fn layer_mask_membership() {
        let mask = LayerMask::NONE.with(ColliderLayer::Terrain).with(ColliderLayer::Preview);
        assert!(mask.contains(ColliderLayer::Terrain));
        assert!(mask.contains(ColliderLayer::Preview));
        assert!(!mask.contains(ColliderLayer::Building));
    }
}
