// src/heightmap_data.rs
use bevy::math::{UVec2, Vec2, Vec3};
use bevy::prelude::*;
use image::GrayImage;
use std::sync::Arc;

use crate::building::core::TerrainSampler;

/// March step (world units) used before bisecting a ray hit.
const RAY_MARCH_STEP: f32 = 2.0;
/// Bisection passes once a ray crosses the surface.
const RAY_BISECT_STEPS: usize = 12;

/// Terrain height grid. `None` texels are holes: nothing to stand on.
#[derive(Resource, Clone)]
pub struct HeightField {
    /// Texel count in X and Z
    pub resolution: UVec2,
    /// Size of the whole field in world units (X,Z)
    pub size: Vec2,
    /// World-space XZ of the texel (0, 0)
    pub origin: Vec2,
    /// World meters per full normalized height (1.0)
    pub height_scale: f32,
    heights: Arc<Vec<Option<f32>>>, // row-major, normalized 0..1
}

impl HeightField {
    /// Build a field by evaluating `f` at every texel's world XZ.
    /// `f` returns a normalized height, or `None` for a hole.
    pub fn from_fn(
        resolution: UVec2,
        size: Vec2,
        height_scale: f32,
        f: impl Fn(Vec2) -> Option<f32>,
    ) -> Self {
        let resolution = resolution.max(UVec2::splat(2));
        let origin = -size * 0.5;
        let step = size / (resolution - UVec2::ONE).as_vec2();

        let mut heights = Vec::with_capacity((resolution.x * resolution.y) as usize);
        for j in 0..resolution.y {
            for i in 0..resolution.x {
                let world = origin + Vec2::new(i as f32, j as f32) * step;
                heights.push(f(world));
            }
        }

        Self {
            resolution,
            size,
            origin,
            height_scale,
            heights: Arc::new(heights),
        }
    }

    /// Load from a grayscale heightmap, centered on the world origin.
    /// Pixels at or below `hole_below` become holes.
    pub fn from_luma8(
        img: &GrayImage,
        size: Vec2,
        height_scale: f32,
        hole_below: Option<u8>,
    ) -> Self {
        let resolution = UVec2::new(img.width(), img.height()).max(UVec2::splat(2));
        let max_px = img.width().saturating_sub(1);
        let max_pz = img.height().saturating_sub(1);

        let mut heights = Vec::with_capacity((resolution.x * resolution.y) as usize);
        for j in 0..resolution.y {
            for i in 0..resolution.x {
                let v = img.get_pixel(i.min(max_px), j.min(max_pz))[0];
                let hole = hole_below.is_some_and(|cut| v <= cut);
                heights.push((!hole).then(|| v as f32 / 255.0));
            }
        }

        Self {
            resolution,
            size,
            origin: -size * 0.5,
            height_scale,
            heights: Arc::new(heights),
        }
    }

    /// World-space spacing between neighbouring texels.
    #[inline]
    pub fn texel_size(&self) -> Vec2 {
        self.size / (self.resolution - UVec2::ONE).as_vec2()
    }

    /// World height of a texel, `None` for holes or out-of-range indices.
    pub fn texel_height(&self, i: u32, j: u32) -> Option<f32> {
        if i >= self.resolution.x || j >= self.resolution.y {
            return None;
        }
        self.heights[(j * self.resolution.x + i) as usize].map(|h| h * self.height_scale)
    }

    /// Bilinear-sample the terrain height (world units) at (world_x, world_z).
    /// Returns None outside the field or when any contributing texel is a hole.
    pub fn sample_height(&self, world_x: f32, world_z: f32) -> Option<f32> {
        let lx = world_x - self.origin.x;
        let lz = world_z - self.origin.y;
        if lx < 0.0 || lz < 0.0 || lx > self.size.x || lz > self.size.y {
            return None;
        }

        let texel = self.texel_size();
        let px_f = lx / texel.x;
        let pz_f = lz / texel.y;

        let max_x = self.resolution.x - 1;
        let max_z = self.resolution.y - 1;
        let x0 = (px_f.floor() as u32).min(max_x);
        let z0 = (pz_f.floor() as u32).min(max_z);
        let x1 = (x0 + 1).min(max_x);
        let z1 = (z0 + 1).min(max_z);

        let dx = px_f - x0 as f32;
        let dz = pz_f - z0 as f32;

        let s00 = self.texel_height(x0, z0)?;
        let s10 = self.texel_height(x1, z0)?;
        let s01 = self.texel_height(x0, z1)?;
        let s11 = self.texel_height(x1, z1)?;

        let a = s00 * (1.0 - dx) + s10 * dx;
        let b = s01 * (1.0 - dx) + s11 * dx;
        Some(a * (1.0 - dz) + b * dz)
    }

    /// First ground intersection along a ray within `max_distance`.
    /// Marches in fixed steps, then bisects the crossing for a tight X/Z.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<Vec3> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let below = |p: Vec3| self.sample_height(p.x, p.z).is_some_and(|h| p.y <= h);

        let mut t_prev = 0.0;
        let mut t = 0.0;
        while t < max_distance {
            t = (t + RAY_MARCH_STEP).min(max_distance);
            if below(origin + dir * t) {
                // bisect between the last point above and the first below
                let mut t_low = t_prev;
                let mut t_high = t;
                for _ in 0..RAY_BISECT_STEPS {
                    let t_mid = (t_low + t_high) * 0.5;
                    if below(origin + dir * t_mid) {
                        t_high = t_mid;
                    } else {
                        t_low = t_mid;
                    }
                }
                let p = origin + dir * t_high;
                let y = self.sample_height(p.x, p.z)?;
                return Some(Vec3::new(p.x, y, p.z));
            }
            t_prev = t;
        }
        None
    }
}

impl TerrainSampler for HeightField {
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<Vec3> {
        let h = self.sample_height(origin.x, origin.z)?;
        let drop = origin.y - h;
        (drop >= 0.0 && drop <= max_distance).then(|| Vec3::new(origin.x, h, origin.z))
    }
}
