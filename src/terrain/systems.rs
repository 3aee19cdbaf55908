use bevy::math::{UVec2, Vec2};
use bevy::prelude::*;
use bevy::render::mesh::{Indices, Mesh};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::PrimitiveTopology;

use crate::building::core::ColliderLayer;
use crate::heightmap_data::HeightField;
use crate::terrain::components::Terrain;

/// Where the terrain comes from and how big it is.
#[derive(Resource, Clone, Debug)]
pub struct TerrainSettings {
    /// Grayscale heightmap, relative to the working directory.
    pub heightmap_path: String,
    /// World size (X, Z), centered on the origin.
    pub world_size: Vec2,
    pub height_scale: f32,
    /// Luminance at or below which a pixel is a hole.
    pub hole_below: Option<u8>,
    /// Quads per axis of the rendered mesh.
    pub mesh_resolution: u32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            heightmap_path: "assets/heightmaps/terrain.png".to_string(),
            world_size: Vec2::splat(512.0),
            height_scale: 40.0,
            hole_below: Some(2),
            mesh_resolution: 256,
        }
    }
}

/// 1) Height field from the heightmap; rolling hills with a chasm when the
///    image is not there.
pub fn load_height_field(mut commands: Commands, settings: Res<TerrainSettings>) {
    let field = match image::open(&settings.heightmap_path) {
        Ok(img) => {
            let luma = img.to_luma8();
            info!(
                "Terrain: loaded '{}' ({}x{})",
                settings.heightmap_path,
                luma.width(),
                luma.height()
            );
            HeightField::from_luma8(&luma, settings.world_size, settings.height_scale, settings.hole_below)
        }
        Err(e) => {
            warn!(
                "Terrain: could not open '{}' ({e}); using procedural terrain",
                settings.heightmap_path
            );
            procedural_field(&settings)
        }
    };
    commands.insert_resource(field);
}

/// Rolling hills crossed by a winding chasm of holes.
pub fn procedural_field(settings: &TerrainSettings) -> HeightField {
    HeightField::from_fn(UVec2::splat(257), settings.world_size, settings.height_scale, |p| {
        let chasm = p.y - (60.0 + 18.0 * (p.x * 0.02).sin());
        if chasm.abs() < 7.0 {
            return None;
        }
        let hills = 0.12 * (p.x * 0.015).sin() * (p.y * 0.012).cos()
            + 0.04 * (p.x * 0.05 + p.y * 0.035).sin();
        Some(0.3 + hills)
    })
}

/// 2) Spawn the terrain mesh.
pub fn spawn_terrain_mesh(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<TerrainSettings>,
    field: Option<Res<HeightField>>,
) {
    let Some(field) = field else {
        error!("Terrain: no height field; nothing to spawn");
        return;
    };

    let mesh = build_terrain_mesh(&field, settings.mesh_resolution);
    commands.spawn((
        Name::new("Terrain"),
        Terrain,
        ColliderLayer::Terrain,
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.36, 0.5, 0.28),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::IDENTITY,
    ));
}

/// Build a grid mesh over the whole field. Triangles touching a hole are
/// left out so voids are visible.
pub fn build_terrain_mesh(field: &HeightField, resolution: u32) -> Mesh {
    let res = resolution.max(1);
    let verts = res + 1;
    let step = field.size / res as f32;
    // keep the outer ring inside the field despite float error
    let inset = |v: f32, max: f32| v.min(max - 1e-3);

    // 1) Positions, UVs, hole flags
    let mut positions = Vec::with_capacity((verts * verts) as usize);
    let mut uvs = Vec::with_capacity((verts * verts) as usize);
    let mut solid = Vec::with_capacity((verts * verts) as usize);
    for j in 0..verts {
        for i in 0..verts {
            let x = field.origin.x + inset(i as f32 * step.x, field.size.x);
            let z = field.origin.y + inset(j as f32 * step.y, field.size.y);
            let h = field.sample_height(x, z);
            positions.push([x, h.unwrap_or(0.0), z]);
            uvs.push([i as f32 / res as f32, j as f32 / res as f32]);
            solid.push(h.is_some());
        }
    }

    // 2) Normals from neighbouring heights
    let height_at = |i: u32, j: u32| positions[(j.min(res) * verts + i.min(res)) as usize][1];
    let mut normals = Vec::with_capacity(positions.len());
    for j in 0..verts {
        for i in 0..verts {
            let dx = height_at(i + 1, j) - height_at(i.saturating_sub(1), j);
            let dz = height_at(i, j + 1) - height_at(i, j.saturating_sub(1));
            let n = Vec3::new(-dx / (2.0 * step.x), 1.0, -dz / (2.0 * step.y)).normalize();
            normals.push(n.to_array());
        }
    }

    // 3) Indices, skipping quads with a hole corner
    let mut indices = Vec::with_capacity((res * res * 6) as usize);
    for j in 0..res {
        for i in 0..res {
            let a = j * verts + i;
            let c = a + verts;
            if [a, a + 1, c, c + 1].iter().all(|&k| solid[k as usize]) {
                indices.extend_from_slice(&[a, c, a + 1, a + 1, c, c + 1]);
            }
        }
    }

    // 4) Assemble the mesh
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
