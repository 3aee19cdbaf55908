use bevy::prelude::*;

use crate::terrain::systems::{load_height_field, spawn_terrain_mesh, TerrainSettings};

/// Startup ordering so the mesh (and anything else) waits for the height field.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TerrainStartupSet {
    Load,  // height field resource
    Spawn, // entities that read it
}

pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TerrainSettings>()
            .configure_sets(
                Startup,
                (
                    TerrainStartupSet::Load,
                    TerrainStartupSet::Spawn.after(TerrainStartupSet::Load),
                ),
            )
            // Heightmap (or the procedural fallback) once at startup
            .add_systems(Startup, load_height_field.in_set(TerrainStartupSet::Load))
            .add_systems(Startup, spawn_terrain_mesh.in_set(TerrainStartupSet::Spawn));
    }
}
