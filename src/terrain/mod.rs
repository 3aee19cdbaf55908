mod components;
mod plugin;
mod systems;

pub use components::Terrain;
pub use plugin::{TerrainPlugin, TerrainStartupSet};
pub use systems::{build_terrain_mesh, TerrainSettings};
