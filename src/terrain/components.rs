// src/terrain/components.rs
use bevy::prelude::*;

/// Marker for the terrain mesh entity.
#[derive(Component)]
pub struct Terrain;
