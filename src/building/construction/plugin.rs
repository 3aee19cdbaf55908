//! Construction wiring.
//! - Place/started/finished events
//! - Scene readiness observer + part decomposition
//! - Site spawn -> start -> advance -> finish, in that order every frame

use bevy::prelude::*;

use crate::building::model::{decompose_scene_models, mark_scene_spawned};
use crate::building::plugin::BuildingSet;

use super::components::{BuildingPlaced, ConstructionFinished, PlaceBuilding};
use super::systems::{
    advance_construction, finish_construction, spawn_placed_buildings, start_construction,
};

pub struct ConstructionPlugin;
impl Plugin for ConstructionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlaceBuilding>()
            .add_event::<BuildingPlaced>()
            .add_event::<ConstructionFinished>()
            .add_observer(mark_scene_spawned)
            .add_systems(
                Update,
                (
                    spawn_placed_buildings,
                    start_construction,
                    decompose_scene_models,
                    advance_construction,
                    finish_construction,
                )
                    .chain()
                    .in_set(BuildingSet::Construction),
            );
    }
}
