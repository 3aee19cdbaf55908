use bevy::prelude::*;

mod setup;
mod input;
mod actions;
mod state;
mod ui;
mod heightmap_data;
mod terrain;
mod building;

// re-export the bits we actually need in main
use actions::ActionState;
use building::plugin::BuildingSet;
use building::BuildingStackPlugin;
use input::{camera_controller, cursor_ray_system, input_mapping_system, pause_toggle_system, CursorHit};
use state::GameState;
use ui::{spawn_pause_overlay, despawn_pause_overlay, UiPlugin};
use terrain::TerrainPlugin;

fn main() {
    App::new()
        // core engine plugins
        .add_plugins(DefaultPlugins)
        // domain plugins
        .add_plugins(TerrainPlugin)        // height field + terrain mesh
        .add_plugins(BuildingStackPlugin)  // templates, placement, construction
        .add_plugins(UiPlugin)             // toolbar, status, pointer-over-UI
        // init resources & game-state
        .init_resource::<ActionState>()
        .init_resource::<CursorHit>()
        .init_state::<GameState>()
        // camera, lights
        .add_systems(Startup, setup::setup)
        // pause-menu UI
        .add_systems(OnEnter(GameState::Paused), spawn_pause_overlay)
        .add_systems(OnExit(GameState::Paused), despawn_pause_overlay)
        // input + camera + cursor ray each frame, ahead of placement
        .add_systems(Update, pause_toggle_system)
        .add_systems(
            Update,
            (input_mapping_system, camera_controller, cursor_ray_system)
                .chain()
                .in_set(BuildingSet::Input),
        )
        .run();
}
