// src/building/plugin.rs
use bevy::prelude::*;

use crate::building::construction::ConstructionPlugin;
use crate::building::placement::PlacementPlugin;
use crate::building::registry::BuildingRegistryAssetPlugin;
use crate::state::GameState;

/// Frame order for everything building-related.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildingSet {
    /// Host input: actions, cursor ray, pointer-over-UI.
    Input,
    /// Session requests and the placement tick.
    Session,
    /// Ghost entities follow the session.
    Preview,
    /// Committed buildings spawn and rise.
    Construction,
}

pub struct BuildingStackPlugin;
impl Plugin for BuildingStackPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                BuildingSet::Input,
                BuildingSet::Session,
                BuildingSet::Preview,
                BuildingSet::Construction,
            )
                .chain()
                .run_if(in_state(GameState::Running)),
        )
        .add_plugins(BuildingRegistryAssetPlugin) // templates asset + loader
        .add_plugins(PlacementPlugin)             // session, modes, ghosts
        .add_plugins(ConstructionPlugin);         // sites, reveal, final swap
    }
}
