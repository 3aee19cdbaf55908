//! Placement wiring.
//! - Settings, session, preview frame/pool resources
//! - Select / cancel / toggle / line-adjust events
//! - Session tick, then ghost sync + tint + path gizmos

use bevy::prelude::*;

use crate::building::plugin::BuildingSet;

use super::line::LineAdjust;
use super::preview::{draw_line_path, sync_preview_pool, tint_ghosts, PreviewFrame, PreviewMaterials, PreviewPool};
use super::session::PlacementSession;
use super::settings::PlacementSettings;
use super::systems::{
    handle_session_requests, run_placement_session, CancelPlacement, SelectTemplate,
    TogglePlacementKind,
};

pub struct PlacementPlugin;
impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlacementSettings>()
            .init_resource::<PlacementSession>()
            .init_resource::<PreviewFrame>()
            .init_resource::<PreviewPool>()
            .init_resource::<PreviewMaterials>()
            .add_event::<SelectTemplate>()
            .add_event::<CancelPlacement>()
            .add_event::<TogglePlacementKind>()
            .add_event::<LineAdjust>()
            .add_systems(
                Update,
                (handle_session_requests, run_placement_session)
                    .chain()
                    .in_set(BuildingSet::Session),
            )
            .add_systems(
                Update,
                (sync_preview_pool, tint_ghosts, draw_line_path)
                    .chain()
                    .in_set(BuildingSet::Preview),
            );
    }
}
