// src/building/placement/systems.rs
use bevy::prelude::*;

use crate::actions::{ActionState, PlayerAction};
use crate::building::construction::components::PlaceBuilding;
use crate::building::core::ColliderLayer;
use crate::building::occupancy::{BoxCollider, ColliderMode, OccupancySnapshot};
use crate::building::registry::{TemplateId, Templates};
use crate::heightmap_data::HeightField;
use crate::input::CursorHit;
use crate::ui::PointerOverUi;

use super::line::{LineAdjust, LineState};
use super::mode::PlacementInput;
use super::preview::PreviewFrame;
use super::rotation::RotationInput;
use super::session::PlacementSession;
use super::settings::PlacementSettings;

/// UI/host request: place this template (again: stop placing it).
#[derive(Event, Clone, Copy, Debug)]
pub struct SelectTemplate(pub TemplateId);

/// UI/host request: abort the current session.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct CancelPlacement;

/// UI/host request: flip between single and line placement.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct TogglePlacementKind;

/// Session entry points from UI events and their keyboard shortcuts.
#[allow(clippy::too_many_arguments)]
pub fn handle_session_requests(
    actions: Res<ActionState>,
    settings: Res<PlacementSettings>,
    templates: Templates,
    mut session: ResMut<PlacementSession>,
    mut select: EventReader<SelectTemplate>,
    mut cancel: EventReader<CancelPlacement>,
    mut toggle: EventReader<TogglePlacementKind>,
    mut adjust: EventWriter<LineAdjust>,
) {
    let mut requested: Vec<TemplateId> = select.read().map(|ev| ev.0).collect();
    for digit in 1..=9u8 {
        if actions.just_pressed(PlayerAction::SelectTemplate(digit)) {
            requested.push(TemplateId(u32::from(digit - 1)));
        }
    }

    if cancel.read().count() > 0 {
        session.cancel();
    }
    let toggles = toggle.read().count() + usize::from(actions.just_pressed(PlayerAction::ToggleLineMode));
    if toggles % 2 == 1 {
        session.toggle_kind(&settings);
    }

    for id in requested {
        match templates.get(id) {
            Some(template) => {
                session.select_template(id, template, &settings);
            }
            None => debug!("Placement: no template in slot {:?}", id),
        }
    }

    // keyboard versions of the line-adjust callbacks
    if session.line_state() == Some(LineState::Adjusting) {
        if let Some(line) = session.line_settings() {
            if actions.just_pressed(PlayerAction::SpacingUp) {
                adjust.write(LineAdjust::SpacingChanged(line.spacing + settings.spacing_step));
            }
            if actions.just_pressed(PlayerAction::SpacingDown) {
                adjust.write(LineAdjust::SpacingChanged(line.spacing - settings.spacing_step));
            }
            if actions.just_pressed(PlayerAction::ToggleLineSide) {
                adjust.write(LineAdjust::OrientationToggled(!line.rotated_right));
            }
        }
    }
}

/// Gather this frame's input, snapshot the colliders and tick the session.
/// Commits become `PlaceBuilding` events; previews go to `PreviewFrame`.
#[allow(clippy::too_many_arguments)]
pub fn run_placement_session(
    time: Res<Time>,
    actions: Res<ActionState>,
    cursor: Res<CursorHit>,
    over_ui: Res<PointerOverUi>,
    settings: Res<PlacementSettings>,
    terrain: Option<Res<HeightField>>,
    colliders: Query<(Entity, &BoxCollider, &ColliderLayer, &ColliderMode, &GlobalTransform)>,
    mut adjust: EventReader<LineAdjust>,
    mut session: ResMut<PlacementSession>,
    mut frame: ResMut<PreviewFrame>,
    mut place: EventWriter<PlaceBuilding>,
) {
    let adjust: Vec<LineAdjust> = adjust.read().copied().collect();

    let (Some(id), Some(terrain)) = (session.active_template(), terrain) else {
        frame.template = None;
        frame.previews.clear();
        frame.path.clear();
        return;
    };

    let input = PlacementInput {
        cursor: cursor.0,
        primary: actions.just_pressed(PlayerAction::Primary),
        secondary: actions.just_pressed(PlayerAction::Secondary),
        confirm: actions.just_pressed(PlayerAction::Confirm),
        cancel: actions.just_pressed(PlayerAction::Cancel),
        rotation: RotationInput {
            left_held: actions.pressed(PlayerAction::RotateLeft),
            right_held: actions.pressed(PlayerAction::RotateRight),
            left_pressed: actions.just_pressed(PlayerAction::RotateLeft),
            right_pressed: actions.just_pressed(PlayerAction::RotateRight),
            snap_held: actions.pressed(PlayerAction::SnapModifier),
            dt: time.delta_secs(),
        },
        over_ui: over_ui.0,
        adjust,
    }
    .without_ui_clicks();

    let mut occupancy = OccupancySnapshot::default();
    for (e, collider, layer, mode, global) in &colliders {
        occupancy.push_collider(e, collider, *layer, *mode, global);
    }

    let tick = session.tick(&input, &*terrain, &occupancy, &settings);

    for pose in &tick.commits {
        place.write(PlaceBuilding { template: id, pose: *pose });
    }

    frame.template = session.active_template();
    if frame.template.is_some() {
        frame.previews = tick.previews;
        frame.path = tick.path;
    } else {
        frame.previews.clear();
        frame.path.clear();
    }
}
