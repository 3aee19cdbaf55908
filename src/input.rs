use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::input::{mouse::MouseMotion, keyboard::KeyCode, ButtonInput};
use bevy::window::PrimaryWindow;

use crate::actions::{PlayerAction, ActionState};
use crate::building::placement::settings::PlacementSettings;
use crate::heightmap_data::HeightField;
use crate::setup::MainCamera;
use crate::state::GameState;

pub const MOVE_SPEED: f32 = 60.0;
pub const ROTATE_SPEED: f32 = 0.2;
pub const MAX_CAMERA_DT: f32 = 0.05; // never use a dt larger than 50ms

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

#[derive(Component)]
pub struct CameraOrbit {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

/// Where the pointer ray meets the ground this frame.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct CursorHit(pub Option<Vec3>);

pub fn input_mapping_system(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut action_state: ResMut<ActionState>,
) {
    let key = |code: KeyCode| (keys.pressed(code), keys.just_pressed(code));
    let bindings = [
        (PlayerAction::MoveForward, key(KeyCode::KeyW)),
        (PlayerAction::MoveBackward, key(KeyCode::KeyS)),
        (PlayerAction::MoveLeft, key(KeyCode::KeyA)),
        (PlayerAction::MoveRight, key(KeyCode::KeyD)),
        (PlayerAction::Primary, (mouse.pressed(MouseButton::Left), mouse.just_pressed(MouseButton::Left))),
        (PlayerAction::Secondary, (mouse.pressed(MouseButton::Right), mouse.just_pressed(MouseButton::Right))),
        (PlayerAction::RotateLeft, key(KeyCode::KeyQ)),
        (PlayerAction::RotateRight, key(KeyCode::KeyE)),
        (PlayerAction::SnapModifier, key(KeyCode::ShiftLeft)),
        (PlayerAction::Confirm, key(KeyCode::Enter)),
        (PlayerAction::Cancel, key(KeyCode::Escape)),
        (PlayerAction::ToggleLineMode, key(KeyCode::KeyL)),
        (PlayerAction::SpacingDown, key(KeyCode::BracketLeft)),
        (PlayerAction::SpacingUp, key(KeyCode::BracketRight)),
        (PlayerAction::ToggleLineSide, key(KeyCode::KeyT)),
    ];
    for (action, (held, edge)) in bindings {
        action_state.set(action, held, edge);
    }
    for (slot, code) in (1u8..).zip(DIGIT_KEYS) {
        let (held, edge) = key(code);
        action_state.set(PlayerAction::SelectTemplate(slot), held, edge);
    }
}

pub fn pause_toggle_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
    current_state: Res<State<GameState>>,
) {
    if keys.just_pressed(KeyCode::KeyP) {
        if current_state.get() == &GameState::Running {
            next_state.set(GameState::Paused);
            info!("Paused game");
        } else if current_state.get() == &GameState::Paused {
            next_state.set(GameState::Running);
            info!("Resumed game");
        }
    }
}

pub fn camera_controller(
    time: Res<Time>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    action_state: Res<ActionState>,
    field: Option<Res<HeightField>>,
    mut query: Query<(&mut Transform, &mut CameraOrbit), With<MainCamera>>,
) {
    // 0) Clamp delta
    let dt = time.delta_secs().min(MAX_CAMERA_DT);

    let Ok((mut tf, mut orbit)) = query.single_mut() else { return; };
    let ground = |x: f32, z: f32| {
        field.as_ref().and_then(|f| f.sample_height(x, z)).unwrap_or(0.0)
    };

    // 1) Camera-relative movement
    let forward = Vec2::new(-orbit.yaw.cos(), -orbit.yaw.sin());
    let right = Vec2::new(-forward.y, forward.x);

    let mut dir = Vec2::ZERO;
    if action_state.pressed(PlayerAction::MoveForward) { dir += forward; }
    if action_state.pressed(PlayerAction::MoveBackward) { dir -= forward; }
    if action_state.pressed(PlayerAction::MoveLeft) { dir -= right; }
    if action_state.pressed(PlayerAction::MoveRight) { dir += right; }

    if dir != Vec2::ZERO {
        let delta = dir.normalize() * MOVE_SPEED * dt;
        orbit.focus.x += delta.x;
        orbit.focus.z += delta.y;
    }

    // 2) Ground the focus Y (holes keep the last height)
    if let Some(h) = field.as_ref().and_then(|f| f.sample_height(orbit.focus.x, orbit.focus.z)) {
        orbit.focus.y = h;
    }

    // 3) Zoom
    for ev in scroll_evr.read() {
        let amount = match ev.unit {
            MouseScrollUnit::Line => ev.y * 2.0,
            MouseScrollUnit::Pixel => ev.y * 0.04,
        };
        orbit.radius = (orbit.radius - amount).clamp(5.0, 400.0);
    }

    // 4) Orbit
    if mouse_buttons.pressed(MouseButton::Middle) {
        for ev in motion_evr.read() {
            orbit.yaw += ev.delta.x * ROTATE_SPEED * dt;
            orbit.pitch += ev.delta.y * ROTATE_SPEED * dt;
        }
    } else {
        motion_evr.clear();
    }

    orbit.pitch = orbit.pitch.clamp(0.1, std::f32::consts::FRAC_PI_2 - 0.01);

    // 5) Position camera
    let xz_radius = orbit.radius * orbit.pitch.cos();
    let offset = Vec3::new(
        xz_radius * orbit.yaw.cos(),
        orbit.radius * orbit.pitch.sin(),
        xz_radius * orbit.yaw.sin(),
    );

    tf.translation = orbit.focus + offset;

    // 6) Prevent underground camera
    let terrain_y = ground(tf.translation.x, tf.translation.z);
    if tf.translation.y < terrain_y + 2.5 {
        tf.translation.y = terrain_y + 2.5;
    }

    tf.look_at(orbit.focus, Vec3::Y);
}

/// Pointer ray against the height field -> `CursorHit`.
pub fn cursor_ray_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    field: Option<Res<HeightField>>,
    settings: Res<PlacementSettings>,
    mut hit: ResMut<CursorHit>,
) {
    hit.0 = None;
    let Some(field) = field else { return };
    let Ok(window) = windows.single() else { return };
    let Some(cursor) = window.cursor_position() else { return };
    let Ok((camera, cam_tf)) = cameras.single() else { return };
    let Ok(ray) = camera.viewport_to_world(cam_tf, cursor) else { return };

    hit.0 = field.raycast(ray.origin, *ray.direction, settings.cursor_max_distance);
}
