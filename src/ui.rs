use bevy::prelude::*;
use bevy::ui::BackgroundColor;

use crate::building::placement::line::{LineAdjust, LineState};
use crate::building::placement::mode::PlacementKind;
use crate::building::placement::session::PlacementSession;
use crate::building::placement::settings::PlacementSettings;
use crate::building::placement::systems::{CancelPlacement, SelectTemplate, TogglePlacementKind};
use crate::building::plugin::BuildingSet;
use crate::building::registry::{BuildingTemplate, TemplateId, Templates};

const BUTTON_IDLE: Color = Color::srgb(0.18, 0.18, 0.2);
const BUTTON_HOVER: Color = Color::srgb(0.28, 0.28, 0.32);
const BUTTON_ACTIVE: Color = Color::srgb(0.25, 0.5, 0.3);

#[derive(Component)]
pub struct PauseOverlay;

/// UI node that swallows world clicks while hovered.
#[derive(Component)]
pub struct BlocksWorldInput;

/// True while the pointer is over a `BlocksWorldInput` node.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerOverUi(pub bool);

#[derive(Component)]
pub struct Toolbar;

#[derive(Component, Clone, Copy)]
pub struct TemplateButton(pub TemplateId);

#[derive(Component)]
pub struct LineToggleButton;

#[derive(Component)]
pub struct CancelButton;

/// Panel with the line-adjust buttons; shown only while adjusting a line.
#[derive(Component)]
pub struct LineAdjustPanel;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineButton {
    SpacingDown,
    SpacingUp,
    Side,
    Confirm,
    Back,
}

#[derive(Component)]
pub struct StatusText;

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerOverUi>()
            .add_systems(Startup, spawn_status_text)
            .add_systems(Update, spawn_toolbar)
            .add_systems(
                Update,
                (update_pointer_over_ui, toolbar_buttons).chain().in_set(BuildingSet::Input),
            )
            .add_systems(
                Update,
                (highlight_buttons, show_line_panel, update_status_text).after(BuildingSet::Session),
            );
    }
}

pub fn spawn_pause_overlay(mut commands: Commands) {
    commands.spawn((
        // Fullscreen transparent overlay node
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::linear_rgba(0.0, 0.0, 0.0, 0.7)),
        PauseOverlay,
    ))
    .with_children(|parent| {
        parent.spawn((
            Text::new("Paused"),
            TextFont { font_size: 64.0, ..default() },
            TextLayout::new_with_justify(JustifyText::Center),
            TextColor(Color::WHITE),
        ));
    });
}

pub fn despawn_pause_overlay(
    mut commands: Commands,
    query: Query<Entity, With<PauseOverlay>>,
) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}

fn button_node() -> Node {
    Node {
        padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
        margin: UiRect::all(Val::Px(3.0)),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}

fn label(text: impl Into<String>) -> impl Bundle {
    (Text::new(text), TextFont { font_size: 16.0, ..default() }, TextColor(Color::WHITE))
}

/// Toolbar caption: digit shortcut (first nine only) plus the name.
fn template_label(id: TemplateId, template: &BuildingTemplate) -> String {
    if id.0 < 9 {
        format!("{} {}", id.0 + 1, template.name)
    } else {
        template.name.clone()
    }
}

/// One button per template plus the line controls, once the registry is in.
pub fn spawn_toolbar(
    mut commands: Commands,
    templates: Templates,
    asset_server: Res<AssetServer>,
    mut spawned: Local<bool>,
) {
    if *spawned {
        return;
    }
    let Some(registry) = templates.registry() else { return };
    *spawned = true;

    let buttons: Vec<(TemplateId, String, Option<Handle<Image>>)> = registry
        .iter()
        .map(|(id, t)| {
            let icon = t.icon.as_ref().map(|path| asset_server.load(path.as_str()));
            (id, template_label(id, t), icon)
        })
        .collect();

    commands
        .spawn((
            Name::new("Toolbar"),
            Toolbar,
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(8.0),
                left: Val::Px(8.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
        ))
        .with_children(|root| {
            root.spawn((
                LineAdjustPanel,
                Node { display: Display::None, ..default() },
            ))
            .with_children(|panel| {
                for (button, text) in [
                    (LineButton::SpacingDown, "Spacing -"),
                    (LineButton::SpacingUp, "Spacing +"),
                    (LineButton::Side, "Side"),
                    (LineButton::Confirm, "Build line"),
                    (LineButton::Back, "Back"),
                ] {
                    panel
                        .spawn((Button, button, BlocksWorldInput, button_node(), BackgroundColor(BUTTON_IDLE)))
                        .with_child(label(text));
                }
            });

            root.spawn(Node::default()).with_children(|row| {
                for (id, text, icon) in buttons {
                    row.spawn((
                        Button,
                        TemplateButton(id),
                        BlocksWorldInput,
                        button_node(),
                        BackgroundColor(BUTTON_IDLE),
                    ))
                    .with_children(|button| {
                        if let Some(icon) = icon {
                            button.spawn((
                                ImageNode::new(icon),
                                Node {
                                    width: Val::Px(20.0),
                                    height: Val::Px(20.0),
                                    margin: UiRect::right(Val::Px(6.0)),
                                    ..default()
                                },
                            ));
                        }
                        button.spawn(label(text));
                    });
                }
                row.spawn((
                    Button,
                    LineToggleButton,
                    BlocksWorldInput,
                    button_node(),
                    BackgroundColor(BUTTON_IDLE),
                ))
                .with_child(label("Line (L)"));
                row.spawn((
                    Button,
                    CancelButton,
                    BlocksWorldInput,
                    button_node(),
                    BackgroundColor(BUTTON_IDLE),
                ))
                .with_child(label("Cancel"));
            });
        });
    info!("UI: toolbar with {} templates", registry.templates.len());
}

pub fn update_pointer_over_ui(
    nodes: Query<&Interaction, With<BlocksWorldInput>>,
    mut over: ResMut<PointerOverUi>,
) {
    let now = nodes.iter().any(|i| *i != Interaction::None);
    over.set_if_neq(PointerOverUi(now));
}

/// Button presses -> session events.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn toolbar_buttons(
    templates: Query<(&Interaction, &TemplateButton), Changed<Interaction>>,
    toggles: Query<&Interaction, (Changed<Interaction>, With<LineToggleButton>)>,
    cancels: Query<&Interaction, (Changed<Interaction>, With<CancelButton>)>,
    line_buttons: Query<(&Interaction, &LineButton), Changed<Interaction>>,
    session: Res<PlacementSession>,
    settings: Res<PlacementSettings>,
    mut select: EventWriter<SelectTemplate>,
    mut toggle: EventWriter<TogglePlacementKind>,
    mut cancel: EventWriter<CancelPlacement>,
    mut adjust: EventWriter<LineAdjust>,
) {
    for (interaction, button) in &templates {
        if *interaction == Interaction::Pressed {
            select.write(SelectTemplate(button.0));
        }
    }
    for interaction in &toggles {
        if *interaction == Interaction::Pressed {
            toggle.write(TogglePlacementKind);
        }
    }
    if cancels.iter().any(|i| *i == Interaction::Pressed) {
        cancel.write(CancelPlacement);
    }

    let Some(line) = session.line_settings() else { return };
    for (interaction, button) in &line_buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        adjust.write(match button {
            LineButton::SpacingDown => LineAdjust::SpacingChanged(line.spacing - settings.spacing_step),
            LineButton::SpacingUp => LineAdjust::SpacingChanged(line.spacing + settings.spacing_step),
            LineButton::Side => LineAdjust::OrientationToggled(!line.rotated_right),
            LineButton::Confirm => LineAdjust::Confirm,
            LineButton::Back => LineAdjust::Cancel,
        });
    }
}

#[allow(clippy::type_complexity)]
pub fn highlight_buttons(
    session: Res<PlacementSession>,
    mut buttons: Query<(
        &Interaction,
        &mut BackgroundColor,
        Option<&TemplateButton>,
        Has<LineToggleButton>,
    ), With<Button>>,
) {
    for (interaction, mut bg, template, is_toggle) in &mut buttons {
        let active = match template {
            Some(t) => session.active_template() == Some(t.0),
            None => is_toggle && session.kind() == PlacementKind::Line,
        };
        let color = if active {
            BUTTON_ACTIVE
        } else if *interaction != Interaction::None {
            BUTTON_HOVER
        } else {
            BUTTON_IDLE
        };
        bg.set_if_neq(BackgroundColor(color));
    }
}

pub fn show_line_panel(session: Res<PlacementSession>, mut panels: Query<&mut Node, With<LineAdjustPanel>>) {
    let display = if session.line_state() == Some(LineState::Adjusting) {
        Display::Flex
    } else {
        Display::None
    };
    for mut node in &mut panels {
        if node.display != display {
            node.display = display;
        }
    }
}

pub fn spawn_status_text(mut commands: Commands) {
    commands.spawn((
        StatusText,
        Text::new(""),
        TextFont { font_size: 18.0, ..default() },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
    ));
}

pub fn update_status_text(session: Res<PlacementSession>, mut texts: Query<&mut Text, With<StatusText>>) {
    if !session.is_changed() {
        return;
    }
    let status = match session.active() {
        None => format!("{:?} mode | 1-9 pick a building, L toggles line mode", session.kind()),
        Some(active) => match (session.line_state(), session.line_settings()) {
            (Some(state), Some(line)) => format!(
                "Line '{}' {:?} | spacing {:.1}{} | yaw {:.0} | Enter confirm, RMB back, Esc cancel",
                active.template.name,
                state,
                line.spacing,
                if line.rotated_right { ", beside line" } else { "" },
                session.yaw_deg(),
            ),
            _ => format!(
                "Placing '{}' | yaw {:.0} | Q/E rotate, Shift snaps | Esc cancel",
                active.template.name,
                session.yaw_deg(),
            ),
        },
    };
    for mut text in &mut texts {
        if text.0 != status {
            text.0 = status.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::registry::tests::block_template;

    #[test]
    fn only_the_first_nine_templates_get_a_digit() {
        let hut = block_template("Hut", Vec2::ONE, 1.0);
        assert_eq!(template_label(TemplateId(0), &hut), "1 Hut");
        assert_eq!(template_label(TemplateId(8), &hut), "9 Hut");
        assert_eq!(template_label(TemplateId(9), &hut), "Hut");
    }
}
