// src/building/placement/preview.rs
//! Ghost entities mirroring the session's previews, reused by index.

use bevy::prelude::*;

use crate::building::construction::components::{BuildingParts, Ghost, ModelPart};
use crate::building::model::{ModelRole, ModelSpawner};
use crate::building::registry::{TemplateId, Templates};

use super::mode::PreviewState;
use super::session::PlacementSession;

/// What the ghosts should show this frame. Written by the session system.
#[derive(Resource, Default, Debug)]
pub struct PreviewFrame {
    pub template: Option<TemplateId>,
    pub previews: Vec<PreviewState>,
    pub path: Vec<Vec3>,
}

/// Ghost roots currently in the world, in preview order.
#[derive(Resource, Default, Debug)]
pub struct PreviewPool {
    template: Option<TemplateId>,
    ghosts: Vec<Entity>,
}

/// Valid / invalid tint for ghost parts.
#[derive(Resource)]
pub struct PreviewMaterials {
    pub valid: Handle<StandardMaterial>,
    pub invalid: Handle<StandardMaterial>,
}

impl FromWorld for PreviewMaterials {
    fn from_world(world: &mut World) -> Self {
        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let mut tint = |r: f32, g: f32, b: f32| {
            materials.add(StandardMaterial {
                base_color: Color::srgba(r, g, b, 0.45),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })
        };
        Self { valid: tint(0.25, 0.9, 0.35), invalid: tint(0.95, 0.2, 0.2) }
    }
}

/// Despawn every ghost on a template change, then grow/shrink the pool to the
/// frame and move each ghost onto its preview.
pub fn sync_preview_pool(
    frame: Res<PreviewFrame>,
    mut pool: ResMut<PreviewPool>,
    mut spawner: ModelSpawner,
    templates: Templates,
    mut ghosts: Query<(&mut Transform, &mut Visibility, &mut Ghost)>,
) {
    if frame.template != pool.template {
        for e in pool.ghosts.drain(..) {
            spawner.commands.entity(e).despawn();
        }
        pool.template = frame.template;
    }

    let Some(id) = frame.template else { return };
    let Some(template) = templates.get(id) else { return };
    let Some(model) = template.construction_model.as_ref() else { return };

    while pool.ghosts.len() > frame.previews.len() {
        if let Some(e) = pool.ghosts.pop() {
            spawner.commands.entity(e).despawn();
        }
    }

    for (i, preview) in frame.previews.iter().enumerate() {
        let visibility = if preview.visible { Visibility::Visible } else { Visibility::Hidden };
        let ghost = Ghost { valid: preview.valid };

        if let Some(&e) = pool.ghosts.get(i) {
            if let Ok((mut tf, mut vis, mut g)) = ghosts.get_mut(e) {
                *tf = preview.pose.transform();
                vis.set_if_neq(visibility);
                g.set_if_neq(ghost);
            }
            continue;
        }

        let e = spawner.spawn(id, template, model, preview.pose.transform(), ModelRole::Ghost);
        spawner.commands.entity(e).insert((visibility, ghost));
        pool.ghosts.push(e);
    }
}

/// Swap ghost part materials when validity flips or parts appear.
pub fn tint_ghosts(
    materials: Res<PreviewMaterials>,
    ghosts: Query<(&Ghost, &BuildingParts), Or<(Changed<Ghost>, Changed<BuildingParts>)>>,
    mut part_materials: Query<&mut MeshMaterial3d<StandardMaterial>, With<ModelPart>>,
) {
    for (ghost, parts) in &ghosts {
        let handle = if ghost.valid { &materials.valid } else { &materials.invalid };
        for part in &parts.parts {
            if let Ok(mut mat) = part_materials.get_mut(part.entity) {
                if mat.0 != *handle {
                    mat.0 = handle.clone();
                }
            }
        }
    }
}

/// Gizmo line along the smoothed path plus a marker per anchor.
pub fn draw_line_path(frame: Res<PreviewFrame>, session: Res<PlacementSession>, mut gizmos: Gizmos) {
    const LIFT: Vec3 = Vec3::new(0.0, 0.15, 0.0);
    if frame.path.len() >= 2 {
        gizmos.linestrip(frame.path.iter().map(|p| *p + LIFT), Color::srgb(1.0, 0.85, 0.2));
    }
    let Some(line) = session.active().and_then(|a| a.mode.as_line()) else { return };
    for anchor in line.anchors() {
        gizmos.sphere(Isometry3d::from_translation(*anchor + LIFT), 0.3, Color::srgb(1.0, 0.5, 0.1));
    }
}
