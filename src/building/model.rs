// src/building/model.rs
//! Instantiating template models and splitting them into revealable parts.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy::scene::SceneInstanceReady;

use super::construction::components::{
    AwaitingParts, BuildingModel, BuildingPart, BuildingParts, ConstructionSite, Ghost, ModelPart,
    SceneSpawned,
};
use super::construction::progress::ConstructionPhase;
use super::core::ColliderLayer;
use super::occupancy::{BoxCollider, ColliderMode};
use super::registry::{BuildingTemplate, ModelRef, TemplateId};

/// What an instantiated model is for; decides the initial part state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelRole {
    /// Committed, rising: parts start hidden and non-solid.
    Construction,
    /// Committed, finished: everything shown and solid.
    Final,
    /// Placement preview.
    Ghost,
}

impl ModelRole {
    fn part_state(self) -> (Visibility, ColliderMode) {
        match self {
            ModelRole::Construction => (Visibility::Hidden, ColliderMode::Probe),
            ModelRole::Final => (Visibility::Inherited, ColliderMode::Solid),
            ModelRole::Ghost => (Visibility::Inherited, ColliderMode::Probe),
        }
    }
}

/// Everything needed to spawn a model from a system.
#[derive(SystemParam)]
pub struct ModelSpawner<'w, 's> {
    pub commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    asset_server: Res<'w, AssetServer>,
}

impl ModelSpawner<'_, '_> {
    /// Spawn `model` as a new root at `transform`. Block models get their
    /// parts right away; scene models are decomposed once the scene is ready.
    pub fn spawn(
        &mut self,
        id: TemplateId,
        template: &BuildingTemplate,
        model: &ModelRef,
        transform: Transform,
        role: ModelRole,
    ) -> Entity {
        let root = self
            .commands
            .spawn((
                Name::new(format!("{} ({:?})", template.name, role)),
                transform,
                Visibility::Visible,
                BuildingModel { template: id },
            ))
            .id();

        match model {
            ModelRef::Blocks { parts } => {
                let (visibility, mode) = ModelRole::Construction.part_state();
                let mut out = Vec::with_capacity(parts.len());

                for (i, block) in parts.iter().enumerate() {
                    let mesh = self.meshes.add(Cuboid::new(block.size.x, block.size.y, block.size.z));
                    let (r, g, b) = block.color;
                    let material = self.materials.add(StandardMaterial {
                        base_color: Color::srgb(r, g, b),
                        perceptual_roughness: 0.9,
                        ..default()
                    });

                    let mut part = self.commands.spawn((
                        Name::new(format!("Part {i}")),
                        ModelPart,
                        Mesh3d(mesh),
                        MeshMaterial3d(material),
                        Transform::from_translation(block.offset + Vec3::Y * block.size.y * 0.5),
                        visibility,
                        ChildOf(root),
                    ));
                    if block.collider {
                        part.insert((
                            BoxCollider { center: Vec3::ZERO, half_extents: block.size * 0.5 },
                            ColliderLayer::Building,
                            mode,
                        ));
                    }
                    out.push(BuildingPart {
                        entity: part.id(),
                        base_height: block.base_height(),
                        has_collider: block.collider,
                    });
                }

                let parts = BuildingParts::new(out);
                match role {
                    ModelRole::Construction => {}
                    ModelRole::Final => set_all_parts(&mut self.commands, &parts, ModelRole::Final),
                    ModelRole::Ghost => prepare_ghost(&mut self.commands, root, &parts),
                }
                self.commands.entity(root).insert(parts);
            }
            ModelRef::Scene { path } => {
                let scene = self
                    .asset_server
                    .load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
                self.commands.entity(root).insert((SceneRoot(scene), AwaitingParts));
                if role == ModelRole::Ghost {
                    self.commands.entity(root).insert(Ghost { valid: false });
                }
            }
        }

        root
    }
}

fn set_all_parts(commands: &mut Commands, parts: &BuildingParts, role: ModelRole) {
    let (visibility, mode) = role.part_state();
    for part in &parts.parts {
        let mut e = commands.entity(part.entity);
        e.insert(visibility);
        if part.has_collider {
            e.insert(mode);
        }
    }
}

/// Turn any instance into a preview: every part shown, every collider a
/// non-blocking probe on the preview layer, and no construction progress ever.
pub fn prepare_ghost(commands: &mut Commands, root: Entity, parts: &BuildingParts) {
    commands
        .entity(root)
        .remove::<ConstructionSite>()
        .insert(Ghost { valid: false });
    for part in &parts.parts {
        let mut e = commands.entity(part.entity);
        e.insert(Visibility::Inherited);
        if part.has_collider {
            e.insert((ColliderMode::Probe, ColliderLayer::Preview));
        }
    }
}

/// Observer: a scene model's instance is in the world.
pub fn mark_scene_spawned(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    awaiting: Query<(), With<AwaitingParts>>,
) {
    let root = trigger.target();
    if awaiting.contains(root) {
        commands.entity(root).insert(SceneSpawned);
    }
}

/// Split spawned scenes into parts, one per mesh descendant, keyed by the
/// lowest corner of its bounds in building space. Waits a frame when bounds
/// are not computed yet.
pub fn decompose_scene_models(
    mut commands: Commands,
    roots: Query<
        (Entity, &GlobalTransform, Option<&Ghost>, Option<&ConstructionSite>),
        (With<SceneSpawned>, With<AwaitingParts>),
    >,
    children: Query<&Children>,
    meshes: Query<(&GlobalTransform, Option<&Aabb>), With<Mesh3d>>,
) {
    for (root, root_tf, ghost, site) in &roots {
        let to_local = root_tf.affine().inverse();
        let mut found = Vec::new();
        let mut pending = false;

        for e in children.iter_descendants(root) {
            let Ok((tf, aabb)) = meshes.get(e) else { continue };
            let Some(aabb) = aabb else {
                pending = true;
                break;
            };
            let local = to_local * tf.affine();
            let (min, max) = (Vec3::from(aabb.min()), Vec3::from(aabb.max()));
            let base = (0..8)
                .map(|k| {
                    let corner = Vec3::new(
                        if k & 1 == 0 { min.x } else { max.x },
                        if k & 2 == 0 { min.y } else { max.y },
                        if k & 4 == 0 { min.z } else { max.z },
                    );
                    local.transform_point3(corner).y
                })
                .fold(f32::INFINITY, f32::min);
            found.push((e, base, *aabb));
        }
        if pending {
            continue;
        }
        if found.is_empty() {
            warn!("Buildings: scene model on {:?} has no meshes; nothing to reveal", root);
        }

        let mut parts = Vec::with_capacity(found.len());
        for (e, base_height, aabb) in found {
            commands.entity(e).insert((
                ModelPart,
                BoxCollider {
                    center: aabb.center.into(),
                    half_extents: aabb.half_extents.into(),
                },
                ColliderLayer::Building,
            ));
            parts.push(BuildingPart { entity: e, base_height, has_collider: true });
        }
        let parts = BuildingParts::new(parts);

        if ghost.is_some() {
            prepare_ghost(&mut commands, root, &parts);
        } else if let Some(site) = site {
            let clock = &site.clock;
            if clock.phase() == ConstructionPhase::Built0 {
                set_all_parts(&mut commands, &parts, ModelRole::Construction);
            } else {
                for (part, shown) in parts.parts.iter().zip(parts.reveal.revealed(clock.progress())) {
                    let role = if shown { ModelRole::Final } else { ModelRole::Construction };
                    let (visibility, mode) = role.part_state();
                    commands.entity(part.entity).insert((visibility, mode));
                }
            }
        } else {
            set_all_parts(&mut commands, &parts, ModelRole::Final);
        }

        debug!("Buildings: decomposed {:?} into {} parts", root, parts.parts.len());
        commands
            .entity(root)
            .insert(parts)
            .remove::<(AwaitingParts, SceneSpawned)>();
    }
}
