// src/building/construction/systems.rs
use bevy::prelude::*;

use crate::building::core::ColliderLayer;
use crate::building::model::{ModelRole, ModelSpawner};
use crate::building::occupancy::{BoxCollider, ColliderMode};
use crate::building::placement::settings::PlacementSettings;
use crate::building::registry::Templates;

use super::components::{
    BuildingModel, BuildingParts, BuildingPlaced, CompletedBuilding, ConstructionFinished,
    ConstructionSite, ModelPart, PlaceBuilding,
};
use super::progress::{ConstructionClock, TickOutcome};

/// PlaceBuilding -> a new construction site in `Built0` with a solid footprint.
pub fn spawn_placed_buildings(
    mut requests: EventReader<PlaceBuilding>,
    mut placed: EventWriter<BuildingPlaced>,
    mut spawner: ModelSpawner,
    templates: Templates,
    settings: Res<PlacementSettings>,
) {
    for req in requests.read() {
        let Some(template) = templates.get(req.template) else {
            warn!("Construction: unknown template {:?}; placement dropped", req.template);
            continue;
        };
        let Some(model) = template.construction_model.as_ref() else {
            error!("Construction: template '{}' has no construction model", template.name);
            continue;
        };

        let root = spawner.spawn(
            req.template,
            template,
            model,
            req.pose.transform(),
            ModelRole::Construction,
        );
        spawner.commands.entity(root).insert((
            ConstructionSite { clock: ConstructionClock::new(template.construction_time) },
            BoxCollider::footprint(template.footprint_size(), settings.probes.overlap_height),
            ColliderLayer::Building,
            ColliderMode::Solid,
        ));

        info!(
            "Construction: placed '{}' at {:.1?} yaw {:.0}",
            template.name, req.pose.position, req.pose.yaw_deg
        );
        placed.write(BuildingPlaced { entity: root, template: req.template });
    }
}

/// Built0 -> Constructing for every freshly placed site.
pub fn start_construction(
    mut placed: EventReader<BuildingPlaced>,
    mut sites: Query<&mut ConstructionSite>,
) {
    for ev in placed.read() {
        let Ok(mut site) = sites.get_mut(ev.entity) else { continue };
        if !site.clock.start() {
            debug!("Construction: {:?} already started", ev.entity);
        }
    }
}

/// Show + solidify the parts at or below the progress threshold; hide the rest.
pub fn apply_reveal(
    parts: &BuildingParts,
    progress: f32,
    part_state: &mut Query<(&mut Visibility, Option<&mut ColliderMode>), With<ModelPart>>,
) {
    for (part, shown) in parts.parts.iter().zip(parts.reveal.revealed(progress)) {
        let Ok((mut vis, mode)) = part_state.get_mut(part.entity) else { continue };
        vis.set_if_neq(if shown { Visibility::Inherited } else { Visibility::Hidden });
        if let Some(mut mode) = mode {
            mode.set_if_neq(if shown { ColliderMode::Solid } else { ColliderMode::Probe });
        }
    }
}

pub fn advance_construction(
    time: Res<Time>,
    mut sites: Query<(Entity, &BuildingModel, &mut ConstructionSite, Option<&BuildingParts>)>,
    mut part_state: Query<(&mut Visibility, Option<&mut ColliderMode>), With<ModelPart>>,
    mut finished: EventWriter<ConstructionFinished>,
) {
    let dt = time.delta_secs();
    for (entity, model, mut site, parts) in &mut sites {
        match site.clock.tick(dt) {
            TickOutcome::Idle => {}
            TickOutcome::Advanced { progress } => {
                if let Some(parts) = parts {
                    apply_reveal(parts, progress, &mut part_state);
                }
            }
            TickOutcome::Completed => {
                if let Some(parts) = parts {
                    apply_reveal(parts, 1.0, &mut part_state);
                }
                site.clock.freeze();
                finished.write(ConstructionFinished { entity, template: model.template });
            }
        }
    }
}

/// Swap in the final model when the template has a distinct one; otherwise
/// the fully revealed construction model stays as the finished building.
pub fn finish_construction(
    mut finished: EventReader<ConstructionFinished>,
    mut spawner: ModelSpawner,
    templates: Templates,
    settings: Res<PlacementSettings>,
    transforms: Query<&Transform, With<ConstructionSite>>,
) {
    for ev in finished.read() {
        let Some(template) = templates.get(ev.template) else { continue };
        let Ok(transform) = transforms.get(ev.entity) else { continue };

        match template.distinct_final_model() {
            Some(final_model) => {
                let root = spawner.spawn(ev.template, template, final_model, *transform, ModelRole::Final);
                spawner.commands.entity(root).insert((
                    BoxCollider::footprint(template.footprint_size(), settings.probes.overlap_height),
                    ColliderLayer::Building,
                    ColliderMode::Solid,
                    CompletedBuilding,
                ));
                spawner.commands.entity(ev.entity).despawn();
            }
            None => {
                spawner.commands.entity(ev.entity).insert(CompletedBuilding);
            }
        }
        info!("Construction: '{}' complete", template.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::construction::components::BuildingPart;
    use crate::building::registry::TemplateId;
    use std::time::Duration;

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_event::<ConstructionFinished>()
            .add_systems(Update, advance_construction);
        app
    }

    fn spawn_site(app: &mut App, duration: f32, heights: &[f32]) -> (Entity, Vec<Entity>) {
        let world = app.world_mut();
        let parts: Vec<Entity> = heights
            .iter()
            .map(|_| world.spawn((ModelPart, Visibility::Hidden, ColliderMode::Probe)).id())
            .collect();
        let records = parts
            .iter()
            .zip(heights)
            .map(|(&entity, &base_height)| BuildingPart { entity, base_height, has_collider: true })
            .collect();
        let mut clock = ConstructionClock::new(duration);
        clock.start();
        let root = world
            .spawn((
                BuildingModel { template: TemplateId(0) },
                ConstructionSite { clock },
                BuildingParts::new(records),
            ))
            .id();
        (root, parts)
    }

    fn step(app: &mut App, secs: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(secs));
        app.update();
    }

    fn shown(app: &App, e: Entity) -> (Visibility, ColliderMode) {
        let world = app.world();
        (*world.get::<Visibility>(e).unwrap(), *world.get::<ColliderMode>(e).unwrap())
    }

    fn finished_count(app: &App) -> usize {
        app.world().resource::<Events<ConstructionFinished>>().len()
    }

    #[test]
    fn parts_appear_bottom_up_then_finish_once() {
        let mut app = test_app();
        let (_, parts) = spawn_site(&mut app, 2.0, &[0.0, 1.0, 2.0]);

        step(&mut app, 1.0);
        assert_eq!(shown(&app, parts[0]), (Visibility::Inherited, ColliderMode::Solid));
        assert_eq!(shown(&app, parts[1]), (Visibility::Inherited, ColliderMode::Solid));
        assert_eq!(shown(&app, parts[2]), (Visibility::Hidden, ColliderMode::Probe));
        assert_eq!(finished_count(&app), 0);

        step(&mut app, 1.0);
        assert_eq!(shown(&app, parts[2]), (Visibility::Inherited, ColliderMode::Solid));
        assert_eq!(finished_count(&app), 1);

        // terminal: no second completion
        step(&mut app, 1.0);
        assert_eq!(finished_count(&app), 1);
    }

    #[test]
    fn zero_duration_reveals_everything_on_first_update() {
        let mut app = test_app();
        let (root, parts) = spawn_site(&mut app, 0.0, &[0.0, 3.0]);

        step(&mut app, 0.0);
        for p in parts {
            assert_eq!(shown(&app, p), (Visibility::Inherited, ColliderMode::Solid));
        }
        let site = app.world().get::<ConstructionSite>(root).unwrap();
        assert_eq!(site.clock.progress(), 1.0);
    }

    #[test]
    fn unstarted_sites_stay_hidden() {
        let mut app = test_app();
        let part = app.world_mut().spawn((ModelPart, Visibility::Hidden, ColliderMode::Probe)).id();
        app.world_mut().spawn((
            BuildingModel { template: TemplateId(0) },
            ConstructionSite { clock: ConstructionClock::new(1.0) },
            BuildingParts::new(vec![BuildingPart { entity: part, base_height: 0.0, has_collider: true }]),
        ));

        step(&mut app, 5.0);
        assert_eq!(shown(&app, part), (Visibility::Hidden, ColliderMode::Probe));
    }
}
