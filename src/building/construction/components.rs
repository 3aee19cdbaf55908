// src/building/construction/components.rs
use bevy::prelude::*;

use crate::building::core::PlacementPose;
use crate::building::registry::TemplateId;

use super::progress::{ConstructionClock, PartReveal};

/// Root of any instantiated building model (site, final or ghost).
#[derive(Component, Clone, Copy, Debug)]
pub struct BuildingModel {
    pub template: TemplateId,
}

/// A committed building that is rising.
#[derive(Component, Debug)]
pub struct ConstructionSite {
    pub clock: ConstructionClock,
}

/// A committed building whose construction has finished.
#[derive(Component, Debug)]
pub struct CompletedBuilding;

/// Non-solid always-visible stand-in. Never progresses.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub valid: bool,
}

/// Marker on each revealable sub-piece of a model.
#[derive(Component, Debug)]
pub struct ModelPart;

/// Scene model spawned but not yet split into parts.
#[derive(Component, Debug)]
pub struct AwaitingParts;

/// Scene instance is in the world; decompose on the next update.
#[derive(Component, Debug)]
pub struct SceneSpawned;

/// One sub-piece: its entity and lowest point relative to the building base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingPart {
    pub entity: Entity,
    pub base_height: f32,
    pub has_collider: bool,
}

/// Owned list of parts, fixed once decomposed.
#[derive(Component, Debug)]
pub struct BuildingParts {
    pub parts: Vec<BuildingPart>,
    pub reveal: PartReveal,
}

impl BuildingParts {
    pub fn new(parts: Vec<BuildingPart>) -> Self {
        let reveal = PartReveal::new(parts.iter().map(|p| p.base_height).collect());
        Self { parts, reveal }
    }
}

/// Request from placement: commit a building of `template` at `pose`.
#[derive(Event, Clone, Copy, Debug)]
pub struct PlaceBuilding {
    pub template: TemplateId,
    pub pose: PlacementPose,
}

/// Fired once a construction site entity exists and should start rising.
#[derive(Event, Clone, Copy, Debug)]
pub struct BuildingPlaced {
    pub entity: Entity,
    pub template: TemplateId,
}

/// Fired on the tick a site reaches progress 1.
#[derive(Event, Clone, Copy, Debug)]
pub struct ConstructionFinished {
    pub entity: Entity,
    pub template: TemplateId,
}
