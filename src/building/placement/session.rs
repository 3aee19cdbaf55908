// src/building/placement/session.rs
//! Session manager: which template is being placed, in which mode, at which
//! yaw. Plain data; the systems feed it input and act on its output.

use bevy::prelude::*;

use crate::building::core::{OccupancyQuery, TerrainSampler};
use crate::building::registry::{BuildingTemplate, TemplateId};
use crate::building::validator::FootprintSpec;

use super::line::{LineSettings, LineState};
use super::mode::{ModeTick, PlacementContext, PlacementInput, PlacementKind, PlacementMode};
use super::rotation::RotationState;
use super::settings::PlacementSettings;

/// The session currently placing `template`.
#[derive(Clone, Debug)]
pub struct ActiveSession {
    pub id: TemplateId,
    pub template: BuildingTemplate,
    pub mode: PlacementMode,
}

#[derive(Resource, Debug, Default)]
pub struct PlacementSession {
    active: Option<ActiveSession>,
    /// Mode used by the next session (and the current one).
    kind: PlacementKind,
    rotation: RotationState,
}

impl PlacementSession {
    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn active_template(&self) -> Option<TemplateId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn kind(&self) -> PlacementKind {
        self.kind
    }

    pub fn yaw_deg(&self) -> f32 {
        self.rotation.yaw_deg
    }

    pub fn line_state(&self) -> Option<LineState> {
        self.active.as_ref()?.mode.as_line().map(|l| l.state())
    }

    pub fn line_settings(&self) -> Option<LineSettings> {
        self.active.as_ref()?.mode.as_line().map(|l| l.settings())
    }

    /// Start placing `template`. Selecting the active template again ends the
    /// session instead. Returns whether a session is active afterwards.
    pub fn select_template(
        &mut self,
        id: TemplateId,
        template: &BuildingTemplate,
        settings: &PlacementSettings,
    ) -> bool {
        if self.active_template() == Some(id) {
            self.cancel();
            return false;
        }
        self.cancel();

        if let Err(e) = template.check() {
            error!("Placement: {e}; session aborted");
            self.cancel();
            return false;
        }

        info!("Placement: placing '{}' ({:?})", template.name, self.kind);
        self.active = Some(ActiveSession {
            id,
            template: template.clone(),
            mode: PlacementMode::enter(self.kind, settings),
        });
        true
    }

    /// End the session, if any, and reset the yaw. Safe to call at any time.
    pub fn cancel(&mut self) -> bool {
        self.rotation.reset();
        let Some(mut active) = self.active.take() else {
            return false;
        };
        active.mode.exit();
        info!("Placement: cancelled '{}'", active.template.name);
        true
    }

    /// Switch mode kind; an active session re-enters in the new mode.
    pub fn set_kind(&mut self, kind: PlacementKind, settings: &PlacementSettings) {
        if self.kind == kind {
            return;
        }
        self.kind = kind;
        if let Some(active) = self.active.as_mut() {
            active.mode.exit();
            active.mode = PlacementMode::enter(kind, settings);
            info!("Placement: switched to {:?}", kind);
        }
    }

    pub fn toggle_kind(&mut self, settings: &PlacementSettings) {
        self.set_kind(self.kind.toggled(), settings);
    }

    /// One tick: rotation, then the mode. Ending the mode ends the session.
    pub fn tick(
        &mut self,
        input: &PlacementInput,
        terrain: &dyn TerrainSampler,
        occupancy: &dyn OccupancyQuery,
        settings: &PlacementSettings,
    ) -> ModeTick {
        let Some(active) = self.active.as_mut() else {
            return ModeTick::default();
        };

        if active.mode.uses_rotation() {
            self.rotation.apply(&input.rotation, settings.rotation_speed_deg);
        }

        let ctx = PlacementContext {
            terrain,
            occupancy,
            settings,
            footprint: FootprintSpec::from(&active.template),
            yaw_deg: self.rotation.yaw_deg,
        };
        let tick = active.mode.tick(input, &ctx);
        if tick.exit {
            self.cancel();
        }
        tick
    }
}
