// src/building/placement/mode.rs
//! The placement mode variant and the per-tick data flowing through it.

use bevy::prelude::*;

use crate::building::core::{OccupancyQuery, PlacementPose, TerrainSampler};
use crate::building::validator::{evaluate, FootprintSpec};

use super::line::{LineAdjust, LineMode};
use super::rotation::RotationInput;
use super::settings::PlacementSettings;
use super::single::SingleMode;

/// Where a preview goes when the cursor is off the terrain: far below
/// anything a probe or overlap query can reach.
pub const PARKED_POSITION: Vec3 = Vec3::new(0.0, -10_000.0, 0.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlacementKind {
    #[default]
    Single,
    Line,
}

impl PlacementKind {
    pub fn toggled(self) -> Self {
        match self {
            PlacementKind::Single => PlacementKind::Line,
            PlacementKind::Line => PlacementKind::Single,
        }
    }
}

/// World input for one tick, already resolved by the host.
#[derive(Clone, Debug, Default)]
pub struct PlacementInput {
    /// Cursor ray hit on the ground.
    pub cursor: Option<Vec3>,
    pub primary: bool,
    pub secondary: bool,
    pub confirm: bool,
    pub cancel: bool,
    pub rotation: RotationInput,
    /// Pointer is over a panel: primary/secondary are ignored.
    pub over_ui: bool,
    /// Line-adjust callbacks received this tick.
    pub adjust: Vec<LineAdjust>,
}

impl PlacementInput {
    /// Drop world clicks that landed on UI.
    pub fn without_ui_clicks(mut self) -> Self {
        if self.over_ui {
            self.primary = false;
            self.secondary = false;
        }
        self
    }
}

/// Read-only world access for one tick.
pub struct PlacementContext<'a> {
    pub terrain: &'a dyn TerrainSampler,
    pub occupancy: &'a dyn OccupancyQuery,
    pub settings: &'a PlacementSettings,
    pub footprint: FootprintSpec,
    /// Current session yaw, degrees.
    pub yaw_deg: f32,
}

impl PlacementContext<'_> {
    pub fn is_valid(&self, pose: &PlacementPose) -> bool {
        match evaluate(pose, &self.footprint, &self.settings.probes, self.terrain, self.occupancy) {
            Ok(()) => true,
            Err(reason) => {
                debug!("Placement: rejected at {:.1?}: {:?}", pose.position, reason);
                false
            }
        }
    }

    /// Preview under the cursor at the session yaw; parked and hidden on a miss.
    pub fn cursor_preview(&self, cursor: Option<Vec3>) -> PreviewState {
        match cursor {
            Some(hit) => {
                let pose = PlacementPose::new(hit, self.yaw_deg);
                PreviewState { valid: self.is_valid(&pose), pose, visible: true }
            }
            None => PreviewState {
                pose: PlacementPose::new(PARKED_POSITION, self.yaw_deg),
                valid: false,
                visible: false,
            },
        }
    }
}

/// One ghost as it should look this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewState {
    pub pose: PlacementPose,
    pub valid: bool,
    pub visible: bool,
}

/// Output of a mode tick.
#[derive(Clone, Debug, Default)]
pub struct ModeTick {
    pub previews: Vec<PreviewState>,
    /// Poses to commit as real buildings, in order.
    pub commits: Vec<PlacementPose>,
    /// The mode asked for the session to end.
    pub exit: bool,
    /// Smoothed line path, when drawing or adjusting.
    pub path: Vec<Vec3>,
}

/// Exactly one of these is active per session.
#[derive(Clone, Debug)]
pub enum PlacementMode {
    Single(SingleMode),
    Line(LineMode),
}

impl PlacementMode {
    pub fn enter(kind: PlacementKind, settings: &PlacementSettings) -> Self {
        match kind {
            PlacementKind::Single => PlacementMode::Single(SingleMode::default()),
            PlacementKind::Line => PlacementMode::Line(LineMode::new(settings)),
        }
    }

    pub fn kind(&self) -> PlacementKind {
        match self {
            PlacementMode::Single(_) => PlacementKind::Single,
            PlacementMode::Line(_) => PlacementKind::Line,
        }
    }

    /// Whether the shared rotation input steers this mode right now.
    pub fn uses_rotation(&self) -> bool {
        match self {
            PlacementMode::Single(_) => true,
            PlacementMode::Line(line) => line.is_adjusting(),
        }
    }

    pub fn tick(&mut self, input: &PlacementInput, ctx: &PlacementContext) -> ModeTick {
        match self {
            PlacementMode::Single(single) => single.tick(input, ctx),
            PlacementMode::Line(line) => line.tick(input, ctx),
        }
    }

    pub fn exit(&mut self) {
        if let PlacementMode::Line(line) = self {
            line.clear();
        }
    }

    pub fn as_line(&self) -> Option<&LineMode> {
        match self {
            PlacementMode::Line(line) => Some(line),
            PlacementMode::Single(_) => None,
        }
    }
}
