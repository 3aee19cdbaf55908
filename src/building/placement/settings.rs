// src/building/placement/settings.rs
use bevy::prelude::*;

use crate::building::validator::ProbeSettings;

/// Placement tunables.
#[derive(Resource, Clone, Debug)]
pub struct PlacementSettings {
    pub probes: ProbeSettings,
    /// Continuous rotation, degrees per second.
    pub rotation_speed_deg: f32,
    /// Line mode: a new anchor must be at least this far from the last one.
    pub min_segment_length: f32,
    /// Line mode: curve samples per anchor segment.
    pub curve_resolution: u32,
    pub default_spacing: f32,
    pub max_spacing: f32,
    /// Spacing change per `[`/`]` press or button click.
    pub spacing_step: f32,
    /// Cursor ray length against the terrain.
    pub cursor_max_distance: f32,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            probes: ProbeSettings::default(),
            rotation_speed_deg: 90.0,
            min_segment_length: 1.0,
            curve_resolution: 10,
            default_spacing: 1.0,
            max_spacing: 20.0,
            spacing_step: 0.5,
            cursor_max_distance: 2000.0,
        }
    }
}
