// src/building/placement/line.rs
//! Line placement: click anchors, smooth them into a curve, then fill the
//! curve with evenly spaced building slots.
//!
//! Idle -> Drawing on the first anchor; Drawing -> Adjusting on confirm with
//! at least two anchors; Adjusting -> Drawing on secondary/cancel. Confirm in
//! Adjusting commits every valid slot and ends the session. Right-click in
//! Drawing drops the last anchor; dropping the only one ends the session.

use bevy::prelude::*;

use crate::building::core::{yaw_towards, PlacementPose};

use super::curve::{path_length, smooth_path, walk_slots, MIN_SLOT_STEP};
use super::mode::{ModeTick, PlacementContext, PlacementInput, PreviewState};
use super::settings::PlacementSettings;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineState {
    #[default]
    Idle,
    Drawing,
    Adjusting,
}

/// UI callbacks into the Adjusting state.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum LineAdjust {
    /// New gap between consecutive footprints, meters.
    SpacingChanged(f32),
    /// true: buildings stand to the right of the line, turned 90 degrees.
    OrientationToggled(bool),
    Confirm,
    /// Back to drawing.
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSettings {
    pub spacing: f32,
    pub rotated_right: bool,
}

#[derive(Clone, Debug)]
pub struct LineMode {
    state: LineState,
    anchors: Vec<Vec3>,
    settings: LineSettings,
    max_spacing: f32,
}

impl LineMode {
    pub fn new(settings: &PlacementSettings) -> Self {
        let max_spacing = settings.max_spacing.max(0.0);
        Self {
            state: LineState::Idle,
            anchors: Vec::new(),
            settings: LineSettings {
                spacing: settings.default_spacing.clamp(0.0, max_spacing),
                rotated_right: false,
            },
            max_spacing,
        }
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    pub fn anchors(&self) -> &[Vec3] {
        &self.anchors
    }

    pub fn settings(&self) -> LineSettings {
        self.settings
    }

    pub fn is_adjusting(&self) -> bool {
        self.state == LineState::Adjusting
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
        self.state = LineState::Idle;
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        self.settings.spacing = if spacing.is_finite() { spacing.clamp(0.0, self.max_spacing) } else { 0.0 };
    }

    pub fn tick(&mut self, input: &PlacementInput, ctx: &PlacementContext) -> ModeTick {
        let mut out = ModeTick::default();

        let mut confirm = input.confirm;
        let mut back = false;
        for adjust in &input.adjust {
            if self.state != LineState::Adjusting {
                continue;
            }
            match *adjust {
                LineAdjust::SpacingChanged(s) => self.set_spacing(s),
                LineAdjust::OrientationToggled(right) => self.settings.rotated_right = right,
                LineAdjust::Confirm => confirm = true,
                LineAdjust::Cancel => back = true,
            }
        }

        match self.state {
            LineState::Idle => {
                if input.cancel || input.secondary {
                    out.exit = true;
                    return out;
                }
                if input.primary {
                    if let Some(hit) = input.cursor {
                        self.anchors.push(hit);
                        self.state = LineState::Drawing;
                        debug!("Line: first anchor at {:.1?}", hit);
                    }
                }
                if self.state == LineState::Idle {
                    out.previews.push(ctx.cursor_preview(input.cursor));
                    return out;
                }
                self.fill(&mut out, input.cursor, 0.0, ctx);
            }
            LineState::Drawing => {
                if input.cancel {
                    out.exit = true;
                    return out;
                }
                if input.secondary {
                    self.anchors.pop();
                    if self.anchors.is_empty() {
                        self.state = LineState::Idle;
                        out.exit = true;
                        return out;
                    }
                }
                if input.primary {
                    if let Some(hit) = input.cursor {
                        self.try_append(hit, ctx.settings.min_segment_length);
                    }
                }
                if confirm && self.anchors.len() >= 2 {
                    self.state = LineState::Adjusting;
                    info!("Line: {} anchors, adjusting", self.anchors.len());
                    self.fill(&mut out, None, ctx.yaw_deg, ctx);
                } else {
                    self.fill(&mut out, input.cursor, 0.0, ctx);
                }
            }
            LineState::Adjusting => {
                if input.secondary || input.cancel || back {
                    self.state = LineState::Drawing;
                    self.fill(&mut out, input.cursor, 0.0, ctx);
                    return out;
                }
                self.fill(&mut out, None, ctx.yaw_deg, ctx);
                if confirm {
                    out.commits = out.previews.iter().filter(|p| p.valid).map(|p| p.pose).collect();
                    info!(
                        "Line: committing {} of {} slots along {:.1} m",
                        out.commits.len(),
                        out.previews.len(),
                        path_length(&out.path)
                    );
                    out.exit = true;
                }
            }
        }
        out
    }

    fn try_append(&mut self, point: Vec3, min_segment_length: f32) -> bool {
        match self.anchors.last() {
            Some(last) if last.distance(point) <= min_segment_length => false,
            _ => {
                self.anchors.push(point);
                true
            }
        }
    }

    /// Rebuild path and slot previews from scratch. `provisional` is the live
    /// cursor while drawing; it extends the line when far enough from the
    /// last anchor.
    fn fill(&self, out: &mut ModeTick, provisional: Option<Vec3>, yaw_offset: f32, ctx: &PlacementContext) {
        let mut anchors = self.anchors.clone();
        if let (Some(p), Some(last)) = (provisional, anchors.last()) {
            if last.distance(p) > f32::EPSILON {
                anchors.push(p);
            }
        }
        out.path = smooth_path(&anchors, ctx.settings.curve_resolution);
        out.previews = self.slots(&out.path, yaw_offset, ctx);
    }

    /// Slot poses along `path`. A slot whose terrain probe misses is dropped
    /// and the walk carries on at the next target.
    pub fn slots(&self, path: &[Vec3], yaw_offset: f32, ctx: &PlacementContext) -> Vec<PreviewState> {
        let size = ctx.footprint.size;
        let step = (size.y + self.settings.spacing).max(MIN_SLOT_STEP);
        let probes = &ctx.settings.probes;

        walk_slots(path, step)
            .into_iter()
            .filter_map(|slot| {
                let flat = Vec3::new(slot.tangent.x, 0.0, slot.tangent.z).normalize_or_zero();
                let mut yaw = yaw_towards(flat);
                let mut point = slot.point;
                if self.settings.rotated_right {
                    yaw += 90.0;
                    point += flat.cross(Vec3::Y) * size.x * 0.5;
                }

                let origin = point + Vec3::Y * probes.probe_height;
                let Some(ground) = ctx.terrain.probe_down(origin, probes.probe_distance) else {
                    debug!("Line: slot at {:.1?} has no ground; skipped", point);
                    return None;
                };
                let pose = PlacementPose::new(ground, yaw + yaw_offset);
                Some(PreviewState { valid: ctx.is_valid(&pose), pose, visible: true })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::core::TerrainSampler;
    use crate::building::occupancy::OccupancySnapshot;
    use crate::building::validator::tests::{flat, FnTerrain};
    use crate::building::validator::FootprintSpec;

    fn settings() -> PlacementSettings {
        PlacementSettings { default_spacing: 1.0, min_segment_length: 1.0, ..default() }
    }

    fn ctx<'a>(
        terrain: &'a dyn TerrainSampler,
        occupancy: &'a OccupancySnapshot,
        settings: &'a PlacementSettings,
    ) -> PlacementContext<'a> {
        PlacementContext {
            terrain,
            occupancy,
            settings,
            footprint: FootprintSpec { size: Vec2::new(2.0, 2.0), grid_density: 2, max_height_delta: 0.5 },
            yaw_deg: 0.0,
        }
    }

    fn click(x: f32, z: f32) -> PlacementInput {
        PlacementInput { cursor: Some(Vec3::new(x, 0.0, z)), primary: true, ..default() }
    }

    fn hover(x: f32, z: f32) -> PlacementInput {
        PlacementInput { cursor: Some(Vec3::new(x, 0.0, z)), ..default() }
    }

    fn confirm() -> PlacementInput {
        PlacementInput { confirm: true, ..default() }
    }

    #[test]
    fn walks_through_the_states() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);

        line.tick(&click(0.0, 0.0), &ctx);
        assert_eq!(line.state(), LineState::Drawing);

        // one anchor: confirm does nothing
        line.tick(&confirm(), &ctx);
        assert_eq!(line.state(), LineState::Drawing);

        line.tick(&click(12.0, 0.0), &ctx);
        line.tick(&confirm(), &ctx);
        assert_eq!(line.state(), LineState::Adjusting);

        let back = PlacementInput { secondary: true, ..default() };
        line.tick(&back, &ctx);
        assert_eq!(line.state(), LineState::Drawing);
        assert_eq!(line.anchors().len(), 2);
    }

    #[test]
    fn short_segments_are_refused() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);

        line.tick(&click(0.0, 0.0), &ctx);
        line.tick(&click(0.5, 0.0), &ctx);
        assert_eq!(line.anchors().len(), 1);
        line.tick(&click(1.5, 0.0), &ctx);
        assert_eq!(line.anchors().len(), 2);
    }

    #[test]
    fn secondary_pops_anchors_then_exits() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);
        let secondary = PlacementInput { secondary: true, ..default() };

        line.tick(&click(0.0, 0.0), &ctx);
        line.tick(&click(5.0, 0.0), &ctx);
        assert!(!line.tick(&secondary, &ctx).exit);
        assert_eq!(line.anchors().len(), 1);

        // popping the last anchor ends the session right away
        let tick = line.tick(&secondary, &ctx);
        assert!(tick.exit);
        assert!(tick.previews.is_empty());
        assert!(line.anchors().is_empty());
        assert_eq!(line.state(), LineState::Idle);
    }

    #[test]
    fn secondary_in_idle_exits() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);
        let secondary = PlacementInput { secondary: true, ..default() };
        assert!(line.tick(&secondary, &ctx).exit);
    }

    #[test]
    fn cursor_is_a_provisional_anchor_while_drawing() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);

        line.tick(&click(0.0, 0.0), &ctx);
        let tick = line.tick(&hover(9.0, 0.0), &ctx);
        // step 3: slots at 1.5, 4.5, 7.5
        assert_eq!(tick.previews.len(), 3);
        assert_eq!(tick.path.last(), Some(&Vec3::new(9.0, 0.0, 0.0)));
        assert_eq!(line.anchors().len(), 1);
    }

    #[test]
    fn confirm_commits_valid_slots_exactly_spaced() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);

        line.tick(&click(0.0, 0.0), &ctx);
        line.tick(&click(0.0, 12.0), &ctx);
        line.tick(&confirm(), &ctx);
        let tick = line.tick(&confirm(), &ctx);

        assert!(tick.exit);
        assert_eq!(tick.commits.len(), 4);
        for pair in tick.commits.windows(2) {
            let d = pair[0].position.distance(pair[1].position);
            assert!((d - 3.0).abs() < 1e-4);
        }
        // facing along +Z
        assert!(tick.commits[0].yaw_deg.abs() < 1e-3);
    }

    #[test]
    fn missing_ground_drops_only_that_slot() {
        // a hole between z = 4 and z = 5
        let terrain = FnTerrain(|p: Vec2| if (4.0..5.0).contains(&p.y) { None } else { Some(0.0_f32) });
        let (occ, s) = (OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);

        line.tick(&click(0.0, 0.0), &ctx);
        line.tick(&click(0.0, 12.0), &ctx);
        let tick = line.tick(&confirm(), &ctx);

        // targets 1.5, 4.5, 7.5, 10.5; the one over the hole is gone
        assert_eq!(tick.previews.len(), 3);
        assert!(tick.previews.iter().all(|p| (p.pose.position.z - 4.5).abs() > 0.1));
        // neighbours sample at z = 2.5 and 6.5, clear of the hole
        assert!(tick.previews.iter().all(|p| p.valid));
    }

    #[test]
    fn rotated_right_turns_and_offsets() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);

        line.tick(&click(0.0, 0.0), &ctx);
        line.tick(&click(10.0, 0.0), &ctx);
        line.tick(&confirm(), &ctx);

        let orient = PlacementInput { adjust: vec![LineAdjust::OrientationToggled(true)], ..default() };
        let tick = line.tick(&orient, &ctx);
        let first = tick.previews[0].pose;
        // heading +X is yaw 90; turned right -> 180, pushed half a width to +Z
        assert!((first.yaw_deg - 180.0).abs() < 1e-3);
        assert!((first.position.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn spacing_is_clamped_and_only_changes_while_adjusting() {
        let (terrain, occ, s) = (flat(), OccupancySnapshot::default(), settings());
        let ctx = ctx(&terrain, &occ, &s);
        let mut line = LineMode::new(&s);
        let widen = PlacementInput { adjust: vec![LineAdjust::SpacingChanged(500.0)], ..default() };

        line.tick(&click(0.0, 0.0), &ctx);
        line.tick(&widen, &ctx);
        assert_eq!(line.settings().spacing, 1.0);

        line.tick(&click(10.0, 0.0), &ctx);
        line.tick(&confirm(), &ctx);
        line.tick(&widen, &ctx);
        assert_eq!(line.settings().spacing, s.max_spacing);

        line.set_spacing(-3.0);
        assert_eq!(line.settings().spacing, 0.0);
    }
}
