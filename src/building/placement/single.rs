// src/building/placement/single.rs
//! One ghost under the cursor; every valid primary click commits a copy and
//! the ghost stays for the next one.

use super::mode::{ModeTick, PlacementContext, PlacementInput};

#[derive(Clone, Debug, Default)]
pub struct SingleMode;

impl SingleMode {
    pub fn tick(&mut self, input: &PlacementInput, ctx: &PlacementContext) -> ModeTick {
        let mut out = ModeTick::default();
        if input.cancel || input.secondary {
            out.exit = true;
            return out;
        }

        let preview = ctx.cursor_preview(input.cursor);
        if input.primary && preview.valid {
            out.commits.push(preview.pose);
        }
        out.previews.push(preview);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::core::ColliderLayer;
    use crate::building::occupancy::{ColliderMode, OccupancySnapshot, OrientedBox};
    use crate::building::placement::mode::PARKED_POSITION;
    use crate::building::placement::settings::PlacementSettings;
    use crate::building::registry::tests::block_template;
    use crate::building::validator::tests::flat;
    use crate::building::validator::FootprintSpec;
    use bevy::prelude::*;

    fn ctx<'a>(
        terrain: &'a dyn crate::building::core::TerrainSampler,
        occupancy: &'a OccupancySnapshot,
        settings: &'a PlacementSettings,
    ) -> PlacementContext<'a> {
        let template = block_template("Hut", Vec2::new(2.0, 2.0), 5.0);
        PlacementContext {
            terrain,
            occupancy,
            settings,
            footprint: FootprintSpec::from(&template),
            yaw_deg: 30.0,
        }
    }

    #[test]
    fn valid_click_commits_at_preview_pose() {
        let terrain = flat();
        let occupancy = OccupancySnapshot::default();
        let settings = PlacementSettings::default();
        let ctx = ctx(&terrain, &occupancy, &settings);

        let input = PlacementInput { cursor: Some(Vec3::new(3.0, 0.0, 4.0)), primary: true, ..default() };
        let tick = SingleMode.tick(&input, &ctx);
        assert_eq!(tick.previews.len(), 1);
        assert!(tick.previews[0].valid);
        assert_eq!(tick.commits, vec![tick.previews[0].pose]);
        assert_eq!(tick.commits[0].yaw_deg, 30.0);
        assert!(!tick.exit);
    }

    #[test]
    fn occupied_spot_does_not_commit() {
        let terrain = flat();
        let mut occupancy = OccupancySnapshot::default();
        occupancy.push(
            None,
            OrientedBox::new(Vec3::new(3.0, 1.0, 4.0), Vec3::splat(1.0), Quat::IDENTITY),
            ColliderLayer::Building,
            ColliderMode::Solid,
        );
        let settings = PlacementSettings::default();
        let ctx = ctx(&terrain, &occupancy, &settings);

        let input = PlacementInput { cursor: Some(Vec3::new(3.0, 0.0, 4.0)), primary: true, ..default() };
        let tick = SingleMode.tick(&input, &ctx);
        assert!(!tick.previews[0].valid);
        assert!(tick.commits.is_empty());
    }

    #[test]
    fn cursor_miss_parks_an_invalid_hidden_preview() {
        let terrain = flat();
        let occupancy = OccupancySnapshot::default();
        let settings = PlacementSettings::default();
        let ctx = ctx(&terrain, &occupancy, &settings);

        let input = PlacementInput { cursor: None, primary: true, ..default() };
        let tick = SingleMode.tick(&input, &ctx);
        let preview = tick.previews[0];
        assert!(!preview.valid && !preview.visible);
        assert_eq!(preview.pose.position, PARKED_POSITION);
        assert!(tick.commits.is_empty());
    }

    #[test]
    fn clicks_over_ui_are_ignored() {
        let terrain = flat();
        let occupancy = OccupancySnapshot::default();
        let settings = PlacementSettings::default();
        let ctx = ctx(&terrain, &occupancy, &settings);

        let input = PlacementInput {
            cursor: Some(Vec3::ZERO),
            primary: true,
            secondary: true,
            over_ui: true,
            ..default()
        }
        .without_ui_clicks();
        let tick = SingleMode.tick(&input, &ctx);
        assert!(tick.commits.is_empty());
        assert!(!tick.exit);
    }
}
