use bevy::prelude::*;
use crate::input::CameraOrbit;
use crate::terrain::TerrainSettings;

#[derive(Component)]
pub struct MainCamera;

/// Orbit looking at the map center from a fifth of the map away, tilted
/// enough that building footprints read clearly.
pub fn overview_orbit(world_size: Vec2) -> CameraOrbit {
    CameraOrbit {
        focus: Vec3::ZERO,
        radius: (world_size.max_element() * 0.2).clamp(20.0, 400.0),
        yaw: 0.8,
        pitch: 0.75,
    }
}

pub fn setup(mut commands: Commands, terrain: Res<TerrainSettings>) {
    let half = terrain.world_size * 0.5;

    // low sun from one corner so the chasm walls cast shadows
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 12_000.0,
            ..default()
        },
        Transform::from_xyz(half.x, terrain.height_scale * 3.0, half.y * 0.6)
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let orbit = overview_orbit(terrain.world_size);
    let eye = orbit.focus
        + orbit.radius
            * Vec3::new(
                orbit.pitch.cos() * orbit.yaw.cos(),
                orbit.pitch.sin(),
                orbit.pitch.cos() * orbit.yaw.sin(),
            );
    commands.spawn((
        Name::new("Main camera"),
        Camera3d::default(),
        Transform::from_translation(eye).looking_at(orbit.focus, Vec3::Y),
        MainCamera,
        orbit,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_radius_follows_the_map_within_zoom_limits() {
        assert_eq!(overview_orbit(Vec2::splat(512.0)).radius, 102.4);
        assert_eq!(overview_orbit(Vec2::splat(10.0)).radius, 20.0);
        assert_eq!(overview_orbit(Vec2::new(8000.0, 100.0)).radius, 400.0);
    }
}
