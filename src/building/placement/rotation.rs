// src/building/placement/rotation.rs
//! Shared yaw input: continuous turning while held, 45 degree snaps on a
//! key-down edge while the modifier is held.

use crate::building::core::wrap_degrees;

const SNAP_DEG: f32 = 45.0;

/// Rotate input sampled for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationInput {
    pub left_held: bool,
    pub right_held: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub snap_held: bool,
    pub dt: f32,
}

/// Next multiple of 45 strictly above `deg`.
pub fn snap_right(deg: f32) -> f32 {
    wrap_degrees(((deg / SNAP_DEG).floor() + 1.0) * SNAP_DEG)
}

/// Next multiple of 45 strictly below `deg`.
pub fn snap_left(deg: f32) -> f32 {
    wrap_degrees(((deg / SNAP_DEG).ceil() - 1.0) * SNAP_DEG)
}

/// Transient yaw of the active session, [0, 360).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    pub yaw_deg: f32,
}

impl RotationState {
    pub fn reset(&mut self) {
        self.yaw_deg = 0.0;
    }

    /// Apply one tick of input. A snap edge replaces continuous rotation for
    /// the tick.
    pub fn apply(&mut self, input: &RotationInput, speed_deg: f32) {
        if input.snap_held && (input.left_pressed || input.right_pressed) {
            if input.right_pressed {
                self.yaw_deg = snap_right(self.yaw_deg);
            }
            if input.left_pressed {
                self.yaw_deg = snap_left(self.yaw_deg);
            }
            return;
        }

        let mut dir = 0.0;
        if input.right_held {
            dir += 1.0;
        }
        if input.left_held {
            dir -= 1.0;
        }
        if dir != 0.0 {
            self.yaw_deg = wrap_degrees(self.yaw_deg + dir * speed_deg * input.dt.max(0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_right_from_31_lands_on_45() {
        assert_eq!(snap_right(31.0), 45.0);
        assert_eq!(snap_right(45.0), 90.0);
        assert_eq!(snap_right(350.0), 0.0);
    }

    #[test]
    fn snap_left_goes_below() {
        assert_eq!(snap_left(31.0), 0.0);
        assert_eq!(snap_left(45.0), 0.0);
        assert_eq!(snap_left(0.0), 315.0);
    }

    #[test]
    fn snap_edge_short_circuits_continuous() {
        let mut rot = RotationState { yaw_deg: 31.0 };
        let input = RotationInput {
            right_held: true,
            right_pressed: true,
            snap_held: true,
            dt: 1.0,
            ..Default::default()
        };
        rot.apply(&input, 90.0);
        assert_eq!(rot.yaw_deg, 45.0);
    }

    #[test]
    fn modifier_without_an_edge_keeps_turning() {
        let mut rot = RotationState { yaw_deg: 45.0 };
        let input = RotationInput { right_held: true, snap_held: true, dt: 0.5, ..Default::default() };
        rot.apply(&input, 90.0);
        assert_eq!(rot.yaw_deg, 90.0);
    }

    #[test]
    fn continuous_rotation_wraps() {
        let mut rot = RotationState { yaw_deg: 10.0 };
        let input = RotationInput { left_held: true, dt: 0.5, ..Default::default() };
        rot.apply(&input, 90.0);
        assert_eq!(rot.yaw_deg, 325.0);
        rot.reset();
        assert_eq!(rot.yaw_deg, 0.0);
    }
}
