use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    /// Left click in the world
    Primary,
    /// Right click in the world
    Secondary,
    RotateLeft,
    RotateRight,
    SnapModifier,
    Confirm,
    Cancel,
    ToggleLineMode,
    SpacingDown,
    SpacingUp,
    ToggleLineSide,
    /// Toolbar slot 1..=9
    SelectTemplate(u8),
}

/// Held state plus the key-down edge of each action for this frame.
#[derive(Default, Resource)]
pub struct ActionState {
    pressed: HashMap<PlayerAction, bool>,
    just_pressed: HashMap<PlayerAction, bool>,
}

impl ActionState {
    pub fn set(&mut self, action: PlayerAction, is_pressed: bool, was_just_pressed: bool) {
        self.pressed.insert(action, is_pressed);
        self.just_pressed.insert(action, was_just_pressed);
    }

    pub fn pressed(&self, action: PlayerAction) -> bool {
        *self.pressed.get(&action).unwrap_or(&false)
    }

    pub fn just_pressed(&self, action: PlayerAction) -> bool {
        *self.just_pressed.get(&action).unwrap_or(&false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_actions_read_as_released() {
        let mut state = ActionState::default();
        assert!(!state.pressed(PlayerAction::Confirm));
        state.set(PlayerAction::SelectTemplate(3), true, true);
        assert!(state.just_pressed(PlayerAction::SelectTemplate(3)));
        assert!(!state.just_pressed(PlayerAction::SelectTemplate(4)));
        state.set(PlayerAction::SelectTemplate(3), true, false);
        assert!(state.pressed(PlayerAction::SelectTemplate(3)));
        assert!(!state.just_pressed(PlayerAction::SelectTemplate(3)));
    }
}
