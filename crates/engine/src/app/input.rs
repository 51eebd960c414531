use crate::world::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveNorth,
    MoveWest,
    MoveSouth,
    MoveEast,
    Interact,
    Attack,
    Evade,
    Quit,
}

const ACTION_COUNT: usize = 8;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveNorth => 0,
            InputAction::MoveWest => 1,
            InputAction::MoveSouth => 2,
            InputAction::MoveEast => 3,
            InputAction::Interact => 4,
            InputAction::Attack => 5,
            InputAction::Evade => 6,
            InputAction::Quit => 7,
        }
    }

    pub fn move_facing(self) -> Option<Facing> {
        match self {
            InputAction::MoveNorth => Some(Facing::North),
            InputAction::MoveWest => Some(Facing::West),
            InputAction::MoveSouth => Some(Facing::South),
            InputAction::MoveEast => Some(Facing::East),
            _ => None,
        }
    }
}

/// Held state per action, used to turn raw key events (including OS key
/// repeat) into one key-down event per physical press.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    /// Records the new state and returns true only on an up-to-down edge.
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) -> bool {
        let was_down = std::mem::replace(&mut self.down[action.index()], is_down);
        is_down && !was_down
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_presses_emit_a_single_edge() {
        let mut states = ActionStates::default();
        assert!(states.set(InputAction::Attack, true));
        assert!(!states.set(InputAction::Attack, true));
        assert!(states.is_down(InputAction::Attack));
        assert!(!states.set(InputAction::Attack, false));
        assert!(states.set(InputAction::Attack, true));
    }

    #[test]
    fn only_movement_actions_map_to_a_facing() {
        assert_eq!(InputAction::MoveEast.move_facing(), Some(Facing::East));
        assert_eq!(InputAction::Interact.move_facing(), None);
    }
}
