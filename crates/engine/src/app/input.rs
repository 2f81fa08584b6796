/// Logical keys the town core understands. Movement is WASD, manual camera
/// pan is the arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    Interact,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

const ACTION_COUNT: usize = 12;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::PanUp,
        InputAction::PanDown,
        InputAction::PanLeft,
        InputAction::PanRight,
        InputAction::Interact,
        InputAction::ZoomIn,
        InputAction::ZoomOut,
        InputAction::ZoomReset,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::PanUp => 4,
            InputAction::PanDown => 5,
            InputAction::PanLeft => 6,
            InputAction::PanRight => 7,
            InputAction::Interact => 8,
            InputAction::ZoomIn => 9,
            InputAction::ZoomOut => 10,
            InputAction::ZoomReset => 11,
        }
    }

    pub fn is_movement(self) -> bool {
        matches!(
            self,
            InputAction::MoveUp
                | InputAction::MoveDown
                | InputAction::MoveLeft
                | InputAction::MoveRight
        )
    }

    pub fn is_pan(self) -> bool {
        matches!(
            self,
            InputAction::PanUp | InputAction::PanDown | InputAction::PanLeft | InputAction::PanRight
        )
    }
}

/// Physical press state per action, read once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeysHeld {
    down: [bool; ACTION_COUNT],
}

impl KeysHeld {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub fn with_down(mut self, action: InputAction) -> Self {
        self.set(action, true);
        self
    }

    pub fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }

    pub fn any_down(&self) -> bool {
        self.down.iter().any(|down| *down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_its_own_slot() {
        for action in InputAction::ALL {
            let keys = KeysHeld::default().with_down(action);
            for other in InputAction::ALL {
                assert_eq!(keys.is_down(other), other == action, "{action:?} vs {other:?}");
            }
        }
    }

    #[test]
    fn clear_releases_everything() {
        let mut keys = KeysHeld::default()
            .with_down(InputAction::MoveUp)
            .with_down(InputAction::PanLeft);
        assert!(keys.any_down());
        keys.clear();
        assert!(!keys.any_down());
    }

    #[test]
    fn movement_and_pan_groups_are_disjoint() {
        for action in InputAction::ALL {
            assert!(!(action.is_movement() && action.is_pan()));
        }
        assert!(InputAction::MoveLeft.is_movement());
        assert!(InputAction::PanLeft.is_pan());
        assert!(!InputAction::Interact.is_movement());
    }
}
