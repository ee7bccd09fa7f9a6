use super::Actuator;

/// Number of discrete actions the value function scores.
pub const NUM_ACTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Shoot,
}

impl Action {
    pub const ALL: [Action; NUM_ACTIONS] = [Action::MoveLeft, Action::MoveRight, Action::Shoot];

    /// Map an action-value index back to an action.
    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    /// Position of this action in the action-value vector.
    pub fn index(self) -> usize {
        match self {
            Action::MoveLeft => 0,
            Action::MoveRight => 1,
            Action::Shoot => 2,
        }
    }

    /// Issue the matching intent on the actuator.
    pub fn apply<P: Actuator + ?Sized>(self, player: &mut P) {
        match self {
            Action::MoveLeft => player.move_left(),
            Action::MoveRight => player.move_right(),
            Action::Shoot => player.shoot_bullet(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::MoveLeft => "left",
            Action::MoveRight => "right",
            Action::Shoot => "shoot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Actuator for Recorder {
        fn move_left(&mut self) {
            self.calls.push("left");
        }
        fn move_right(&mut self) {
            self.calls.push("right");
        }
        fn shoot_bullet(&mut self) {
            self.calls.push("shoot");
        }
    }

    #[test]
    fn test_index_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), Some(action));
        }
        assert_eq!(Action::from_index(3), None);
    }

    #[test]
    fn test_apply_issues_single_intent() {
        let mut player = Recorder::default();
        Action::MoveRight.apply(&mut player);
        Action::Shoot.apply(&mut player);
        assert_eq!(player.calls, vec!["right", "shoot"]);
    }
}
