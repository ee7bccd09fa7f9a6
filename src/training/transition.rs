use crate::ai::state_encoding::EncodedState;
use crate::game::Action;

/// One observed step of play. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: EncodedState,
    pub action: Action,
    pub reward: f32,
    pub state_prime: EncodedState,
}
