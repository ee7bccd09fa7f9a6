//! Experience replay, the Q-learning update, and training metrics.

pub mod metrics;
pub mod q_learning;
pub mod replay_buffer;
pub mod transition;

pub use metrics::{RunningAverage, TickTiming};
pub use q_learning::{build_targets, train_step};
pub use replay_buffer::ReplayBuffer;
pub use transition::Transition;
