//! Decision-making: state encoding, action selection, and the value networks.

pub mod networks;
pub mod policy;
pub mod state_encoding;
pub mod value_function;

pub use networks::NetworkKind;
pub use policy::{ActionSelector, EpsilonSchedule, Policy};
pub use state_encoding::{EncodedState, StateFeaturizer, StateShape, CHANNELS};
pub use value_function::{BurnValueFunction, QModel, ValueFunction};
