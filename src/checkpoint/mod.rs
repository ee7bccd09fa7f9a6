//! Value-function persistence: the model store and its JSON metadata sidecar.

mod metadata;
mod store;

pub use metadata::CheckpointMetadata;
pub use store::ModelStore;
