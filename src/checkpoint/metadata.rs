use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Training snapshot written next to the model file as `<stem>.meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub tick: u64,
    pub epsilon: f32,
    pub average_loss: f32,
    pub network: String,
    pub policy: String,
    /// Seconds since the unix epoch.
    pub timestamp: u64,
}

impl CheckpointMetadata {
    pub fn new(
        tick: u64,
        epsilon: f32,
        average_loss: f32,
        network: impl Into<String>,
        policy: impl Into<String>,
    ) -> Self {
        CheckpointMetadata {
            tick,
            epsilon,
            average_loss,
            network: network.into(),
            policy: policy.into(),
            timestamp: unix_now(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
