use std::fmt;
use std::str::FromStr;

use log::debug;
use rand::Rng;

use crate::error::ConfigError;
use crate::game::{Action, NUM_ACTIONS};

/// Action-selection strategy, fixed at controller construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Policy {
    #[serde(rename = "greedy")]
    Greedy,
    #[serde(rename = "egreedy")]
    EpsilonGreedy,
    #[serde(rename = "softmax")]
    Softmax,
}

impl Policy {
    pub fn name(self) -> &'static str {
        match self {
            Policy::Greedy => "greedy",
            Policy::EpsilonGreedy => "egreedy",
            Policy::Softmax => "softmax",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Policy::Greedy),
            "egreedy" => Ok(Policy::EpsilonGreedy),
            "softmax" => Ok(Policy::Softmax),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Linearly annealed exploration rate.
///
/// Stays at `initial` until more than `observe_frames` ticks have elapsed, then
/// drops by `(initial - final) / exploration_frames` per tick down to `final`.
#[derive(Debug, Clone)]
pub struct EpsilonSchedule {
    value: f32,
    initial: f32,
    floor: f32,
    step: f32,
    observe_frames: u64,
}

impl EpsilonSchedule {
    pub fn new(initial: f32, floor: f32, exploration_frames: u64, observe_frames: u64) -> Self {
        let step = if exploration_frames == 0 {
            initial - floor
        } else {
            (initial - floor) / exploration_frames as f32
        };
        EpsilonSchedule {
            value: initial,
            initial,
            floor,
            step,
            observe_frames,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Override the current rate (e.g. 1.0 for pure exploration).
    pub fn set(&mut self, value: f32) {
        self.value = value;
    }

    /// Resume from a previously saved rate, kept within `[final, initial]`.
    /// A non-finite rate restarts the schedule.
    pub fn restore(&mut self, value: f32) {
        self.value = if value.is_finite() {
            value.clamp(self.floor, self.initial)
        } else {
            self.initial
        };
    }

    /// Apply one tick of annealing given the elapsed tick count.
    pub fn anneal(&mut self, elapsed_ticks: u64) {
        if elapsed_ticks > self.observe_frames && self.value > self.floor {
            self.value = (self.value - self.step).max(self.floor);
        }
    }
}

/// Picks an action from an action-value vector.
#[derive(Debug, Clone)]
pub struct ActionSelector {
    policy: Policy,
    temperature: f32,
}

impl ActionSelector {
    pub fn new(policy: Policy, temperature: f32) -> Self {
        ActionSelector {
            policy,
            temperature,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Select an action. `epsilon` is only consulted by the epsilon-greedy policy.
    pub fn select<R: Rng>(&self, q_values: &[f32], epsilon: f32, rng: &mut R) -> Action {
        debug_assert_eq!(q_values.len(), NUM_ACTIONS);
        let index = match self.policy {
            Policy::Greedy => {
                let index = argmax(q_values);
                debug!("GREEDY: {index}");
                index
            }
            Policy::EpsilonGreedy => {
                if rng.random_range(0.0..1.0) < epsilon {
                    let index = rng.random_range(0..NUM_ACTIONS);
                    debug!("e-greedy RANDOM: {index}");
                    index
                } else {
                    let index = argmax(q_values);
                    debug!("e-greedy GREEDY: {index}");
                    index
                }
            }
            Policy::Softmax => {
                let probs = softmax(q_values, self.temperature);
                let index = sample_categorical(&probs, rng);
                debug!("Q: {q_values:?}, SOFTMAX: {probs:?} -> {index}");
                index
            }
        };
        Action::ALL[index]
    }
}

/// Index of the largest value; ties go to the first occurrence.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Numerically stable softmax of `values / temperature`.
pub fn softmax(values: &[f32], temperature: f32) -> Vec<f32> {
    let scaled: Vec<f32> = values.iter().map(|&v| v / temperature).collect();
    let max_val = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut probs: Vec<f32> = scaled.iter().map(|&v| (v - max_val).exp()).collect();
    let sum: f32 = probs.iter().sum();
    for p in &mut probs {
        *p /= sum;
    }
    probs
}

/// Sample an index from a categorical distribution defined by `probs`.
fn sample_categorical<R: Rng>(probs: &[f32], rng: &mut R) -> usize {
    let r: f32 = rng.random_range(0.0..1.0);
    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if r < cumulative {
            return i;
        }
    }
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}
