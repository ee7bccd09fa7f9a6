use burn::nn::loss::{MseLoss, Reduction};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::TensorData;

use crate::ai::state_encoding::{encode_states_batch, EncodedState, StateShape};
use crate::ai::value_function::ValueFunction;
use crate::error::ControllerError;
use crate::game::NUM_ACTIONS;
use crate::training::replay_buffer::ReplayBuffer;
use crate::training::transition::Transition;

/// Assemble the regression targets for a minibatch.
///
/// Each row starts as the current prediction `Q(state)`, so untaken actions
/// contribute zero error. The taken action's entry is replaced with
/// `reward + gamma * max Q(state_prime)`. `current` and `next` are row-major
/// `[batch, NUM_ACTIONS]` matrices.
pub fn build_targets(current: &[f32], next: &[f32], batch: &[&Transition], gamma: f32) -> Vec<f32> {
    debug_assert_eq!(current.len(), batch.len() * NUM_ACTIONS);
    debug_assert_eq!(next.len(), batch.len() * NUM_ACTIONS);

    let mut targets = current.to_vec();
    for (i, transition) in batch.iter().enumerate() {
        let row = i * NUM_ACTIONS;
        let max_next = next[row..row + NUM_ACTIONS]
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        targets[row + transition.action.index()] = transition.reward + gamma * max_next;
    }
    targets
}

/// One Q-learning update from a uniformly sampled minibatch. Returns the loss.
///
/// The live value function produces both the predictions and the bootstrap
/// values for `state_prime`; there is no frozen target copy.
pub fn train_step<B: AutodiffBackend>(
    value_fn: &mut dyn ValueFunction<B>,
    replay: &mut ReplayBuffer<Transition>,
    shape: StateShape,
    batch_size: usize,
    gamma: f32,
) -> Result<f32, ControllerError> {
    let device = value_fn.device();
    let batch = replay.sample(batch_size);
    let batch_size = batch.len();

    let states: Vec<&EncodedState> = batch.iter().map(|t| &t.state).collect();
    let next_states: Vec<&EncodedState> = batch.iter().map(|t| &t.state_prime).collect();

    // Forward pass on current states: [B, 3]
    let prediction = value_fn.evaluate(encode_states_batch::<B>(&states, shape, &device));
    let current = action_values(prediction.clone(), batch_size)?;

    let next_q = value_fn.evaluate(encode_states_batch::<B>(&next_states, shape, &device));
    let next = action_values(next_q, batch_size)?;

    let target_data = build_targets(&current, &next, &batch, gamma);
    let targets = Tensor::<B, 2>::from_data(
        TensorData::new(target_data, [batch_size, NUM_ACTIONS]),
        &device,
    );

    let loss = MseLoss::new().forward(prediction, targets, Reduction::Mean);
    let loss_val = tensor_values(loss.clone())?
        .first()
        .copied()
        .ok_or_else(|| ControllerError::Tensor("empty loss tensor".to_string()))?;

    value_fn.update(loss);
    Ok(loss_val)
}

/// Flatten a `[rows, NUM_ACTIONS]` action-value tensor, checking its width.
pub(crate) fn action_values<B: Backend>(
    q: Tensor<B, 2>,
    rows: usize,
) -> Result<Vec<f32>, ControllerError> {
    let values = tensor_values(q)?;
    if values.len() != rows * NUM_ACTIONS {
        return Err(ControllerError::ActionValues {
            expected: rows * NUM_ACTIONS,
            found: values.len(),
        });
    }
    Ok(values)
}

pub(crate) fn tensor_values<B: Backend, const D: usize>(
    t: Tensor<B, D>,
) -> Result<Vec<f32>, ControllerError> {
    t.into_data()
        .to_vec::<f32>()
        .map_err(|e| ControllerError::Tensor(format!("{e:?}")))
}
