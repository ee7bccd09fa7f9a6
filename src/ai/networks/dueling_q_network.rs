use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::prelude::*;

use super::conv_q_network::strided_len;
use crate::ai::state_encoding::CHANNELS;
use crate::ai::value_function::QModel;
use crate::game::NUM_ACTIONS;

/// Dueling Q-network: a shared conv trunk with separate state-value and
/// advantage streams.
///
/// ```text
/// Input:  [batch, 3, H, W]
/// Conv1:  3 -> 32 channels, 3x3, pad 1, ReLU
/// Conv2:  32 -> 64 channels, 3x3, pad 1, stride 2, ReLU
/// Flatten
/// Value:      flat -> 128 -> 1
/// Advantage:  flat -> 128 -> 3
/// Q = V + (A - mean(A))
/// ```
#[derive(Module, Debug)]
pub struct DuelingQNetwork<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    value_hidden: Linear<B>,
    value_out: Linear<B>,
    advantage_hidden: Linear<B>,
    advantage_out: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct DuelingQNetworkConfig {
    pub height: usize,
    pub width: usize,
}

impl DuelingQNetworkConfig {
    pub fn flat_features(&self) -> usize {
        64 * strided_len(self.height) * strided_len(self.width)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> DuelingQNetwork<B> {
        let flat = self.flat_features();
        DuelingQNetwork {
            conv1: Conv2dConfig::new([CHANNELS, 32], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            conv2: Conv2dConfig::new([32, 64], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .with_stride([2, 2])
                .init(device),
            value_hidden: LinearConfig::new(flat, 128).init(device),
            value_out: LinearConfig::new(128, 1).init(device),
            advantage_hidden: LinearConfig::new(flat, 128).init(device),
            advantage_out: LinearConfig::new(128, NUM_ACTIONS).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> QModel<B> for DuelingQNetwork<B> {
    fn forward(&self, states: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.conv1.forward(states));
        let x = self.relu.forward(self.conv2.forward(x));
        let features: Tensor<B, 2> = x.flatten(1, 3);

        let v = self
            .value_out
            .forward(self.relu.forward(self.value_hidden.forward(features.clone())));
        let a = self
            .advantage_out
            .forward(self.relu.forward(self.advantage_hidden.forward(features)));

        let a_mean = a.clone().mean_dim(1); // [batch, 1]
        v + (a - a_mean)
    }
}
