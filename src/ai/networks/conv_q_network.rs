use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Linear, LinearConfig, PaddingConfig2d};
use burn::prelude::*;
use burn::tensor::activation::leaky_relu;

use crate::ai::state_encoding::CHANNELS;
use crate::ai::value_function::QModel;
use crate::game::NUM_ACTIONS;

const LEAKY_SLOPE: f64 = 0.2;

/// Convolutional Q-network.
///
/// ```text
/// Input:  [batch, 3, H, W]
/// Conv1:  3 -> 16 channels, 3x3, pad 1            =>  [batch, 16, H, W]
/// Conv2:  16 -> 32 channels, 3x3, pad 1, stride 2 =>  [batch, 32, ⌈H/2⌉, ⌈W/2⌉]
/// Conv3:  32 -> 64 channels, 3x3, pad 1, stride 2 =>  [batch, 64, ⌈H/4⌉, ⌈W/4⌉]
/// Flatten
/// FC1:    flat -> 512
/// FC2:    512 -> 3  (Q-values, one per action)
/// ```
///
/// Leaky ReLU (slope 0.2) after every layer but the last. A 12x16 display
/// flattens to 64*3*4 = 768 features.
#[derive(Module, Debug)]
pub struct ConvQNetwork<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    fc1: Linear<B>,
    fc2: Linear<B>,
}

#[derive(Config, Debug)]
pub struct ConvQNetworkConfig {
    pub height: usize,
    pub width: usize,
}

/// Output length of a 3x3, pad 1, stride 2 convolution.
pub(crate) fn strided_len(n: usize) -> usize {
    (n.max(1) - 1) / 2 + 1
}

impl ConvQNetworkConfig {
    /// Number of features entering the first linear layer.
    pub fn flat_features(&self) -> usize {
        64 * strided_len(strided_len(self.height)) * strided_len(strided_len(self.width))
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvQNetwork<B> {
        let same = PaddingConfig2d::Explicit(1, 1);
        ConvQNetwork {
            conv1: Conv2dConfig::new([CHANNELS, 16], [3, 3])
                .with_padding(same.clone())
                .init(device),
            conv2: Conv2dConfig::new([16, 32], [3, 3])
                .with_padding(same.clone())
                .with_stride([2, 2])
                .init(device),
            conv3: Conv2dConfig::new([32, 64], [3, 3])
                .with_padding(same)
                .with_stride([2, 2])
                .init(device),
            fc1: LinearConfig::new(self.flat_features(), 512).init(device),
            fc2: LinearConfig::new(512, NUM_ACTIONS).init(device),
        }
    }
}

impl<B: Backend> QModel<B> for ConvQNetwork<B> {
    fn forward(&self, states: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = leaky_relu(self.conv1.forward(states), LEAKY_SLOPE);
        let x = leaky_relu(self.conv2.forward(x), LEAKY_SLOPE);
        let x = leaky_relu(self.conv3.forward(x), LEAKY_SLOPE);
        let x: Tensor<B, 2> = x.flatten(1, 3);
        let x = leaky_relu(self.fc1.forward(x), LEAKY_SLOPE);
        self.fc2.forward(x)
    }
}
