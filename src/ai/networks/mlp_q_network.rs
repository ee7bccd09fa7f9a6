use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

use crate::ai::state_encoding::CHANNELS;
use crate::ai::value_function::QModel;
use crate::game::NUM_ACTIONS;

/// Fully connected Q-network over the flattened display.
///
/// ```text
/// Input:   [batch, 3, H, W]
/// Flatten: 3*H*W
/// FC1:     3*H*W -> 256, ReLU
/// FC2:     256 -> 128, ReLU
/// FC3:     128 -> 3
/// ```
#[derive(Module, Debug)]
pub struct MlpQNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct MlpQNetworkConfig {
    pub height: usize,
    pub width: usize,
    #[config(default = 256)]
    pub hidden: usize,
}

impl MlpQNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MlpQNetwork<B> {
        let inputs = CHANNELS * self.height * self.width;
        MlpQNetwork {
            fc1: LinearConfig::new(inputs, self.hidden).init(device),
            fc2: LinearConfig::new(self.hidden, self.hidden / 2).init(device),
            fc3: LinearConfig::new(self.hidden / 2, NUM_ACTIONS).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> QModel<B> for MlpQNetwork<B> {
    fn forward(&self, states: Tensor<B, 4>) -> Tensor<B, 2> {
        let x: Tensor<B, 2> = states.flatten(1, 3);
        let x = self.relu.forward(self.fc1.forward(x));
        let x = self.relu.forward(self.fc2.forward(x));
        self.fc3.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_network_output_shape() {
        let device = Default::default();
        let network = MlpQNetworkConfig::new(4, 6).init::<TestBackend>(&device);

        let input = Tensor::zeros([5, 3, 4, 6], &device);
        assert_eq!(network.forward(input).dims(), [5, 3]);
    }
}
