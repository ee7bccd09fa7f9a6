use std::path::Path;

use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::backend::AutodiffBackend;

use crate::error::PersistenceError;

/// A network that maps `[batch, 3, H, W]` states to `[batch, 3]` action values.
pub trait QModel<B: Backend>: Module<B> {
    fn forward(&self, states: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// A trainable action-value function.
///
/// The decision loop only needs these capabilities; the layer topology behind
/// them is interchangeable (see [`crate::ai::networks::NetworkKind`]).
pub trait ValueFunction<B: AutodiffBackend> {
    /// Registry tag of the underlying network.
    fn name(&self) -> &str;

    fn device(&self) -> B::Device;

    /// Score a batch of states.
    fn evaluate(&self, states: Tensor<B, 4>) -> Tensor<B, 2>;

    /// One gradient step against `loss`.
    fn update(&mut self, loss: Tensor<B, 1>);

    fn save(&self, path: &Path) -> Result<(), PersistenceError>;

    fn load(&mut self, path: &Path) -> Result<(), PersistenceError>;
}

/// [`ValueFunction`] backed by a burn module trained with Adam.
pub struct BurnValueFunction<B, M>
where
    B: AutodiffBackend,
    M: QModel<B> + AutodiffModule<B>,
{
    name: String,
    model: M,
    optimizer: OptimizerAdaptor<Adam, M, B>,
    learning_rate: f64,
    device: B::Device,
}

impl<B, M> BurnValueFunction<B, M>
where
    B: AutodiffBackend,
    M: QModel<B> + AutodiffModule<B>,
{
    pub fn new(name: impl Into<String>, model: M, learning_rate: f64, device: B::Device) -> Self {
        BurnValueFunction {
            name: name.into(),
            model,
            optimizer: AdamConfig::new().init(),
            learning_rate,
            device,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<B, M> ValueFunction<B> for BurnValueFunction<B, M>
where
    B: AutodiffBackend,
    M: QModel<B> + AutodiffModule<B>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn device(&self) -> B::Device {
        self.device.clone()
    }

    fn evaluate(&self, states: Tensor<B, 4>) -> Tensor<B, 2> {
        self.model.forward(states)
    }

    fn update(&mut self, loss: Tensor<B, 1>) {
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self
            .optimizer
            .step(self.learning_rate, self.model.clone(), grads);
    }

    fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let recorder = DefaultRecorder::default();
        self.model
            .clone()
            .save_file(path.to_path_buf(), &recorder)
            .map_err(|e| PersistenceError::ModelSave(e.to_string()))
    }

    fn load(&mut self, path: &Path) -> Result<(), PersistenceError> {
        let recorder = DefaultRecorder::default();
        self.model = self
            .model
            .clone()
            .load_file(path.to_path_buf(), &recorder, &self.device)
            .map_err(|e| PersistenceError::ModelLoad(e.to_string()))?;
        Ok(())
    }
}
