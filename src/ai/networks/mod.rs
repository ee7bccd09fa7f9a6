mod conv_q_network;
mod dueling_q_network;
mod mlp_q_network;

use std::fmt;
use std::str::FromStr;

use burn::tensor::backend::AutodiffBackend;

pub use conv_q_network::{ConvQNetwork, ConvQNetworkConfig};
pub use dueling_q_network::{DuelingQNetwork, DuelingQNetworkConfig};
pub use mlp_q_network::{MlpQNetwork, MlpQNetworkConfig};

use crate::ai::state_encoding::StateShape;
use crate::ai::value_function::{BurnValueFunction, ValueFunction};
use crate::error::ConfigError;

/// Registry of value-function architectures, keyed by configuration tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Cnn,
    Mlp,
    Dueling,
}

impl NetworkKind {
    pub const ALL: [NetworkKind; 3] = [NetworkKind::Cnn, NetworkKind::Mlp, NetworkKind::Dueling];

    pub fn name(self) -> &'static str {
        match self {
            NetworkKind::Cnn => "cnn",
            NetworkKind::Mlp => "mlp",
            NetworkKind::Dueling => "dueling",
        }
    }

    /// Build a freshly initialised value function for states of `shape`.
    pub fn build<B: AutodiffBackend>(
        self,
        shape: StateShape,
        learning_rate: f64,
        device: &B::Device,
    ) -> Box<dyn ValueFunction<B>> {
        let StateShape { height, width } = shape;
        match self {
            NetworkKind::Cnn => Box::new(BurnValueFunction::new(
                self.name(),
                ConvQNetworkConfig::new(height, width).init::<B>(device),
                learning_rate,
                device.clone(),
            )),
            NetworkKind::Mlp => Box::new(BurnValueFunction::new(
                self.name(),
                MlpQNetworkConfig::new(height, width).init::<B>(device),
                learning_rate,
                device.clone(),
            )),
            NetworkKind::Dueling => Box::new(BurnValueFunction::new(
                self.name(),
                DuelingQNetworkConfig::new(height, width).init::<B>(device),
                learning_rate,
                device.clone(),
            )),
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NetworkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ConfigError::UnknownNetwork(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::prelude::*;

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_from_str() {
        assert_eq!("cnn".parse::<NetworkKind>().unwrap(), NetworkKind::Cnn);
        assert_eq!("dueling".parse::<NetworkKind>().unwrap(), NetworkKind::Dueling);
        assert!(matches!(
            "resnet".parse::<NetworkKind>(),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_every_kind_builds_and_scores() {
        let device = Default::default();
        let shape = StateShape::new(6, 8);
        for kind in NetworkKind::ALL {
            let vf = kind.build::<TestBackend>(shape, 1e-3, &device);
            assert_eq!(vf.name(), kind.name());
            let q = vf.evaluate(Tensor::zeros([2, 3, 6, 8], &device));
            assert_eq!(q.dims(), [2, 3], "{kind} output shape");
        }
    }

    #[test]
    fn test_update_changes_predictions() {
        let device = Default::default();
        let mut vf = NetworkKind::Mlp.build::<TestBackend>(StateShape::new(2, 2), 1e-2, &device);
        let input = Tensor::<TestBackend, 4>::ones([1, 3, 2, 2], &device);

        let before: Vec<f32> = vf.evaluate(input.clone()).into_data().to_vec().unwrap();
        let target = Tensor::<TestBackend, 2>::from_data([[10.0f32, 10.0, 10.0]], &device);
        let diff = vf.evaluate(input.clone()) - target;
        let loss = (diff.clone() * diff).mean();
        vf.update(loss);
        let after: Vec<f32> = vf.evaluate(input).into_data().to_vec().unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network");
        let device = Default::default();
        let shape = StateShape::new(3, 3);
        let input = Tensor::<TestBackend, 4>::ones([1, 3, 3, 3], &device);

        let saved = NetworkKind::Cnn.build::<TestBackend>(shape, 1e-3, &device);
        saved.save(&path).unwrap();
        let expected: Vec<f32> = saved.evaluate(input.clone()).into_data().to_vec().unwrap();

        let mut loaded = NetworkKind::Cnn.build::<TestBackend>(shape, 1e-3, &device);
        loaded.load(&path).unwrap();
        let actual: Vec<f32> = loaded.evaluate(input).into_data().to_vec().unwrap();

        for (a, b) in expected.iter().zip(&actual) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_load_missing_file_fails() {
        let device = Default::default();
        let mut vf = NetworkKind::Mlp.build::<TestBackend>(StateShape::new(2, 2), 1e-3, &device);
        let result = vf.load(std::path::Path::new("/nonexistent/dir/network"));
        assert!(result.is_err());
    }
}
