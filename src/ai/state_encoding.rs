use std::sync::Arc;

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::error::StateError;
use crate::game::Occupant;

/// Number of occupant categories, one tensor channel each.
pub const CHANNELS: usize = 3;

/// Shape of a single encoded state: `[CHANNELS, height, width]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateShape {
    pub height: usize,
    pub width: usize,
}

impl StateShape {
    pub fn new(height: usize, width: usize) -> Self {
        StateShape { height, width }
    }

    /// Number of f32 values in one encoded state.
    pub fn len(&self) -> usize {
        CHANNELS * self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A featurized display, channel-major (`[c][row][col]`). Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedState(Arc<[f32]>);

impl EncodedState {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Value at channel `c`, row `row`, col `col`.
    pub fn get(&self, shape: StateShape, c: usize, row: usize, col: usize) -> f32 {
        self.0[(c * shape.height + row) * shape.width + col]
    }
}

/// Turns the display grid into a one-hot `[3, H, W]` state.
///
/// Each occupant adds 1.0 to its category channel at its cell, so overlapping
/// occupants accumulate. The scratch buffer is zeroed and reused every frame.
pub struct StateFeaturizer {
    shape: StateShape,
    scratch: Vec<f32>,
}

impl StateFeaturizer {
    pub fn new(shape: StateShape) -> Self {
        StateFeaturizer {
            shape,
            scratch: vec![0.0; shape.len()],
        }
    }

    pub fn shape(&self) -> StateShape {
        self.shape
    }

    /// Encode one frame.
    pub fn encode<O: Occupant>(
        &mut self,
        display: &[Vec<Option<O>>],
    ) -> Result<EncodedState, StateError> {
        let StateShape { height, width } = self.shape;
        let found_width = display.first().map_or(0, Vec::len);
        if display.len() != height || display.iter().any(|line| line.len() != width) {
            return Err(StateError::ShapeMismatch {
                height,
                width,
                found_height: display.len(),
                found_width,
            });
        }

        self.scratch.fill(0.0);
        for (row, line) in display.iter().enumerate() {
            for (col, cell) in line.iter().enumerate() {
                let Some(occupant) = cell else { continue };
                let index = occupant.state_index();
                if index >= CHANNELS {
                    return Err(StateError::UnknownCategory {
                        index,
                        row,
                        col,
                        channels: CHANNELS,
                    });
                }
                self.scratch[(index * height + row) * width + col] += 1.0;
            }
        }

        Ok(EncodedState(Arc::from(self.scratch.as_slice())))
    }
}

/// Encode a single state as a tensor of shape `[1, 3, H, W]`.
pub fn encode_state<B: Backend>(
    state: &EncodedState,
    shape: StateShape,
    device: &B::Device,
) -> Tensor<B, 4> {
    encode_states_batch::<B>(&[state], shape, device)
}

/// Stack states into a batched tensor of shape `[batch, 3, H, W]`.
pub fn encode_states_batch<B: Backend>(
    states: &[&EncodedState],
    shape: StateShape,
    device: &B::Device,
) -> Tensor<B, 4> {
    let mut flat = Vec::with_capacity(states.len() * shape.len());
    for state in states {
        flat.extend_from_slice(state.as_slice());
    }
    let data = TensorData::new(flat, [states.len(), CHANNELS, shape.height, shape.width]);
    Tensor::<B, 4>::from_data(data, device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    struct Tag(usize);

    impl Occupant for Tag {
        fn state_index(&self) -> usize {
            self.0
        }
    }

    fn grid(cells: &[(usize, usize, usize)], height: usize, width: usize) -> Vec<Vec<Option<Tag>>> {
        let mut display: Vec<Vec<Option<Tag>>> =
            (0..height).map(|_| (0..width).map(|_| None).collect()).collect();
        for &(row, col, tag) in cells {
            display[row][col] = Some(Tag(tag));
        }
        display
    }

    #[test]
    fn test_encode_empty_display_is_zero() {
        let shape = StateShape::new(2, 3);
        let mut featurizer = StateFeaturizer::new(shape);
        let state = featurizer.encode(&grid(&[], 2, 3)).unwrap();
        assert_eq!(state.as_slice().len(), 18);
        assert!(state.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_encode_places_one_hot_channels() {
        let shape = StateShape::new(2, 3);
        let mut featurizer = StateFeaturizer::new(shape);
        let state = featurizer
            .encode(&grid(&[(0, 0, 0), (1, 2, 1), (0, 1, 2)], 2, 3))
            .unwrap();

        assert_eq!(state.get(shape, 0, 0, 0), 1.0);
        assert_eq!(state.get(shape, 1, 1, 2), 1.0);
        assert_eq!(state.get(shape, 2, 0, 1), 1.0);
        assert_eq!(state.as_slice().iter().sum::<f32>(), 3.0);
        // Category 0 lands only in channel 0.
        assert_eq!(state.get(shape, 1, 0, 0), 0.0);
        assert_eq!(state.get(shape, 2, 0, 0), 0.0);
    }

    #[test]
    fn test_encode_resets_between_frames() {
        let shape = StateShape::new(2, 2);
        let mut featurizer = StateFeaturizer::new(shape);
        let first = featurizer.encode(&grid(&[(0, 0, 1)], 2, 2)).unwrap();
        let second = featurizer.encode(&grid(&[(1, 1, 1)], 2, 2)).unwrap();

        assert_eq!(first.get(shape, 1, 0, 0), 1.0);
        assert_eq!(second.get(shape, 1, 0, 0), 0.0);
        assert_eq!(second.get(shape, 1, 1, 1), 1.0);
    }

    #[test]
    fn test_encode_rejects_unknown_category() {
        let mut featurizer = StateFeaturizer::new(StateShape::new(2, 2));
        let err = featurizer.encode(&grid(&[(1, 0, 3)], 2, 2)).unwrap_err();
        assert_eq!(
            err,
            StateError::UnknownCategory {
                index: 3,
                row: 1,
                col: 0,
                channels: 3
            }
        );
    }

    #[test]
    fn test_encode_rejects_wrong_shape() {
        let mut featurizer = StateFeaturizer::new(StateShape::new(2, 2));
        let err = featurizer.encode(&grid(&[], 3, 2)).unwrap_err();
        assert!(matches!(err, StateError::ShapeMismatch { found_height: 3, .. }));
    }

    #[test]
    fn test_encode_state_tensor_has_batch_dim() {
        let shape = StateShape::new(4, 5);
        let mut featurizer = StateFeaturizer::new(shape);
        let state = featurizer.encode(&grid(&[(3, 4, 2)], 4, 5)).unwrap();
        let device = Default::default();
        let tensor = encode_state::<TestBackend>(&state, shape, &device);
        assert_eq!(tensor.dims(), [1, 3, 4, 5]);

        let data: Vec<f32> = tensor.into_data().to_vec().unwrap();
        assert_eq!(data[2 * 20 + 3 * 5 + 4], 1.0);
    }

    #[test]
    fn test_encode_batch() {
        let shape = StateShape::new(4, 5);
        let mut featurizer = StateFeaturizer::new(shape);
        let a = featurizer.encode(&grid(&[], 4, 5)).unwrap();
        let b = featurizer.encode(&grid(&[(0, 0, 0)], 4, 5)).unwrap();
        let device = Default::default();
        let batch = encode_states_batch::<TestBackend>(&[&a, &b], shape, &device);
        assert_eq!(batch.dims(), [2, 3, 4, 5]);
    }
}
