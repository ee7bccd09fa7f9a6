use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Capacity-bounded FIFO store with uniform sampling without replacement.
pub struct ReplayBuffer<T> {
    buffer: VecDeque<T>,
    capacity: usize,
    rng: StdRng,
}

impl<T> ReplayBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    /// A buffer whose sampling sequence is reproducible.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be > 0");
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            rng,
        }
    }

    /// Append to the back, evicting from the front once over capacity.
    pub fn push(&mut self, item: T) {
        self.buffer.push_back(item);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Draw `batch_size` distinct entries uniformly at random.
    ///
    /// # Panics
    /// If `batch_size` exceeds the current length.
    pub fn sample(&mut self, batch_size: usize) -> Vec<&T> {
        assert!(
            batch_size <= self.buffer.len(),
            "Not enough transitions to sample: requested {batch_size}, have {}",
            self.buffer.len()
        );
        let indices = index::sample(&mut self.rng, self.buffer.len(), batch_size);
        indices.iter().map(|i| &self.buffer[i]).collect()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
