use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Moving average over the last `window` recorded values.
#[derive(Debug, Clone)]
pub struct RunningAverage {
    values: VecDeque<f32>,
    window: usize,
    total_recorded: u64, // lifetime count, never capped
}

impl RunningAverage {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "running average window must be > 0");
        RunningAverage {
            values: VecDeque::with_capacity(window),
            window,
            total_recorded: 0,
        }
    }

    pub fn record(&mut self, value: f32) {
        self.total_recorded += 1;
        self.values.push_back(value);
        if self.values.len() > self.window {
            self.values.pop_front();
        }
    }

    /// Mean of the values in the window, 0.0 when nothing has been recorded.
    pub fn average(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    pub fn last(&self) -> Option<f32> {
        self.values.back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }
}

/// Tick throughput over a resettable window.
pub struct TickTiming {
    window_start: Instant,
    window_ticks: u64,
    window_overhead: Duration, // throttle sleeps and saves, excluded from throughput
}

impl TickTiming {
    pub fn new() -> Self {
        TickTiming {
            window_start: Instant::now(),
            window_ticks: 0,
            window_overhead: Duration::ZERO,
        }
    }

    pub fn record_tick(&mut self) {
        self.window_ticks += 1;
    }

    pub fn record_overhead(&mut self, d: Duration) {
        self.window_overhead += d;
    }

    /// Ticks per second since the last `reset_window`, excluding overhead.
    pub fn ticks_per_sec(&self) -> f32 {
        let net = self.window_start.elapsed().saturating_sub(self.window_overhead);
        if net.is_zero() {
            return 0.0;
        }
        self.window_ticks as f32 / net.as_secs_f32()
    }

    pub fn reset_window(&mut self) {
        self.window_start = Instant::now();
        self.window_ticks = 0;
        self.window_overhead = Duration::ZERO;
    }
}

impl Default for TickTiming {
    fn default() -> Self {
        Self::new()
    }
}
