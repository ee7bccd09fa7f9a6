//! The per-tick decision loop.
//!
//! Each call to [`AiController::tick`] runs one straight-line pass:
//!
//! 1. encode the current display
//! 2. score it with the value function
//! 3. pick an action and anneal epsilon
//! 4. actuate and advance the game by one tick
//! 5. throttle to the frame interval (play mode only)
//! 6. turn the score delta into a reward
//! 7. encode the next display and store the transition
//! 8. train on a minibatch once warm-up has passed (train mode only)
//! 9. persist the model every `save_interval` ticks (train mode only)

use std::time::{Duration, Instant};

use burn::tensor::backend::AutodiffBackend;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::policy::{ActionSelector, EpsilonSchedule, Policy};
use crate::ai::state_encoding::{encode_state, StateFeaturizer, StateShape};
use crate::ai::value_function::ValueFunction;
use crate::checkpoint::{CheckpointMetadata, ModelStore};
use crate::config::{AgentConfig, AppConfig, RunMode};
use crate::error::ControllerError;
use crate::game::{Action, Actuator, Game};
use crate::training::q_learning::{action_values, train_step};
use crate::training::{ReplayBuffer, RunningAverage, TickTiming, Transition};

/// Counters the loop mutates every tick.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Completed ticks.
    pub timestamp: u64,
    pub epsilon: EpsilonSchedule,
    /// Running score: `point * gamma + reward` each tick.
    pub point: f64,
}

impl AgentState {
    pub fn new(agent: &AgentConfig) -> Self {
        AgentState {
            timestamp: 0,
            epsilon: EpsilonSchedule::new(
                agent.initial_epsilon,
                agent.final_epsilon,
                agent.exploration_frames,
                agent.observe_frames,
            ),
            point: 0.0,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub q_values: Vec<f32>,
    pub action: Action,
    pub reward: f32,
    pub score: f64,
    /// Set when a training step ran this tick.
    pub loss: Option<f32>,
}

/// Plays `G` through the actuator `P`, learning from each tick in train mode.
pub struct AiController<B, G, P>
where
    B: AutodiffBackend,
    G: Game,
    P: Actuator,
{
    game: G,
    player: P,
    value_fn: Box<dyn ValueFunction<B>>,
    featurizer: StateFeaturizer,
    selector: ActionSelector,
    replay: ReplayBuffer<Transition>,
    losses: RunningAverage,
    timing: TickTiming,
    store: Option<ModelStore>,
    agent: AgentConfig,
    mode: RunMode,
    frame_interval: Duration,
    log_interval: u64,
    save_interval: u64,
    state: AgentState,
    last_tick: Option<Instant>,
    rng: StdRng,
}

impl<B, G, P> AiController<B, G, P>
where
    B: AutodiffBackend,
    G: Game,
    P: Actuator,
{
    /// Build the configured network for the game's display and attach it.
    pub fn new(
        game: G,
        player: P,
        config: &AppConfig,
        device: &B::Device,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        let (height, width) = game.display_size();
        let value_fn = config.run.network.build::<B>(
            StateShape::new(height, width),
            config.agent.learning_rate,
            device,
        );
        Self::with_value_function(game, player, value_fn, config)
    }

    /// Attach an already constructed value function.
    ///
    /// When a model path is configured, saved parameters are loaded here. A
    /// missing or unreadable file is logged and the fresh parameters are kept.
    pub fn with_value_function(
        game: G,
        player: P,
        mut value_fn: Box<dyn ValueFunction<B>>,
        config: &AppConfig,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        let (height, width) = game.display_size();
        let mut state = AgentState::new(&config.agent);

        let store = config.checkpoint.model_path.clone().map(ModelStore::new);
        if let Some(store) = &store {
            match store.load(value_fn.as_mut()) {
                Ok(Some(meta)) => {
                    info!(
                        "loaded {} model from {} (tick {}, epsilon {:.4})",
                        meta.network,
                        store.model_path().display(),
                        meta.tick,
                        meta.epsilon
                    );
                    if config.checkpoint.resume_exploration {
                        state.epsilon.restore(meta.epsilon);
                    }
                }
                Ok(None) => info!("loaded model from {}", store.model_path().display()),
                Err(e) => warn!(
                    "could not load model from {}, starting fresh: {e}",
                    store.model_path().display()
                ),
            }
        }

        let seed = config.run.seed;
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let replay = match seed {
            Some(seed) => ReplayBuffer::with_seed(config.agent.replay_capacity, seed.wrapping_add(1)),
            None => ReplayBuffer::new(config.agent.replay_capacity),
        };

        info!(
            "controller ready: mode={} policy={} network={} display={}x{}",
            config.run.mode,
            config.run.policy,
            value_fn.name(),
            height,
            width
        );

        Ok(AiController {
            game,
            player,
            value_fn,
            featurizer: StateFeaturizer::new(StateShape::new(height, width)),
            selector: ActionSelector::new(config.run.policy, config.agent.softmax_temperature),
            replay,
            losses: RunningAverage::new(config.agent.loss_window),
            timing: TickTiming::new(),
            store,
            agent: config.agent.clone(),
            mode: config.run.mode,
            frame_interval: Duration::from_millis(config.run.frame_interval_ms),
            log_interval: config.run.log_interval,
            save_interval: config.checkpoint.save_interval,
            state,
            last_tick: None,
            rng,
        })
    }

    /// Advance the game by exactly one tick.
    pub fn tick(&mut self) -> Result<TickReport, ControllerError> {
        let shape = self.featurizer.shape();
        let device = self.value_fn.device();

        let state = self.featurizer.encode(self.game.current_display())?;
        let q = self.value_fn.evaluate(encode_state::<B>(&state, shape, &device));
        let q_values = action_values(q, 1)?;
        debug!("Q: {q_values:?}");

        let action = self
            .selector
            .select(&q_values, self.state.epsilon.value(), &mut self.rng);
        self.state.epsilon.anneal(self.state.timestamp);

        action.apply(&mut self.player);
        let prev_point = self.game.total_point();
        self.game
            .update()
            .map_err(|e| ControllerError::Game(Box::new(e)))?;
        self.state.timestamp += 1;

        if !self.mode.is_training() {
            self.throttle();
        }

        let delta = self.game.total_point() - prev_point;
        let reward = (delta * f64::from(self.agent.reward_scale)) as f32;
        self.state.point = self.state.point * f64::from(self.agent.gamma) + f64::from(reward);
        debug!("TIME: {}, GAME SCORE: {:.4}", self.state.timestamp, self.state.point);

        let state_prime = self.featurizer.encode(self.game.current_display())?;
        self.replay.push(Transition {
            state,
            action,
            reward,
            state_prime,
        });

        let mut loss = None;
        if self.mode.is_training() && self.state.timestamp > self.agent.observe_frames {
            let value = train_step(
                self.value_fn.as_mut(),
                &mut self.replay,
                shape,
                self.agent.batch_size,
                self.agent.gamma,
            )?;
            self.losses.record(value);
            info!("LOSS: {value:.6}");
            loss = Some(value);

            if self.state.timestamp % self.save_interval == 0 {
                let started = Instant::now();
                self.save()?;
                self.timing.record_overhead(started.elapsed());
            }
        }

        self.timing.record_tick();
        if self.state.timestamp % self.log_interval == 0 {
            self.log_summary();
        }

        Ok(TickReport {
            tick: self.state.timestamp,
            q_values,
            action,
            reward,
            score: self.state.point,
            loss,
        })
    }

    /// Persist the value function and its metadata sidecar. A no-op without a
    /// configured model path.
    pub fn save(&self) -> Result<(), ControllerError> {
        let Some(store) = &self.store else {
            debug!("no model path configured, skipping save");
            return Ok(());
        };
        let metadata = CheckpointMetadata::new(
            self.state.timestamp,
            self.state.epsilon.value(),
            self.losses.average(),
            self.value_fn.name(),
            self.selector.policy().name(),
        );
        store.save(self.value_fn.as_ref(), &metadata)?;
        info!("saved model to {}", store.model_path().display());
        Ok(())
    }

    fn throttle(&mut self) {
        if let Some(prev) = self.last_tick {
            let elapsed = prev.elapsed();
            if elapsed < self.frame_interval {
                let wait = self.frame_interval - elapsed;
                std::thread::sleep(wait);
                self.timing.record_overhead(wait);
            }
        }
        self.last_tick = Some(Instant::now());
    }

    fn log_summary(&mut self) {
        info!(
            "tick {} | eps {:.4} | avg loss {:.6} | score {:.4} | {:.1} ticks/s | replay {}",
            self.state.timestamp,
            self.state.epsilon.value(),
            self.losses.average(),
            self.state.point,
            self.timing.ticks_per_sec(),
            self.replay.len()
        );
        self.timing.reset_window();
    }

    pub fn timestamp(&self) -> u64 {
        self.state.timestamp
    }

    pub fn epsilon(&self) -> f32 {
        self.state.epsilon.value()
    }

    /// Override the exploration rate, e.g. 1.0 to force random play.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.state.epsilon.set(epsilon);
    }

    /// Decayed running score.
    pub fn score(&self) -> f64 {
        self.state.point
    }

    pub fn average_loss(&self) -> f32 {
        self.losses.average()
    }

    pub fn replay_len(&self) -> usize {
        self.replay.len()
    }

    pub fn replay(&self) -> &ReplayBuffer<Transition> {
        &self.replay
    }

    pub fn agent_state(&self) -> &AgentState {
        &self.state
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn policy(&self) -> Policy {
        self.selector.policy()
    }

    pub fn value_function(&self) -> &dyn ValueFunction<B> {
        self.value_fn.as_ref()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

