use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::warn;

use crate::ai::networks::NetworkKind;
use crate::ai::policy::Policy;
use crate::error::ConfigError;
use crate::game::GalleryConfig;

/// Whether the controller learns from its experience or only plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Train,
    Play,
}

impl RunMode {
    pub fn name(self) -> &'static str {
        match self {
            RunMode::Train => "train",
            RunMode::Play => "play",
        }
    }

    pub fn is_training(self) -> bool {
        self == RunMode::Train
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(RunMode::Train),
            "play" => Ok(RunMode::Play),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Learning hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Warm-up ticks before epsilon annealing and training begin.
    pub observe_frames: u64,
    pub replay_capacity: usize,
    pub batch_size: usize,
    pub gamma: f32,
    pub initial_epsilon: f32,
    pub final_epsilon: f32,
    /// Ticks over which epsilon falls from initial to final.
    pub exploration_frames: u64,
    pub softmax_temperature: f32,
    /// Multiplier from score delta to reward.
    pub reward_scale: f32,
    pub learning_rate: f64,
    /// Number of recent losses in the running average.
    pub loss_window: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            observe_frames: 3200,
            replay_capacity: 50_000,
            batch_size: 32,
            gamma: 0.97,
            initial_epsilon: 0.3,
            final_epsilon: 0.01,
            exploration_frames: 100_000,
            softmax_temperature: 0.1,
            reward_scale: 0.01,
            learning_rate: 1e-3,
            loss_window: 100,
        }
    }
}

/// How the controller runs: mode, policy, network, device, pacing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub mode: RunMode,
    pub verbose: bool,
    pub policy: Policy,
    pub network: NetworkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<usize>,
    /// Minimum wall-clock time per tick in play mode.
    pub frame_interval_ms: u64,
    /// Ticks between summary log lines.
    pub log_interval: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            mode: RunMode::Train,
            verbose: false,
            policy: Policy::EpsilonGreedy,
            network: NetworkKind::Cnn,
            gpu: None,
            frame_interval_ms: 100,
            log_interval: 100,
            seed: None,
        }
    }
}

/// Model persistence. Without a `model_path` nothing is loaded or saved.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    pub save_interval: u64,
    /// Restore epsilon from the metadata sidecar on load.
    pub resume_exploration: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        CheckpointConfig {
            model_path: None,
            save_interval: 100,
            resume_exploration: false,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub run: RunConfig,
    pub checkpoint: CheckpointConfig,
    pub game: GalleryConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let agent = &self.agent;

        if !agent.learning_rate.is_finite() || agent.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "agent.learning_rate must be > 0".into(),
            ));
        }
        if !agent.softmax_temperature.is_finite() || agent.softmax_temperature <= 0.0 {
            return Err(ConfigError::Validation(
                "agent.softmax_temperature must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&agent.gamma) {
            return Err(ConfigError::Validation(
                "agent.gamma must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&agent.initial_epsilon) {
            return Err(ConfigError::Validation(
                "agent.initial_epsilon must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&agent.final_epsilon) {
            return Err(ConfigError::Validation(
                "agent.final_epsilon must be in [0, 1]".into(),
            ));
        }
        if agent.final_epsilon > agent.initial_epsilon {
            return Err(ConfigError::Validation(
                "agent.final_epsilon must be <= agent.initial_epsilon".into(),
            ));
        }
        if agent.batch_size == 0 {
            return Err(ConfigError::Validation(
                "agent.batch_size must be > 0".into(),
            ));
        }
        if agent.replay_capacity < agent.batch_size {
            return Err(ConfigError::Validation(
                "agent.replay_capacity must be >= agent.batch_size".into(),
            ));
        }
        if agent.observe_frames < agent.batch_size as u64 {
            return Err(ConfigError::Validation(
                "agent.observe_frames must be >= agent.batch_size".into(),
            ));
        }
        if agent.exploration_frames == 0 {
            return Err(ConfigError::Validation(
                "agent.exploration_frames must be > 0".into(),
            ));
        }
        if agent.loss_window == 0 {
            return Err(ConfigError::Validation(
                "agent.loss_window must be > 0".into(),
            ));
        }

        if self.run.log_interval == 0 {
            return Err(ConfigError::Validation(
                "run.log_interval must be > 0".into(),
            ));
        }
        if self.checkpoint.save_interval == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.save_interval must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[agent]
gamma = 0.5
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!((config.agent.gamma - 0.5).abs() < 1e-6);
        // Other fields should be defaults
        assert_eq!(config.agent.observe_frames, 3200);
        assert_eq!(config.run.policy, Policy::EpsilonGreedy);
        assert_eq!(config.checkpoint.save_interval, 100);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.agent.replay_capacity, 50_000);
        assert_eq!(config.agent.batch_size, 32);
        assert_eq!(config.run.mode, RunMode::Train);
        assert_eq!(config.run.network, NetworkKind::Cnn);
        assert!(config.checkpoint.model_path.is_none());
    }

    #[test]
    fn test_run_section_tags() {
        let toml_str = r#"
[run]
mode = "play"
policy = "softmax"
network = "dueling"
gpu = 1
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.mode, RunMode::Play);
        assert_eq!(config.run.policy, Policy::Softmax);
        assert_eq!(config.run.network, NetworkKind::Dueling);
        assert_eq!(config.run.gpu, Some(1));
    }

    #[test]
    fn test_unknown_policy_tag_is_rejected() {
        let toml_str = r#"
[run]
policy = "boltzmann"
"#;
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("train".parse::<RunMode>().unwrap(), RunMode::Train);
        assert_eq!("play".parse::<RunMode>().unwrap(), RunMode::Play);
        assert!(matches!(
            "watch".parse::<RunMode>(),
            Err(ConfigError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_validation_rejects_negative_lr() {
        let mut config = AppConfig::default();
        config.agent.learning_rate = -0.001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_temperature() {
        let mut config = AppConfig::default();
        config.agent.softmax_temperature = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_finite_rates() {
        let mut config = AppConfig::default();
        config.agent.learning_rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.softmax_temperature = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.softmax_temperature = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.gamma = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_invalid_gamma() {
        let mut config = AppConfig::default();
        config.agent.gamma = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_epsilon_out_of_range() {
        let mut config = AppConfig::default();
        config.agent.initial_epsilon = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.final_epsilon = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_final_epsilon_gt_initial() {
        let mut config = AppConfig::default();
        config.agent.initial_epsilon = 0.1;
        config.agent.final_epsilon = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_replay_capacity_lt_batch() {
        let mut config = AppConfig::default();
        config.agent.replay_capacity = 10;
        config.agent.batch_size = 64;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_observe_lt_batch() {
        let mut config = AppConfig::default();
        config.agent.observe_frames = 8;
        config.agent.batch_size = 32;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_intervals() {
        let mut config = AppConfig::default();
        config.checkpoint.save_interval = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.run.log_interval = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.exploration_frames = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.loss_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.agent.observe_frames, 3200);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[checkpoint]
model_path = "network.model"
save_interval = 10000
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(
            config.checkpoint.model_path.as_deref(),
            Some(Path::new("network.model"))
        );
        assert_eq!(config.checkpoint.save_interval, 10_000);
        // Others are defaults
        assert!((config.agent.learning_rate - 1e-3).abs() < 1e-9);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[agent]\nbatch_size = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }
}
