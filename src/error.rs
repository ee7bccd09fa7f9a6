use std::path::PathBuf;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("unknown policy '{0}' (expected 'greedy', 'egreedy', or 'softmax')")]
    UnknownPolicy(String),

    #[error("unknown network '{0}' (expected 'cnn', 'mlp', or 'dueling')")]
    UnknownNetwork(String),

    #[error("unknown mode '{0}' (expected 'train' or 'play')")]
    UnknownMode(String),
}

/// Errors raised while turning a game display into a state tensor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("occupant at ({row}, {col}) has category {index}, expected < {channels}")]
    UnknownCategory {
        index: usize,
        row: usize,
        col: usize,
        channels: usize,
    },

    #[error("display is {found_height}x{found_width}, expected {height}x{width}")]
    ShapeMismatch {
        height: usize,
        width: usize,
        found_height: usize,
        found_width: usize,
    },
}

/// Errors that can occur while persisting or restoring the value function.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort a controller tick. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("state encoding error: {0}")]
    State(#[from] StateError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("tensor data extraction failed: {0}")]
    Tensor(String),

    #[error("value function returned {found} action values, expected {expected}")]
    ActionValues { expected: usize, found: usize },

    #[error("game update failed: {0}")]
    Game(#[source] Box<dyn std::error::Error + Send + Sync>),
}
