#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use arcade_dqn::ai::networks::NetworkKind;
use arcade_dqn::ai::policy::Policy;
use arcade_dqn::backend::{select_device, TrainBackend};
use arcade_dqn::config::{AppConfig, RunMode};
use arcade_dqn::controller::AiController;
use arcade_dqn::game::Gallery;
use arcade_dqn::logging::init_logging;

/// Drive the shooting gallery with a deep Q-learning controller.
#[derive(Parser)]
#[command(name = "arcade-dqn", about = "Play or train a DQN agent on the shooting gallery")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Run mode: train or play
    #[arg(long)]
    mode: Option<String>,

    /// Action policy: greedy, egreedy or softmax
    #[arg(long)]
    policy: Option<String>,

    /// Value network: cnn, mlp or dueling
    #[arg(long)]
    network: Option<String>,

    /// GPU device index (requires the `gpu` feature)
    #[arg(long)]
    gpu: Option<usize>,

    /// Model file to load at startup and save to while training
    #[arg(long)]
    model: Option<PathBuf>,

    /// Log per-tick Q-values and actions
    #[arg(long, short)]
    verbose: bool,

    /// Stop after this many ticks (runs until interrupted otherwise)
    #[arg(long)]
    ticks: Option<u64>,

    /// Seed for exploration, replay sampling and the game
    #[arg(long)]
    seed: Option<u64>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = build_config(&cli)?;
    init_logging(config.run.verbose);

    let device = select_device(config.run.gpu);
    let game = Gallery::new(config.game.clone()).context("creating gallery")?;
    let pad = game.pad();

    let mut controller =
        AiController::<TrainBackend, _, _>::new(game, pad, &config, &device)
            .context("creating controller")?;

    let mut tick = 0u64;
    while cli.ticks.is_none_or(|limit| tick < limit) {
        controller
            .tick()
            .with_context(|| format!("tick {}", controller.timestamp() + 1))?;
        tick += 1;
    }

    if config.run.mode == RunMode::Train {
        controller.save().context("saving final model")?;
    }
    info!(
        "finished after {} ticks: score {:.4}, epsilon {:.4}, avg loss {:.6}",
        controller.timestamp(),
        controller.score(),
        controller.epsilon(),
        controller.average_loss()
    );
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn build_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(mode) = &cli.mode {
        config.run.mode = mode.parse::<RunMode>()?;
    }
    if let Some(policy) = &cli.policy {
        config.run.policy = policy.parse::<Policy>()?;
    }
    if let Some(network) = &cli.network {
        config.run.network = network.parse::<NetworkKind>()?;
    }
    if cli.gpu.is_some() {
        config.run.gpu = cli.gpu;
    }
    if cli.model.is_some() {
        config.checkpoint.model_path = cli.model.clone();
    }
    if cli.verbose {
        config.run.verbose = true;
    }
    if let Some(seed) = cli.seed {
        config.run.seed = Some(seed);
        config.game.seed = Some(seed);
    }

    config.validate().context("validating configuration")?;
    Ok(config)
}
