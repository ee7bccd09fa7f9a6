//! # Arcade DQN
//!
//! A deep Q-learning controller for tick-based arcade games. Each tick it reads
//! the game's display grid, scores the three actions with a neural value
//! function, acts, and learns from replayed experience via the Burn ML
//! framework.
//!
//! ## Modules
//!
//! - [`game`] — Game and actuator contracts, actions, the shooting gallery
//! - [`ai`] — State encoding, action policies, value networks
//! - [`training`] — Replay buffer, Q-learning update, metrics
//! - [`checkpoint`] — Model persistence and metadata
//! - [`controller`] — The per-tick decision loop
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod backend;
pub mod checkpoint;
pub mod config;
pub mod controller;
pub mod error;
pub mod game;
pub mod logging;
pub mod training;
