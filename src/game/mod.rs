//! Contracts for the game the controller plays, the discrete action set, and a
//! small built-in shooting gallery used for demos and tests.
//!
//! The controller never looks inside the simulation: it reads the rendered
//! display grid, the running score, and advances one tick at a time through
//! [`Game::update`]. Player intents go through a separate [`Actuator`].

mod action;
mod gallery;

use std::rc::Rc;

pub use action::{Action, NUM_ACTIONS};
pub use gallery::{Gallery, GalleryConfig, GalleryError, GalleryPad, Sprite};

/// Anything that can occupy a display cell.
pub trait Occupant {
    /// Category channel this occupant is encoded into.
    fn state_index(&self) -> usize;
}

impl<T: Occupant + ?Sized> Occupant for &T {
    fn state_index(&self) -> usize {
        (**self).state_index()
    }
}

impl<T: Occupant + ?Sized> Occupant for Rc<T> {
    fn state_index(&self) -> usize {
        (**self).state_index()
    }
}

impl<T: Occupant + ?Sized> Occupant for Box<T> {
    fn state_index(&self) -> usize {
        (**self).state_index()
    }
}

/// The simulation driven by the controller.
pub trait Game {
    type Occupant: Occupant;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Display dimensions as `(height, width)`. Fixed for the game's lifetime.
    fn display_size(&self) -> (usize, usize);

    /// Current display, row-major, `height` rows of `width` cells each.
    fn current_display(&self) -> &[Vec<Option<Self::Occupant>>];

    /// Total score so far.
    fn total_point(&self) -> f64;

    /// Apply the latched action and advance the simulation by one tick.
    fn update(&mut self) -> Result<(), Self::Error>;
}

/// The player's controls. Exactly one intent is issued per tick.
pub trait Actuator {
    fn move_left(&mut self);
    fn move_right(&mut self);
    fn shoot_bullet(&mut self);
}
