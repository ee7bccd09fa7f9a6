use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Action, Actuator, Game, Occupant};

/// Shooting gallery tuning.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub height: usize,
    pub width: usize,
    /// Ticks between block spawns.
    pub spawn_interval: u64,
    /// Ticks between block moves.
    pub fall_interval: u64,
    pub hit_points: f64,
    pub miss_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        GalleryConfig {
            height: 12,
            width: 16,
            spawn_interval: 6,
            fall_interval: 2,
            hit_points: 100.0,
            miss_penalty: 100.0,
            seed: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("gallery must be at least 3x2, got {height}x{width}")]
    TooSmall { height: usize, width: usize },

    #[error("gallery intervals must be > 0")]
    ZeroInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Block,
    Player,
    Bullet,
}

impl Occupant for Sprite {
    fn state_index(&self) -> usize {
        match self {
            Sprite::Block => 0,
            Sprite::Player => 1,
            Sprite::Bullet => 2,
        }
    }
}

/// Player handle for a [`Gallery`]. Intents are latched and consumed by the
/// next `update`; a later intent in the same tick replaces an earlier one.
#[derive(Debug, Clone)]
pub struct GalleryPad {
    intent: Rc<Cell<Option<Action>>>,
}

impl Actuator for GalleryPad {
    fn move_left(&mut self) {
        self.intent.set(Some(Action::MoveLeft));
    }

    fn move_right(&mut self) {
        self.intent.set(Some(Action::MoveRight));
    }

    fn shoot_bullet(&mut self) {
        self.intent.set(Some(Action::Shoot));
    }
}

/// Blocks fall from the top row; the player slides along the bottom row and
/// shoots bullets straight up. Destroying a block scores `hit_points`, a block
/// reaching the bottom row costs `miss_penalty`.
pub struct Gallery {
    config: GalleryConfig,
    player_col: usize,
    blocks: Vec<(usize, usize)>,
    bullets: Vec<(usize, usize)>,
    score: f64,
    tick: u64,
    intent: Rc<Cell<Option<Action>>>,
    display: Vec<Vec<Option<Sprite>>>,
    rng: StdRng,
}

impl Gallery {
    pub fn new(config: GalleryConfig) -> Result<Self, GalleryError> {
        if config.height < 3 || config.width < 2 {
            return Err(GalleryError::TooSmall {
                height: config.height,
                width: config.width,
            });
        }
        if config.spawn_interval == 0 || config.fall_interval == 0 {
            return Err(GalleryError::ZeroInterval);
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut gallery = Gallery {
            player_col: config.width / 2,
            blocks: Vec::new(),
            bullets: Vec::new(),
            score: 0.0,
            tick: 0,
            intent: Rc::new(Cell::new(None)),
            display: vec![vec![None; config.width]; config.height],
            rng,
            config,
        };
        gallery.redraw();
        Ok(gallery)
    }

    /// A player handle bound to this gallery.
    pub fn pad(&self) -> GalleryPad {
        GalleryPad {
            intent: Rc::clone(&self.intent),
        }
    }

    pub fn player_col(&self) -> usize {
        self.player_col
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn blocks(&self) -> &[(usize, usize)] {
        &self.blocks
    }

    pub fn bullets(&self) -> &[(usize, usize)] {
        &self.bullets
    }

    /// Place a block directly, bypassing the spawner.
    pub fn place_block(&mut self, row: usize, col: usize) {
        if row < self.config.height && col < self.config.width {
            self.blocks.push((row, col));
            self.redraw();
        }
    }

    fn bottom_row(&self) -> usize {
        self.config.height - 1
    }

    fn apply_intent(&mut self) {
        match self.intent.take() {
            Some(Action::MoveLeft) => self.player_col = self.player_col.saturating_sub(1),
            Some(Action::MoveRight) => {
                self.player_col = (self.player_col + 1).min(self.config.width - 1)
            }
            Some(Action::Shoot) => {
                let muzzle = (self.bottom_row() - 1, self.player_col);
                if !self.bullets.contains(&muzzle) {
                    self.bullets.push(muzzle);
                }
            }
            None => {}
        }
    }

    /// Remove every bullet/block pair sharing a cell.
    fn resolve_hits(&mut self) {
        let mut hits = 0;
        self.bullets.retain(|bullet| {
            if let Some(i) = self.blocks.iter().position(|block| block == bullet) {
                self.blocks.swap_remove(i);
                hits += 1;
                false
            } else {
                true
            }
        });
        self.score += hits as f64 * self.config.hit_points;
    }

    fn advance_bullets(&mut self) {
        self.bullets.retain_mut(|(row, _)| {
            if *row == 0 {
                false
            } else {
                *row -= 1;
                true
            }
        });
    }

    fn advance_blocks(&mut self) {
        let bottom = self.bottom_row();
        let before = self.blocks.len();
        for block in &mut self.blocks {
            block.0 += 1;
        }
        self.blocks.retain(|&(row, _)| row < bottom);
        let missed = before - self.blocks.len();
        self.score -= missed as f64 * self.config.miss_penalty;
    }

    fn spawn_block(&mut self) {
        let col = self.rng.random_range(0..self.config.width);
        if !self.blocks.contains(&(0, col)) {
            self.blocks.push((0, col));
        }
    }

    fn redraw(&mut self) {
        for row in &mut self.display {
            row.fill(None);
        }
        for &(row, col) in &self.blocks {
            self.display[row][col] = Some(Sprite::Block);
        }
        for &(row, col) in &self.bullets {
            self.display[row][col] = Some(Sprite::Bullet);
        }
        let bottom = self.bottom_row();
        self.display[bottom][self.player_col] = Some(Sprite::Player);
    }
}

impl Game for Gallery {
    type Occupant = Sprite;
    type Error = Infallible;

    fn display_size(&self) -> (usize, usize) {
        (self.config.height, self.config.width)
    }

    fn current_display(&self) -> &[Vec<Option<Sprite>>] {
        &self.display
    }

    fn total_point(&self) -> f64 {
        self.score
    }

    fn update(&mut self) -> Result<(), Infallible> {
        self.apply_intent();
        self.resolve_hits();
        self.advance_bullets();
        self.resolve_hits();

        self.tick += 1;
        if self.tick % self.config.fall_interval == 0 {
            self.advance_blocks();
            self.resolve_hits();
        }
        if self.tick % self.config.spawn_interval == 0 {
            self.spawn_block();
        }

        self.redraw();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_gallery() -> Gallery {
        Gallery::new(GalleryConfig {
            height: 6,
            width: 5,
            spawn_interval: 1_000,
            fall_interval: 1_000,
            seed: Some(7),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_tiny_display() {
        let result = Gallery::new(GalleryConfig {
            height: 2,
            width: 5,
            ..Default::default()
        });
        assert!(matches!(result, Err(GalleryError::TooSmall { .. })));
    }

    #[test]
    fn test_player_drawn_on_bottom_row() {
        let gallery = quiet_gallery();
        let display = gallery.current_display();
        assert_eq!(display.len(), 6);
        assert_eq!(display[5][2], Some(Sprite::Player));
    }

    #[test]
    fn test_pad_moves_player_and_clamps() {
        let mut gallery = quiet_gallery();
        let mut pad = gallery.pad();
        for _ in 0..10 {
            pad.move_right();
            gallery.update().unwrap();
        }
        assert_eq!(gallery.player_col(), 4);
        for _ in 0..10 {
            pad.move_left();
            gallery.update().unwrap();
        }
        assert_eq!(gallery.player_col(), 0);
    }

    #[test]
    fn test_intent_is_consumed_once() {
        let mut gallery = quiet_gallery();
        let mut pad = gallery.pad();
        pad.move_left();
        gallery.update().unwrap();
        gallery.update().unwrap();
        assert_eq!(gallery.player_col(), 1);
    }

    #[test]
    fn test_bullet_destroys_block_and_scores() {
        let mut gallery = quiet_gallery();
        gallery.place_block(1, 2);
        let mut pad = gallery.pad();
        pad.shoot_bullet();
        for _ in 0..5 {
            gallery.update().unwrap();
        }
        assert!(gallery.blocks().is_empty());
        assert!(gallery.bullets().is_empty());
        assert_eq!(gallery.total_point(), 100.0);
    }

    #[test]
    fn test_block_reaching_bottom_costs_points() {
        let mut gallery = Gallery::new(GalleryConfig {
            height: 4,
            width: 3,
            spawn_interval: 1_000,
            fall_interval: 1,
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        gallery.place_block(1, 0);
        gallery.update().unwrap();
        gallery.update().unwrap();
        assert!(gallery.blocks().is_empty());
        assert_eq!(gallery.total_point(), -100.0);
    }

    #[test]
    fn test_spawner_adds_blocks_on_top_row() {
        let mut gallery = Gallery::new(GalleryConfig {
            spawn_interval: 1,
            fall_interval: 1_000,
            seed: Some(3),
            ..Default::default()
        })
        .unwrap();
        gallery.update().unwrap();
        assert_eq!(gallery.blocks().len(), 1);
        assert_eq!(gallery.blocks()[0].0, 0);
    }
}
