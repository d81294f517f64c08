//! Columnstui — rules engine for a Columns-style falling-jewel matching puzzle.
//!
//! Triplets of jewels ("fallers") drop into a grid with three hidden buffer rows on top,
//! can be shifted and rotated while falling, freeze once they stop, and vanish when three
//! or more equal jewels line up horizontally, vertically or diagonally.
//!
//! [`GameState`] is the engine. A driver calls, per tick: [`GameState::tick`], the three
//! match checks, [`GameState::check_game_over`], then optionally spawns the next faller.
//! Player input arrives between ticks as [`Command`]s.

pub mod app;
pub mod error;
pub mod field;
pub mod game;
pub mod input;
pub mod theme;
pub mod ui;

use clap::ValueEnum;
use std::path::PathBuf;

pub use error::GameError;
pub use field::{BUFFER_ROWS, Cell, Jewel, Playfield};
pub use game::GameState;
pub use input::{Command, Control};

/// How the driver feeds the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Read one command per line from stdin.
    #[default]
    Script,
    /// Run the tick cycle with random spawns until game over or the tick limit.
    Auto,
}

/// Options derived from the CLI that shape the field and the driver.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub mode: Mode,
    /// File of initial visible rows.
    pub contents: Option<PathBuf>,
    pub seed: Option<u64>,
    /// Tick limit in auto mode.
    pub ticks: u32,
    pub color: bool,
    pub show_buffer: bool,
    /// Per-jewel `#RRGGBB` overrides.
    pub jewel_colors: Vec<(Jewel, String)>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 13,
            columns: 6,
            mode: Mode::Script,
            contents: None,
            seed: None,
            ticks: 500,
            color: false,
            show_buffer: false,
            jewel_colors: Vec::new(),
        }
    }
}
