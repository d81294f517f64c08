//! Game state: playfield, controlled faller, settling, matching, game over.

use crate::error::{GameError, Result};
use crate::field::{BUFFER_ROWS, Cell, Direction, Jewel, Playfield};
use crate::input::{Command, Control};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Jewels forced in when no column has room; the spawn tops out.
const FALLBACK_JEWELS: [Jewel; 3] = [Jewel::S, Jewel::T, Jewel::V];

/// The controlled triplet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Faller {
    /// Top, middle, bottom.
    jewels: [Jewel; 3],
    /// 0-based column.
    column: usize,
    /// Row of the bottom jewel, buffer rows included.
    bottom_row: usize,
    /// Resting on something but not yet frozen.
    landed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Left,
    Right,
}

/// Engine for one game: owns the playfield and at most one faller.
#[derive(Debug, Clone)]
pub struct GameState {
    playfield: Playfield,
    faller: Option<Faller>,
    game_over: bool,
    rng: StdRng,
}

impl GameState {
    /// Empty field of `rows` visible rows and `columns` columns, randomly seeded.
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        Self::with_rng(rows, columns, StdRng::from_os_rng())
    }

    /// Like `new`, but random spawns are reproducible.
    pub fn with_seed(rows: usize, columns: usize, seed: u64) -> Result<Self> {
        Self::with_rng(rows, columns, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rows: usize, columns: usize, rng: StdRng) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidInput(format!(
                "field must have at least one row and one column, got {rows}x{columns}"
            )));
        }
        Ok(Self {
            playfield: Playfield::new(rows, columns),
            faller: None,
            game_over: false,
            rng,
        })
    }

    /// Pre-populate visible row `row` (0-based). Setup only.
    pub fn seed_row(&mut self, row: usize, line: &str) -> Result<()> {
        self.playfield.seed_row(row, line)
    }

    /// Parse and apply one command line.
    pub fn submit_command(&mut self, line: &str) -> Result<Control> {
        let command = line.parse::<Command>()?;
        self.apply(command)
    }

    pub fn apply(&mut self, command: Command) -> Result<Control> {
        match command {
            Command::Quit => return Ok(Control::Quit),
            Command::Tick => self.tick(),
            Command::Rotate => self.rotate(),
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::Spawn { column, jewels } => self.spawn(column, jewels)?,
        }
        Ok(Control::Continue)
    }

    /// Clear pending matches (with full settle), then one gravity step.
    pub fn tick(&mut self) {
        if self.game_over {
            return;
        }
        self.remove_matching();
        self.drop_once();
    }

    /// Place a faller at the top of `column` (1-based), jewels listed top to bottom.
    /// Does nothing while a faller is active or matches are pending.
    pub fn spawn(&mut self, column: usize, jewels: [Jewel; 3]) -> Result<()> {
        if self.game_over || self.faller.is_some() || self.playfield.has_matches() {
            return Ok(());
        }
        if column == 0 || column > self.playfield.columns() {
            return Err(GameError::ColumnOutOfRange(column.to_string()));
        }
        self.place_faller(column - 1, jewels);
        Ok(())
    }

    /// Write the faller into the buffer rows of `col` (0-based) and take one gravity step.
    /// Tops out if the column is already occupied up to the first visible row.
    fn place_faller(&mut self, col: usize, jewels: [Jewel; 3]) {
        let topped_out = (0..=BUFFER_ROWS).any(|row| self.playfield.get(row, col).is_some_and(|c| !c.is_empty()));
        if topped_out {
            debug!("spawn in column {} topped out", col + 1);
            self.game_over = true;
        }
        for (row, jewel) in jewels.iter().enumerate() {
            self.playfield.set(row, col, Cell::Falling(*jewel));
        }
        debug!("spawned {}{}{} in column {}", jewels[0], jewels[1], jewels[2], col + 1);
        self.faller = Some(Faller {
            jewels,
            column: col,
            bottom_row: BUFFER_ROWS - 1,
            landed: false,
        });
        self.drop_once();
    }

    /// Spawn random jewels in a random column whose top visible row is empty.
    /// With no such column, force a spawn in column 1 so the game tops out.
    pub fn spawn_random(&mut self) {
        if self.game_over || self.faller.is_some() || self.playfield.has_matches() {
            return;
        }
        let free: Vec<usize> = (0..self.playfield.columns())
            .filter(|&col| self.playfield.get(BUFFER_ROWS, col) == Some(Cell::Empty))
            .collect();
        let (col, jewels) = match free.choose(&mut self.rng) {
            Some(&col) => {
                let mut pick = || Jewel::ALL[self.rng.random_range(0..Jewel::ALL.len())];
                (col, [pick(), pick(), pick()])
            }
            None => {
                warn!("no free column; forcing spawn in column 1");
                (0, FALLBACK_JEWELS)
            }
        };
        self.place_faller(col, jewels);
    }

    /// Cycle the faller's jewels: bottom moves to the top.
    pub fn rotate(&mut self) {
        if self.game_over {
            return;
        }
        if let Some(ref mut faller) = self.faller {
            faller.jewels.rotate_right(1);
            self.playfield.cycle_three(faller.column, faller.bottom_row);
        }
    }

    pub fn move_left(&mut self) {
        self.shift(Shift::Left);
    }

    pub fn move_right(&mut self) {
        self.shift(Shift::Right);
    }

    fn shift(&mut self, shift: Shift) {
        if self.game_over {
            return;
        }
        let Some(ref mut faller) = self.faller else {
            return;
        };
        let from = faller.column;
        let to = match shift {
            Shift::Left => from.checked_sub(1),
            Shift::Right => Some(from + 1).filter(|&c| c < self.playfield.columns()),
        };
        let Some(to) = to else {
            return;
        };
        if !self.playfield.can_shift_faller(from, to) {
            trace!("shift {shift:?} blocked at column {from}");
            return;
        }
        self.playfield.shift_faller(from, to);
        faller.column = to;

        // Sliding off a stack can reveal space underneath.
        faller.landed = !self.playfield.has_gap_below_top(to);
        if faller.landed {
            self.playfield.land_column(to);
        } else {
            self.playfield.lift_column(to);
        }
    }

    /// One gravity step, then update the faller: advance and maybe land if it moved,
    /// freeze if it was already landed and nothing moved.
    pub fn drop_once(&mut self) -> bool {
        let moved = self.playfield.drop_step();
        trace!("drop step moved={moved}");
        let last_row = self.playfield.total_rows() - 1;
        let mut freeze = false;
        if let Some(ref mut faller) = self.faller {
            if moved {
                faller.bottom_row = (faller.bottom_row + 1).min(last_row);
                let below = faller.bottom_row + 1;
                let blocked = below > last_row
                    || self.playfield.get(below, faller.column).is_some_and(|c| !c.is_empty());
                if blocked {
                    faller.landed = true;
                    self.playfield.land_faller();
                }
            } else if faller.landed {
                freeze = true;
            } else {
                // Spawned directly on top of the stack.
                faller.landed = true;
                self.playfield.land_faller();
            }
        }
        if freeze {
            self.playfield.rest_faller();
            if let Some(faller) = self.faller.take() {
                debug!("faller froze in column {} at row {}", faller.column + 1, faller.bottom_row);
            }
        }
        moved
    }

    /// Repeat gravity steps until nothing moves.
    pub fn drop_jewels(&mut self) {
        while self.drop_once() {}
    }

    pub fn check_horizontal_match(&mut self) {
        self.check_match(Direction::Horizontal);
    }

    pub fn check_vertical_match(&mut self) {
        self.check_match(Direction::Vertical);
    }

    /// Both diagonal directions.
    pub fn check_diagonal_match(&mut self) {
        self.check_match(Direction::DiagonalDownRight);
        self.check_match(Direction::DiagonalDownLeft);
    }

    /// Matches are only evaluated on a settled field (no faller under control).
    fn check_match(&mut self, direction: Direction) {
        if self.faller.is_some() {
            return;
        }
        let windows = self.playfield.flag_runs(direction);
        if windows > 0 {
            debug!("{direction:?}: {windows} matching run(s) flagged");
        }
    }

    /// Empty every matched cell and, if any were cleared, settle fully.
    pub fn remove_matching(&mut self) {
        let cleared = self.playfield.clear_matched();
        if cleared > 0 {
            debug!("removed {cleared} matched jewel(s)");
            self.drop_jewels();
        }
    }

    /// Game ends when a frozen field with no pending matches reaches into the buffer.
    pub fn check_game_over(&mut self) {
        if self.game_over || self.faller.is_some() || self.playfield.has_matches() {
            return;
        }
        if self.playfield.buffer_occupied() {
            debug!("stack reached the buffer rows; game over");
            self.game_over = true;
        }
    }

    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub const fn rows(&self) -> usize {
        self.playfield.rows()
    }

    pub const fn columns(&self) -> usize {
        self.playfield.columns()
    }

    /// Read-only view of the playfield.
    pub const fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    /// Copy of every row, buffer included.
    pub fn full_field(&self) -> Vec<Vec<Cell>> {
        self.playfield.cells().to_vec()
    }

    /// Copy of the visible rows.
    pub fn visible_field(&self) -> Vec<Vec<Cell>> {
        self.playfield.visible().to_vec()
    }

    pub fn current_faller(&self) -> Option<[Jewel; 3]> {
        self.faller.as_ref().map(|f| f.jewels)
    }

    /// 0-based column of the active faller.
    pub fn faller_column(&self) -> Option<usize> {
        self.faller.as_ref().map(|f| f.column)
    }

    pub fn is_faller_landed(&self) -> bool {
        self.faller.as_ref().is_some_and(|f| f.landed)
    }

    /// No faller under control.
    pub const fn is_frozen(&self) -> bool {
        self.faller.is_none()
    }

    pub fn has_matches(&self) -> bool {
        self.playfield.has_matches()
    }
}
