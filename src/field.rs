//! Playfield: jewels, tagged cells, single-step gravity and match scans.

use crate::error::{GameError, Result};
use std::fmt;
use std::str::FromStr;

/// Hidden rows above the visible area; fallers spawn here.
pub const BUFFER_ROWS: usize = 3;

/// Shortest run of equal jewels that gets flagged.
const MATCH_LEN: usize = 3;

/// Jewel colours (symbols S, T, V, W, X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Jewel {
    S,
    T,
    V,
    W,
    X,
    Y,
    Z,
}

impl Jewel {
    pub const ALL: [Self; 7] = [Self::S, Self::T, Self::V, Self::W, Self::X, Self::Y, Self::Z];

    pub const fn symbol(self) -> char {
        match self {
            Self::S => 'S',
            Self::T => 'T',
            Self::V => 'V',
            Self::W => 'W',
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'S' => Some(Self::S),
            'T' => Some(Self::T),
            'V' => Some(Self::V),
            'W' => Some(Self::W),
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Index into `ALL` (used for palette lookups).
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Jewel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Jewel {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_symbol(c).ok_or_else(|| GameError::InvalidJewel(s.to_string())),
            _ => Err(GameError::InvalidJewel(s.to_string())),
        }
    }
}

/// One grid position, tagged with its render state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Settled jewel.
    Resting(Jewel),
    /// Part of the controlled faller, still descending.
    Falling(Jewel),
    /// Part of the controlled faller, landed but not frozen.
    Landed(Jewel),
    /// Flagged for removal on the next tick.
    Matched(Jewel),
}

impl Cell {
    pub const fn jewel(self) -> Option<Jewel> {
        match self {
            Self::Empty => None,
            Self::Resting(j) | Self::Falling(j) | Self::Landed(j) | Self::Matched(j) => Some(j),
        }
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// True for cells owned by the controlled faller.
    pub const fn is_faller_part(self) -> bool {
        matches!(self, Self::Falling(_) | Self::Landed(_))
    }

    pub const fn is_matched(self) -> bool {
        matches!(self, Self::Matched(_))
    }

    const fn landed(self) -> Self {
        match self {
            Self::Falling(j) => Self::Landed(j),
            other => other,
        }
    }

    const fn lifted(self) -> Self {
        match self {
            Self::Landed(j) => Self::Falling(j),
            other => other,
        }
    }

    const fn rested(self) -> Self {
        match self {
            Self::Falling(j) | Self::Landed(j) => Self::Resting(j),
            other => other,
        }
    }
}

/// Scan direction as (row step, column step). Rows only ever step downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
    /// Down and to the right.
    DiagonalDownRight,
    /// Down and to the left.
    DiagonalDownLeft,
}

impl Direction {
    const fn step(self) -> (usize, isize) {
        match self {
            Self::Horizontal => (0, 1),
            Self::Vertical => (1, 0),
            Self::DiagonalDownRight => (1, 1),
            Self::DiagonalDownLeft => (1, -1),
        }
    }
}

/// Grid of `rows + BUFFER_ROWS` by `columns` cells. Row 0 is the top buffer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playfield {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<Cell>>,
}

impl Playfield {
    pub fn new(rows: usize, columns: usize) -> Self {
        let cells = (0..rows + BUFFER_ROWS).map(|_| vec![Cell::Empty; columns]).collect();
        Self { rows, columns, cells }
    }

    /// Visible rows (buffer excluded).
    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Rows including the hidden buffer.
    #[inline]
    pub const fn total_rows(&self) -> usize {
        self.rows + BUFFER_ROWS
    }

    #[inline]
    pub fn get(&self, row: usize, column: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    #[inline]
    pub fn set(&mut self, row: usize, column: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            *slot = cell;
        }
    }

    #[inline]
    fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.get(row, column).is_some_and(|c| !c.is_empty())
    }

    /// All rows, buffer included.
    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Rows below the buffer.
    pub fn visible(&self) -> &[Vec<Cell>] {
        &self.cells[BUFFER_ROWS..]
    }

    /// Fill visible row `row` from a line of jewel symbols, space meaning empty.
    pub fn seed_row(&mut self, row: usize, line: &str) -> Result<()> {
        if row >= self.rows {
            return Err(GameError::InvalidInput(format!(
                "row {row} is outside the {} visible rows",
                self.rows
            )));
        }
        let len = line.chars().count();
        if len != self.columns {
            return Err(GameError::InvalidInput(format!(
                "row has {len} cells, field has {} columns",
                self.columns
            )));
        }
        let parsed = line
            .chars()
            .map(|c| match c {
                ' ' => Ok(Cell::Empty),
                _ => Jewel::from_symbol(c)
                    .map(Cell::Resting)
                    .ok_or_else(|| GameError::InvalidJewel(c.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        self.cells[row + BUFFER_ROWS] = parsed;
        Ok(())
    }

    /// One gravity pass from the second-to-last row upwards: every jewel with an empty
    /// cell beneath moves down one row. Returns true if anything moved.
    pub fn drop_step(&mut self) -> bool {
        let mut moved = false;
        for row in (0..self.total_rows() - 1).rev() {
            for col in 0..self.columns {
                if self.cells[row + 1][col].is_empty() && !self.cells[row][col].is_empty() {
                    self.cells[row + 1][col] = std::mem::take(&mut self.cells[row][col]);
                    moved = true;
                }
            }
        }
        moved
    }

    /// True if no jewel anywhere sits directly above an empty cell.
    pub fn is_settled(&self) -> bool {
        self.cells
            .windows(2)
            .all(|pair| pair[0].iter().zip(&pair[1]).all(|(above, below)| above.is_empty() || !below.is_empty()))
    }

    /// Falling faller cells become landed.
    pub(crate) fn land_faller(&mut self) {
        self.retag(None, Cell::landed);
    }

    /// Faller cells become resting jewels.
    pub(crate) fn rest_faller(&mut self) {
        self.retag(None, Cell::rested);
    }

    pub(crate) fn land_column(&mut self, column: usize) {
        self.retag(Some(column), Cell::landed);
    }

    pub(crate) fn lift_column(&mut self, column: usize) {
        self.retag(Some(column), Cell::lifted);
    }

    fn retag(&mut self, column: Option<usize>, f: fn(Cell) -> Cell) {
        for row in &mut self.cells {
            for (col, cell) in row.iter_mut().enumerate() {
                if column.is_none_or(|c| c == col) {
                    *cell = f(*cell);
                }
            }
        }
    }

    /// Cycle the three cells ending at `bottom_row` downwards: bottom wraps to the top.
    pub(crate) fn cycle_three(&mut self, column: usize, bottom_row: usize) {
        let Some(top_row) = bottom_row.checked_sub(2) else {
            return;
        };
        let mut trio = [Cell::Empty; 3];
        for (i, slot) in trio.iter_mut().enumerate() {
            *slot = self.get(top_row + i, column).unwrap_or_default();
        }
        trio.rotate_right(1);
        for (i, cell) in trio.into_iter().enumerate() {
            self.set(top_row + i, column, cell);
        }
    }

    /// False if any row holding a faller cell in `from` is occupied in `to`.
    pub(crate) fn can_shift_faller(&self, from: usize, to: usize) -> bool {
        (0..self.total_rows()).all(|row| {
            !self.get(row, from).is_some_and(Cell::is_faller_part) || !self.is_occupied(row, to)
        })
    }

    /// Move every faller cell in column `from` sideways into `to`.
    pub(crate) fn shift_faller(&mut self, from: usize, to: usize) {
        for row in (0..self.total_rows()).rev() {
            if let Some(cell) = self.get(row, from).filter(|c| c.is_faller_part()) {
                self.set(row, to, cell);
                self.set(row, from, Cell::Empty);
            }
        }
    }

    /// True if an empty cell exists below the topmost jewel of `column`.
    pub fn has_gap_below_top(&self, column: usize) -> bool {
        let Some(top) = (0..self.total_rows()).find(|&row| self.is_occupied(row, column)) else {
            return false;
        };
        (top..self.total_rows()).any(|row| !self.is_occupied(row, column))
    }

    /// Flag every window of `MATCH_LEN` equal jewels in `direction`.
    /// Reads from a snapshot so flags placed during the scan never affect it.
    /// Returns the number of matching windows found.
    pub fn flag_runs(&mut self, direction: Direction) -> usize {
        let snapshot = self.cells.clone();
        let (dr, dc) = direction.step();
        let mut windows = 0;
        for row in 0..self.total_rows() {
            for col in 0..self.columns {
                let Some(positions) = self.window(row, col, dr, dc) else {
                    continue;
                };
                let Some(first) = snapshot[row][col].jewel() else {
                    continue;
                };
                if positions.iter().all(|&(r, c)| snapshot[r][c].jewel() == Some(first)) {
                    for (r, c) in positions {
                        self.cells[r][c] = Cell::Matched(first);
                    }
                    windows += 1;
                }
            }
        }
        windows
    }

    fn window(&self, row: usize, col: usize, dr: usize, dc: isize) -> Option<[(usize, usize); MATCH_LEN]> {
        let mut out = [(0, 0); MATCH_LEN];
        for (k, slot) in out.iter_mut().enumerate() {
            let r = row + k * dr;
            let c = col.checked_add_signed(k as isize * dc)?;
            if r >= self.total_rows() || c >= self.columns {
                return None;
            }
            *slot = (r, c);
        }
        Some(out)
    }

    pub fn has_matches(&self) -> bool {
        self.cells.iter().flatten().any(|c| c.is_matched())
    }

    /// Empty every matched cell. Returns how many were cleared.
    pub fn clear_matched(&mut self) -> usize {
        let mut cleared = 0;
        for cell in self.cells.iter_mut().flatten() {
            if cell.is_matched() {
                *cell = Cell::Empty;
                cleared += 1;
            }
        }
        cleared
    }

    /// True if any buffer row holds a jewel.
    pub fn buffer_occupied(&self) -> bool {
        self.cells[..BUFFER_ROWS].iter().flatten().any(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_with(rows: usize, columns: usize, lines: &[&str]) -> Playfield {
        let mut f = Playfield::new(rows, columns);
        for (i, line) in lines.iter().enumerate() {
            f.seed_row(i, line).unwrap();
        }
        f
    }

    #[test]
    fn new_field_has_buffer_rows() {
        let f = Playfield::new(13, 6);
        assert_eq!(f.total_rows(), 16);
        assert_eq!(f.cells().len(), 16);
        assert_eq!(f.visible().len(), 13);
        assert!(f.cells().iter().flatten().all(|c| c.is_empty()));
    }

    #[test]
    fn jewel_parses_single_symbols_only() {
        assert_eq!("S".parse::<Jewel>(), Ok(Jewel::S));
        assert_eq!("Z".parse::<Jewel>(), Ok(Jewel::Z));
        assert!(matches!("U".parse::<Jewel>(), Err(GameError::InvalidJewel(_))));
        assert!(matches!("SS".parse::<Jewel>(), Err(GameError::InvalidJewel(_))));
        assert!(matches!("".parse::<Jewel>(), Err(GameError::InvalidJewel(_))));
    }

    #[test]
    fn seed_row_offsets_past_buffer() {
        let f = field_with(4, 3, &["S T"]);
        assert_eq!(f.get(3, 0), Some(Cell::Resting(Jewel::S)));
        assert_eq!(f.get(3, 1), Some(Cell::Empty));
        assert_eq!(f.get(3, 2), Some(Cell::Resting(Jewel::T)));
    }

    #[test]
    fn seed_row_rejects_bad_input_without_mutation() {
        let mut f = Playfield::new(4, 3);
        assert!(matches!(f.seed_row(0, "ST"), Err(GameError::InvalidInput(_))));
        assert!(matches!(f.seed_row(0, "SQT"), Err(GameError::InvalidJewel(_))));
        assert!(matches!(f.seed_row(4, "STV"), Err(GameError::InvalidInput(_))));
        assert_eq!(f, Playfield::new(4, 3));
    }

    #[test]
    fn drop_step_moves_a_stack_one_row() {
        let mut f = field_with(4, 1, &["S", "T", " ", " "]);
        assert!(f.drop_step());
        assert_eq!(f.get(3, 0), Some(Cell::Empty));
        assert_eq!(f.get(4, 0), Some(Cell::Resting(Jewel::S)));
        assert_eq!(f.get(5, 0), Some(Cell::Resting(Jewel::T)));
    }

    #[test]
    fn drop_step_at_rest_is_noop() {
        let mut f = field_with(3, 2, &["  ", "S ", "TV"]);
        let before = f.clone();
        assert!(!f.drop_step());
        assert_eq!(f, before);
        assert!(f.is_settled());
    }

    #[test]
    fn horizontal_run_of_three_is_flagged() {
        let mut f = field_with(2, 6, &["      ", "SSS   "]);
        assert_eq!(f.flag_runs(Direction::Horizontal), 1);
        for col in 0..3 {
            assert_eq!(f.get(4, col), Some(Cell::Matched(Jewel::S)));
        }
        assert_eq!(f.get(4, 3), Some(Cell::Empty));
    }

    #[test]
    fn run_of_two_or_broken_run_is_not_flagged() {
        let mut f = field_with(2, 6, &["SS TT ", "S SVSS"]);
        assert_eq!(f.flag_runs(Direction::Horizontal), 0);
        assert!(!f.has_matches());
    }

    #[test]
    fn vertical_run_of_two_or_broken_run_is_not_flagged() {
        // column 0: S T S S (broken, then only two); column 1: V gap V V
        let mut f = field_with(4, 2, &["SV", "T ", "SV", "SV"]);
        let before = f.clone();
        assert_eq!(f.flag_runs(Direction::Vertical), 0);
        assert_eq!(f, before);
    }

    #[test]
    fn broken_diagonals_are_not_flagged() {
        // down-right: S T S; down-left: X, gap, X
        let mut f = field_with(3, 4, &["S  X", " T  ", " XS "]);
        let before = f.clone();
        assert_eq!(f.flag_runs(Direction::DiagonalDownRight), 0);
        assert_eq!(f.flag_runs(Direction::DiagonalDownLeft), 0);
        assert_eq!(f, before);

        // two in a row on each diagonal
        let mut f = field_with(2, 3, &["W W", " W "]);
        assert_eq!(f.flag_runs(Direction::DiagonalDownRight), 0);
        assert_eq!(f.flag_runs(Direction::DiagonalDownLeft), 0);
        assert!(!f.has_matches());
    }

    #[test]
    fn runs_inside_buffer_rows_are_flagged() {
        let mut f = Playfield::new(1, 3);
        for col in 0..3 {
            f.set(1, col, Cell::Resting(Jewel::Y));
        }
        assert_eq!(f.flag_runs(Direction::Horizontal), 1);
        for col in 0..3 {
            assert_eq!(f.get(1, col), Some(Cell::Matched(Jewel::Y)));
        }
    }

    #[test]
    fn run_of_four_flags_every_cell() {
        let mut f = field_with(1, 5, &[" TTTT"]);
        assert_eq!(f.flag_runs(Direction::Horizontal), 2);
        assert_eq!(f.get(3, 0), Some(Cell::Empty));
        for col in 1..5 {
            assert_eq!(f.get(3, col), Some(Cell::Matched(Jewel::T)));
        }
    }

    #[test]
    fn vertical_run_is_flagged() {
        let mut f = field_with(4, 2, &["  ", "V ", "V ", "VS"]);
        assert_eq!(f.flag_runs(Direction::Vertical), 1);
        assert_eq!(f.get(4, 0), Some(Cell::Matched(Jewel::V)));
        assert_eq!(f.get(6, 0), Some(Cell::Matched(Jewel::V)));
        assert_eq!(f.get(6, 1), Some(Cell::Resting(Jewel::S)));
    }

    #[test]
    fn both_diagonals_are_flagged() {
        let mut right = field_with(3, 3, &["W  ", " W ", "  W"]);
        assert_eq!(right.flag_runs(Direction::DiagonalDownRight), 1);
        assert_eq!(right.flag_runs(Direction::DiagonalDownLeft), 0);
        assert_eq!(right.get(5, 2), Some(Cell::Matched(Jewel::W)));

        let mut left = field_with(3, 3, &["  X", " X ", "X  "]);
        assert_eq!(left.flag_runs(Direction::DiagonalDownLeft), 1);
        assert_eq!(left.get(3, 2), Some(Cell::Matched(Jewel::X)));
        assert_eq!(left.get(5, 0), Some(Cell::Matched(Jewel::X)));
    }

    #[test]
    fn flagging_is_idempotent_and_additive() {
        let mut f = field_with(3, 3, &["SSS", "S  ", "S  "]);
        f.flag_runs(Direction::Horizontal);
        f.flag_runs(Direction::Vertical);
        let once = f.clone();
        f.flag_runs(Direction::Horizontal);
        f.flag_runs(Direction::Vertical);
        assert_eq!(f, once);
        assert_eq!(f.clear_matched(), 5);
        assert!(!f.has_matches());
    }

    #[test]
    fn cycle_three_wraps_bottom_to_top() {
        let mut f = Playfield::new(2, 1);
        f.set(0, 0, Cell::Falling(Jewel::S));
        f.set(1, 0, Cell::Falling(Jewel::T));
        f.set(2, 0, Cell::Falling(Jewel::V));
        f.cycle_three(0, 2);
        assert_eq!(f.get(0, 0), Some(Cell::Falling(Jewel::V)));
        assert_eq!(f.get(1, 0), Some(Cell::Falling(Jewel::S)));
        assert_eq!(f.get(2, 0), Some(Cell::Falling(Jewel::T)));
    }

    #[test]
    fn gap_detection_looks_below_topmost_jewel() {
        let mut f = field_with(3, 2, &["S ", "  ", "TT"]);
        assert!(f.has_gap_below_top(0));
        assert!(!f.has_gap_below_top(1));
        f.drop_step();
        assert!(!f.has_gap_below_top(0));
        assert!(!Playfield::new(2, 1).has_gap_below_top(0));
    }
}
