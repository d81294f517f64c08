//! Text rendering of the playfield.
//!
//! Every cell is three characters wide: `"   "` empty, `" S "` resting, `"[S]"` falling,
//! `"|S|"` landed, `"*S*"` matched. Rows are framed with `|` and closed by a dashed rule.

use crate::field::Cell;
use crate::theme::Theme;
use crossterm::style::Stylize;
use std::fmt::Write;

pub const GAME_OVER_TEXT: &str = "GAME OVER";

/// Plain three-character form of a cell.
pub fn cell_text(cell: Cell) -> String {
    match cell {
        Cell::Empty => "   ".to_string(),
        Cell::Resting(j) => format!(" {j} "),
        Cell::Falling(j) => format!("[{j}]"),
        Cell::Landed(j) => format!("|{j}|"),
        Cell::Matched(j) => format!("*{j}*"),
    }
}

fn styled_cell(cell: Cell, theme: &Theme) -> String {
    let text = cell_text(cell);
    let Some(jewel) = cell.jewel() else {
        return text;
    };
    let fg = theme.jewel_color(jewel);
    match cell {
        Cell::Landed(_) => text.with(fg).on(theme.landed_bg).to_string(),
        Cell::Matched(_) => text.with(fg).on(theme.matched_bg).to_string(),
        _ => text.with(fg).bold().to_string(),
    }
}

/// Render rows (any slice of the field) framed and ruled. Colours only when a theme is given.
pub fn render_rows(rows: &[Vec<Cell>], theme: Option<&Theme>) -> String {
    let columns = rows.first().map_or(0, Vec::len);
    let mut out = String::new();
    for row in rows {
        out.push('|');
        for &cell in row {
            match theme {
                Some(theme) => out.push_str(&styled_cell(cell, theme)),
                None => out.push_str(&cell_text(cell)),
            }
        }
        out.push_str("|\n");
    }
    let _ = writeln!(out, " {} ", "-".repeat(3 * columns));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Jewel;

    #[test]
    fn cell_forms() {
        assert_eq!(cell_text(Cell::Empty), "   ");
        assert_eq!(cell_text(Cell::Resting(Jewel::S)), " S ");
        assert_eq!(cell_text(Cell::Falling(Jewel::T)), "[T]");
        assert_eq!(cell_text(Cell::Landed(Jewel::V)), "|V|");
        assert_eq!(cell_text(Cell::Matched(Jewel::Z)), "*Z*");
    }

    #[test]
    fn render_plain_field() {
        let rows = vec![
            vec![Cell::Empty, Cell::Falling(Jewel::X)],
            vec![Cell::Resting(Jewel::S), Cell::Matched(Jewel::W)],
        ];
        let expected = "|   [X]|\n| S *W*|\n ------ \n";
        assert_eq!(render_rows(&rows, None), expected);
    }

    #[test]
    fn colored_render_keeps_cell_text() {
        let rows = vec![vec![Cell::Resting(Jewel::Y)]];
        let out = render_rows(&rows, Some(&Theme::default()));
        assert!(out.contains(" Y "));
        assert!(out.contains("\x1b["));
    }
}
