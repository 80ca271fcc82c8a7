//! Fixed-width text grid for a board
//!
//! One header line of two-digit column labels, then one line per row. Each
//! cell takes three characters: ` . ` empty, ` R ` red, ` Y ` yellow, and
//! blank where the row/column pair is not on the board.

use std::fmt::Write;

use hexgo_core::geometry::{MAX_COL, MAX_ROW, MIN_COL, MIN_ROW};
use hexgo_core::{Board, Cell, Position};

/// Three-character glyph for a cell
pub fn glyph(cell: Cell) -> &'static str {
    match cell {
        Cell::Empty => " . ",
        Cell::Red => " R ",
        Cell::Yellow => " Y ",
    }
}

/// Render the whole board, newline-terminated
pub fn render(board: &Board) -> String {
    let mut out = String::new();

    out.push_str("   ");
    for col in MIN_COL..=MAX_COL {
        let _ = write!(out, "{col:02} ");
    }
    out.push('\n');

    for row in MIN_ROW..=MAX_ROW {
        let _ = write!(out, "{row:02} ");
        for col in MIN_COL..=MAX_COL {
            match board.get(Position::new(row, col)) {
                Some(cell) => out.push_str(glyph(cell)),
                None => out.push_str("   "),
            }
        }
        out.push('\n');
    }

    out
}
