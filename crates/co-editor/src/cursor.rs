//! Cursor — a buffer position plus desired-column memory.
//!
//! The cursor never leaves the buffer: `row` is a real line and `col` is in
//! `0..=line_len(row)`. Every movement takes the buffer as a parameter and
//! clamps against it; the cursor does not own or borrow the buffer.
//!
//! # Desired column
//!
//! Moving up or down through a short line pulls the column in, and moving
//! on to a long line should put it back. The first vertical move records the
//! column it started from in `desired_col`; every vertical move then lands
//! on `min(desired, line_len)`. Any horizontal move or edit forgets it.
//!
//! # Wrapping
//!
//! Left at column 0 goes to the end of the previous line, Right at the end
//! of a line goes to the start of the next. Neither wraps past the first or
//! last line.

use crate::buffer::LineBuffer;
use crate::position::Position;
use crate::width;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    desired_col: Option<usize>,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            desired_col: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.pos.row
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// The column vertical moves are aiming for, if a vertical run is in
    /// progress.
    #[inline]
    #[must_use]
    pub const fn desired_col(&self) -> Option<usize> {
        self.desired_col
    }

    /// Screen column of the cursor within its line.
    #[must_use]
    pub fn display_col(&self, buf: &LineBuffer) -> usize {
        buf.line(self.pos.row)
            .map_or(0, |line| width::display_col(line.chars(), self.pos.col))
    }

    // -- Placement ----------------------------------------------------------

    /// Jump to `pos`, clamped into the buffer. Forgets the desired column.
    pub fn set_position(&mut self, pos: Position, buf: &LineBuffer) {
        self.pos = buf.clamp(pos);
        self.desired_col = None;
    }

    /// Pull the cursor back inside the buffer after the buffer shrank.
    /// Keeps the desired column.
    pub fn clamp(&mut self, buf: &LineBuffer) {
        self.pos = buf.clamp(self.pos);
    }

    // -- Horizontal ---------------------------------------------------------

    pub fn left(&mut self, buf: &LineBuffer) {
        self.desired_col = None;
        if self.pos.col > 0 {
            self.pos.col -= 1;
        } else if self.pos.row > 0 {
            self.pos.row -= 1;
            self.pos.col = buf.line_len(self.pos.row);
        }
    }

    pub fn right(&mut self, buf: &LineBuffer) {
        self.desired_col = None;
        if self.pos.col < buf.line_len(self.pos.row) {
            self.pos.col += 1;
        } else if self.pos.row + 1 < buf.line_count() {
            self.pos.row += 1;
            self.pos.col = 0;
        }
    }

    pub const fn home(&mut self) {
        self.desired_col = None;
        self.pos.col = 0;
    }

    pub fn end(&mut self, buf: &LineBuffer) {
        self.desired_col = None;
        self.pos.col = buf.line_len(self.pos.row);
    }

    // -- Vertical -----------------------------------------------------------

    pub fn up(&mut self, buf: &LineBuffer) {
        self.page_up(1, buf);
    }

    pub fn down(&mut self, buf: &LineBuffer) {
        self.page_down(1, buf);
    }

    /// Move up `rows` lines, stopping at the first.
    pub fn page_up(&mut self, rows: usize, buf: &LineBuffer) {
        self.move_to_row(self.pos.row.saturating_sub(rows), buf);
    }

    /// Move down `rows` lines, stopping at the last.
    pub fn page_down(&mut self, rows: usize, buf: &LineBuffer) {
        let last = buf.line_count() - 1;
        self.move_to_row(self.pos.row.saturating_add(rows).min(last), buf);
    }

    fn move_to_row(&mut self, row: usize, buf: &LineBuffer) {
        if row == self.pos.row {
            return;
        }
        let desired = *self.desired_col.get_or_insert(self.pos.col);
        self.pos.row = row;
        self.pos.col = desired.min(buf.line_len(row));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
