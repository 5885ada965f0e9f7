// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid a frame is painted into.
//
// The editor paints text rows and the status line here; the diff renderer
// then compares this frame against the previous one and emits escape
// sequences for the cells that changed.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing. A row's cells are
//     contiguous, so the renderer's left-to-right scan is linear.
//
//   - Writes outside the grid are ignored, never a panic. Callers paint
//     freely and the grid clips.
//
//   - Wide characters occupy two columns. The first cell holds the char,
//     the second is a continuation cell. Painting over either half of an
//     existing wide char breaks it cleanly.

use crate::cell::{Attr, Cell};
use crate::width::{char_width, glyph};

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A 2D buffer of terminal cells.
///
/// # Examples
///
/// ```
/// use co_term::buffer::FrameBuffer;
/// use co_term::cell::{Attr, Cell};
///
/// let mut buf = FrameBuffer::new(80, 24);
/// assert_eq!(buf.width(), 80);
///
/// buf.paint_text(0, 0, "hello", Attr::empty());
/// assert_eq!(buf.row_text(0).unwrap().trim_end(), "hello");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer filled with blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Buffer width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the buffer.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// A single row as a slice, or `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The characters of row `y` as a string, continuation cells skipped.
    ///
    /// Mostly for tests and the headless screen; the renderer works on cells.
    #[must_use]
    pub fn row_text(&self, y: u16) -> Option<String> {
        self.row(y)
            .map(|cells| cells.iter().filter_map(|c| c.character()).collect())
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the buffer, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    // ─── Direct Cell Access ──────────────────────────────────────────────

    /// Write a cell directly, with no wide-char cleanup.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    // ─── Wide Character Cleanup ──────────────────────────────────────────

    /// Break any wide character that touches `(x, y)`.
    ///
    /// - If `(x, y)` is a continuation, the owner at `x - 1` becomes a space.
    /// - If the cell after `(x, y)` is a continuation, it is orphaned by the
    ///   coming write and is cleared.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = ' ';
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Paint one character cell. Returns `true` if it was in bounds.
    pub fn paint_cell(&mut self, x: u16, y: u16, ch: char, attrs: Attr) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = Cell::styled(ch, attrs);
        true
    }

    /// Paint `text` left-to-right from `(x, y)`.
    ///
    /// Every character advances by its [`char_width`]. Characters the
    /// terminal would not advance for are painted as blanks. A wide char
    /// that does not fit before the right edge becomes a single blank.
    /// Painting stops at the right edge.
    ///
    /// Returns the number of columns consumed.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, attrs: Attr) -> u16 {
        if y >= self.height {
            return 0;
        }

        let mut col = x;

        for ch in text.chars() {
            if col >= self.width {
                break;
            }

            let is_wide = char_width(ch) == 2;

            if is_wide && col + 1 >= self.width {
                self.paint_cell(col, y, ' ', attrs);
                col += 1;
                break;
            }

            self.paint_cell(col, y, glyph(ch), attrs);

            if is_wide {
                let cont_x = col + 1;
                self.break_wide_char_at(cont_x, y);
                let cont_idx = self.index(cont_x, y);
                self.cells[cont_idx] = Cell::continuation(attrs);
                col += 2;
            } else {
                col += 1;
            }
        }

        col.saturating_sub(x)
    }

    /// Fill `len` cells of row `y` from column `x` with blanks carrying
    /// `attrs`. Used for solid bars such as the status line.
    pub fn fill(&mut self, x: u16, y: u16, len: u16, attrs: Attr) {
        let end = x.saturating_add(len).min(self.width);
        for col in x..end {
            self.paint_cell(col, y, ' ', attrs);
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────────
