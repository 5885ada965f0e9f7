//! Viewport — which buffer lines are on screen.
//!
//! Only vertical scrolling: long lines are clipped, not scrolled
//! horizontally. The scroll offset is re-clamped after every cursor move,
//! every change in line count, and every terminal resize, so that
//!
//! ```text
//! top <= max(0, line_count - visible_rows)
//! top <= cursor_row < top + visible_rows
//! ```

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    top: usize,
    rows: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new() -> Self {
        Self { top: 0, rows: 1 }
    }

    /// First buffer row on screen.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Text rows on screen, at least 1.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        if self.rows == 0 { 1 } else { self.rows }
    }

    /// Scroll so `cursor_row` is visible and no space is wasted below the
    /// last line. A `visible_rows` of 0 counts as 1.
    pub fn clamp(&mut self, cursor_row: usize, line_count: usize, visible_rows: usize) {
        self.rows = visible_rows.max(1);
        let rows = self.rows;

        self.top = self.top.min(line_count.saturating_sub(rows));
        if cursor_row < self.top {
            self.top = cursor_row;
        }
        if cursor_row >= self.top + rows {
            self.top = cursor_row + 1 - rows;
        }
    }

    /// Buffer rows to paint, top to bottom.
    #[must_use]
    pub fn visible_range(&self, line_count: usize) -> Range<usize> {
        let end = (self.top + self.rows()).min(line_count);
        self.top.min(end)..end
    }
}
