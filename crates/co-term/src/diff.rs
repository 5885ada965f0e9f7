// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Instead of redrawing the whole screen every frame, compare the current
// FrameBuffer against the previous one and emit escape sequences only for
// the cells that changed. A keystroke usually touches one text row and the
// status line, so most frames are a few dozen bytes.
//
// The pipeline per frame:
//
//   1. The editor paints a FrameBuffer.
//   2. `render()` diffs it against the stored previous frame and appends
//      the changes to an in-memory byte buffer, tracking cursor position
//      and attributes so redundant escapes are skipped.
//   3. `flush()` writes the whole frame with a single write.
//
// Unchanged rows are skipped with a single slice comparison. The frame is
// wrapped in synchronized output (DEC 2026) and the cursor is hidden while
// cells are drawn, then shown at its final position.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::cell::{Attr, Cell};

const DEFAULT_CAPACITY: usize = 16_384;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were written.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// Bytes of escape output generated.
    pub bytes_written: usize,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits escape sequences only for changed cells.
///
/// ```
/// use co_term::buffer::FrameBuffer;
/// use co_term::cell::Attr;
/// use co_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let mut frame = FrameBuffer::new(10, 2);
/// frame.paint_text(0, 0, "hi", Attr::empty());
///
/// let first = renderer.render(&frame, Some((2, 0)));
/// assert_eq!(first.cells_rendered, 20);
///
/// let second = renderer.render(&frame, Some((2, 0)));
/// assert_eq!(second.cells_rendered, 0);
/// ```
pub struct DiffRenderer {
    output: Vec<u8>,
    previous: Option<FrameBuffer>,
    last_x: i32,
    last_y: i32,
    last_attrs: Attr,
}

impl DiffRenderer {
    /// Create a renderer with no previous frame; the first render draws
    /// everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: Vec::with_capacity(DEFAULT_CAPACITY),
            previous: None,
            last_x: -1,
            last_y: -1,
            last_attrs: Attr::empty(),
        }
    }

    /// Diff `current` against the previous frame and queue the output.
    ///
    /// `cursor` is the `(x, y)` where the terminal cursor should rest after
    /// the frame, or `None` to leave it hidden.
    pub fn render(&mut self, current: &FrameBuffer, cursor: Option<(u16, u16)>) -> RenderStats {
        self.output.clear();
        self.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        ansi::begin_sync(&mut self.output).ok();
        ansi::cursor_hide(&mut self.output).ok();

        let previous = self.previous.take();
        let full_redraw = previous
            .as_ref()
            .is_none_or(|prev| prev.width() != width || prev.height() != height);

        if full_redraw {
            ansi::reset(&mut self.output).ok();
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let (Some(curr_row), prev_row) = (
                current.row(y),
                previous.as_ref().and_then(|p| p.row(y)),
            ) else {
                continue;
            };

            if !full_redraw && prev_row == Some(curr_row) {
                stats.cells_skipped += usize::from(width);
                continue;
            }

            for (x, cell) in (0..width).zip(curr_row.iter()) {
                let changed = full_redraw
                    || prev_row.and_then(|r| r.get(usize::from(x))) != Some(cell);
                if changed {
                    self.render_cell(x, y, *cell);
                    stats.cells_rendered += 1;
                } else {
                    stats.cells_skipped += 1;
                }
            }
        }

        ansi::reset(&mut self.output).ok();

        if let Some((x, y)) = cursor {
            ansi::cursor_to(&mut self.output, x, y).ok();
            ansi::cursor_show(&mut self.output).ok();
        }

        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        self.previous = Some(current.clone());
        stats
    }

    /// Write the queued output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.flush_to(&mut stdout)
    }

    /// Write the queued output to `w` and clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.output.is_empty() {
            return Ok(());
        }
        w.write_all(&self.output)?;
        w.flush()?;
        self.output.clear();
        Ok(())
    }

    /// Forget the previous frame so the next render draws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    // ─── Cell Output ─────────────────────────────────────────────────────

    fn reset_state(&mut self) {
        self.last_x = -1;
        self.last_y = -1;
        self.last_attrs = Attr::empty();
    }

    fn render_cell(&mut self, x: u16, y: u16, cell: Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        // The terminal auto-advances after a character; skip the move when
        // this cell directly follows the last one.
        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(&mut self.output, x, y).ok();
        }

        if cell.is_continuation() {
            // The wide char just written already covered this column.
            if xi > 0 && self.last_x == xi - 1 && self.last_y == yi {
                self.last_x = xi;
                return;
            }
            self.apply_attrs(cell.attrs);
            self.output.push(b' ');
            self.last_x = xi;
            self.last_y = yi;
            return;
        }

        self.apply_attrs(cell.attrs);
        let mut utf8 = [0u8; 4];
        self.output
            .extend_from_slice(cell.ch.encode_utf8(&mut utf8).as_bytes());

        self.last_x = xi;
        self.last_y = yi;
    }

    fn apply_attrs(&mut self, attrs: Attr) {
        if attrs == self.last_attrs {
            return;
        }
        if !self.last_attrs.is_empty() {
            ansi::reset(&mut self.output).ok();
        }
        ansi::attrs(&mut self.output, attrs).ok();
        self.last_attrs = attrs;
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
