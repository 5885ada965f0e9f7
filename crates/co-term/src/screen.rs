// SPDX-License-Identifier: MIT
//
// Screen — the capability interface between the editor core and a display.
//
// The core needs exactly five things from a terminal: its size, the next
// input event, a way to draw styled text at a cell, a place to leave the
// cursor, and a way to show the finished frame. [`Screen`] is that list.
//
// Frame protocol: the caller draws the whole frame with `draw_text`, sets
// the cursor, then calls `refresh`. After a refresh the drawing surface is
// blank again, so each frame is painted from scratch. Cells not drawn in a
// frame show as blank.
//
// Two implementations:
//
//   TermScreen     — the real terminal: raw mode, blocking input with
//                    resize detection, differential output.
//   HeadlessScreen — scripted events and an in-memory grid, for tests and
//                    anything else that wants to drive the editor without
//                    a TTY.

use std::collections::VecDeque;
use std::io;

use crate::buffer::FrameBuffer;
use crate::cell::{Attr, Cell};
use crate::diff::DiffRenderer;
use crate::input::{Event, KeyCode, KeyEvent};
use crate::reader::EventReader;
use crate::terminal::{Size, Terminal};

// ─── Screen Trait ────────────────────────────────────────────────────────────

/// What the editor core may ask of a display.
pub trait Screen {
    /// Current size in cells.
    fn size(&self) -> Size;

    /// Block until the next input event. `Ok(None)` means input is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    fn read_event(&mut self) -> io::Result<Option<Event>>;

    /// Draw `text` starting at `(row, col)`, clipped to the screen.
    /// Returns the number of columns used.
    fn draw_text(&mut self, row: u16, col: u16, text: &str, attrs: Attr) -> u16;

    /// Where the cursor rests once the frame is shown.
    fn move_cursor(&mut self, row: u16, col: u16);

    /// Show the drawn frame and start a blank one.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the display fails.
    fn refresh(&mut self) -> io::Result<()>;
}

// ─── TermScreen ──────────────────────────────────────────────────────────────

/// A [`Screen`] on the controlling terminal.
///
/// Opening it enters raw mode on the alternate screen; dropping it (or
/// [`close`](Self::close)) restores the terminal.
pub struct TermScreen {
    terminal: Terminal,
    reader: EventReader,
    frame: FrameBuffer,
    renderer: DiffRenderer,
    cursor: Option<(u16, u16)>,
}

impl TermScreen {
    /// Take over the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if resize events cannot be set up, raw mode cannot
    /// be entered, or the terminal cannot be written.
    pub fn open() -> io::Result<Self> {
        let reader = EventReader::stdin()?;
        let mut terminal = Terminal::new();
        terminal.enter()?;
        let size = terminal.size();
        Ok(Self {
            terminal,
            reader,
            frame: FrameBuffer::new(size.cols, size.rows),
            renderer: DiffRenderer::new(),
            cursor: None,
        })
    }

    /// Restore the terminal, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal could not be restored.
    pub fn close(mut self) -> io::Result<()> {
        self.terminal.leave()
    }
}

impl Screen for TermScreen {
    fn size(&self) -> Size {
        self.terminal.size()
    }

    fn read_event(&mut self) -> io::Result<Option<Event>> {
        match self.reader.read_event()? {
            Some(Event::Resize(_)) => {
                let size = self.terminal.refresh_size();
                self.frame.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                Ok(Some(Event::Resize(size)))
            }
            other => Ok(other),
        }
    }

    fn draw_text(&mut self, row: u16, col: u16, text: &str, attrs: Attr) -> u16 {
        self.frame.paint_text(col, row, text, attrs)
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor = Some((col, row));
    }

    fn refresh(&mut self) -> io::Result<()> {
        let stats = self.renderer.render(&self.frame, self.cursor);
        tracing::trace!(
            cells = stats.cells_rendered,
            bytes = stats.bytes_written,
            "frame"
        );
        self.renderer.flush()?;
        self.frame.clear();
        Ok(())
    }
}

// ─── HeadlessScreen ──────────────────────────────────────────────────────────

/// A [`Screen`] with scripted input and an in-memory display.
///
/// Events are served from a queue; when it runs dry, input is closed.
/// Every `refresh` snapshots the drawn frame so callers can inspect what
/// was last shown.
///
/// ```
/// use co_term::screen::{HeadlessScreen, Screen};
/// use co_term::cell::Attr;
/// use co_term::terminal::Size;
///
/// let mut screen = HeadlessScreen::new(Size::new(10, 2));
/// screen.draw_text(0, 0, "hi", Attr::empty());
/// screen.move_cursor(0, 2);
/// screen.refresh().unwrap();
///
/// assert_eq!(screen.row_text(0), "hi");
/// assert_eq!(screen.cursor(), (0, 2));
/// ```
pub struct HeadlessScreen {
    size: Size,
    events: VecDeque<Event>,
    back: FrameBuffer,
    front: FrameBuffer,
    cursor: (u16, u16),
    frames: usize,
}

impl HeadlessScreen {
    /// An empty screen of the given size with no scripted input.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            events: VecDeque::new(),
            back: FrameBuffer::new(size.cols, size.rows),
            front: FrameBuffer::new(size.cols, size.rows),
            cursor: (0, 0),
            frames: 0,
        }
    }

    /// Queue an event.
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Queue a key press.
    pub fn push_key(&mut self, key: KeyEvent) {
        self.push(Event::Key(key));
    }

    /// Queue one plain key press per character of `text`. `'\n'` is queued
    /// as Enter and `'\t'` as Tab, the way a terminal sends them.
    pub fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            let code = match ch {
                '\n' => KeyCode::Enter,
                '\t' => KeyCode::Tab,
                c => KeyCode::Char(c),
            };
            self.push_key(KeyEvent::plain(code));
        }
    }

    /// Number of events still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// How many frames have been shown.
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// `(row, col)` of the cursor in the last shown frame.
    #[must_use]
    pub const fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    /// Text of `row` in the last shown frame, trailing blanks trimmed.
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        self.front
            .row_text(row)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default()
    }

    /// Every row of the last shown frame, trailing blanks trimmed.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.front.height()).map(|row| self.row_text(row)).collect()
    }

    /// The cell at `(row, col)` in the last shown frame.
    #[must_use]
    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        self.front.get(col, row).copied()
    }
}

impl Screen for HeadlessScreen {
    fn size(&self) -> Size {
        self.size
    }

    fn read_event(&mut self) -> io::Result<Option<Event>> {
        let event = self.events.pop_front();
        if let Some(Event::Resize(size)) = event {
            self.size = size;
            self.back.resize(size.cols, size.rows);
        }
        Ok(event)
    }

    fn draw_text(&mut self, row: u16, col: u16, text: &str, attrs: Attr) -> u16 {
        self.back.paint_text(col, row, text, attrs)
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor = (row, col);
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.front.clone_from(&self.back);
        self.back.clear();
        self.frames += 1;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
