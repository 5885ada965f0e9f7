//! Editor — the session state and the command dispatcher.
//!
//! One owned aggregate holds everything a session needs: the buffer, the
//! cursor, the viewport, the indent width, the keymap, the options, the
//! terminal size, and the transient status message. There is no global
//! state.
//!
//! Each event flows through:
//!
//! ```text
//! Screen::read_event → Keymap::lookup → execute → buffer / cursor mutation
//!                                              → viewport re-clamp
//! view::render → Screen::refresh
//! ```
//!
//! The dispatcher has no modes and keeps no state between events beyond the
//! cursor's desired column.

use std::borrow::Cow;
use std::io;

use co_term::input::{Event, KeyEvent};
use co_term::screen::Screen;
use co_term::terminal::Size;

use crate::buffer::LineBuffer;
use crate::command::{Command, Keymap};
use crate::cursor::Cursor;
use crate::error::{EditError, describe};
use crate::indent::IndentWidth;
use crate::options::Options;
use crate::position::Position;
use crate::view;
use crate::viewport::Viewport;

/// Whether the loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A status-line message. Cleared by the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    is_error: bool,
}

impl Message {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Errors are drawn bold.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

pub struct Editor {
    buffer: LineBuffer,
    cursor: Cursor,
    viewport: Viewport,
    indent: IndentWidth,
    keymap: Keymap,
    options: Options,
    size: Size,
    message: Option<Message>,
}

impl Editor {
    /// Start a session on `buffer`. The indent width comes from the options
    /// if set there, otherwise from the buffer's own indentation.
    #[must_use]
    pub fn new(buffer: LineBuffer, options: Options) -> Self {
        let indent = options
            .indent
            .unwrap_or_else(|| IndentWidth::detect(buffer.lines().map(Cow::from)));
        let keymap = options.keymap();
        let mut editor = Self {
            buffer,
            cursor: Cursor::new(),
            viewport: Viewport::new(),
            indent,
            keymap,
            options,
            size: Size::DEFAULT,
            message: None,
        };
        editor.scroll();
        editor
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub const fn indent(&self) -> IndentWidth {
        self.indent
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    // -- Messages -----------------------------------------------------------

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    // -- Main loop ----------------------------------------------------------

    /// Draw, wait for input, dispatch, repeat, until a quit command or the
    /// input closes.
    ///
    /// # Errors
    ///
    /// Only screen I/O errors. Edit and save failures are reported on the
    /// status line and the loop goes on.
    pub fn run<S: Screen>(&mut self, screen: &mut S) -> io::Result<()> {
        self.resize(screen.size());
        loop {
            view::render(self, screen);
            screen.refresh()?;

            let Some(event) = screen.read_event()? else {
                tracing::info!("input closed");
                return Ok(());
            };
            if self.handle_event(event) == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Apply one input event.
    pub fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(size) => {
                self.resize(size);
                Flow::Continue
            }
        }
    }

    /// Apply one key press. Any key press clears the status message; keys
    /// with no binding do nothing else.
    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        self.clear_message();
        self.keymap
            .lookup(key)
            .map_or(Flow::Continue, |command| self.execute(command))
    }

    /// Store the new terminal size and re-clamp the scroll offset.
    pub fn resize(&mut self, size: Size) {
        tracing::debug!(cols = size.cols, rows = size.rows, "resize");
        self.size = size;
        self.scroll();
    }

    // -- Dispatch -----------------------------------------------------------

    /// Run one command.
    pub fn execute(&mut self, command: Command) -> Flow {
        tracing::debug!(?command, pos = ?self.cursor.position(), "dispatch");

        let flow = match command {
            Command::Up => self.motion(|c, b, _| c.up(b)),
            Command::Down => self.motion(|c, b, _| c.down(b)),
            Command::Left => self.motion(|c, b, _| c.left(b)),
            Command::Right => self.motion(|c, b, _| c.right(b)),
            Command::Home => self.motion(|c, _, _| c.home()),
            Command::End => self.motion(|c, b, _| c.end(b)),
            Command::PageUp => self.motion(|c, b, rows| c.page_up(rows, b)),
            Command::PageDown => self.motion(|c, b, rows| c.page_down(rows, b)),
            Command::Save => {
                self.save();
                Flow::Continue
            }
            Command::SaveAndQuit => {
                if self.save() {
                    Flow::Quit
                } else {
                    Flow::Continue
                }
            }
            Command::Quit => Flow::Quit,
            edit => {
                if let Err(err) = self.edit(edit) {
                    tracing::warn!(%err, ?edit, "edit failed");
                }
                Flow::Continue
            }
        };

        self.cursor.clamp(&self.buffer);
        self.scroll();
        flow
    }

    fn motion(&mut self, f: impl FnOnce(&mut Cursor, &LineBuffer, usize)) -> Flow {
        f(&mut self.cursor, &self.buffer, self.viewport.rows());
        Flow::Continue
    }

    fn edit(&mut self, command: Command) -> Result<(), EditError> {
        let pos = self.cursor.position();
        let next = match command {
            Command::Insert(ch) => self.buffer.insert_char(pos, ch)?,
            Command::Newline => self.buffer.split_line(pos)?,
            Command::Backspace => {
                let n = if pos.col > 0 && self.in_indent(pos) {
                    self.indent.get().min(pos.col)
                } else {
                    1
                };
                self.buffer.delete_before(pos, n)?
            }
            Command::Delete => {
                self.buffer.delete_after(pos)?;
                pos
            }
            Command::Tab => {
                let n = if self.in_indent(pos) {
                    self.indent.get()
                } else {
                    1
                };
                self.buffer.insert_str(pos, &" ".repeat(n))?
            }
            Command::KillLine => {
                self.buffer.delete_line(pos.row)?;
                pos
            }
            _ => pos,
        };
        self.cursor.set_position(next, &self.buffer);
        Ok(())
    }

    /// Whether everything left of `pos` is spaces and tabs.
    fn in_indent(&self, pos: Position) -> bool {
        self.buffer.leading_whitespace(pos.row) >= pos.col
    }

    /// Write the buffer. Returns whether it worked; either way the outcome
    /// is on the status line.
    fn save(&mut self) -> bool {
        match self.buffer.save() {
            Ok(lines) => {
                let noun = if lines == 1 { "line" } else { "lines" };
                self.set_message(format!("Wrote {lines} {noun}"));
                true
            }
            Err(err) => {
                let text = describe(&err);
                tracing::error!(error = %text, "save failed");
                self.set_error(text);
                false
            }
        }
    }

    fn scroll(&mut self) {
        self.viewport.clamp(
            self.cursor.row(),
            self.buffer.line_count(),
            view::text_rows(self.size),
        );
    }

    /// Put the cursor at `pos`, clamped, and scroll to it.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor.set_position(pos, &self.buffer);
        self.scroll();
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("viewport", &self.viewport)
            .field("indent", &self.indent)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
