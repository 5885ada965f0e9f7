// SPDX-License-Identifier: MIT
//
// Terminal ownership: raw input, the alternate screen, and putting both back.
//
// `Terminal::enter` takes the terminal over for the editor and `leave` (or
// dropping the handle) gives it back. Raw input is a separate guard,
// `RawMode`, that holds the termios it replaced. When stdin is not a tty
// (tests, pipes) there is nothing to switch and the guard is simply absent.
//
// A panic while the editor owns the terminal would otherwise leave the shell
// in raw mode on the alternate screen. The panic hook writes a fixed reset
// sequence directly to fd 1, without going through the stdout lock a
// panicking frame flush may hold, and reapplies the saved termios before
// the default hook prints the message.
//
// All `unsafe` here is termios, ioctl, and isatty: POSIX calls with no std
// wrapper.
#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::{Mutex, Once, PoisonError};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Width and height of the terminal in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the size cannot be read, e.g. output is not a tty.
    pub const DEFAULT: Self = Self { cols: 80, rows: 24 };

    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// Ask the kernel how big the terminal on stdout is. `None` when stdout is
/// not a terminal or reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } != 0 {
        return None;
    }
    (ws.ws_col > 0 && ws.ws_row > 0).then(|| Size::new(ws.ws_col, ws.ws_row))
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

/// The termios in effect before raw mode, for the panic hook. `RawMode`
/// keeps its own copy; this one exists because the hook cannot reach it.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Raw input on stdin for as long as the guard lives.
///
/// Raw means: bytes arrive one at a time, unechoed, with no line editing and
/// no signal keys. Flow control is off too, which is what lets Ctrl+S and
/// Ctrl+Q reach the keymap.
#[cfg(unix)]
struct RawMode {
    saved: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// Switch stdin to raw mode. `Ok(None)` if stdin is not a terminal.
    fn enable() -> io::Result<Option<Self>> {
        let fd = libc::STDIN_FILENO;
        if unsafe { libc::isatty(fd) } == 0 {
            tracing::debug!("stdin is not a tty; raw mode skipped");
            return Ok(None);
        }

        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut termios = saved;
        unsafe { libc::cfmakeraw(&raw mut termios) };
        // read() blocks until at least one byte is there.
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(io::Error::last_os_error());
        }

        *SAVED_TERMIOS.lock().unwrap_or_else(PoisonError::into_inner) = Some(saved);
        Ok(Some(Self { saved }))
    }

    /// Put the saved termios back.
    fn disable(self) -> io::Result<()> {
        let rc = unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const self.saved)
        };
        SAVED_TERMIOS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    #[allow(clippy::unnecessary_wraps)]
    const fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }

    #[allow(clippy::unnecessary_wraps, clippy::unused_self)]
    const fn disable(self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Panic hook ─────────────────────────────────────────────────────────────

/// Written on panic: close any open synchronized update, drop attributes,
/// show the cursor, then return to the main screen.
#[rustfmt::skip]
const PANIC_RESET: &[u8] = b"\
    \x1b[?2026l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

/// Chain a terminal reset in front of the current panic hook. Runs once per
/// process no matter how many terminals are entered.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            reset_after_panic();
            previous(info);
        }));
    });
}

fn reset_after_panic() {
    #[cfg(unix)]
    {
        unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                PANIC_RESET.as_ptr().cast::<libc::c_void>(),
                PANIC_RESET.len(),
            );
        }
        // try_lock: the panic may have happened while the lock was held.
        if let Ok(saved) = SAVED_TERMIOS.try_lock() {
            if let Some(termios) = saved.as_ref() {
                unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, termios) };
            }
        }
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(PANIC_RESET);
        let _ = out.flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// What `enter` changed, kept so `leave` can undo exactly that.
struct Entered {
    raw: Option<RawMode>,
}

/// The editor's hold on the terminal.
///
/// ```no_run
/// use co_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // draw, read keys
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    size: Size,
    entered: Option<Entered>,
}

impl Terminal {
    /// A handle that has not taken over anything yet. The size is read now,
    /// or [`Size::DEFAULT`] if that fails.
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: get_size().unwrap_or(Size::DEFAULT),
            entered: None,
        }
    }

    /// Last known size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Read the size again, e.g. after a resize. Keeps the old value if the
    /// query fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    /// Raw input, alternate screen, hidden cursor, blank screen. Entering
    /// twice does nothing the second time.
    ///
    /// # Errors
    ///
    /// Fails if termios cannot be changed or stdout cannot be written. Raw
    /// mode is undone again if the screen setup fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.entered.is_some() {
            return Ok(());
        }
        install_panic_hook();

        let raw = RawMode::enable()?;
        if let Err(err) = Self::take_screen() {
            if let Some(raw) = raw {
                let _ = raw.disable();
            }
            return Err(err);
        }

        self.entered = Some(Entered { raw });
        tracing::debug!(cols = self.size.cols, rows = self.size.rows, "terminal entered");
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Does nothing if not entered.
    ///
    /// # Errors
    ///
    /// Fails if stdout cannot be written or termios cannot be restored.
    /// Termios is restored even when the screen reset fails.
    pub fn leave(&mut self) -> io::Result<()> {
        let Some(entered) = self.entered.take() else {
            return Ok(());
        };
        let screen = Self::give_back_screen();
        let termios = entered.raw.map_or(Ok(()), RawMode::disable);
        tracing::debug!("terminal restored");
        screen.and(termios)
    }

    fn take_screen() -> io::Result<()> {
        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()
    }

    fn give_back_screen() -> io::Result<()> {
        let mut out = io::stdout().lock();
        ansi::end_sync(&mut out)?;
        ansi::reset(&mut out)?;
        ansi::cursor_show(&mut out)?;
        ansi::exit_alt_screen(&mut out)?;
        out.flush()
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            tracing::warn!(%err, "terminal restore on drop failed");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_is_classic_vt100() {
        assert_eq!(Size::DEFAULT, Size::new(80, 24));
        assert_ne!(Size::DEFAULT, Size::new(80, 25));
    }

    #[test]
    fn size_query_without_tty_is_none_or_nonzero() {
        if let Some(size) = get_size() {
            assert!(size.cols > 0 && size.rows > 0);
        }
    }

    #[test]
    fn panic_reset_leaves_alt_screen_last() {
        let text = std::str::from_utf8(PANIC_RESET).unwrap();
        assert!(text.starts_with("\x1b[?2026l"));
        assert!(text.contains("\x1b[0m"));
        assert!(text.contains("\x1b[?25h"));
        assert!(text.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn new_handle_owns_nothing() {
        let term = Terminal::new();
        assert!(term.entered.is_none());
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
    }

    #[test]
    fn enter_and_leave_are_idempotent() {
        let mut term = Terminal::new();
        term.enter().unwrap();
        term.enter().unwrap();
        assert!(term.entered.is_some());
        term.leave().unwrap();
        term.leave().unwrap();
        assert!(term.entered.is_none());
    }

    #[test]
    fn dropping_an_entered_handle_leaves() {
        let mut term = Terminal::new();
        term.enter().unwrap();
        drop(term);
    }

    #[test]
    fn refresh_size_updates_the_cache() {
        let mut term = Terminal::new();
        assert_eq!(term.refresh_size(), term.size());
    }
}
