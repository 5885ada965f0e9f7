// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Blocking event reader: stdin bytes in, key and resize events out.
//
// The editor is single-threaded. It draws a frame, then blocks here until
// the user does something. `read_event` waits in `poll(2)` with no timeout,
// so an idle editor costs nothing.
//
// # SIGWINCH
//
// Resizes arrive through a self-pipe. The handler writes one byte to a
// non-blocking pipe and `poll` watches the pipe's read end next to the
// input fd. A signal landing between two waits leaves its byte in the pipe,
// so the next `poll` returns at once instead of sleeping until a key. The
// handler is installed without `SA_RESTART`; an `EINTR` just loops back to
// `poll`, which then sees the byte.
//
// # Escape Sequence Timeout
//
// A lone ESC byte is either the Escape key or the start of a sequence. When
// the parser holds pending bytes, the next poll waits at most
// `ESC_TIMEOUT_MS`. If nothing arrives, the pending bytes are flushed as
// literal keys. This is the only bounded wait in the program.

use std::collections::VecDeque;
use std::io;
#[cfg(unix)]
use std::sync::atomic::{AtomicI32, Ordering};
#[cfg(unix)]
use std::sync::{Mutex, PoisonError};

use crate::input::{Event, Parser};
use crate::terminal::{self, Size};

/// A keypress is 1-6 bytes, a fast typist or a paste a few hundred.
const READ_BUF_SIZE: usize = 4096;

/// How long a lone ESC waits for the rest of a sequence.
pub const ESC_TIMEOUT_MS: i32 = 25;

// ─── Resize wake pipe ────────────────────────────────────────────────────────

/// Write end of the wake pipe, -1 until it exists. Read by the handler.
#[cfg(unix)]
static WAKE_WRITE: AtomicI32 = AtomicI32::new(-1);

/// Read end of the wake pipe, created on first use and shared by every
/// reader that reports resizes.
#[cfg(unix)]
static WAKE_READ: Mutex<Option<libc::c_int>> = Mutex::new(None);

/// The wake pipe's read end, creating the pipe and installing the SIGWINCH
/// handler the first time.
#[cfg(unix)]
fn resize_wake_fd() -> io::Result<libc::c_int> {
    let mut slot = WAKE_READ.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(fd) = *slot {
        return Ok(fd);
    }
    let [read, write] = open_wake_pipe()?;
    WAKE_WRITE.store(write, Ordering::Relaxed);
    install_sigwinch_handler()?;
    *slot = Some(read);
    tracing::debug!(read, write, "resize wake pipe ready");
    Ok(read)
}

/// A pipe with both ends non-blocking and close-on-exec.
#[cfg(unix)]
fn open_wake_pipe() -> io::Result<[libc::c_int; 2]> {
    let mut fds = [0; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    for fd in fds {
        let ok = unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFL);
            flags >= 0
                && libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) == 0
                && libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) == 0
        };
        if !ok {
            let err = io::Error::last_os_error();
            unsafe {
                libc::close(fds[0]);
                libc::close(fds[1]);
            }
            return Err(err);
        }
    }
    Ok(fds)
}

#[cfg(unix)]
fn install_sigwinch_handler() -> io::Result<()> {
    let rc = unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut())
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// `write(2)` is async-signal-safe. A full pipe already holds a wakeup, so a
/// failed write loses nothing.
#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    let fd = WAKE_WRITE.load(Ordering::Relaxed);
    if fd >= 0 {
        let byte = 1u8;
        unsafe { libc::write(fd, (&raw const byte).cast(), 1) };
    }
}

/// Empty the wake pipe. Several resizes collapse into one event.
#[cfg(unix)]
fn drain(fd: libc::c_int) {
    let mut buf = [0u8; 64];
    while unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) } > 0 {}
}

// ─── EventReader ─────────────────────────────────────────────────────────────

enum Wait {
    Input,
    Resize,
    TimedOut,
    Interrupted,
}

/// Blocking reader that turns a terminal input fd into [`Event`]s.
///
/// ```no_run
/// use co_term::reader::EventReader;
///
/// let mut reader = EventReader::stdin()?;
/// while let Some(event) = reader.read_event()? {
///     println!("{event:?}");
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventReader {
    #[cfg(unix)]
    fd: libc::c_int,
    /// Read end of the wake pipe when resizes are reported.
    #[cfg(unix)]
    wake: Option<libc::c_int>,
    parser: Parser,
    queue: VecDeque<Event>,
    eof: bool,
}

impl EventReader {
    /// Read from stdin and report terminal resizes.
    ///
    /// # Errors
    ///
    /// Returns an error if the resize pipe or the SIGWINCH handler cannot be
    /// set up.
    #[cfg(unix)]
    pub fn stdin() -> io::Result<Self> {
        Self::from_fd(libc::STDIN_FILENO).with_resize_events()
    }

    /// Read from stdin. Resizes are not reported on this platform.
    ///
    /// # Errors
    ///
    /// Never fails here; the signature matches the unix build.
    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    pub fn stdin() -> io::Result<Self> {
        Ok(Self {
            parser: Parser::new(),
            queue: VecDeque::new(),
            eof: false,
        })
    }

    /// Read from an arbitrary fd, without resize events. The caller keeps
    /// the fd open for the reader's lifetime.
    #[cfg(unix)]
    #[must_use]
    pub fn from_fd(fd: libc::c_int) -> Self {
        Self {
            fd,
            wake: None,
            parser: Parser::new(),
            queue: VecDeque::new(),
            eof: false,
        }
    }

    /// Also report SIGWINCH as [`Event::Resize`].
    ///
    /// # Errors
    ///
    /// Returns an error if the resize pipe or the SIGWINCH handler cannot be
    /// set up.
    #[cfg(unix)]
    pub fn with_resize_events(mut self) -> io::Result<Self> {
        self.wake = Some(resize_wake_fd()?);
        Ok(self)
    }

    /// Block until the next event.
    ///
    /// Returns `Ok(None)` once the input is closed and every buffered event
    /// has been delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if polling or reading the fd fails for a reason
    /// other than a signal interruption.
    pub fn read_event(&mut self) -> io::Result<Option<Event>> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(event));
            }
            if self.eof {
                return Ok(None);
            }

            let timeout = if self.parser.has_pending() {
                ESC_TIMEOUT_MS
            } else {
                -1
            };

            match self.wait(timeout)? {
                Wait::Interrupted => {}
                Wait::TimedOut => self.queue.extend(self.parser.flush()),
                Wait::Input => self.fill()?,
                Wait::Resize => {
                    let size = terminal::get_size().unwrap_or(Size::DEFAULT);
                    tracing::debug!(cols = size.cols, rows = size.rows, "resize");
                    return Ok(Some(Event::Resize(size)));
                }
            }
        }
    }

    /// Read what is available and parse it. A zero-length read is EOF.
    fn fill(&mut self) -> io::Result<()> {
        let mut buf = [0u8; READ_BUF_SIZE];
        match self.read(&mut buf) {
            Ok(0) => {
                self.queue.extend(self.parser.flush());
                self.eof = true;
                Ok(())
            }
            Ok(n) => {
                self.queue.extend(self.parser.advance(&buf[..n]));
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Wait on the input fd and, if present, the wake pipe. A pending
    /// resize wins over pending input.
    #[cfg(unix)]
    fn wait(&self, timeout_ms: i32) -> io::Result<Wait> {
        let mut pfds = [
            libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                fd: self.wake.unwrap_or(-1),
                events: libc::POLLIN,
                revents: 0,
            },
        ];
        let nfds: libc::nfds_t = if self.wake.is_some() { 2 } else { 1 };
        let ready = unsafe { libc::poll(pfds.as_mut_ptr(), nfds, timeout_ms) };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(Wait::Interrupted)
            } else {
                Err(err)
            };
        }
        if ready == 0 {
            return Ok(Wait::TimedOut);
        }
        if let Some(wake) = self.wake {
            if pfds[1].revents & libc::POLLIN != 0 {
                drain(wake);
                return Ok(Wait::Resize);
            }
        }
        if pfds[0].revents == 0 {
            return Ok(Wait::Interrupted);
        }
        Ok(Wait::Input)
    }

    #[cfg(unix)]
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    // Without poll there is no escape timeout: a lone ESC is delivered with
    // the next read.
    #[cfg(not(unix))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn wait(&self, _timeout_ms: i32) -> io::Result<Wait> {
        Ok(Wait::Input)
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_self)]
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        use std::io::Read;
        io::stdin().lock().read(buf)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
