//! Error types for the editor core.
//!
//! [`BufferError`] covers file I/O, [`EditError`] covers buffer mutations
//! given a position the buffer does not have. Neither is fatal to a session:
//! the dispatcher reports them and carries on.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use crate::position::Position;

/// Loading or saving a file failed.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: Utf8Error,
    },

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no file name")]
    NoPath,
}

/// A buffer mutation was asked to work somewhere it cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("position {pos} is outside the buffer")]
    OutOfBounds { pos: Position },

    #[error("row {row} is outside the buffer")]
    RowOutOfBounds { row: usize },

    /// Line breaks only enter the buffer through `split_line`.
    #[error("text contains a line break")]
    LineBreak,
}

/// An error and its chain of sources on one line, `outer: inner: ...`.
///
/// The status line has no room for a backtrace, but "cannot write x" alone
/// hides the reason.
#[must_use]
pub fn describe(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
