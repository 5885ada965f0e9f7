//! # co-editor — Editor core for co
//!
//! This crate contains everything the editor does that is not terminal
//! plumbing:
//!
//! - **[`position`]** — `Position` (row, col), 0-indexed, columns in chars
//! - **[`buffer`]** — `LineBuffer` wrapping a rope with line edits, file I/O, and metadata
//! - **[`width`]** — char column ↔ screen column mapping
//! - **[`indent`]** — indent width detection
//! - **[`cursor`]** — cursor movement with desired-column memory
//! - **[`viewport`]** — vertical scroll clamping
//! - **[`command`]** — commands and the keymap
//! - **[`options`]** — `--set` options
//! - **[`editor`]** — session state, command dispatch, main loop
//! - **[`view`]** — painting the editor onto a `Screen`
//! - **[`error`]** — error types
//!
//! The core reaches the terminal only through `co_term::screen::Screen`, so
//! the whole editor runs against `HeadlessScreen` in tests.

pub mod buffer;
pub mod command;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod indent;
pub mod options;
pub mod position;
pub mod view;
pub mod viewport;
pub mod width;
