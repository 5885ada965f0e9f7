// SPDX-License-Identifier: MIT
//
// co-term — Terminal layer for the co editor.
//
// Everything the editor core needs from a character-cell terminal, and
// nothing it doesn't: raw mode with panic-safe restore, a byte parser that
// turns stdin into key events, a blocking event reader that also reports
// resizes, a cell grid to paint into, and a differential renderer that only
// sends changed cells.
//
// The core never touches these directly. It talks to the [`screen::Screen`]
// trait — "how big is the terminal, give me the next event, draw this text
// here, put the cursor there, show the frame" — and this crate provides the
// real implementation plus a headless one for tests.
//
// No crossterm, no ratatui: direct termios and ANSI escape sequences.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod input;
pub mod reader;
pub mod screen;
pub mod terminal;
pub mod width;
