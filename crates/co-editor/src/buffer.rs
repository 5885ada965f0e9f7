//! Line buffer — the text being edited.
//!
//! A `LineBuffer` wraps a [`ropey::Rope`] and presents it as an ordered list
//! of lines with line-level editing operations, file load/save, and metadata
//! (path, modified flag, line ending).
//!
//! # Design choices
//!
//! - **One line break, `\n`.** ropey is built without its CR/Unicode line
//!   break features, so `\n` is the only separator it knows. CRLF and lone CR
//!   are normalized away on load and written back on save. The rope never
//!   ends with a `\n`: N lines are stored as N strings joined by N-1 breaks,
//!   so `len_lines()` is the line count and there is always at least one.
//!
//! - **Columns are char offsets**, never bytes. Column `len` (one past the
//!   last char) is a valid position for inserting and deleting.
//!
//! - **Mutations return `Result`.** A position outside the buffer is an
//!   [`EditError`], not a panic. The dispatcher clamps before calling, so an
//!   error here means a bug upstream, and the session survives it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ropey::{Rope, RopeSlice};

use crate::error::{BufferError, EditError};
use crate::indent::leading_run;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a file.
///
/// Detected on load from the first terminator in the file. New buffers use
/// `Lf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// The style of the first line terminator in `text`, or `Lf` if there
    /// is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => return Self::Lf,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => return Self::CrLf,
                b'\r' => return Self::Cr,
                _ => {}
            }
        }
        Self::Lf
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
            Self::Cr => f.write_str("CR"),
        }
    }
}

// ---------------------------------------------------------------------------
// LineBuffer
// ---------------------------------------------------------------------------

/// The ordered lines of one file. Never empty: an empty file is one empty
/// line.
pub struct LineBuffer {
    rope: Rope,
    path: Option<PathBuf>,
    modified: bool,
    line_ending: LineEnding,
}

impl LineBuffer {
    // -- Construction -------------------------------------------------------

    /// One empty line, no path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            path: None,
            modified: false,
            line_ending: LineEnding::Lf,
        }
    }

    /// Build from file text: terminators stripped, one line per input line.
    /// A single final terminator does not make an extra empty line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        let mut normalized = normalize_line_endings(text);
        if normalized.ends_with('\n') {
            normalized.pop();
        }
        Self {
            rope: Rope::from_str(&normalized),
            path: None,
            modified: false,
            line_ending,
        }
    }

    /// Load `path`. A file that does not exist yet gives one empty line
    /// bound to that path, so the first save creates it.
    ///
    /// # Errors
    ///
    /// [`BufferError::Read`] if the file exists but cannot be read,
    /// [`BufferError::Encoding`] if it is not UTF-8.
    pub fn load(path: &Path) -> Result<Self, BufferError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "new file");
                let mut buffer = Self::new();
                buffer.path = Some(path.to_path_buf());
                return Ok(buffer);
            }
            Err(source) => {
                return Err(BufferError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let text = std::str::from_utf8(&bytes).map_err(|source| BufferError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;

        let mut buffer = Self::from_text(text);
        buffer.path = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            lines = buffer.line_count(),
            line_ending = %buffer.line_ending,
            "loaded"
        );
        Ok(buffer)
    }

    // -- Read access --------------------------------------------------------

    /// Number of lines, always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line `row` without its break, or `None` past the last line.
    #[must_use]
    pub fn line(&self, row: usize) -> Option<RopeSlice<'_>> {
        if row >= self.line_count() {
            return None;
        }
        let line = self.rope.line(row);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            Some(line.slice(..len - 1))
        } else {
            Some(line)
        }
    }

    /// Length of line `row` in chars; 0 past the last line.
    #[must_use]
    pub fn line_len(&self, row: usize) -> usize {
        self.line(row).map_or(0, |l| l.len_chars())
    }

    /// Length of the run of spaces and tabs that starts line `row`.
    #[must_use]
    pub fn leading_whitespace(&self, row: usize) -> usize {
        self.line(row).map_or(0, |l| leading_run(l.chars()))
    }

    /// Every line, in order.
    pub fn lines(&self) -> impl Iterator<Item = RopeSlice<'_>> {
        (0..self.line_count()).filter_map(|row| self.line(row))
    }

    /// The lines joined with `\n`, no trailing break.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Clamp `pos` to the nearest position the buffer has.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.line_count() - 1);
        Position::new(row, pos.col.min(self.line_len(row)))
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` at `pos`. Returns the position after it.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfBounds`] if `pos` is not in the buffer,
    /// [`EditError::LineBreak`] for `\n` or `\r`.
    pub fn insert_char(&mut self, pos: Position, ch: char) -> Result<Position, EditError> {
        if is_line_break(ch) {
            return Err(EditError::LineBreak);
        }
        let idx = self.char_idx(pos)?;
        self.rope.insert_char(idx, ch);
        self.modified = true;
        Ok(Position::new(pos.row, pos.col + 1))
    }

    /// Insert `text` at `pos`. Returns the position after it.
    ///
    /// # Errors
    ///
    /// As [`insert_char`](Self::insert_char).
    pub fn insert_str(&mut self, pos: Position, text: &str) -> Result<Position, EditError> {
        if text.chars().any(is_line_break) {
            return Err(EditError::LineBreak);
        }
        let idx = self.char_idx(pos)?;
        if text.is_empty() {
            return Ok(pos);
        }
        self.rope.insert(idx, text);
        self.modified = true;
        Ok(Position::new(pos.row, pos.col + text.chars().count()))
    }

    /// Delete up to `n` chars ending at `pos`: `min(n, col)` of them. At
    /// column 0 the line joins onto the previous one instead. Returns where
    /// the cursor belongs afterwards.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfBounds`] if `pos` is not in the buffer.
    pub fn delete_before(&mut self, pos: Position, n: usize) -> Result<Position, EditError> {
        let idx = self.char_idx(pos)?;
        if n == 0 {
            return Ok(pos);
        }

        if pos.col == 0 {
            if pos.row == 0 {
                return Ok(pos);
            }
            let joined_at = Position::new(pos.row - 1, self.line_len(pos.row - 1));
            // The break is the char just before this line's first char.
            self.rope.remove(idx - 1..idx);
            self.modified = true;
            return Ok(joined_at);
        }

        let count = n.min(pos.col);
        self.rope.remove(idx - count..idx);
        self.modified = true;
        Ok(Position::new(pos.row, pos.col - count))
    }

    /// Delete the char at `pos`. At the end of a line the next line joins
    /// onto this one. On the last line's end this does nothing.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfBounds`] if `pos` is not in the buffer.
    pub fn delete_after(&mut self, pos: Position) -> Result<(), EditError> {
        let idx = self.char_idx(pos)?;
        if idx < self.rope.len_chars() {
            self.rope.remove(idx..=idx);
            self.modified = true;
        }
        Ok(())
    }

    /// Split line `pos.row` at `pos.col`; the remainder becomes a new line
    /// below. Returns `(row + 1, 0)`.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfBounds`] if `pos` is not in the buffer.
    pub fn split_line(&mut self, pos: Position) -> Result<Position, EditError> {
        let idx = self.char_idx(pos)?;
        self.rope.insert_char(idx, '\n');
        self.modified = true;
        Ok(Position::new(pos.row + 1, 0))
    }

    /// Remove line `row`. Removing the only line leaves one empty line.
    ///
    /// # Errors
    ///
    /// [`EditError::RowOutOfBounds`] if there is no such line.
    pub fn delete_line(&mut self, row: usize) -> Result<(), EditError> {
        let count = self.line_count();
        if row >= count {
            return Err(EditError::RowOutOfBounds { row });
        }

        let start = self.rope.line_to_char(row);
        let range = if count == 1 {
            0..self.rope.len_chars()
        } else if row + 1 == count {
            // Last line: take the break before it so no empty line is left.
            start - 1..self.rope.len_chars()
        } else {
            start..self.rope.line_to_char(row + 1)
        };

        if !range.is_empty() {
            self.rope.remove(range);
        }
        self.modified = true;
        Ok(())
    }

    fn char_idx(&self, pos: Position) -> Result<usize, EditError> {
        if pos.row >= self.line_count() || pos.col > self.line_len(pos.row) {
            return Err(EditError::OutOfBounds { pos });
        }
        Ok(self.rope.line_to_char(pos.row) + pos.col)
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// True if the buffer changed since it was loaded or last saved.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    // -- File I/O -----------------------------------------------------------

    /// Write every line followed by one terminator of the buffer's style.
    /// Returns the number of lines written and clears the modified flag.
    ///
    /// # Errors
    ///
    /// [`BufferError::NoPath`] if the buffer has no path, [`BufferError::Write`]
    /// if the write fails.
    pub fn save(&mut self) -> Result<usize, BufferError> {
        let Some(path) = self.path.clone() else {
            return Err(BufferError::NoPath);
        };
        self.save_as(&path)
    }

    /// Write to `path` and make it the buffer's path.
    ///
    /// # Errors
    ///
    /// [`BufferError::Write`] if the write fails.
    pub fn save_as(&mut self, path: &Path) -> Result<usize, BufferError> {
        let content = self.to_file_text();
        fs::write(path, content).map_err(|source| BufferError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        let lines = self.line_count();
        self.path = Some(path.to_path_buf());
        self.modified = false;
        tracing::info!(path = %path.display(), lines, "saved");
        Ok(lines)
    }

    /// The text as it goes to disk.
    #[must_use]
    pub fn to_file_text(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut out = String::with_capacity(self.rope.len_bytes() + self.line_count() * 2);
        for line in self.lines() {
            for chunk in line.chunks() {
                out.push_str(chunk);
            }
            out.push_str(ending);
        }
        out
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBuffer")
            .field("lines", &self.line_count())
            .field("modified", &self.modified)
            .field("line_ending", &self.line_ending)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r')
}

/// Turn every `\r\n` and lone `\r` into `\n`.
fn normalize_line_endings(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\r' {
            result.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(buf: &LineBuffer) -> Vec<String> {
        buf.lines().map(|l| l.to_string()).collect()
    }

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    // -- LineEnding ---------------------------------------------------------

    #[test]
    fn line_ending_detect() {
        assert_eq!(LineEnding::detect("a\nb\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\r\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb\r"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("none"), LineEnding::Lf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }

    #[test]
    fn line_ending_first_wins() {
        assert_eq!(LineEnding::detect("a\nb\r\nc"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::CrLf);
    }

    #[test]
    fn line_ending_display() {
        assert_eq!(LineEnding::CrLf.to_string(), "CRLF");
        assert_eq!(LineEnding::Lf.as_str(), "\n");
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_buffer_has_one_empty_line() {
        let buf = LineBuffer::new();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_len(0), 0);
        assert!(!buf.is_modified());
        assert!(buf.path().is_none());
    }

    #[test]
    fn from_text_strips_one_final_terminator() {
        assert_eq!(lines(&LineBuffer::from_text("ab\ncd\n")), vec!["ab", "cd"]);
        assert_eq!(lines(&LineBuffer::from_text("ab\ncd")), vec!["ab", "cd"]);
        assert_eq!(lines(&LineBuffer::from_text("ab\n\n")), vec!["ab", ""]);
        assert_eq!(lines(&LineBuffer::from_text("")), vec![""]);
        assert_eq!(lines(&LineBuffer::from_text("\n")), vec![""]);
    }

    #[test]
    fn from_text_normalizes_crlf_and_cr() {
        let buf = LineBuffer::from_text("a\r\nb\r\n");
        assert_eq!(lines(&buf), vec!["a", "b"]);
        assert_eq!(buf.line_ending(), LineEnding::CrLf);

        let buf = LineBuffer::from_text("a\rb\r");
        assert_eq!(lines(&buf), vec!["a", "b"]);
        assert_eq!(buf.line_ending(), LineEnding::Cr);
    }

    #[test]
    fn unicode_line_separators_are_not_breaks() {
        let buf = LineBuffer::from_text("a\u{2028}b\u{85}c");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_len(0), 5);
    }

    // -- Read access --------------------------------------------------------

    #[test]
    fn line_out_of_range_is_none() {
        let buf = LineBuffer::from_text("one");
        assert!(buf.line(1).is_none());
        assert_eq!(buf.line_len(1), 0);
    }

    #[test]
    fn line_len_counts_chars() {
        let buf = LineBuffer::from_text("café\n中文");
        assert_eq!(buf.line_len(0), 4);
        assert_eq!(buf.line_len(1), 2);
    }

    #[test]
    fn leading_whitespace_counts_spaces_and_tabs() {
        let buf = LineBuffer::from_text("    x\n\t\ty\nz\n   ");
        assert_eq!(buf.leading_whitespace(0), 4);
        assert_eq!(buf.leading_whitespace(1), 2);
        assert_eq!(buf.leading_whitespace(2), 0);
        assert_eq!(buf.leading_whitespace(3), 3);
    }

    #[test]
    fn leading_whitespace_stops_at_other_unicode_spaces() {
        // U+00A0 and U+3000 are whitespace but not indentation.
        let buf = LineBuffer::from_text("\u{a0} x\n  \u{3000}y");
        assert_eq!(buf.leading_whitespace(0), 0);
        assert_eq!(buf.leading_whitespace(1), 2);
        assert_eq!(buf.leading_whitespace(9), 0);
    }

    #[test]
    fn contents_joins_without_trailing_break() {
        let buf = LineBuffer::from_text("a\nb\n");
        assert_eq!(buf.contents(), "a\nb");
    }

    #[test]
    fn clamp_pulls_into_range() {
        let buf = LineBuffer::from_text("abc\nx");
        assert_eq!(buf.clamp(pos(0, 99)), pos(0, 3));
        assert_eq!(buf.clamp(pos(9, 2)), pos(1, 1));
    }

    // -- Insert -------------------------------------------------------------

    #[test]
    fn insert_char_in_middle_and_end() {
        let mut buf = LineBuffer::from_text("ac");
        assert_eq!(buf.insert_char(pos(0, 1), 'b').unwrap(), pos(0, 2));
        assert_eq!(buf.insert_char(pos(0, 3), 'd').unwrap(), pos(0, 4));
        assert_eq!(lines(&buf), vec!["abcd"]);
        assert!(buf.is_modified());
    }

    #[test]
    fn insert_into_empty_buffer() {
        let mut buf = LineBuffer::new();
        buf.insert_char(pos(0, 0), 'x').unwrap();
        assert_eq!(lines(&buf), vec!["x"]);
    }

    #[test]
    fn insert_str_returns_end() {
        let mut buf = LineBuffer::from_text("x");
        assert_eq!(buf.insert_str(pos(0, 0), "    ").unwrap(), pos(0, 4));
        assert_eq!(lines(&buf), vec!["    x"]);
    }

    #[test]
    fn insert_out_of_bounds_is_an_error() {
        let mut buf = LineBuffer::from_text("ab");
        assert_eq!(
            buf.insert_char(pos(0, 3), 'x'),
            Err(EditError::OutOfBounds { pos: pos(0, 3) })
        );
        assert_eq!(
            buf.insert_char(pos(1, 0), 'x'),
            Err(EditError::OutOfBounds { pos: pos(1, 0) })
        );
        assert!(!buf.is_modified());
    }

    #[test]
    fn insert_line_break_is_rejected() {
        let mut buf = LineBuffer::from_text("ab");
        assert_eq!(buf.insert_char(pos(0, 1), '\n'), Err(EditError::LineBreak));
        assert_eq!(buf.insert_str(pos(0, 1), "x\ry"), Err(EditError::LineBreak));
        assert_eq!(buf.line_count(), 1);
    }

    // -- delete_before ------------------------------------------------------

    #[test]
    fn delete_before_removes_one() {
        let mut buf = LineBuffer::from_text("abc");
        assert_eq!(buf.delete_before(pos(0, 2), 1).unwrap(), pos(0, 1));
        assert_eq!(lines(&buf), vec!["ac"]);
    }

    #[test]
    fn delete_before_caps_at_column() {
        let mut buf = LineBuffer::from_text("  x");
        assert_eq!(buf.delete_before(pos(0, 2), 4).unwrap(), pos(0, 0));
        assert_eq!(lines(&buf), vec!["x"]);
    }

    #[test]
    fn delete_before_at_col_0_joins_lines() {
        let mut buf = LineBuffer::from_text("ab\ncd");
        assert_eq!(buf.delete_before(pos(1, 0), 1).unwrap(), pos(0, 2));
        assert_eq!(lines(&buf), vec!["abcd"]);
    }

    #[test]
    fn delete_before_at_origin_is_noop() {
        let mut buf = LineBuffer::from_text("ab");
        assert_eq!(buf.delete_before(pos(0, 0), 1).unwrap(), pos(0, 0));
        assert_eq!(lines(&buf), vec!["ab"]);
        assert!(!buf.is_modified());
    }

    #[test]
    fn delete_before_four_space_indent() {
        let mut buf = LineBuffer::from_text("    ");
        assert_eq!(buf.delete_before(pos(0, 4), 4).unwrap(), pos(0, 0));
        assert_eq!(lines(&buf), vec![""]);
    }

    // -- delete_after -------------------------------------------------------

    #[test]
    fn delete_after_removes_char() {
        let mut buf = LineBuffer::from_text("abc");
        buf.delete_after(pos(0, 1)).unwrap();
        assert_eq!(lines(&buf), vec!["ac"]);
    }

    #[test]
    fn delete_after_at_eol_joins_next() {
        let mut buf = LineBuffer::from_text("ab\ncd");
        buf.delete_after(pos(0, 2)).unwrap();
        assert_eq!(lines(&buf), vec!["abcd"]);
    }

    #[test]
    fn delete_after_at_end_of_buffer_is_noop() {
        let mut buf = LineBuffer::from_text("ab");
        buf.delete_after(pos(0, 2)).unwrap();
        assert_eq!(lines(&buf), vec!["ab"]);
        assert!(!buf.is_modified());
    }

    // -- split_line ---------------------------------------------------------

    #[test]
    fn split_line_in_middle() {
        let mut buf = LineBuffer::from_text("hello");
        assert_eq!(buf.split_line(pos(0, 2)).unwrap(), pos(1, 0));
        assert_eq!(lines(&buf), vec!["he", "llo"]);
    }

    #[test]
    fn split_line_at_ends() {
        let mut buf = LineBuffer::from_text("ab");
        buf.split_line(pos(0, 2)).unwrap();
        buf.split_line(pos(0, 0)).unwrap();
        assert_eq!(lines(&buf), vec!["", "ab", ""]);
    }

    // -- delete_line --------------------------------------------------------

    #[test]
    fn delete_line_middle_first_last() {
        let mut buf = LineBuffer::from_text("a\nb\nc\nd");
        buf.delete_line(1).unwrap();
        assert_eq!(lines(&buf), vec!["a", "c", "d"]);
        buf.delete_line(0).unwrap();
        assert_eq!(lines(&buf), vec!["c", "d"]);
        buf.delete_line(1).unwrap();
        assert_eq!(lines(&buf), vec!["c"]);
    }

    #[test]
    fn delete_only_line_leaves_empty_line() {
        let mut buf = LineBuffer::from_text("only");
        buf.delete_line(0).unwrap();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(lines(&buf), vec![""]);
        buf.delete_line(0).unwrap();
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn delete_line_out_of_range() {
        let mut buf = LineBuffer::from_text("a");
        assert_eq!(buf.delete_line(1), Err(EditError::RowOutOfBounds { row: 1 }));
    }

    #[test]
    fn line_count_never_drops_below_one() {
        let mut buf = LineBuffer::from_text("a\nb\nc");
        for _ in 0..5 {
            buf.delete_line(0).unwrap();
            assert!(buf.line_count() >= 1);
        }
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn to_file_text_terminates_every_line() {
        assert_eq!(LineBuffer::from_text("a\nb").to_file_text(), "a\nb\n");
        assert_eq!(LineBuffer::from_text("a\r\nb\r\n").to_file_text(), "a\r\nb\r\n");
        assert_eq!(LineBuffer::new().to_file_text(), "\n");
    }

    #[test]
    fn load_then_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.txt");
        fs::write(&path, "fn main() {\n    body();\n}\n").unwrap();

        let mut buf = LineBuffer::load(&path).unwrap();
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.path(), Some(path.as_path()));

        assert_eq!(buf.save().unwrap(), 3);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fn main() {\n    body();\n}\n"
        );
    }

    #[test]
    fn save_adds_missing_final_terminator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nofinal.txt");
        fs::write(&path, "a\nb").unwrap();

        let mut buf = LineBuffer::load(&path).unwrap();
        buf.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn save_keeps_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        fs::write(&path, "a\r\nb\r\n").unwrap();

        let mut buf = LineBuffer::load(&path).unwrap();
        buf.insert_char(pos(1, 1), '!').unwrap();
        buf.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\r\nb!\r\n");
    }

    #[test]
    fn save_clears_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let mut buf = LineBuffer::load(&path).unwrap();
        buf.insert_char(pos(0, 0), 'x').unwrap();
        assert!(buf.is_modified());
        buf.save().unwrap();
        assert!(!buf.is_modified());
        assert_eq!(fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn load_missing_file_gives_empty_buffer_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let buf = LineBuffer::load(&path).unwrap();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_len(0), 0);
        assert_eq!(buf.path(), Some(path.as_path()));
        assert!(!path.exists());
    }

    #[test]
    fn load_invalid_utf8_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.dat");
        fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let err = LineBuffer::load(&path).unwrap_err();
        assert!(matches!(err, BufferError::Encoding { .. }));
    }

    #[test]
    fn load_directory_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineBuffer::load(dir.path()).unwrap_err();
        assert!(matches!(err, BufferError::Read { .. }));
    }

    #[test]
    fn save_to_missing_directory_fails_and_stays_modified() {
        let dir = tempfile::tempdir().unwrap();
        let mut buf = LineBuffer::from_text("x");
        buf.insert_char(pos(0, 1), 'y').unwrap();

        let err = buf.save_as(&dir.path().join("no/such/dir.txt")).unwrap_err();
        assert!(matches!(err, BufferError::Write { .. }));
        assert!(buf.is_modified());
    }

    #[test]
    fn save_without_path_fails() {
        let mut buf = LineBuffer::from_text("x");
        assert!(matches!(buf.save(), Err(BufferError::NoPath)));
    }
}
