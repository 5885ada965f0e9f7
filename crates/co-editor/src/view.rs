//! View — paints the editor onto a [`Screen`].
//!
//! Stateless: everything it needs is read from the [`Editor`], and the
//! scroll offset it paints from was clamped by the editor before the frame.
//!
//! ```text
//! ┌──────┬────────────────────────┐
//! │gutter│      text area         │ ← text_rows(height) rows
//! │ 1    │fn main() {             │
//! │ 2    │    body();             │
//! │~     │                        │ ← past the end of the buffer
//! ├──────┴────────────────────────┤
//! │ main.rs [+]  Wrote 2 lines   2:5  indent 4 │ ← status (INVERSE)
//! └───────────────────────────────┘
//! ```
//!
//! Text is clipped at the right edge by display width, never wrapped. A
//! screen of one row has no status line.

use co_term::cell::Attr;
use co_term::screen::Screen;
use co_term::terminal::Size;

use crate::editor::Editor;
use crate::width::{char_width, str_width};

// ---------------------------------------------------------------------------
// Layout helpers
// ---------------------------------------------------------------------------

/// Rows available for text: everything but the status line, or the whole
/// screen when it is too short to have one. Never 0.
#[must_use]
pub fn text_rows(size: Size) -> usize {
    let rows = usize::from(size.rows);
    if rows >= 2 { rows - 1 } else { 1 }
}

/// Columns used by the line-number gutter: digits of the largest line number
/// plus a separator space. 0 when numbers are off.
///
/// | Lines   | Gutter |
/// |---------|--------|
/// | 1–9     | 2      |
/// | 10–99   | 3      |
/// | 100–999 | 4      |
#[must_use]
pub fn gutter_width(line_count: usize, show_numbers: bool) -> u16 {
    if !show_numbers {
        return 0;
    }
    // At least 1, so ilog10 doesn't panic on 0.
    let digits = line_count.max(1).ilog10() + 1;
    // digits <= 20 for usize::MAX.
    #[allow(clippy::cast_possible_truncation)]
    let width = digits as u16 + 1;
    width
}

/// The longest prefix of `chars` that fits in `max` columns.
fn clip<I: IntoIterator<Item = char>>(chars: I, max: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in chars {
        used += char_width(ch);
        if used > max {
            break;
        }
        out.push(ch);
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
const fn to_u16(n: usize) -> u16 {
    if n > u16::MAX as usize { u16::MAX } else { n as u16 }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Paint one full frame: text rows, status line, cursor. The caller
/// refreshes the screen afterwards.
pub fn render<S: Screen>(editor: &Editor, screen: &mut S) {
    let size = screen.size();
    if size.cols == 0 || size.rows == 0 {
        return;
    }

    let buffer = editor.buffer();
    let mut gutter = gutter_width(buffer.line_count(), editor.options().number);
    if gutter >= size.cols {
        gutter = 0;
    }
    let text_width = size.cols - gutter;
    let rows = text_rows(size);
    let top = editor.viewport().top();

    let mut painted = 0;
    for row in editor.viewport().visible_range(buffer.line_count()).take(rows) {
        let Some(line) = buffer.line(row) else { break };
        let y = to_u16(painted);
        if gutter > 0 {
            let label = format!("{:>w$} ", row + 1, w = usize::from(gutter) - 1);
            screen.draw_text(y, 0, &label, Attr::DIM);
        }
        let text = clip(line.chars(), usize::from(text_width));
        screen.draw_text(y, gutter, &text, Attr::empty());
        painted += 1;
    }
    for screen_row in painted..rows {
        screen.draw_text(to_u16(screen_row), 0, "~", Attr::DIM);
    }

    if size.rows >= 2 {
        render_status_line(editor, screen, size.rows - 1, size.cols);
    }

    let cursor = editor.cursor();
    let y = to_u16(cursor.row().saturating_sub(top));
    let x = cursor.display_col(buffer).min(usize::from(text_width) - 1);
    screen.move_cursor(y, gutter + to_u16(x));
}

/// ` name [+]  message ... row:col  indent N `, inverse, full width.
fn render_status_line<S: Screen>(editor: &Editor, screen: &mut S, y: u16, width: u16) {
    let buffer = editor.buffer();
    let name = buffer
        .path()
        .and_then(|p| p.file_name())
        .map_or_else(|| "[No Name]".into(), |n| n.to_string_lossy());
    let modified = if buffer.is_modified() { " [+]" } else { "" };
    let left = format!(" {name}{modified}");
    let right = format!(" {}  indent {} ", editor.cursor().position(), editor.indent());

    let total = usize::from(width);
    screen.draw_text(y, 0, &" ".repeat(total), Attr::INVERSE);

    let right_width = str_width(&right);
    let right_start = total.saturating_sub(right_width);
    let room = if right_start > 0 { right_start - 1 } else { 0 };

    let left = clip(left.chars(), room);
    let mut col = screen.draw_text(y, 0, &left, Attr::INVERSE);

    if let Some(message) = editor.message() {
        let attrs = if message.is_error() {
            Attr::INVERSE | Attr::BOLD
        } else {
            Attr::INVERSE
        };
        let space = room.saturating_sub(usize::from(col) + 2);
        let text = clip(message.text().chars(), space);
        if !text.is_empty() {
            col += 2;
            screen.draw_text(y, col, &text, attrs);
        }
    }

    screen.draw_text(y, to_u16(right_start), &right, Attr::INVERSE);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use co_term::screen::HeadlessScreen;
    use pretty_assertions::assert_eq;

    use crate::buffer::LineBuffer;
    use crate::options::Options;

    fn paint(editor: &mut Editor, cols: u16, rows: u16) -> HeadlessScreen {
        let mut screen = HeadlessScreen::new(Size::new(cols, rows));
        editor.resize(screen.size());
        render(editor, &mut screen);
        screen.refresh().unwrap();
        screen
    }

    fn editor(text: &str) -> Editor {
        Editor::new(LineBuffer::from_text(text), Options::new())
    }

    #[test]
    fn gutter_widths() {
        assert_eq!(gutter_width(1, true), 2);
        assert_eq!(gutter_width(9, true), 2);
        assert_eq!(gutter_width(10, true), 3);
        assert_eq!(gutter_width(999, true), 4);
        assert_eq!(gutter_width(0, true), 2);
        assert_eq!(gutter_width(500, false), 0);
    }

    #[test]
    fn text_rows_reserve_status() {
        assert_eq!(text_rows(Size::new(80, 24)), 23);
        assert_eq!(text_rows(Size::new(80, 2)), 1);
        assert_eq!(text_rows(Size::new(80, 1)), 1);
        assert_eq!(text_rows(Size::new(80, 0)), 1);
    }

    #[test]
    fn clip_respects_wide_chars() {
        assert_eq!(clip("abc".chars(), 2), "ab");
        assert_eq!(clip("a中b".chars(), 2), "a");
        assert_eq!(clip("a中b".chars(), 3), "a中");
        assert_eq!(clip("".chars(), 3), "");
    }

    #[test]
    fn lines_then_tildes_then_status() {
        let mut e = editor("one\ntwo");
        let screen = paint(&mut e, 30, 5);
        let lines = screen.lines();
        assert_eq!(lines[0], "one");
        assert_eq!(lines[1], "two");
        assert_eq!(lines[2], "~");
        assert_eq!(lines[3], "~");
        assert!(lines[4].starts_with(" [No Name]"));
        assert!(lines[4].ends_with("1:1  indent 2"));
        assert_eq!(screen.cell(4, 0).unwrap().attrs, Attr::INVERSE);
        assert_eq!(screen.cell(2, 0).unwrap().attrs, Attr::DIM);
    }

    #[test]
    fn status_shows_file_name_and_modified() {
        let mut buf = LineBuffer::from_text("x");
        buf.set_path("/tmp/some/notes.txt".into());
        buf.insert_char(crate::position::Position::new(0, 0), 'y').unwrap();
        let mut e = Editor::new(buf, Options::new());
        let screen = paint(&mut e, 40, 3);
        assert!(screen.row_text(2).starts_with(" notes.txt [+]"));
    }

    #[test]
    fn scrolled_view_paints_from_top_row() {
        let options = Options::from_args(["number"]).unwrap();
        let mut e = Editor::new(LineBuffer::from_text("a\nb\nc\nd\ne"), options);
        e.resize(Size::new(10, 4));
        e.set_cursor(crate::position::Position::new(4, 0));
        assert_eq!(e.viewport().top(), 2);

        let screen = paint(&mut e, 10, 4);
        assert_eq!(screen.lines()[..3], ["3 c", "4 d", "5 e"]);
        assert_eq!(screen.cursor(), (2, 2));
    }

    #[test]
    fn long_lines_are_clipped() {
        let mut e = editor(&"x".repeat(50));
        let screen = paint(&mut e, 10, 3);
        assert_eq!(screen.row_text(0), "x".repeat(10));
    }

    #[test]
    fn wide_char_that_does_not_fit_is_dropped() {
        let mut e = editor("abc中");
        let screen = paint(&mut e, 4, 2);
        assert_eq!(screen.row_text(0), "abc");
    }

    #[test]
    fn gutter_numbers_are_right_aligned_and_dim() {
        let text: Vec<String> = (1..=12).map(|n| format!("l{n}")).collect();
        let options = Options::from_args(["number"]).unwrap();
        let mut e = Editor::new(LineBuffer::from_text(&text.join("\n")), options);
        let screen = paint(&mut e, 20, 14);
        assert_eq!(screen.row_text(0), " 1 l1");
        assert_eq!(screen.row_text(11), "12 l12");
        assert_eq!(screen.cell(0, 1).unwrap().attrs, Attr::DIM);
        assert_eq!(screen.row_text(12), "~");
        assert_eq!(screen.cursor(), (0, 3));
    }

    #[test]
    fn one_row_screen_has_no_status() {
        let mut e = editor("only");
        let screen = paint(&mut e, 10, 1);
        assert_eq!(screen.lines(), vec!["only".to_owned()]);
    }

    #[test]
    fn cursor_column_is_clamped_to_screen() {
        let mut e = editor(&"y".repeat(30));
        e.execute(crate::command::Command::End);
        let screen = paint(&mut e, 10, 3);
        assert_eq!(e.cursor().col(), 30);
        assert_eq!(screen.cursor(), (0, 9));
    }

    #[test]
    fn cursor_after_wide_char() {
        let mut e = editor("中文x");
        e.execute(crate::command::Command::Right);
        let screen = paint(&mut e, 10, 3);
        assert_eq!(screen.cursor(), (0, 2));
    }

    #[test]
    fn error_message_is_bold() {
        let mut e = editor("x");
        e.set_error("boom");
        let screen = paint(&mut e, 40, 3);
        let status = screen.row_text(2);
        let at = status.find("boom").unwrap();
        #[allow(clippy::cast_possible_truncation)]
        let cell = screen.cell(2, at as u16).unwrap();
        assert_eq!(cell.attrs, Attr::INVERSE | Attr::BOLD);
    }

    #[test]
    fn narrow_screen_keeps_position_visible() {
        let mut e = editor("x");
        e.set_message("a long message that cannot fit");
        let screen = paint(&mut e, 20, 2);
        assert!(screen.row_text(1).ends_with("1:1  indent 2"));
    }
}
