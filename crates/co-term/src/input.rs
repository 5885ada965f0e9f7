// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. Handles what a terminal in raw
// mode sends without any extra protocols enabled:
//
// - Legacy CSI sequences (arrows, editing keys, function keys, with xterm
//   modifier parameters)
// - SS3 sequences (application-mode arrows, F1-F4)
// - Alt+key (ESC followed by a printable character)
// - C0 control bytes as Ctrl+letter
// - UTF-8 multi-byte characters
//
// # Design
//
// The parser keeps a small byte buffer because an escape sequence can span
// multiple `read()` calls. Feed bytes with [`Parser::advance`]. After a
// short timeout with no new bytes, call [`Parser::flush`] to emit a pending
// lone ESC as a real Escape keypress.

use bitflags::bitflags;

use crate::terminal::Size;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// The terminal was resized to the given size.
    Resize(Size),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with the given modifiers.
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key press with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Ctrl plus a letter, as the parser reports C0 control bytes.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F20.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags, in xterm's CSI encoding
    /// (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte could be a standalone Escape keypress or the start of
/// a multi-byte sequence. The parser holds a lone ESC as pending; the
/// reader waits a short timeout and then calls [`flush`](Parser::flush).
///
/// ```
/// use co_term::input::{Event, KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"a\x1b[A");
/// assert_eq!(
///     events,
///     vec![
///         Event::Key(KeyEvent::plain(KeyCode::Char('a'))),
///         Event::Key(KeyEvent::plain(KeyCode::Up)),
///     ]
/// );
/// ```
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    /// Create a parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return every event that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept and combined with
    /// the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// A lone ESC becomes an Escape key; other leftovers become the keys
    /// they would be on their own.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        for &byte in &self.buf {
            let key = match byte {
                0x1B => KeyEvent::plain(KeyCode::Escape),
                b @ 0x01..=0x1A => KeyEvent::ctrl((b + b'a' - 1) as char),
                0x7F => KeyEvent::plain(KeyCode::Backspace),
                b @ 0x20..=0x7E => KeyEvent::plain(KeyCode::Char(b as char)),
                _ => continue,
            };
            events.push(Event::Key(key));
        }
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions are pure: they read from the front of `buf` and
// return what they found plus how many bytes to consume.

enum Parsed {
    /// An event, consuming `usize` bytes.
    Event(Event, usize),
    /// Sequence is incomplete; need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(key(KeyEvent::ctrl('@')), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Event(key(KeyEvent::ctrl((b + b'a' - 1) as char)), 1),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        // 0x1C..=0x1F have no letter; bare continuation bytes are invalid.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(key_with(KeyCode::Char(b as char), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(
                KeyCode::Char((b + b'a' - 1) as char),
                Modifiers::ALT | Modifiers::CTRL,
            ),
            2,
        ),
        // Unknown byte after ESC: the ESC stands alone.
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter bytes are 0x30..=0x3F, intermediates 0x20..=0x2F, and the
    // final byte 0x40..=0x7E.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    if final_byte == b'~' {
        let code = match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            11..=15 => KeyCode::F(csi_f_number(params[0], 11, 1)),
            17..=21 => KeyCode::F(csi_f_number(params[0], 17, 6)),
            23..=26 => KeyCode::F(csi_f_number(params[0], 23, 11)),
            28 | 29 => KeyCode::F(csi_f_number(params[0], 28, 15)),
            31..=34 => KeyCode::F(csi_f_number(params[0], 31, 17)),
            _ => return Parsed::Skip(consumed),
        };
        return Parsed::Event(key_with(code, modifiers), consumed);
    }

    let event = match final_byte {
        b'A' => key_with(KeyCode::Up, modifiers),
        b'B' => key_with(KeyCode::Down, modifiers),
        b'C' => key_with(KeyCode::Right, modifiers),
        b'D' => key_with(KeyCode::Left, modifiers),
        b'H' => key_with(KeyCode::Home, modifiers),
        b'F' => key_with(KeyCode::End, modifiers),
        b'P' => key_with(KeyCode::F(1), modifiers),
        b'Q' => key_with(KeyCode::F(2), modifiers),
        b'R' => key_with(KeyCode::F(3), modifiers),
        b'S' => key_with(KeyCode::F(4), modifiers),
        b'Z' => key_with(KeyCode::Tab, Modifiers::SHIFT),
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Event(event, consumed)
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };

    Parsed::Event(press(code), 3)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);

    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Event(press(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::plain(code))
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

const fn key(event: KeyEvent) -> Event {
    Event::Key(event)
}

/// Parse semicolon-separated CSI parameters. Colon sub-parameters are
/// dropped. `1;5` → `[1, 5]`, empty → `[]`.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// Map a CSI tilde number inside a contiguous run to its function key.
#[allow(clippy::cast_possible_truncation)]
const fn csi_f_number(param: u16, run_start: u16, first_f: u8) -> u8 {
    first_f + (param - run_start) as u8
}

/// Decode an xterm modifier parameter (`1 + bitmask`). 0 or 1 means none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Byte length of a UTF-8 character from its lead byte, 0 if invalid.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn parse_one(data: &[u8]) -> Event {
        let events = parse(data);
        assert_eq!(events.len(), 1, "expected 1 event, got {events:?}");
        events[0]
    }

    // ── ASCII ───────────────────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        let events = parse(b"ab~");
        assert_eq!(
            events,
            vec![
                press(KeyCode::Char('a')),
                press(KeyCode::Char('b')),
                press(KeyCode::Char('~')),
            ]
        );
    }

    #[test]
    fn named_control_bytes() {
        assert_eq!(parse_one(b"\r"), press(KeyCode::Enter));
        assert_eq!(parse_one(b"\n"), press(KeyCode::Enter));
        assert_eq!(parse_one(b"\t"), press(KeyCode::Tab));
        assert_eq!(parse_one(b"\x7f"), press(KeyCode::Backspace));
        assert_eq!(parse_one(b"\x08"), press(KeyCode::Backspace));
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(parse_one(b"\x11"), key(KeyEvent::ctrl('q')));
        assert_eq!(parse_one(b"\x13"), key(KeyEvent::ctrl('s')));
        assert_eq!(parse_one(b"\x0b"), key(KeyEvent::ctrl('k')));
        assert_eq!(parse_one(b"\x18"), key(KeyEvent::ctrl('x')));
        assert_eq!(parse_one(b"\x00"), key(KeyEvent::ctrl('@')));
    }

    // ── UTF-8 ───────────────────────────────────────────────────────────

    #[test]
    fn utf8_multibyte() {
        assert_eq!(parse_one("é".as_bytes()), press(KeyCode::Char('é')));
        assert_eq!(parse_one("中".as_bytes()), press(KeyCode::Char('中')));
        assert_eq!(parse_one("🦀".as_bytes()), press(KeyCode::Char('🦀')));
    }

    #[test]
    fn utf8_split_across_reads() {
        let bytes = "中".as_bytes();
        let mut parser = Parser::new();
        assert!(parser.advance(&bytes[..1]).is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.advance(&bytes[1..]), vec![press(KeyCode::Char('中'))]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        assert_eq!(parse(b"\x80a"), vec![press(KeyCode::Char('a'))]);
        assert_eq!(parse(b"\xC3(b"), vec![
            press(KeyCode::Char('(')),
            press(KeyCode::Char('b')),
        ]);
    }

    // ── CSI ─────────────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(parse_one(b"\x1b[A"), press(KeyCode::Up));
        assert_eq!(parse_one(b"\x1b[B"), press(KeyCode::Down));
        assert_eq!(parse_one(b"\x1b[C"), press(KeyCode::Right));
        assert_eq!(parse_one(b"\x1b[D"), press(KeyCode::Left));
    }

    #[test]
    fn arrows_with_modifiers() {
        assert_eq!(
            parse_one(b"\x1b[1;5A"),
            key_with(KeyCode::Up, Modifiers::CTRL)
        );
        assert_eq!(
            parse_one(b"\x1b[1;2D"),
            key_with(KeyCode::Left, Modifiers::SHIFT)
        );
    }

    #[test]
    fn home_end_variants() {
        assert_eq!(parse_one(b"\x1b[H"), press(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[F"), press(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[1~"), press(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[4~"), press(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[7~"), press(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[8~"), press(KeyCode::End));
    }

    #[test]
    fn editing_keys() {
        assert_eq!(parse_one(b"\x1b[2~"), press(KeyCode::Insert));
        assert_eq!(parse_one(b"\x1b[3~"), press(KeyCode::Delete));
        assert_eq!(parse_one(b"\x1b[5~"), press(KeyCode::PageUp));
        assert_eq!(parse_one(b"\x1b[6~"), press(KeyCode::PageDown));
    }

    #[test]
    fn function_keys() {
        assert_eq!(parse_one(b"\x1b[15~"), press(KeyCode::F(5)));
        assert_eq!(parse_one(b"\x1b[17~"), press(KeyCode::F(6)));
        assert_eq!(parse_one(b"\x1b[24~"), press(KeyCode::F(12)));
        assert_eq!(parse_one(b"\x1bOP"), press(KeyCode::F(1)));
    }

    #[test]
    fn shift_tab() {
        assert_eq!(parse_one(b"\x1b[Z"), key_with(KeyCode::Tab, Modifiers::SHIFT));
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(parse(b"\x1b[99~x"), vec![press(KeyCode::Char('x'))]);
        assert_eq!(parse(b"\x1b[?1;2cy"), vec![press(KeyCode::Char('y'))]);
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(parse_one(b"\x1bOA"), press(KeyCode::Up));
        assert_eq!(parse_one(b"\x1bOH"), press(KeyCode::Home));
    }

    // ── Escape / Alt ────────────────────────────────────────────────────

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.flush(), vec![press(KeyCode::Escape)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn sequence_split_across_reads() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[").is_empty());
        assert_eq!(parser.advance(b"A"), vec![press(KeyCode::Up)]);
    }

    #[test]
    fn alt_char() {
        assert_eq!(
            parse_one(b"\x1bx"),
            key_with(KeyCode::Char('x'), Modifiers::ALT)
        );
    }

    #[test]
    fn double_escape_is_alt_escape() {
        assert_eq!(
            parse_one(b"\x1b\x1b"),
            key_with(KeyCode::Escape, Modifiers::ALT)
        );
    }

    // ── Params ──────────────────────────────────────────────────────────

    #[test]
    fn csi_params_parse() {
        assert_eq!(parse_csi_params(b""), Vec::<u16>::new());
        assert_eq!(parse_csi_params(b"1;5"), vec![1, 5]);
        assert_eq!(parse_csi_params(b"97;5:2"), vec![97, 5]);
    }

    #[test]
    fn modifiers_decode() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(3), Modifiers::ALT);
        assert_eq!(decode_modifiers(6), Modifiers::SHIFT | Modifiers::CTRL);
    }
}
