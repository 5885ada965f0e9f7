// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell holds a character and its text attributes. Wide characters take
// two cells: the first holds the character, the second is a continuation
// cell (`ch == '\0'`) that the renderer never prints but still compares,
// so a wide char replaced by two narrow ones is redrawn correctly.

bitflags::bitflags! {
    /// Text attributes, mapped one-to-one onto SGR parameters.
    ///
    /// ```
    /// use co_term::cell::Attr;
    ///
    /// let status = Attr::INVERSE | Attr::BOLD;
    /// assert!(status.contains(Attr::INVERSE));
    /// assert!(!status.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2 — faint.
        const DIM       = 1 << 1;
        /// SGR 4 — underline.
        const UNDERLINE = 1 << 2;
        /// SGR 7 — swap foreground and background.
        const INVERSE   = 1 << 3;
    }
}

/// Marker stored in the second cell of a wide character.
const CONTINUATION: char = '\0';

/// A single screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character shown, or `'\0'` for a wide-character continuation.
    pub ch: char,
    /// Text attributes.
    pub attrs: Attr,
}

impl Cell {
    /// A blank cell with no attributes.
    pub const EMPTY: Self = Self {
        ch: ' ',
        attrs: Attr::empty(),
    };

    /// A cell showing `ch` with no attributes.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            attrs: Attr::empty(),
        }
    }

    /// A cell showing `ch` with the given attributes.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, attrs: Attr) -> Self {
        Self { ch, attrs }
    }

    /// The second half of a wide character. Carries the owner's attributes
    /// so an inverse status line stays solid across wide glyphs.
    #[inline]
    #[must_use]
    pub const fn continuation(attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            attrs,
        }
    }

    /// Whether this is the second cell of a wide character.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The printable character, or `None` for a continuation cell.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.is_continuation() {
            None
        } else {
            Some(self.ch)
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_blank_space() {
        assert_eq!(Cell::EMPTY.ch, ' ');
        assert!(Cell::EMPTY.attrs.is_empty());
        assert_eq!(Cell::default(), Cell::EMPTY);
    }

    #[test]
    fn styled_keeps_attrs() {
        let cell = Cell::styled('x', Attr::INVERSE);
        assert_eq!(cell.character(), Some('x'));
        assert!(cell.attrs.contains(Attr::INVERSE));
    }

    #[test]
    fn continuation_has_no_character() {
        let cell = Cell::continuation(Attr::BOLD);
        assert!(cell.is_continuation());
        assert_eq!(cell.character(), None);
        assert_eq!(cell.attrs, Attr::BOLD);
    }

    #[test]
    fn regular_cell_is_not_continuation() {
        assert!(!Cell::new('a').is_continuation());
        assert!(!Cell::EMPTY.is_continuation());
    }
}
