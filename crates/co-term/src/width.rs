// SPDX-License-Identifier: MIT
//
// Character display width.
//
// One policy for the whole program: a character is either one terminal
// column or two. East-Asian Wide, Fullwidth, and Ambiguous characters take
// two; everything else (Narrow, Halfwidth, Neutral, control characters,
// zero-width marks) takes one. The cell grid and the editor's coordinate
// mapping both call into here, so a painted line and the cursor placed on it
// always agree.
//
// `unicode-width`'s CJK table already classifies Ambiguous as 2, which is
// exactly this policy once zero and missing widths are lifted to 1.

use unicode_width::UnicodeWidthChar;

/// Display width of a character in terminal columns: always 1 or 2.
///
/// # Examples
///
/// ```
/// use co_term::width::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\t'), 1);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    match ch.width_cjk() {
        Some(2) => 2,
        _ => 1,
    }
}

/// Display width of a string: the sum of [`char_width`] over its chars.
#[must_use]
pub fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// The glyph to put in a cell for `ch`. Characters the terminal would not
/// advance the cursor for (controls, combining marks, zero-width spaces) are
/// drawn as a blank so the grid stays aligned with [`char_width`].
#[inline]
#[must_use]
pub fn glyph(ch: char) -> char {
    if ch.is_control() {
        return ' ';
    }
    match ch.width_cjk() {
        Some(0) | None => ' ',
        _ => ch,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_narrow() {
        for ch in ['a', 'Z', '0', ' ', '~'] {
            assert_eq!(char_width(ch), 1, "{ch:?}");
        }
    }

    #[test]
    fn cjk_is_wide() {
        assert_eq!(char_width('中'), 2);
        assert_eq!(char_width('あ'), 2);
        assert_eq!(char_width('한'), 2);
    }

    #[test]
    fn fullwidth_forms_are_wide() {
        assert_eq!(char_width('Ａ'), 2); // U+FF21
        assert_eq!(char_width('！'), 2); // U+FF01
    }

    #[test]
    fn halfwidth_katakana_is_narrow() {
        assert_eq!(char_width('ｱ'), 1); // U+FF71
    }

    #[test]
    fn ambiguous_is_wide() {
        assert_eq!(char_width('±'), 2); // U+00B1
        assert_eq!(char_width('α'), 2); // Greek, ambiguous
    }

    #[test]
    fn control_and_zero_width_default_to_one() {
        assert_eq!(char_width('\t'), 1);
        assert_eq!(char_width('\u{7}'), 1);
        assert_eq!(char_width('\u{301}'), 1); // combining acute
        assert_eq!(char_width('\u{200B}'), 1); // zero-width space
    }

    #[test]
    fn glyph_blanks_non_advancing_chars() {
        assert_eq!(glyph('a'), 'a');
        assert_eq!(glyph('中'), '中');
        assert_eq!(glyph('\t'), ' ');
        assert_eq!(glyph('\u{1b}'), ' ');
        assert_eq!(glyph('\u{301}'), ' ');
    }

    #[test]
    fn str_width_sums() {
        assert_eq!(str_width(""), 0);
        assert_eq!(str_width("hello"), 5);
        assert_eq!(str_width("a中b"), 4);
    }
}
