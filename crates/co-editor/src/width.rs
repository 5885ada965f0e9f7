//! Char columns ↔ screen columns.
//!
//! Buffer positions count chars; the terminal counts cells. The two differ
//! as soon as a line holds a wide character. Everything here is derived on
//! demand from the line itself and never cached.
//!
//! Widths come from [`co_term::width::char_width`], the same function the
//! cell grid paints with.

pub use co_term::width::{char_width, str_width};

/// Cumulative display offsets of a line: one entry per char (the screen
/// column it starts at) plus a final entry holding the total width.
///
/// ```
/// use co_editor::width::column_offsets;
///
/// assert_eq!(column_offsets("a中b".chars()), vec![0, 1, 3, 4]);
/// assert_eq!(column_offsets("".chars()), vec![0]);
/// ```
#[must_use]
pub fn column_offsets<I: IntoIterator<Item = char>>(chars: I) -> Vec<usize> {
    let chars = chars.into_iter();
    let mut offsets = Vec::with_capacity(chars.size_hint().0 + 1);
    let mut total = 0;
    offsets.push(0);
    for ch in chars {
        total += char_width(ch);
        offsets.push(total);
    }
    offsets
}

/// Screen column of char index `col`. An index past the end maps to the
/// line's total width.
#[must_use]
pub fn display_col<I: IntoIterator<Item = char>>(chars: I, col: usize) -> usize {
    chars.into_iter().take(col).map(char_width).sum()
}

/// Char index for screen column `target`: the first char whose offset is
/// at or past `target`, clamped to the line length.
#[must_use]
pub fn char_col_at_display<I: IntoIterator<Item = char>>(chars: I, target: usize) -> usize {
    let offsets = column_offsets(chars);
    let len = offsets.len() - 1;
    offsets
        .iter()
        .position(|&offset| offset >= target)
        .map_or(len, |i| i.min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_ascii() {
        assert_eq!(column_offsets("abc".chars()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn offsets_wide() {
        assert_eq!(column_offsets("中文".chars()), vec![0, 2, 4]);
    }

    #[test]
    fn wide_char_at_col_0_pushes_next_to_2() {
        assert_eq!(display_col("中x".chars(), 1), 2);
    }

    #[test]
    fn display_col_past_end_is_total() {
        assert_eq!(display_col("ab中".chars(), 99), 4);
        assert_eq!(display_col("".chars(), 3), 0);
    }

    #[test]
    fn control_and_combining_are_one_column() {
        assert_eq!(display_col("\t\u{301}x".chars(), 2), 2);
    }

    #[test]
    fn char_col_at_display_rounds_into_wide_char() {
        // "a中b": offsets 0 1 3 4
        assert_eq!(char_col_at_display("a中b".chars(), 0), 0);
        assert_eq!(char_col_at_display("a中b".chars(), 1), 1);
        assert_eq!(char_col_at_display("a中b".chars(), 2), 2);
        assert_eq!(char_col_at_display("a中b".chars(), 3), 2);
        assert_eq!(char_col_at_display("a中b".chars(), 4), 3);
    }

    #[test]
    fn char_col_at_display_clamps_to_len() {
        assert_eq!(char_col_at_display("ab".chars(), 50), 2);
        assert_eq!(char_col_at_display("".chars(), 5), 0);
    }
}
