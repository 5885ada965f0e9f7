//! Indent width — how many columns one Tab press inserts and one Backspace
//! inside leading whitespace removes.
//!
//! The width is guessed once from the loaded file (or set with
//! `--set indent=N`) and stays fixed for the session. The guess is a
//! heuristic and can be wrong on short or irregularly indented files.

use std::collections::HashMap;
use std::fmt;

/// Spaces per indentation level, 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndentWidth(u8);

impl IndentWidth {
    pub const TWO: Self = Self(2);
    pub const FOUR: Self = Self(4);
    pub const MAX: u8 = 8;

    /// `None` unless `width` is in 1..=8.
    #[must_use]
    pub const fn new(width: u8) -> Option<Self> {
        if width >= 1 && width <= Self::MAX {
            Some(Self(width))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Guess the width from each line's leading-whitespace run.
    ///
    /// Lines without indentation are skipped; a line of nothing but spaces
    /// still counts with its full length. Of the four most frequent run lengths (ties go to the
    /// shorter), the pairwise differences vote: more multiples of 4 than
    /// multiples of 2-but-not-4 means 4, anything else means 2.
    ///
    /// ```
    /// use co_editor::indent::IndentWidth;
    ///
    /// let lines = ["fn f() {", "    if x {", "        y();", "    }", "}"];
    /// assert_eq!(IndentWidth::detect(lines), IndentWidth::FOUR);
    /// ```
    pub fn detect<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for line in lines {
            let run = leading_run(line.as_ref().chars());
            if run == 0 {
                continue;
            }
            *counts.entry(run).or_default() += 1;
        }

        let mut ranked: Vec<(usize, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let top: Vec<usize> = ranked.iter().take(4).map(|&(len, _)| len).collect();

        let mut fours = 0;
        let mut twos = 0;
        for (i, &a) in top.iter().enumerate() {
            for &b in &top[i + 1..] {
                let diff = a.abs_diff(b);
                if diff % 4 == 0 {
                    fours += 1;
                } else if diff % 2 == 0 {
                    twos += 1;
                }
            }
        }

        let width = if fours > twos { Self::FOUR } else { Self::TWO };
        tracing::debug!(width = width.0, fours, twos, "detected indent width");
        width
    }
}

/// Length of the run of spaces and tabs that starts `chars`. Other Unicode
/// whitespace is not indentation.
pub fn leading_run<I: IntoIterator<Item = char>>(chars: I) -> usize {
    chars
        .into_iter()
        .take_while(|&c| c == ' ' || c == '\t')
        .count()
}

impl Default for IndentWidth {
    fn default() -> Self {
        Self::TWO
    }
}

impl fmt::Display for IndentWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
