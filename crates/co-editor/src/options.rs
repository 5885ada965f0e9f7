//! Editor options — the `--set` directives.
//!
//! Each `--set` argument is one directive, parsed by [`parse_set_arg`] and
//! applied in order by [`Options::apply`]. Later directives win.
//!
//! # Supported syntax
//!
//! | Syntax        | Effect                  |
//! |---------------|-------------------------|
//! | `option`      | Enable boolean option   |
//! | `nooption`    | Disable boolean option  |
//! | `option=VAL`  | Assign a value          |
//!
//! # Option names
//!
//! | Name     | Abbrev | Type                | Default |
//! |----------|--------|---------------------|---------|
//! | `number` | `nu`   | bool                | false   |
//! | `indent` |        | `auto` or 1..=8     | auto    |
//! | `save`   |        | Ctrl letter         | `s`     |
//! | `quit`   |        | Ctrl letter         | `q`     |
//! | `kill`   |        | Ctrl letter         | `k`     |
//! | `exit`   |        | Ctrl letter         | `x`     |
//!
//! `exit` is save-and-quit. Ctrl+H, Ctrl+I, Ctrl+J and Ctrl+M arrive from
//! the terminal as Backspace, Tab and Enter, so they cannot be bound.

use thiserror::Error;

use crate::command::{Action, Keymap};
use crate::indent::IndentWidth;

/// A parsed `--set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option` — enable a boolean option.
    On(String),

    /// `nooption` — disable a boolean option.
    Off(String),

    /// `option=value` — assign a value.
    Assign(String, String),
}

/// A directive that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("option {0} needs a value")]
    MissingValue(String),

    #[error("option {0} takes no value")]
    UnexpectedValue(String),

    #[error("invalid value for {name}: {value} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: &'static str,
    },

    #[error("Ctrl+{letter} is bound to both {first} and {second}")]
    Conflict {
        letter: char,
        first: &'static str,
        second: &'static str,
    },
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "number" | "nu")
}

/// Parse a single `--set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_owned(), value.to_owned());
    }

    // Only strip "no" when the rest is a boolean option, so "number" is
    // not read as "mber".
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_owned());
        }
    }

    SetDirective::On(arg.to_owned())
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Session options, fixed once the editor starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Show the line-number gutter.
    pub number: bool,

    /// Fixed indent width; `None` detects it from the file.
    pub indent: Option<IndentWidth>,

    keys: [(Action, char); 4],
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self {
            number: false,
            indent: None,
            keys: Action::ALL.map(|a| (a, a.default_key())),
        }
    }

    /// Build options from `--set` arguments, in order.
    ///
    /// # Errors
    ///
    /// The first directive that does not apply, or a key bound twice.
    pub fn from_args<I, S>(args: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::new();
        for arg in args {
            options.apply(&parse_set_arg(arg.as_ref()))?;
        }
        options.check_conflicts()?;
        Ok(options)
    }

    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// Unknown names, wrong kinds of value, and out-of-range values.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<(), OptionError> {
        match directive {
            SetDirective::On(name) if is_bool_option(name) => self.number = true,
            SetDirective::Off(name) if is_bool_option(name) => self.number = false,
            SetDirective::Off(name) => return Err(OptionError::Unknown(name.clone())),
            SetDirective::On(name) => {
                return Err(if name == "indent" || Action::from_name(name).is_some() {
                    OptionError::MissingValue(name.clone())
                } else {
                    OptionError::Unknown(name.clone())
                });
            }
            SetDirective::Assign(name, _) if is_bool_option(name) => {
                return Err(OptionError::UnexpectedValue(name.clone()));
            }
            SetDirective::Assign(name, value) if name == "indent" => {
                self.indent = parse_indent(value)?;
            }
            SetDirective::Assign(name, value) => {
                let action =
                    Action::from_name(name).ok_or_else(|| OptionError::Unknown(name.clone()))?;
                let letter = parse_ctrl_letter(name, value)?;
                if let Some(slot) = self.keys.iter_mut().find(|(a, _)| *a == action) {
                    slot.1 = letter;
                }
            }
        }
        Ok(())
    }

    /// The Ctrl letter bound to `action`.
    #[must_use]
    pub fn key_for(&self, action: Action) -> char {
        self.keys
            .iter()
            .find(|(a, _)| *a == action)
            .map_or_else(|| action.default_key(), |&(_, c)| c)
    }

    /// The keymap these options describe.
    #[must_use]
    pub fn keymap(&self) -> Keymap {
        let mut keymap = Keymap::new();
        for &(action, letter) in &self.keys {
            keymap.bind_ctrl(letter, action);
        }
        keymap
    }

    fn check_conflicts(&self) -> Result<(), OptionError> {
        for (i, &(first, a)) in self.keys.iter().enumerate() {
            if let Some(&(second, _)) = self.keys[i + 1..].iter().find(|&&(_, b)| b == a) {
                return Err(OptionError::Conflict {
                    letter: a,
                    first: first.name(),
                    second: second.name(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_indent(value: &str) -> Result<Option<IndentWidth>, OptionError> {
    if value == "auto" {
        return Ok(None);
    }
    let invalid = |reason| OptionError::InvalidValue {
        name: "indent".to_owned(),
        value: value.to_owned(),
        reason,
    };
    let width: u8 = value.parse().map_err(|_| invalid("expected auto or a number"))?;
    IndentWidth::new(width)
        .map(Some)
        .ok_or_else(|| invalid("must be 1 to 8"))
}

fn parse_ctrl_letter(name: &str, value: &str) -> Result<char, OptionError> {
    let invalid = |reason| OptionError::InvalidValue {
        name: name.to_owned(),
        value: value.to_owned(),
        reason,
    };
    let mut chars = value.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return Err(invalid("expected one letter"));
    };
    if !ch.is_ascii_alphabetic() {
        return Err(invalid("expected one letter"));
    }
    let ch = ch.to_ascii_lowercase();
    if matches!(ch, 'h' | 'i' | 'j' | 'm') {
        return Err(invalid("terminals send this as another key"));
    }
    Ok(ch)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
