//! Commands and the keymap that produces them.
//!
//! There are no modes. Every key press is looked up in the [`Keymap`]; a
//! bound key yields its [`Command`], an unbound printable character yields
//! [`Command::Insert`], and anything else is ignored.
//!
//! # Default bindings
//!
//! | Key              | Command       |
//! |------------------|---------------|
//! | arrows           | move          |
//! | Home / End       | line start / end |
//! | PgUp / PgDn      | page          |
//! | Enter            | split line    |
//! | Backspace        | delete before |
//! | Delete           | delete after  |
//! | Tab              | indent        |
//! | Ctrl+K           | kill line     |
//! | Ctrl+S           | save          |
//! | Ctrl+X           | save and quit |
//! | Ctrl+Q           | quit          |
//!
//! The four Ctrl bindings can be moved to other letters with `--set`.

use std::collections::HashMap;

use co_term::input::{KeyCode, KeyEvent, Modifiers};

/// What a key press asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Tab,
    KillLine,
    Save,
    SaveAndQuit,
    Quit,
}

/// The Ctrl+letter control actions that can be rebound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Save,
    Quit,
    Kill,
    Exit,
}

impl Action {
    pub const ALL: [Self; 4] = [Self::Save, Self::Quit, Self::Kill, Self::Exit];

    /// Option name used to rebind it.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Quit => "quit",
            Self::Kill => "kill",
            Self::Exit => "exit",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    #[must_use]
    pub const fn default_key(self) -> char {
        match self {
            Self::Save => 's',
            Self::Quit => 'q',
            Self::Kill => 'k',
            Self::Exit => 'x',
        }
    }

    const fn command(self) -> Command {
        match self {
            Self::Save => Command::Save,
            Self::Quit => Command::Quit,
            Self::Kill => Command::KillLine,
            Self::Exit => Command::SaveAndQuit,
        }
    }
}

// ---------------------------------------------------------------------------
// Keymap
// ---------------------------------------------------------------------------

/// Key → command table.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyEvent, Command>,
}

impl Keymap {
    /// The default bindings.
    #[must_use]
    pub fn new() -> Self {
        let mut bindings = HashMap::new();
        for (code, command) in [
            (KeyCode::Up, Command::Up),
            (KeyCode::Down, Command::Down),
            (KeyCode::Left, Command::Left),
            (KeyCode::Right, Command::Right),
            (KeyCode::Home, Command::Home),
            (KeyCode::End, Command::End),
            (KeyCode::PageUp, Command::PageUp),
            (KeyCode::PageDown, Command::PageDown),
            (KeyCode::Enter, Command::Newline),
            (KeyCode::Backspace, Command::Backspace),
            (KeyCode::Delete, Command::Delete),
            (KeyCode::Tab, Command::Tab),
        ] {
            bindings.insert(KeyEvent::plain(code), command);
        }
        let mut keymap = Self { bindings };
        for action in Action::ALL {
            keymap.bind_ctrl(action.default_key(), action);
        }
        keymap
    }

    /// Bind Ctrl+`letter` to `action`, replacing whatever Ctrl key the
    /// action had before and whatever `letter` did before.
    pub fn bind_ctrl(&mut self, letter: char, action: Action) {
        let command = action.command();
        self.bindings.retain(|_, bound| *bound != command);
        self.bindings
            .insert(KeyEvent::ctrl(letter.to_ascii_lowercase()), command);
    }

    /// The Ctrl key currently bound to `action`.
    #[must_use]
    pub fn ctrl_key_for(&self, action: Action) -> Option<char> {
        let command = action.command();
        self.bindings.iter().find_map(|(key, bound)| match key.code {
            KeyCode::Char(c) if *bound == command && key.modifiers == Modifiers::CTRL => Some(c),
            _ => None,
        })
    }

    /// Look up a key press.
    #[must_use]
    pub fn lookup(&self, key: KeyEvent) -> Option<Command> {
        if let Some(&command) = self.bindings.get(&key) {
            return Some(command);
        }
        match key.code {
            KeyCode::Char(ch)
                if !key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
                    && !ch.is_control() =>
            {
                Some(Command::Insert(ch))
            }
            _ => None,
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    #[test]
    fn default_bindings() {
        let km = Keymap::new();
        assert_eq!(km.lookup(plain(KeyCode::Up)), Some(Command::Up));
        assert_eq!(km.lookup(plain(KeyCode::Enter)), Some(Command::Newline));
        assert_eq!(km.lookup(plain(KeyCode::Tab)), Some(Command::Tab));
        assert_eq!(km.lookup(KeyEvent::ctrl('s')), Some(Command::Save));
        assert_eq!(km.lookup(KeyEvent::ctrl('q')), Some(Command::Quit));
        assert_eq!(km.lookup(KeyEvent::ctrl('k')), Some(Command::KillLine));
        assert_eq!(km.lookup(KeyEvent::ctrl('x')), Some(Command::SaveAndQuit));
    }

    #[test]
    fn printable_chars_insert() {
        let km = Keymap::new();
        assert_eq!(km.lookup(plain(KeyCode::Char('a'))), Some(Command::Insert('a')));
        assert_eq!(km.lookup(plain(KeyCode::Char('中'))), Some(Command::Insert('中')));
        assert_eq!(
            km.lookup(KeyEvent::new(KeyCode::Char('A'), Modifiers::SHIFT)),
            Some(Command::Insert('A'))
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let km = Keymap::new();
        assert_eq!(km.lookup(KeyEvent::ctrl('z')), None);
        assert_eq!(km.lookup(KeyEvent::new(KeyCode::Char('f'), Modifiers::ALT)), None);
        assert_eq!(km.lookup(plain(KeyCode::F(5))), None);
        assert_eq!(km.lookup(plain(KeyCode::Escape)), None);
        assert_eq!(km.lookup(plain(KeyCode::Insert)), None);
        assert_eq!(km.lookup(KeyEvent::new(KeyCode::Up, Modifiers::CTRL)), None);
    }

    #[test]
    fn rebinding_moves_the_action() {
        let mut km = Keymap::new();
        km.bind_ctrl('w', Action::Save);
        assert_eq!(km.lookup(KeyEvent::ctrl('w')), Some(Command::Save));
        assert_eq!(km.lookup(KeyEvent::ctrl('s')), None);
        assert_eq!(km.ctrl_key_for(Action::Save), Some('w'));
    }

    #[test]
    fn rebinding_onto_a_used_letter_takes_it_over() {
        let mut km = Keymap::new();
        km.bind_ctrl('q', Action::Exit);
        assert_eq!(km.lookup(KeyEvent::ctrl('q')), Some(Command::SaveAndQuit));
        assert_eq!(km.lookup(KeyEvent::ctrl('x')), None);
        assert_eq!(km.ctrl_key_for(Action::Quit), None);
    }

    #[test]
    fn action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("bogus"), None);
    }
}
