//! Key events and key classifiers.
//!
//! Prompts never match on raw key codes for navigation; they ask these
//! predicates, which know about the optional vim and emacs aliases.

pub use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crossterm::event::Event as CrosstermEvent;

/// Alternative key sets for moving up and down a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keybinding {
    /// `k` moves up, `j` moves down.
    Vim,
    /// `Ctrl+P` moves up, `Ctrl+N` moves down.
    Emacs,
}

/// Terminal input the session reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed or repeated.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize { width: u16, height: u16 },
    /// Anything else (mouse, focus, paste). Ignored by prompts.
    Other,
}

impl From<CrosstermEvent> for Event {
    fn from(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Event::Key(key),
            CrosstermEvent::Resize(width, height) => Event::Resize { width, height },
            _ => Event::Other,
        }
    }
}

#[inline]
fn is_plain(key: &KeyEvent, code: KeyCode) -> bool {
    key.kind != KeyEventKind::Release
        && key.code == code
        && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

#[inline]
fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.kind != KeyEventKind::Release
        && key.code == KeyCode::Char(c)
        && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Up arrow, or `k` (vim) / `Ctrl+P` (emacs) when those bindings are on.
pub fn is_up_key(key: &KeyEvent, keybindings: &[Keybinding]) -> bool {
    is_plain(key, KeyCode::Up)
        || (keybindings.contains(&Keybinding::Vim) && is_plain(key, KeyCode::Char('k')))
        || (keybindings.contains(&Keybinding::Emacs) && is_ctrl(key, 'p'))
}

/// Down arrow, or `j` (vim) / `Ctrl+N` (emacs) when those bindings are on.
pub fn is_down_key(key: &KeyEvent, keybindings: &[Keybinding]) -> bool {
    is_plain(key, KeyCode::Down)
        || (keybindings.contains(&Keybinding::Vim) && is_plain(key, KeyCode::Char('j')))
        || (keybindings.contains(&Keybinding::Emacs) && is_ctrl(key, 'n'))
}

#[inline]
pub fn is_space_key(key: &KeyEvent) -> bool {
    is_plain(key, KeyCode::Char(' '))
}

#[inline]
pub fn is_enter_key(key: &KeyEvent) -> bool {
    is_plain(key, KeyCode::Enter)
}

#[inline]
pub fn is_backspace_key(key: &KeyEvent) -> bool {
    is_plain(key, KeyCode::Backspace)
}

#[inline]
pub fn is_tab_key(key: &KeyEvent) -> bool {
    is_plain(key, KeyCode::Tab)
}

/// A digit key, `0` through `9`.
#[inline]
pub fn is_number_key(key: &KeyEvent) -> bool {
    number_key_value(key).is_some()
}

/// The digit on a number key.
pub fn number_key_value(key: &KeyEvent) -> Option<u32> {
    match key.code {
        KeyCode::Char(c) if is_plain(key, key.code) => c.to_digit(10),
        _ => None,
    }
}

/// Ctrl+C. In raw mode this arrives as a key instead of `SIGINT`.
#[inline]
pub fn is_force_exit_key(key: &KeyEvent) -> bool {
    is_ctrl(key, 'c')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn arrows_always_navigate() {
        assert!(is_up_key(&key(KeyCode::Up), &[]));
        assert!(is_down_key(&key(KeyCode::Down), &[]));
        assert!(!is_up_key(&key(KeyCode::Down), &[]));
    }

    #[test]
    fn vim_aliases_need_the_profile() {
        assert!(!is_up_key(&key(KeyCode::Char('k')), &[]));
        assert!(is_up_key(&key(KeyCode::Char('k')), &[Keybinding::Vim]));
        assert!(is_down_key(&key(KeyCode::Char('j')), &[Keybinding::Vim]));
        assert!(!is_down_key(&key(KeyCode::Char('j')), &[Keybinding::Emacs]));
    }

    #[test]
    fn emacs_aliases_need_ctrl() {
        let bindings = [Keybinding::Emacs];
        assert!(is_up_key(&ctrl('p'), &bindings));
        assert!(is_down_key(&ctrl('n'), &bindings));
        assert!(!is_down_key(&key(KeyCode::Char('n')), &bindings));
    }

    #[test]
    fn numbers() {
        assert_eq!(number_key_value(&key(KeyCode::Char('7'))), Some(7));
        assert!(is_number_key(&key(KeyCode::Char('0'))));
        assert!(!is_number_key(&key(KeyCode::Char('a'))));
        assert!(!is_number_key(&ctrl('1')));
    }

    #[test]
    fn releases_are_not_classified() {
        let mut enter = key(KeyCode::Enter);
        enter.kind = KeyEventKind::Release;
        assert!(!is_enter_key(&enter));
        assert_eq!(Event::from(CrosstermEvent::Key(enter)), Event::Other);
    }

    #[test]
    fn force_exit() {
        assert!(is_force_exit_key(&ctrl('c')));
        assert!(!is_force_exit_key(&key(KeyCode::Char('c'))));
    }
}
