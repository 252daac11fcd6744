//! The line editor.
//!
//! Tracks what the user has typed and where the cursor is. The prompt
//! string is whatever decoration precedes the typed text on the last
//! rendered row; the screen manager keeps it in sync so the cursor column
//! comes out right.

use std::cell::RefCell;
use std::rc::Weak;

use unicode_width::UnicodeWidthStr;

use crate::ansi::display_width;
use crate::keys::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Cursor location relative to the start of the prompt row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPos {
    /// Rows below the prompt row (non-zero when the line wraps).
    pub rows: usize,
    /// Column on that row.
    pub cols: usize,
}

/// Typed input plus cursor.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    prompt: String,
    line: String,
    /// Cursor position in chars, `0..=line.chars().count()`.
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text typed so far.
    #[inline]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Cursor offset into [`line`](Self::line), in chars.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Drop all typed text.
    pub fn clear_line(&mut self) {
        self.line.clear();
        self.cursor = 0;
    }

    /// Insert `text` at the cursor, as if typed.
    pub fn write(&mut self, text: &str) {
        let at = self.byte_offset(self.cursor);
        self.line.insert_str(at, text);
        self.cursor += text.chars().count();
    }

    /// Apply a key press. Returns `true` if the line or cursor changed.
    ///
    /// Enter is not handled; the typed line stays until a prompt clears it.
    pub fn feed(&mut self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char(c) if !ctrl && !alt => {
                let mut buf = [0u8; 4];
                self.write(c.encode_utf8(&mut buf));
                true
            }
            KeyCode::Char('a') if ctrl => self.move_to(0),
            KeyCode::Char('e') if ctrl => self.move_to(self.len()),
            KeyCode::Char('u') if ctrl => {
                let removed = self.cursor > 0;
                self.delete_range(0, self.cursor);
                removed
            }
            KeyCode::Char('k') if ctrl => {
                let removed = self.cursor < self.len();
                self.delete_range(self.cursor, self.len());
                removed
            }
            KeyCode::Char('w') if ctrl => {
                let start = self.previous_word_start();
                let removed = start < self.cursor;
                self.delete_range(start, self.cursor);
                removed
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.delete_range(self.cursor - 1, self.cursor);
                true
            }
            KeyCode::Delete if self.cursor < self.len() => {
                self.delete_range(self.cursor, self.cursor + 1);
                true
            }
            KeyCode::Left if self.cursor > 0 => self.move_to(self.cursor - 1),
            KeyCode::Right if self.cursor < self.len() => self.move_to(self.cursor + 1),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.len()),
            _ => false,
        }
    }

    /// Where the cursor sits once prompt and line are laid out at `columns`.
    pub fn cursor_position(&self, columns: usize) -> CursorPos {
        let columns = columns.max(1);
        let before_cursor = &self.line[..self.byte_offset(self.cursor)];
        let offset = display_width(&self.prompt) + before_cursor.width();
        CursorPos {
            rows: offset / columns,
            cols: offset % columns,
        }
    }

    fn len(&self) -> usize {
        self.line.chars().count()
    }

    fn move_to(&mut self, cursor: usize) -> bool {
        let moved = cursor != self.cursor;
        self.cursor = cursor;
        moved
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let (from, to) = (self.byte_offset(start), self.byte_offset(end));
        self.line.replace_range(from..to, "");
        self.cursor = start;
    }

    fn previous_word_start(&self) -> usize {
        let chars: Vec<char> = self.line.chars().take(self.cursor).collect();
        let mut i = chars.len();
        while i > 0 && chars[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !chars[i - 1].is_whitespace() {
            i -= 1;
        }
        i
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.line
            .char_indices()
            .nth(chars)
            .map_or(self.line.len(), |(i, _)| i)
    }
}

/// Access to a session's line editor from effects and timers.
///
/// Keypress handlers receive the editor directly; this handle is for
/// code that runs between key presses, such as a timer that clears a
/// search term. Calls made while a keypress is being dispatched are
/// ignored.
#[derive(Clone)]
pub struct EditorHandle {
    pub(crate) editor: Weak<RefCell<LineEditor>>,
}

impl EditorHandle {
    fn with<R>(&self, f: impl FnOnce(&mut LineEditor) -> R) -> Option<R> {
        let editor = self.editor.upgrade()?;
        let Ok(mut editor) = editor.try_borrow_mut() else {
            tracing::warn!("line editor is busy; ignoring access from outside keypress dispatch");
            return None;
        };
        Some(f(&mut editor))
    }

    /// The typed line, or an empty string once the session is gone.
    pub fn line(&self) -> String {
        self.with(|e| e.line().to_owned()).unwrap_or_default()
    }

    pub fn clear_line(&self) {
        self.with(LineEditor::clear_line);
    }

    pub fn write(&self, text: &str) {
        self.with(|e| e.write(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(editor: &mut LineEditor, code: KeyCode) -> bool {
        editor.feed(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(editor: &mut LineEditor, s: &str) {
        for c in s.chars() {
            press(editor, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_and_backspace() {
        let mut editor = LineEditor::new();
        type_str(&mut editor, "helo");
        press(&mut editor, KeyCode::Left);
        type_str(&mut editor, "l");
        assert_eq!(editor.line(), "hello");
        assert_eq!(editor.cursor(), 4);
        press(&mut editor, KeyCode::End);
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(editor.line(), "hell");
        assert!(!press(&mut editor, KeyCode::Enter));
        assert_eq!(editor.line(), "hell");
    }

    #[test]
    fn ctrl_w_deletes_previous_word() {
        let mut editor = LineEditor::new();
        type_str(&mut editor, "one two  ");
        editor.feed(&KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(editor.line(), "one ");
    }

    #[test]
    fn ctrl_u_and_ctrl_k() {
        let mut editor = LineEditor::new();
        type_str(&mut editor, "abcdef");
        press(&mut editor, KeyCode::Left);
        press(&mut editor, KeyCode::Left);
        editor.feed(&KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert_eq!(editor.line(), "abcd");
        editor.feed(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(editor.line(), "");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn multibyte_editing() {
        let mut editor = LineEditor::new();
        type_str(&mut editor, "héllo");
        press(&mut editor, KeyCode::Home);
        press(&mut editor, KeyCode::Right);
        press(&mut editor, KeyCode::Delete);
        assert_eq!(editor.line(), "hllo");
    }

    #[test]
    fn cursor_position_accounts_for_prompt_and_wrap() {
        let mut editor = LineEditor::new();
        editor.set_prompt("\x1b[32m?\x1b[0m Name ");
        type_str(&mut editor, "abc");
        assert_eq!(editor.cursor_position(80), CursorPos { rows: 0, cols: 10 });
        assert_eq!(editor.cursor_position(8), CursorPos { rows: 1, cols: 2 });
        assert_eq!(editor.cursor_position(10), CursorPos { rows: 1, cols: 0 });
    }
}
