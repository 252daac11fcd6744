//! Incremental terminal redraw.
//!
//! The screen manager owns the output for a session. Each render walks
//! the cursor back over what the previous render left behind, erases
//! exactly that many rows and writes the new frame, all in one write so
//! nothing else can interleave with it.

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveToColumn, MoveUp, Show};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::ansi::{break_lines, display_width, last_line, line_height, strip_ansi};
use crate::editor::{CursorPos, LineEditor};

/// What the previous render left on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenState {
    /// Rows written by the last render, including bottom content.
    pub height: usize,
    /// Rows of bottom content (and prompt overhang) below the cursor.
    pub extra_lines_under_prompt: usize,
    /// Where the cursor was left, relative to the prompt row.
    pub cursor: CursorPos,
}

/// Redraws prompt content in place below the current cursor.
pub struct ScreenManager {
    output: Box<dyn Write>,
    state: ScreenState,
}

impl ScreenManager {
    pub fn new(output: Box<dyn Write>) -> Self {
        Self {
            output,
            state: ScreenState::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Replace the previous frame with `content` and optional `bottom`
    /// content shown under the prompt row.
    ///
    /// The editor's prompt string is set to the stripped last line of
    /// `content` minus the typed input, and the cursor is left on the
    /// column the editor reports.
    pub fn render(
        &mut self,
        content: &str,
        bottom: Option<&str>,
        editor: &mut LineEditor,
        columns: usize,
    ) -> io::Result<()> {
        let columns = columns.max(1);
        let raw_prompt_line = strip_ansi(last_line(content)).into_owned();

        let typed = editor.line().chars().count();
        let keep = raw_prompt_line.chars().count().saturating_sub(typed);
        editor.set_prompt(raw_prompt_line.chars().take(keep).collect::<String>());
        self.state.cursor = editor.cursor_position(columns);

        let mut content = break_lines(content, columns);
        let bottom = bottom
            .filter(|b| !b.is_empty())
            .map(|b| break_lines(b, columns));

        // A prompt row that exactly fills the terminal leaves the cursor in
        // an ambiguous auto-wrap position; make the wrap explicit.
        let prompt_width = display_width(&raw_prompt_line);
        if prompt_width > 0 && prompt_width % columns == 0 {
            content.push('\n');
        }

        let mut frame = content;
        if let Some(bottom) = &bottom {
            frame.push('\n');
            frame.push_str(bottom);
        }
        let height = line_height(&frame);

        let prompt_rows_below_cursor =
            (prompt_width / columns) as isize - self.state.cursor.rows as isize;
        let bottom_height = bottom.as_deref().map_or(0, line_height) as isize;
        let rows_under_cursor = (prompt_rows_below_cursor + bottom_height).max(0) as usize;

        let mut buf = Vec::with_capacity(frame.len() + 64);
        if self.state.extra_lines_under_prompt > 0 {
            queue!(buf, MoveDown(self.state.extra_lines_under_prompt as u16))?;
        }
        erase_lines(&mut buf, self.state.height)?;
        buf.extend_from_slice(frame.as_bytes());
        if rows_under_cursor > 0 {
            queue!(buf, MoveUp(rows_under_cursor as u16))?;
        }
        queue!(buf, MoveToColumn(self.state.cursor.cols as u16))?;

        self.write(&buf)?;
        self.state.extra_lines_under_prompt = rows_under_cursor;
        self.state.height = height;
        Ok(())
    }

    /// Move the cursor if the editor's column changed without a render,
    /// e.g. after cursor-left on an unchanged line.
    pub fn check_cursor_pos(&mut self, editor: &LineEditor, columns: usize) -> io::Result<()> {
        let cursor = editor.cursor_position(columns);
        if cursor.cols != self.state.cursor.cols {
            let mut buf = Vec::new();
            queue!(buf, MoveToColumn(cursor.cols as u16))?;
            self.write(&buf)?;
            self.state.cursor = cursor;
        }
        Ok(())
    }

    /// Write a frame that has nothing to do with the line editor, such
    /// as the loading indicator shown before the first real render.
    pub fn render_status(&mut self, line: &str, columns: usize) -> io::Result<()> {
        let mut editor = LineEditor::new();
        self.render(line, None, &mut editor, columns)
    }

    /// Finish the session: either erase everything that was rendered or
    /// leave it and move below it, then show the cursor again.
    pub fn done(&mut self, clear_content: bool, editor: &mut LineEditor) -> io::Result<()> {
        editor.set_prompt("");
        let mut buf = Vec::new();
        if self.state.extra_lines_under_prompt > 0 {
            queue!(buf, MoveDown(self.state.extra_lines_under_prompt as u16))?;
        }
        if clear_content {
            erase_lines(&mut buf, self.state.height)?;
        } else if self.state.height > 0 {
            buf.push(b'\n');
        }
        queue!(buf, Show)?;
        self.write(&buf)?;
        self.state = ScreenState::default();
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)?;
        self.output.flush()
    }
}

/// Erase `count` rows ending at the cursor row, leaving the cursor at
/// column 0 of the topmost erased row.
fn erase_lines(buf: &mut Vec<u8>, count: usize) -> io::Result<()> {
    for i in 0..count {
        queue!(buf, Clear(ClearType::CurrentLine))?;
        if i + 1 < count {
            queue!(buf, MoveUp(1))?;
        }
    }
    if count > 0 {
        queue!(buf, MoveToColumn(0))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<Vec<u8>>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().push(buf.to_vec());
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn last(&self) -> String {
            String::from_utf8(self.0.borrow().last().cloned().unwrap_or_default()).unwrap()
        }
        fn writes(&self) -> usize {
            self.0.borrow().len()
        }
    }

    fn manager() -> (ScreenManager, Capture) {
        let capture = Capture::default();
        (ScreenManager::new(Box::new(capture.clone())), capture)
    }

    #[test]
    fn first_render_erases_nothing() {
        let (mut screen, out) = manager();
        let mut editor = LineEditor::new();
        screen.render("? Name", None, &mut editor, 80).unwrap();

        assert_eq!(out.last(), "? Name\x1b[7G");
        assert_eq!(out.writes(), 1);
        assert_eq!(screen.state().height, 1);
        assert_eq!(editor.prompt(), "? Name");
    }

    #[test]
    fn rerender_erases_previous_height() {
        let (mut screen, out) = manager();
        let mut editor = LineEditor::new();
        screen.render("line 1\nline 2\n? pick", None, &mut editor, 80).unwrap();
        screen.render("? done", None, &mut editor, 80).unwrap();

        assert_eq!(
            out.last(),
            "\x1b[2K\x1b[1A\x1b[2K\x1b[1A\x1b[2K\x1b[1G? done\x1b[7G"
        );
        assert_eq!(screen.state().height, 1);
    }

    #[test]
    fn prompt_excludes_typed_input() {
        let (mut screen, _out) = manager();
        let mut editor = LineEditor::new();
        editor.write("abc");
        screen.render("\x1b[1m?\x1b[0m Name abc", None, &mut editor, 80).unwrap();

        assert_eq!(editor.prompt(), "? Name ");
        assert_eq!(screen.state().cursor, CursorPos { rows: 0, cols: 10 });
    }

    #[test]
    fn bottom_content_is_walked_back_over() {
        let (mut screen, out) = manager();
        let mut editor = LineEditor::new();
        screen
            .render("? Name", Some("> error\n> more"), &mut editor, 80)
            .unwrap();
        assert_eq!(out.last(), "? Name\n> error\n> more\x1b[2A\x1b[7G");
        assert_eq!(screen.state().extra_lines_under_prompt, 2);
        assert_eq!(screen.state().height, 3);

        screen.render("? Name", None, &mut editor, 80).unwrap();
        assert!(out.last().starts_with("\x1b[2B\x1b[2K\x1b[1A\x1b[2K\x1b[1A\x1b[2K\x1b[1G"));
        assert_eq!(screen.state().extra_lines_under_prompt, 0);
    }

    #[test]
    fn full_width_prompt_gets_explicit_break() {
        let (mut screen, out) = manager();
        let mut editor = LineEditor::new();
        screen.render("abcd", None, &mut editor, 4).unwrap();

        assert_eq!(out.last(), "abcd\n\x1b[1G");
        assert_eq!(screen.state().height, 2);
        assert_eq!(screen.state().cursor, CursorPos { rows: 1, cols: 0 });
        assert_eq!(screen.state().extra_lines_under_prompt, 0);
    }

    #[test]
    fn long_content_wraps() {
        let (mut screen, out) = manager();
        let mut editor = LineEditor::new();
        screen.render("header that wraps\n? x", None, &mut editor, 10).unwrap();
        assert!(out.last().starts_with("header tha\nt wraps\n? x"));
        assert_eq!(screen.state().height, 3);
    }

    #[test]
    fn cursor_check_only_writes_on_change() {
        let (mut screen, out) = manager();
        let mut editor = LineEditor::new();
        editor.write("ab");
        screen.render("? ab", None, &mut editor, 80).unwrap();
        screen.check_cursor_pos(&editor, 80).unwrap();
        assert_eq!(out.writes(), 1);

        editor.feed(&crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Left,
            crossterm::event::KeyModifiers::NONE,
        ));
        screen.check_cursor_pos(&editor, 80).unwrap();
        assert_eq!(out.last(), "\x1b[4G");
    }

    #[test]
    fn done_keeps_or_clears_content_and_shows_cursor() {
        let (mut screen, out) = manager();
        let mut editor = LineEditor::new();
        screen.render("a\nb", None, &mut editor, 80).unwrap();
        screen.done(false, &mut editor).unwrap();
        assert_eq!(out.last(), "\n\x1b[?25h");

        let (mut screen, out) = manager();
        screen.render("a\nb", None, &mut editor, 80).unwrap();
        screen.done(true, &mut editor).unwrap();
        assert_eq!(out.last(), "\x1b[2K\x1b[1A\x1b[2K\x1b[1G\x1b[?25h");
        assert_eq!(editor.prompt(), "");
    }
}
