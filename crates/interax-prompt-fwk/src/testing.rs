//! Driving sessions without a terminal.
//!
//! [`TestTerminal`] stands in for the process terminal: tests push key
//! events into it and read back what the session wrote.
//!
//! ```ignore
//! let term = TestTerminal::new();
//! let session = prompt.session(config).terminal(term.io()).build();
//! let (answer, ()) = tokio::join!(session.run(), async {
//!     term.settle().await;
//!     term.press(KeyCode::Down);
//!     term.press(KeyCode::Enter);
//! });
//! ```

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use futures::channel::mpsc;

use crate::ansi::strip_ansi;
use crate::terminal::TerminalIo;

type Chunks = Rc<RefCell<Vec<Vec<u8>>>>;

/// A scripted terminal. Each `write_all` of the session is recorded as
/// one chunk, so one chunk is one frame.
pub struct TestTerminal {
    input: RefCell<Option<mpsc::UnboundedSender<io::Result<CrosstermEvent>>>>,
    output: Chunks,
    columns: u16,
}

impl TestTerminal {
    /// An 80 column terminal.
    pub fn new() -> Self {
        Self::with_columns(80)
    }

    pub fn with_columns(columns: u16) -> Self {
        Self {
            input: RefCell::new(None),
            output: Chunks::default(),
            columns,
        }
    }

    /// Terminal I/O for a session. Calling it again detaches the
    /// previous session's input.
    pub fn io(&self) -> TerminalIo {
        let (tx, rx) = mpsc::unbounded();
        *self.input.borrow_mut() = Some(tx);
        TerminalIo {
            input: Box::pin(rx),
            output: Box::new(Recorder(Rc::clone(&self.output))),
            columns: Some(self.columns),
            raw_mode: false,
        }
    }

    pub fn send(&self, event: CrosstermEvent) {
        if let Some(tx) = self.input.borrow().as_ref() {
            let _ = tx.unbounded_send(Ok(event));
        }
    }

    /// Fail the next read with `err`.
    pub fn send_error(&self, err: io::Error) {
        if let Some(tx) = self.input.borrow().as_ref() {
            let _ = tx.unbounded_send(Err(err));
        }
    }

    pub fn press_key(&self, key: KeyEvent) {
        self.send(CrosstermEvent::Key(key));
    }

    pub fn press(&self, code: KeyCode) {
        self.press_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    pub fn ctrl(&self, c: char) {
        self.press_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    pub fn type_text(&self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    pub fn resize(&self, width: u16, height: u16) {
        self.send(CrosstermEvent::Resize(width, height));
    }

    /// End the input stream, as if stdin was closed.
    pub fn close_input(&self) {
        self.input.borrow_mut().take();
    }

    /// Let the session process everything sent so far.
    pub async fn settle(&self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    /// Everything written, escapes included.
    pub fn raw_output(&self) -> String {
        let chunks = self.output.borrow();
        String::from_utf8_lossy(&chunks.concat()).into_owned()
    }

    /// The text of every frame that drew something, escapes removed.
    pub fn frames(&self) -> Vec<String> {
        self.output
            .borrow()
            .iter()
            .map(|chunk| plain(&String::from_utf8_lossy(chunk)))
            .filter(|frame| !frame.is_empty())
            .collect()
    }

    /// The text of the latest frame.
    pub fn screen(&self) -> String {
        self.frames().pop().unwrap_or_default()
    }

    /// Number of writes the session made.
    pub fn writes(&self) -> usize {
        self.output.borrow().len()
    }
}

impl Default for TestTerminal {
    fn default() -> Self {
        Self::new()
    }
}

fn plain(text: &str) -> String {
    strip_ansi(text)
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_owned()
}

struct Recorder(Chunks);

impl Write for Recorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
