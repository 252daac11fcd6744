//! Terminal setup and teardown.
//!
//! Prompts draw inline, below the shell's cursor, so there is no
//! alternate screen. The only state to restore is raw mode and cursor
//! visibility, which [`TerminalGuard`] does on drop and
//! [`install_panic_hook`] does on panic.

use std::io::{self, Write};
use std::pin::Pin;
use std::sync::Once;

use crossterm::cursor::Show;
use crossterm::event::{Event as CrosstermEvent, EventStream};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::Stream;

/// Terminal events as the session reads them.
pub type EventSource = Pin<Box<dyn Stream<Item = io::Result<CrosstermEvent>>>>;

/// Where a session reads events from and writes frames to.
pub struct TerminalIo {
    pub input: EventSource,
    pub output: Box<dyn Write>,
    /// Fixed width. `None` asks the terminal, falling back to 80.
    pub columns: Option<u16>,
    /// Put the terminal in raw mode for the session's duration.
    pub raw_mode: bool,
}

impl TerminalIo {
    /// The process terminal: crossterm's event stream and stdout.
    pub fn stdio() -> Self {
        Self {
            input: Box::pin(EventStream::new()),
            output: Box::new(io::stdout()),
            columns: None,
            raw_mode: true,
        }
    }

    pub(crate) fn width(&self) -> usize {
        match self.columns {
            Some(columns) => usize::from(columns),
            None => crossterm::terminal::size()
                .map(|(columns, _)| usize::from(columns))
                .unwrap_or(80),
        }
    }
}

impl Default for TerminalIo {
    fn default() -> Self {
        Self::stdio()
    }
}

/// Raw mode for as long as the guard lives.
///
/// Restores the terminal when dropped, including on early return and
/// unwinding. Restoring twice is harmless.
pub struct TerminalGuard {
    raw_mode: bool,
    restored: bool,
}

impl TerminalGuard {
    pub fn new(raw_mode: bool) -> io::Result<Self> {
        if raw_mode {
            install_panic_hook();
            enable_raw_mode()?;
        }
        Ok(Self {
            raw_mode,
            restored: false,
        })
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        if self.raw_mode {
            disable_raw_mode()?;
            execute!(io::stdout(), Show)?;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(error = %err, "failed to restore terminal");
        }
    }
}

/// Install a panic hook that leaves raw mode and shows the cursor before
/// the panic message is printed. Installs at most once per process.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), Show);
            original_hook(panic_info);
        }));
    });
}
