//! Prompt definition and the session loop.
//!
//! A prompt is a view function plus the config type it reads; see
//! [`create_prompt`]. Running it builds a [`Session`], which owns the hook
//! store, the screen and the terminal for its whole life and settles
//! exactly once: with the value passed to [`Done::resolve`], or with one
//! of the cancellation errors.
//!
//! The loop is single threaded. Every source of work (key presses,
//! interrupts, timers and tasks that touch hook state) ends in the same
//! place: the store's dirty flag gets set and the loop wakes up, renders
//! once, writes the frame and flushes effects.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::io;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::StreamExt;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::cancel::{AbortSignal, CancelHandle, CancelToken};
use crate::config::Theme;
use crate::error::{PromptError, PromptResult};
use crate::hooks::{HookStore, Hooks};
use crate::keys::{is_force_exit_key, Event};
use crate::screen::ScreenManager;
use crate::signals::{self, Subscription};
use crate::terminal::{EventSource, TerminalGuard, TerminalIo};

/// What a view renders: the main content, ending on the prompt row,
/// and optional content shown below the prompt row (errors, help).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub main: String,
    pub bottom: Option<String>,
}

impl Content {
    /// Content with nothing below the prompt row.
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            bottom: None,
        }
    }

    /// Set the bottom content. Empty text means none.
    pub fn with_bottom(mut self, bottom: impl Into<String>) -> Self {
        let bottom = bottom.into();
        self.bottom = (!bottom.is_empty()).then_some(bottom);
        self
    }
}

impl From<String> for Content {
    fn from(main: String) -> Self {
        Self::new(main)
    }
}

impl From<&str> for Content {
    fn from(main: &str) -> Self {
        Self::new(main)
    }
}

impl From<(String, String)> for Content {
    fn from((main, bottom): (String, String)) -> Self {
        Self::new(main).with_bottom(bottom)
    }
}

/// Settles the session with a value.
///
/// Only the first call counts; later calls are ignored.
pub struct Done<T> {
    inner: Rc<DoneInner<T>>,
}

struct DoneInner<T> {
    value: RefCell<Option<T>>,
    resolved: Cell<bool>,
    store: Weak<HookStore>,
}

impl<T> Clone for Done<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Done<T> {
    fn new(store: &Rc<HookStore>) -> Self {
        Self {
            inner: Rc::new(DoneInner {
                value: RefCell::new(None),
                resolved: Cell::new(false),
                store: Rc::downgrade(store),
            }),
        }
    }

    pub fn resolve(&self, value: T) {
        if self.inner.resolved.replace(true) {
            trace!("session already resolved; ignoring value");
            return;
        }
        *self.inner.value.borrow_mut() = Some(value);
        if let Some(store) = self.inner.store.upgrade() {
            store.wake();
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.get()
    }

    fn take(&self) -> Option<T> {
        self.inner.value.borrow_mut().take()
    }
}

type ViewFn<C, T> = dyn Fn(&C, &Hooks, &Done<T>) -> PromptResult<Content>;

/// A prompt: a view over config `C` that settles with a `T`.
pub struct Prompt<C, T> {
    view: Rc<ViewFn<C, T>>,
}

impl<C, T> Clone for Prompt<C, T> {
    fn clone(&self) -> Self {
        Self {
            view: Rc::clone(&self.view),
        }
    }
}

/// Turn a view function into a [`Prompt`].
///
/// The view runs on every render. It must only touch state through the
/// [`Hooks`] it is given, and call [`Done::resolve`] once it has an
/// answer, normally from a keypress handler.
pub fn create_prompt<C, T, F>(view: F) -> Prompt<C, T>
where
    F: Fn(&C, &Hooks, &Done<T>) -> PromptResult<Content> + 'static,
{
    Prompt {
        view: Rc::new(view),
    }
}

impl<C: 'static, T: 'static> Prompt<C, T> {
    /// Configure a session over a ready config.
    pub fn session(&self, config: C) -> SessionBuilder<C, T> {
        self.session_with(std::future::ready(config))
    }

    /// Configure a session whose config is still being resolved, for
    /// example a message fetched from somewhere. A loading indicator is
    /// shown if it takes long.
    pub fn session_with(&self, config: impl Future<Output = C> + 'static) -> SessionBuilder<C, T> {
        SessionBuilder {
            view: Rc::clone(&self.view),
            config: config.boxed_local(),
            terminal: None,
            clear_on_done: false,
            abort: None,
            handle_signals: None,
            loading_delay: Duration::from_millis(300),
            theme: None,
        }
    }

    /// Run on the process terminal with default options.
    pub async fn run(&self, config: C) -> PromptResult<T> {
        self.session(config).build().run().await
    }
}

/// Options for one session.
pub struct SessionBuilder<C, T> {
    view: Rc<ViewFn<C, T>>,
    config: LocalBoxFuture<'static, C>,
    terminal: Option<TerminalIo>,
    clear_on_done: bool,
    abort: Option<AbortSignal>,
    handle_signals: Option<bool>,
    loading_delay: Duration,
    theme: Option<Theme>,
}

impl<C: 'static, T: 'static> SessionBuilder<C, T> {
    /// Read from and write to `terminal` instead of the process terminal.
    pub fn terminal(mut self, terminal: TerminalIo) -> Self {
        self.terminal = Some(terminal);
        self
    }

    /// Erase the prompt once it settles instead of leaving it on screen.
    pub fn clear_on_done(mut self, clear: bool) -> Self {
        self.clear_on_done = clear;
        self
    }

    /// Settle with [`PromptError::Abort`] when `signal` fires. A signal
    /// that already fired makes the session fail before touching the
    /// terminal.
    pub fn abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort = Some(signal);
        self
    }

    /// Settle with [`PromptError::Exit`] on SIGINT, SIGTERM or SIGHUP.
    /// Defaults to on when the session runs in raw mode.
    pub fn handle_signals(mut self, handle: bool) -> Self {
        self.handle_signals = Some(handle);
        self
    }

    /// How long an unresolved config may take before the loading
    /// indicator appears.
    pub fn loading_delay(mut self, delay: Duration) -> Self {
        self.loading_delay = delay;
        self
    }

    /// Theme for the loading indicator.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn build(self) -> Session<C, T> {
        let terminal = self.terminal.unwrap_or_else(TerminalIo::stdio);
        let handle_signals = self.handle_signals.unwrap_or(terminal.raw_mode);
        let (cancel, cancel_token) = CancelHandle::new();
        Session {
            view: self.view,
            config: self.config,
            terminal,
            clear_on_done: self.clear_on_done,
            abort: self.abort,
            handle_signals,
            loading_delay: self.loading_delay,
            theme: self.theme.unwrap_or_default(),
            cancel,
            cancel_token,
        }
    }
}

/// A built session, ready to [`run`](Session::run).
pub struct Session<C, T> {
    view: Rc<ViewFn<C, T>>,
    config: LocalBoxFuture<'static, C>,
    terminal: TerminalIo,
    clear_on_done: bool,
    abort: Option<AbortSignal>,
    handle_signals: bool,
    loading_delay: Duration,
    theme: Theme,
    cancel: CancelHandle,
    cancel_token: CancelToken,
}

impl<C: 'static, T: 'static> Session<C, T> {
    /// Handle that settles this session with [`PromptError::Cancel`].
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Drive the session to its outcome.
    ///
    /// Whatever the outcome, effect cleanups have run, spawned timers are
    /// gone and the terminal is restored by the time this returns.
    pub async fn run(self) -> PromptResult<T> {
        let local = tokio::task::LocalSet::new();
        local.run_until(self.drive()).await
    }

    async fn drive(self) -> PromptResult<T> {
        let Session {
            view,
            config,
            terminal,
            clear_on_done,
            abort,
            handle_signals,
            loading_delay,
            theme,
            cancel: _cancel,
            cancel_token,
        } = self;

        if abort.as_ref().is_some_and(AbortSignal::is_aborted) {
            debug!("abort signal fired before the session started");
            return Err(PromptError::Abort);
        }

        let columns = terminal.width();
        let fixed_columns = terminal.columns.is_some();
        let TerminalIo {
            input,
            output,
            raw_mode,
            ..
        } = terminal;

        let mut guard = TerminalGuard::new(raw_mode)?;
        let interrupts = Interrupts::new(cancel_token, abort, handle_signals)?;
        let store = HookStore::new(columns);
        let mut run = Run {
            input,
            interrupts,
            screen: ScreenManager::new(output),
            store: Rc::clone(&store),
            fixed_columns,
        };
        debug!(columns, raw_mode, "prompt session started");

        let result = match run.load_config(config, loading_delay, &theme).await {
            Ok(config) => run.main_loop(&*view, &config).await,
            Err(err) => Err(err),
        };

        store.teardown();
        let finished = run
            .screen
            .done(clear_on_done, &mut store.editor.borrow_mut());
        let restored = guard.restore();
        match &result {
            Ok(_) => debug!(renders = store.render_count(), "prompt session resolved"),
            Err(err) => debug!(error = %err, "prompt session rejected"),
        }

        let value = result?;
        finished?;
        restored?;
        Ok(value)
    }
}

struct Run {
    input: EventSource,
    interrupts: Interrupts,
    screen: ScreenManager,
    store: Rc<HookStore>,
    fixed_columns: bool,
}

impl Run {
    /// Wait for the config, showing a spinner once `delay` has passed.
    /// Input read meanwhile is thrown away.
    async fn load_config<C>(
        &mut self,
        mut config: LocalBoxFuture<'static, C>,
        delay: Duration,
        theme: &Theme,
    ) -> PromptResult<C> {
        let mut spinner = tokio::time::interval_at(Instant::now() + delay, theme.spinner.interval);
        spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frame = 0usize;

        let config = loop {
            tokio::select! {
                biased;

                err = self.interrupts.next() => return Err(err),

                config = &mut config => break config,

                event = self.input.next() => {
                    self.discard_early(event)?;
                }

                _ = spinner.tick() => {
                    let line = format!("{} Loading...", theme.spinner.frame(frame));
                    self.screen.render_status(&line, self.store.columns())?;
                    frame += 1;
                }
            }
        };

        // Keys typed while loading may still be buffered.
        while let Some(event) = self.input.next().now_or_never() {
            self.discard_early(event)?;
        }
        Ok(config)
    }

    fn discard_early(&mut self, event: Option<io::Result<CrosstermEvent>>) -> PromptResult<()> {
        match event.map(|event| event.map(Event::from)) {
            Some(Ok(Event::Key(key))) if is_force_exit_key(&key) => {
                Err(PromptError::Exit { signal: "SIGINT" })
            }
            Some(Ok(Event::Resize { width, .. })) => {
                self.resize(width);
                Ok(())
            }
            Some(Ok(event)) => {
                debug!(?event, "dropping input received before the first render");
                Ok(())
            }
            Some(Err(err)) => Err(err.into()),
            None => Err(PromptError::Exit { signal: "EOF" }),
        }
    }

    async fn main_loop<C, T>(&mut self, view: &ViewFn<C, T>, config: &C) -> PromptResult<T> {
        let done = Done::new(&self.store);
        self.store.request_render();

        loop {
            let mut rendered = false;
            while self.store.is_dirty() {
                let content = self.store.render(|hooks| view(config, hooks, &done))?;
                self.screen.render(
                    &content.main,
                    content.bottom.as_deref(),
                    &mut self.store.editor.borrow_mut(),
                    self.store.columns(),
                )?;
                rendered = true;
                if done.is_resolved() {
                    break;
                }
                self.store.flush_effects();
            }
            if !rendered {
                self.screen
                    .check_cursor_pos(&self.store.editor.borrow(), self.store.columns())?;
            }
            if let Some(value) = done.take() {
                return Ok(value);
            }

            tokio::select! {
                biased;

                err = self.interrupts.next() => return Err(err),

                event = self.input.next() => match event.map(|event| event.map(Event::from)) {
                    Some(Ok(Event::Key(key))) if is_force_exit_key(&key) => {
                        return Err(PromptError::Exit { signal: "SIGINT" });
                    }
                    Some(Ok(Event::Key(key))) => self.store.dispatch_keypress(&key)?,
                    Some(Ok(Event::Resize { width, .. })) => {
                        self.resize(width);
                        self.store.request_render();
                    }
                    Some(Ok(Event::Other)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Err(PromptError::Exit { signal: "EOF" }),
                },

                _ = self.store.woken() => {}
            }
        }
    }

    fn resize(&self, width: u16) {
        if !self.fixed_columns {
            self.store.set_columns(usize::from(width));
        }
    }
}

/// Everything that can end a session from outside the view.
struct Interrupts {
    cancel: CancelToken,
    abort: Option<AbortSignal>,
    signals: Option<Subscription>,
}

impl Interrupts {
    fn new(
        cancel: CancelToken,
        abort: Option<AbortSignal>,
        handle_signals: bool,
    ) -> io::Result<Self> {
        let signals = if handle_signals {
            Some(signals::subscribe()?)
        } else {
            None
        };
        Ok(Self {
            cancel,
            abort,
            signals,
        })
    }

    async fn next(&mut self) -> PromptError {
        let Self {
            cancel,
            abort,
            signals,
        } = self;
        if cancel.is_cancelled() {
            return PromptError::Cancel;
        }
        let abort = async move {
            match abort.as_mut() {
                Some(signal) => signal.aborted().await,
                None => std::future::pending().await,
            }
        };
        let signal = async move {
            match signals.as_mut() {
                Some(signals) => signals.recv().await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => PromptError::Cancel,
            _ = abort => PromptError::Abort,
            signal = signal => PromptError::Exit { signal },
        }
    }
}
