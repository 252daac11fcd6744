//! Shared prompt configuration: the theme and user validation.

use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use crossterm::style::Stylize;
use futures::future::{FutureExt, LocalBoxFuture};

/// Prefix icons shown before the message.
#[derive(Debug, Clone)]
pub struct PrefixIcons {
    pub idle: String,
    pub done: String,
}

/// Loading indicator frames and how fast they advance.
#[derive(Debug, Clone)]
pub struct Spinner {
    pub interval: Duration,
    pub frames: Vec<String>,
}

impl Spinner {
    /// Frame `n`, cycling.
    pub fn frame(&self, n: usize) -> &str {
        match self.frames.len() {
            0 => "",
            len => &self.frames[n % len],
        }
    }
}

/// Text styling functions. Each takes plain text and returns it with
/// ANSI styling applied.
#[derive(Clone, Copy)]
pub struct Styles {
    pub message: fn(&str) -> String,
    pub answer: fn(&str) -> String,
    pub error: fn(&str) -> String,
    pub default_answer: fn(&str) -> String,
    pub help: fn(&str) -> String,
    pub highlight: fn(&str) -> String,
    pub disabled: fn(&str) -> String,
    pub description: fn(&str) -> String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            message: |text| text.bold().to_string(),
            answer: |text| text.cyan().to_string(),
            error: |text| format!("> {text}").red().to_string(),
            default_answer: |text| format!("({text})").dim().to_string(),
            help: |text| text.dim().to_string(),
            highlight: |text| text.cyan().to_string(),
            disabled: |text| text.dim().to_string(),
            description: |text| text.cyan().to_string(),
        }
    }
}

impl fmt::Debug for Styles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Styles").finish_non_exhaustive()
    }
}

/// Look of every prompt.
#[derive(Debug, Clone)]
pub struct Theme {
    pub prefix: PrefixIcons,
    pub spinner: Spinner,
    /// Marks the active row in list prompts.
    pub cursor: String,
    pub style: Styles,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            prefix: PrefixIcons {
                idle: "?".blue().to_string(),
                done: "✔".green().to_string(),
            },
            spinner: Spinner {
                interval: Duration::from_millis(80),
                frames: ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]
                    .into_iter()
                    .map(|frame| frame.yellow().to_string())
                    .collect(),
            },
            cursor: "❯".to_owned(),
            style: Styles::default(),
        }
    }
}

/// Result of running a [`Validator`]: `Err` carries the message shown
/// under the prompt.
pub type ValidationResult = Result<(), String>;

/// Answer of a validator, either at once or later.
pub enum Verdict {
    Ready(ValidationResult),
    Pending(LocalBoxFuture<'static, ValidationResult>),
}

/// User validation of a typed answer.
#[derive(Clone)]
pub enum Validator {
    Sync(Rc<dyn Fn(&str) -> ValidationResult>),
    Async(Rc<dyn Fn(String) -> LocalBoxFuture<'static, ValidationResult>>),
}

impl Validator {
    pub fn new(f: impl Fn(&str) -> ValidationResult + 'static) -> Self {
        Self::Sync(Rc::new(f))
    }

    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + 'static,
        Fut: Future<Output = ValidationResult> + 'static,
    {
        Self::Async(Rc::new(move |value| f(value).boxed_local()))
    }

    pub fn check(&self, value: &str) -> Verdict {
        match self {
            Self::Sync(f) => Verdict::Ready(f(value)),
            Self::Async(f) => Verdict::Pending(f(value.to_owned())),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Validator::Sync"),
            Self::Async(_) => f.write_str("Validator::Async"),
        }
    }
}
