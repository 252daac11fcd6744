//! # interax-prompt-fwk
//!
//! A reactive engine for inline terminal prompts, built on crossterm and
//! tokio.
//!
//! A prompt is a plain view function. It runs on every render, keeps its
//! state in hooks, and returns the text to show. The session around it
//! does the rest: reading keys, batching state changes into one redraw,
//! redrawing in place without touching the scrollback, running effects
//! after the frame is on screen, and settling exactly once.
//!
//! ## Features
//!
//! - **Hooks**: `use_state`, `use_ref`, `use_memo`, `use_effect`,
//!   `use_keypress`, addressed by call order through an explicit [`Hooks`]
//!   handle
//! - **Batched rendering**: any number of updates from one key press or
//!   one effect flush produce one render
//! - **ANSI-aware redraw**: wrapping and cursor math ignore escape codes
//! - **Pagination**: windowing over long, variable-height lists with
//!   navigation that skips separators and disabled entries
//! - **Cancellation**: programmatic cancel, external abort signals, Ctrl+C
//!   and process signals, each a distinct [`PromptError`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use interax_prompt_fwk::{create_prompt, keys, Content};
//!
//! let confirm = create_prompt(|message: &String, hooks, done| {
//!     let answer = hooks.use_state(|| None::<bool>)?;
//!     hooks.use_keypress({
//!         let (answer, done) = (answer.clone(), done.clone());
//!         move |key, editor| {
//!             if keys::is_enter_key(key) {
//!                 let yes = editor.line().eq_ignore_ascii_case("y");
//!                 answer.set(Some(yes));
//!                 done.resolve(yes);
//!             }
//!             Ok(())
//!         }
//!     })?;
//!     Ok(Content::from(format!("{message} (y/N) ")))
//! });
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let yes = confirm.run("Continue?".to_owned()).await?;
//!     println!("{yes}");
//!     Ok(())
//! }
//! ```

pub mod ansi;
pub mod cancel;
pub mod config;
pub mod editor;
mod effects;
pub mod error;
pub mod hooks;
pub mod keys;
pub mod pagination;
pub mod prefix;
pub mod screen;
pub mod session;
mod signals;
pub mod terminal;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types at crate root for convenience
pub use cancel::{AbortController, AbortSignal, CancelHandle};
pub use config::{PrefixIcons, Spinner, Styles, Theme, ValidationResult, Validator, Verdict};
pub use editor::{CursorPos, EditorHandle, LineEditor};
pub use effects::Cleanup;
pub use error::{HookError, PromptError, PromptResult};
pub use hooks::{Hooks, KeypressHandler, Ref, State};
pub use keys::{Event, KeyCode, KeyEvent, KeyModifiers, Keybinding};
pub use pagination::{
    find_selectable, nth_selectable, selectable_bounds, step, use_pagination, Direction, Page,
    PaginationState, Paginator, Selectable,
};
pub use prefix::{use_prefix, Status};
pub use screen::ScreenManager;
pub use session::{create_prompt, Content, Done, Prompt, Session, SessionBuilder};
pub use terminal::{install_panic_hook, TerminalGuard, TerminalIo};
