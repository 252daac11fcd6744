//! Error types for prompt sessions.
//!
//! Two families live here. [`HookError`] covers programmer mistakes in a
//! view function (calling a hook outside a render, changing the hook call
//! order). [`PromptError`] is what a session settles with when it does not
//! produce a value.

use std::io;

/// Misuse of the hook primitives.
///
/// These are always bugs in the calling view, never user input problems.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// A hook primitive was invoked while no render pass was active.
    #[error("{hook} can only be called from within a prompt render")]
    OutsideRender {
        /// Name of the primitive that was called.
        hook: &'static str,
    },

    /// The slot at `index` holds a different kind of hook than the one
    /// being called now. The hook call order changed between renders.
    #[error("hook slot {index} was not created by {hook}; hooks must be called in the same order on every render")]
    SlotMismatch {
        /// Position of the offending hook call.
        index: usize,
        /// Name of the primitive that was called.
        hook: &'static str,
    },

    /// A render pass made a different number of hook calls than the one
    /// before it. Only checked in debug builds.
    #[error("render made {current} hook calls, previous render made {previous}")]
    HookCountChanged {
        /// Hook calls made by the previous render.
        previous: usize,
        /// Hook calls made by this render.
        current: usize,
    },
}

/// The ways a prompt session can fail to produce a value.
///
/// `Cancel`, `Abort` and `Exit` are cancellations, not crashes; see
/// [`PromptError::is_cancellation`].
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// A view broke the hook contract.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// A prompt was configured in a way it cannot work with, for example
    /// a select prompt with no selectable choices.
    #[error("{0}")]
    Validation(String),

    /// The session was cancelled through its [`CancelHandle`](crate::CancelHandle).
    #[error("Prompt was canceled")]
    Cancel,

    /// The session's [`AbortSignal`](crate::AbortSignal) fired.
    #[error("Prompt was aborted")]
    Abort,

    /// The process was interrupted or the input went away.
    #[error("User force closed the prompt with {signal}")]
    Exit {
        /// Name of the signal or condition, e.g. `SIGINT`.
        signal: &'static str,
    },

    /// Reading from or writing to the terminal failed.
    #[error("terminal IO error: {0}")]
    Io(#[from] io::Error),
}

impl PromptError {
    /// Build a [`PromptError::Validation`] from anything string-like.
    pub fn validation(message: impl Into<String>) -> Self {
        PromptError::Validation(message.into())
    }

    /// Whether this error is one of the three cancellation kinds.
    #[inline]
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            PromptError::Cancel | PromptError::Abort | PromptError::Exit { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type PromptResult<T> = Result<T, PromptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_kinds_are_distinct_from_crashes() {
        assert!(PromptError::Cancel.is_cancellation());
        assert!(PromptError::Abort.is_cancellation());
        assert!(PromptError::Exit { signal: "SIGINT" }.is_cancellation());
        assert!(!PromptError::validation("nope").is_cancellation());
        assert!(!PromptError::from(HookError::OutsideRender { hook: "use_state" }).is_cancellation());
    }

    #[test]
    fn messages() {
        assert_eq!(PromptError::Cancel.to_string(), "Prompt was canceled");
        assert_eq!(
            PromptError::Exit { signal: "SIGINT" }.to_string(),
            "User force closed the prompt with SIGINT"
        );
        assert_eq!(
            HookError::OutsideRender { hook: "use_effect" }.to_string(),
            "use_effect can only be called from within a prompt render"
        );
    }
}
