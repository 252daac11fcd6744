//! Cancellation surfaces for a prompt session.
//!
//! Two kinds, kept apart because they settle a session with different
//! errors:
//!
//! - [`AbortController`] / [`AbortSignal`]: an external token the caller
//!   creates before the session and can share between several sessions.
//!   Firing it settles each with [`PromptError::Abort`](crate::PromptError::Abort).
//! - [`CancelHandle`]: obtained from a built session, settles that one
//!   session with [`PromptError::Cancel`](crate::PromptError::Cancel).
//!
//! Both are `tokio::sync::watch` flags that only ever go from `false` to
//! `true`.

use std::sync::Arc;

use tokio::sync::watch;

/// A one-way flag that can be waited on.
#[derive(Debug, Clone)]
struct Flag {
    rx: watch::Receiver<bool>,
}

impl Flag {
    #[inline]
    fn is_set(&self) -> bool {
        *self.rx.borrow()
    }

    async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                // The sender is gone; the flag can no longer be set.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// The firing side of an [`AbortSignal`].
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<bool>,
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A signal to hand to one or more sessions.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            flag: Flag {
                rx: self.tx.subscribe(),
            },
        }
    }

    /// Fire the signal. Firing again does nothing.
    pub fn abort(&self) {
        self.tx.send_if_modified(|aborted| !std::mem::replace(aborted, true));
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// The listening side of an [`AbortController`].
///
/// Dropping the controller without firing leaves the signal unfired for
/// good.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    flag: Flag,
}

impl AbortSignal {
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.flag.is_set()
    }

    /// Wait until the signal fires.
    pub async fn aborted(&mut self) {
        self.flag.wait().await;
    }
}

/// Cancels one session. Cheap to clone; cancelling twice is harmless.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub(crate) fn new() -> (Self, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (
            Self { tx: Arc::new(tx) },
            CancelToken { flag: Flag { rx } },
        )
    }

    /// Request cancellation. Has no effect once the session settled or if
    /// it was already cancelled.
    pub fn cancel(&self) {
        self.tx.send_if_modified(|cancelled| !std::mem::replace(cancelled, true));
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Session side of a [`CancelHandle`].
#[derive(Debug)]
pub(crate) struct CancelToken {
    flag: Flag,
}

impl CancelToken {
    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.flag.is_set()
    }

    pub(crate) async fn cancelled(&mut self) {
        self.flag.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn abort_reaches_every_signal() {
        let controller = AbortController::new();
        let mut first = controller.signal();
        let second = controller.signal();
        assert!(!first.is_aborted());

        controller.abort();
        controller.abort();
        first.aborted().await;
        assert!(second.is_aborted());
        assert!(controller.is_aborted());
    }

    #[tokio::test]
    async fn signal_created_after_abort_is_already_fired() {
        let controller = AbortController::new();
        controller.abort();
        let mut signal = controller.signal();
        assert!(signal.is_aborted());
        tokio::time::timeout(Duration::from_millis(10), signal.aborted())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_controller_never_fires() {
        let controller = AbortController::new();
        let mut signal = controller.signal();
        drop(controller);
        let waited = tokio::time::timeout(Duration::from_secs(1), signal.aborted()).await;
        assert!(waited.is_err());
        assert!(!signal.is_aborted());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let (handle, mut token) = CancelHandle::new();
        let other = handle.clone();
        handle.cancel();
        other.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
    }
}
