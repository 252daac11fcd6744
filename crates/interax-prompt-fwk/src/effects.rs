//! Effect scheduling.
//!
//! Effects are queued while a view renders and run only after the frame
//! has been written to the terminal. Each effect slot keeps at most one
//! cleanup, which runs right before the slot's next effect or when the
//! session ends.

use std::cell::RefCell;

/// Undo for an effect, returned by the effect itself.
pub type Cleanup = Box<dyn FnOnce()>;

/// Body of an effect. Synchronous by construction: it returns either
/// nothing or a cleanup, never something to await.
pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

/// Queue of pending effects plus the active cleanup of every slot.
#[derive(Default)]
pub(crate) struct EffectScheduler {
    pending: RefCell<Vec<(usize, EffectFn)>>,
    /// Indexed by hook slot.
    cleanups: RefCell<Vec<Option<Cleanup>>>,
}

impl EffectScheduler {
    pub(crate) fn queue(&self, slot: usize, effect: EffectFn) {
        self.pending.borrow_mut().push((slot, effect));
    }

    #[inline]
    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Run every queued effect, in queue order.
    ///
    /// The caller wraps this in the store's batching so state changes made
    /// by the effects produce a single re-render.
    pub(crate) fn flush(&self) -> usize {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        let ran = pending.len();

        for (slot, effect) in pending {
            if let Some(cleanup) = self.take_cleanup(slot) {
                cleanup();
            }
            let cleanup = effect();
            self.set_cleanup(slot, cleanup);
        }

        ran
    }

    /// Drop queued effects without running them and run every active
    /// cleanup in slot order. Each cleanup runs at most once.
    pub(crate) fn teardown(&self) {
        self.pending.borrow_mut().clear();
        let cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        for cleanup in cleanups.into_iter().flatten() {
            cleanup();
        }
    }

    fn take_cleanup(&self, slot: usize) -> Option<Cleanup> {
        self.cleanups.borrow_mut().get_mut(slot).and_then(Option::take)
    }

    fn set_cleanup(&self, slot: usize, cleanup: Option<Cleanup>) {
        let mut cleanups = self.cleanups.borrow_mut();
        if cleanups.len() <= slot {
            cleanups.resize_with(slot + 1, || None);
        }
        cleanups[slot] = cleanup;
    }
}
