//! The hook store and hook primitives.
//!
//! Every session owns one [`HookStore`]: an ordered arena of slots
//! addressed by call order. A render pass resets the cursor to zero and
//! every hook call claims the next slot, so a view must make the same hook
//! calls in the same order on every render.
//!
//! Views reach the store through [`Hooks`], an explicit context handle
//! passed to the view. Nothing is looked up from a global, so sessions
//! running side by side never see each other's state.
//!
//! # Example
//!
//! ```ignore
//! use interax_prompt_fwk::{create_prompt, Content, Hooks, keys};
//!
//! let counter = create_prompt(|message: &String, hooks: &Hooks, done| {
//!     let count = hooks.use_state(|| 0u32)?;
//!     hooks.use_keypress({
//!         let count = count.clone();
//!         let done = done.clone();
//!         move |key, _editor| {
//!             if keys::is_up_key(key, &[]) {
//!                 count.update(|n| n + 1);
//!             } else if keys::is_enter_key(key) {
//!                 done.resolve(count.get());
//!             }
//!             Ok(())
//!         }
//!     })?;
//!     Ok(Content::from(format!("{message} {}", count.get())))
//! });
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tokio::sync::Notify;
use tracing::trace;

use crate::editor::{EditorHandle, LineEditor};
use crate::effects::{Cleanup, EffectScheduler};
use crate::error::{HookError, PromptResult};
use crate::keys::KeyEvent;

/// A keypress listener registered through [`Hooks::use_keypress`].
pub type KeypressHandler = Box<dyn FnMut(&KeyEvent, &mut LineEditor) -> PromptResult<()>>;

/// Per-session container of hook slots, effects, listeners and the
/// render-request machinery.
pub(crate) struct HookStore {
    slots: RefCell<Vec<Box<dyn Any>>>,
    index: Cell<usize>,
    previous_count: Cell<Option<usize>>,
    rendering: Cell<bool>,
    pub(crate) effects: EffectScheduler,
    listeners: RefCell<Vec<(u64, Ref<Option<KeypressHandler>>)>>,
    next_listener: Cell<u64>,
    pub(crate) editor: Rc<RefCell<LineEditor>>,
    columns: Cell<usize>,
    batch_depth: Cell<usize>,
    pending_change: Cell<bool>,
    dirty: Cell<bool>,
    closed: Cell<bool>,
    renders: Cell<u64>,
    wake: Notify,
}

impl HookStore {
    pub(crate) fn new(columns: usize) -> Rc<Self> {
        Rc::new(Self {
            slots: RefCell::new(Vec::new()),
            index: Cell::new(0),
            previous_count: Cell::new(None),
            rendering: Cell::new(false),
            effects: EffectScheduler::default(),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            editor: Rc::new(RefCell::new(LineEditor::new())),
            columns: Cell::new(columns.max(1)),
            batch_depth: Cell::new(0),
            pending_change: Cell::new(false),
            dirty: Cell::new(false),
            closed: Cell::new(false),
            renders: Cell::new(0),
            wake: Notify::new(),
        })
    }

    /// Run one render pass of `view` against this store.
    ///
    /// The view's own error wins over a hook-count mismatch, since a view
    /// that bailed out early naturally made fewer hook calls.
    pub(crate) fn render<T>(
        self: &Rc<Self>,
        view: impl FnOnce(&Hooks) -> PromptResult<T>,
    ) -> PromptResult<T> {
        self.index.set(0);
        self.dirty.set(false);
        self.rendering.set(true);
        let hooks = Hooks {
            store: Rc::clone(self),
        };
        let result = view(&hooks);
        self.rendering.set(false);
        let output = result?;

        let count = self.index.get();
        if cfg!(debug_assertions) {
            if let Some(previous) = self.previous_count.get() {
                if previous != count {
                    return Err(HookError::HookCountChanged {
                        previous,
                        current: count,
                    }
                    .into());
                }
            }
        }
        self.previous_count.set(Some(count));
        self.renders.set(self.renders.get() + 1);
        trace!(render = self.renders.get(), hooks = count, "render pass");

        Ok(output)
    }

    /// Run `f` with render requests coalesced into at most one.
    pub(crate) fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.batch_depth.set(self.batch_depth.get() + 1);
        let result = f();
        let depth = self.batch_depth.get() - 1;
        self.batch_depth.set(depth);
        if depth == 0 && self.pending_change.replace(false) {
            self.request_render();
        }
        result
    }

    /// Run queued effects inside one batch.
    pub(crate) fn flush_effects(&self) {
        if !self.effects.has_pending() {
            return;
        }
        let ran = self.batch(|| self.effects.flush());
        trace!(effects = ran, "flushed effects");
    }

    /// Feed a key to the line editor, then to every keypress listener.
    pub(crate) fn dispatch_keypress(&self, key: &KeyEvent) -> PromptResult<()> {
        self.editor.borrow_mut().feed(key);
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        self.batch(|| {
            for handler in listeners {
                let mut editor = self.editor.borrow_mut();
                handler.with_mut(|handler| match handler {
                    Some(handler) => handler(key, &mut *editor),
                    None => Ok(()),
                })?;
            }
            Ok(())
        })
    }

    /// Close the store: drop queued effects, run every cleanup once in
    /// slot order, detach listeners and drop hook state. Later state
    /// changes are ignored.
    pub(crate) fn teardown(&self) {
        if self.closed.replace(true) {
            return;
        }
        self.effects.teardown();
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        // Handlers may hold a `Hooks`; drop them outside the borrow.
        drop(listeners);
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        drop(slots);
    }

    pub(crate) fn handle_change(&self) {
        if self.closed.get() {
            return;
        }
        if self.batch_depth.get() > 0 {
            self.pending_change.set(true);
        } else {
            self.request_render();
        }
    }

    pub(crate) fn request_render(&self) {
        self.dirty.set(true);
        self.wake.notify_one();
    }

    /// Wake the session loop without marking the store dirty.
    pub(crate) fn wake(&self) {
        self.wake.notify_one();
    }

    pub(crate) async fn woken(&self) {
        self.wake.notified().await;
    }

    #[inline]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    #[inline]
    pub(crate) fn is_open(&self) -> bool {
        !self.closed.get()
    }

    #[inline]
    pub(crate) fn render_count(&self) -> u64 {
        self.renders.get()
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[inline]
    pub(crate) fn columns(&self) -> usize {
        self.columns.get()
    }

    pub(crate) fn set_columns(&self, columns: usize) {
        self.columns.set(columns.max(1));
    }

    fn add_listener(&self, handler: Ref<Option<KeypressHandler>>) -> u64 {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, handler));
        id
    }

    fn remove_listener(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(listener, _)| *listener != id);
    }

    fn next_index(&self, hook: &'static str) -> Result<usize, HookError> {
        if !self.rendering.get() {
            return Err(HookError::OutsideRender { hook });
        }
        let index = self.index.get();
        self.index.set(index + 1);
        Ok(index)
    }

    /// Fetch slot `index`, allocating it with `init` on first use.
    fn slot<S: Clone + 'static>(
        &self,
        index: usize,
        hook: &'static str,
        init: impl FnOnce() -> S,
    ) -> Result<S, HookError> {
        if let Some(slot) = self.slots.borrow().get(index) {
            return slot
                .downcast_ref::<S>()
                .cloned()
                .ok_or(HookError::SlotMismatch { index, hook });
        }

        let value = init();
        let mut slots = self.slots.borrow_mut();
        // An initializer that called hooks itself would have moved the end.
        if slots.len() != index {
            return Err(HookError::SlotMismatch { index, hook });
        }
        slots.push(Box::new(value.clone()));
        Ok(value)
    }
}

/// The render context handed to a view.
///
/// All hook primitives are methods on this handle. It can be cloned into
/// closures, but the `use_*` methods fail with
/// [`HookError::OutsideRender`] unless a render pass is running.
#[derive(Clone)]
pub struct Hooks {
    store: Rc<HookStore>,
}

impl Hooks {
    /// A state slot. `init` runs only on the first render.
    ///
    /// Setting the value through the returned [`State`] requests a
    /// re-render unless the new value equals the current one.
    pub fn use_state<T: 'static>(&self, init: impl FnOnce() -> T) -> Result<State<T>, HookError> {
        let index = self.store.next_index("use_state")?;
        let cell: Rc<RefCell<T>> =
            self.store
                .slot(index, "use_state", || Rc::new(RefCell::new(init())))?;
        Ok(State {
            cell,
            store: Rc::downgrade(&self.store),
        })
    }

    /// A mutable box whose identity never changes across renders.
    ///
    /// Writing to it never requests a render.
    pub fn use_ref<T: 'static>(&self, init: impl FnOnce() -> T) -> Result<Ref<T>, HookError> {
        self.use_state(|| Ref::new(init())).map(|state| state.get())
    }

    /// Recompute `compute` only when `deps` differs from the previous
    /// render's. Otherwise returns the cached value (the same `Rc`).
    pub fn use_memo<T, D>(&self, compute: impl FnOnce() -> T, deps: D) -> Result<Rc<T>, HookError>
    where
        T: 'static,
        D: PartialEq + 'static,
    {
        let index = self.store.next_index("use_memo")?;
        let slot: Rc<RefCell<Option<Memo<T, D>>>> =
            self.store
                .slot(index, "use_memo", || Rc::new(RefCell::new(None)))?;

        let cached = slot
            .borrow()
            .as_ref()
            .filter(|memo| memo.deps == deps)
            .map(|memo| Rc::clone(&memo.value));
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = Rc::new(compute());
        *slot.borrow_mut() = Some(Memo {
            deps,
            value: Rc::clone(&value),
        });
        Ok(value)
    }

    /// Run `effect` after this render is on screen, if `deps` changed.
    ///
    /// The effect may return a [`Cleanup`]; it runs before the effect's
    /// next run and when the session ends. Pass `()` as `deps` to run
    /// once on mount.
    pub fn use_effect<D, F>(&self, effect: F, deps: D) -> Result<(), HookError>
    where
        D: PartialEq + 'static,
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        let index = self.store.next_index("use_effect")?;
        let slot: Rc<RefCell<Option<D>>> =
            self.store
                .slot(index, "use_effect", || Rc::new(RefCell::new(None)))?;

        let changed = slot.borrow().as_ref() != Some(&deps);
        if changed {
            *slot.borrow_mut() = Some(deps);
            self.store.effects.queue(index, Box::new(effect));
        }
        Ok(())
    }

    /// Listen to key presses.
    ///
    /// The listener is attached once, after the first render; later
    /// renders only swap in the newest `handler`. All state changes made
    /// by one key press are batched into a single re-render.
    pub fn use_keypress<F>(&self, handler: F) -> Result<(), HookError>
    where
        F: FnMut(&KeyEvent, &mut LineEditor) -> PromptResult<()> + 'static,
    {
        let latest: Ref<Option<KeypressHandler>> = self.use_ref(|| None)?;
        latest.set(Some(Box::new(handler)));

        let store = Rc::downgrade(&self.store);
        self.use_effect(
            move || {
                let store = store.upgrade()?;
                let id = store.add_listener(latest);
                let store = Rc::downgrade(&store);
                Some(Box::new(move || {
                    if let Some(store) = store.upgrade() {
                        store.remove_listener(id);
                    }
                }) as Cleanup)
            },
            (),
        )
    }

    /// Current terminal width in columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.store.columns()
    }

    /// The session's line editor, for use outside keypress handlers.
    pub fn line_editor(&self) -> EditorHandle {
        EditorHandle {
            editor: Rc::downgrade(&self.store.editor),
        }
    }

    /// Coalesce the state changes made by `f` into one re-render.
    ///
    /// Keypress handlers and effects are already batched; use this from
    /// spawned tasks.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.store.batch(f)
    }
}

struct Memo<T, D> {
    deps: D,
    value: Rc<T>,
}

/// Handle to a state slot.
pub struct State<T> {
    cell: Rc<RefCell<T>>,
    store: Weak<HookStore>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            store: Weak::clone(&self.store),
        }
    }
}

impl<T: Clone> State<T> {
    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T> State<T> {
    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    fn live_store(&self) -> Option<Rc<HookStore>> {
        self.store.upgrade().filter(|store| store.is_open())
    }
}

impl<T: PartialEq> State<T> {
    /// Store `value` and request a re-render, unless it equals the
    /// current value. Ignored once the session has settled.
    pub fn set(&self, value: T) {
        let Some(store) = self.live_store() else {
            return;
        };
        {
            let mut current = self.cell.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        store.handle_change();
    }

    /// Set the value computed from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        self.set(next);
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("State").field(&self.cell.borrow()).finish()
    }
}

/// A stable mutable box, see [`Hooks::use_ref`].
///
/// Two `Ref`s are equal only if they are the same box, which makes a
/// `Ref` usable as an effect dependency that never changes.
pub struct Ref<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Ref<T> {
    /// A box outside any store. Inside a view, use [`Hooks::use_ref`].
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrite the value. Does not render.
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    /// Overwrite the value and return the old one.
    pub fn replace(&self, value: T) -> T {
        self.cell.replace(value)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    /// Mutate in place. `f` must not touch this `Ref` again.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }
}

impl<T: Clone> Ref<T> {
    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T: Default> Ref<T> {
    /// Take the value, leaving the default behind.
    pub fn take(&self) -> T {
        self.cell.take()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Eq for Ref<T> {}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&self.cell.borrow()).finish()
    }
}
