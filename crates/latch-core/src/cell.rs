//! State cells: the mutable values behind every stateful primitive.
//!
//! A [`StateCell`] holds two copies of its value:
//!
//! - the **latest** value, which every write updates immediately, and
//! - the **rendered** value, a snapshot taken when a render pass of the owning
//!   component starts.
//!
//! Component code reads the rendered value with [`StateCell::get`], so a render
//! pass never observes a write that happened in the middle of it. Writes made
//! with [`StateCell::update`] see the latest value, which is what makes several
//! writes in one batch compose left-to-right:
//!
//! ```ignore
//! let count = StateCell::new(0);
//! count.update(|n| n + 1);
//! count.update(|n| n + 1);
//! assert_eq!(count.latest(), 2);
//! ```
//!
//! Every write bumps the cell's version and marks the owning root dirty, which
//! is how the host learns that a re-render is required.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tokio::sync::Notify;

use crate::hooks::SlotHooks;

// ============================================================================
// Invalidation
// ============================================================================

/// Dirty flag shared between a root and the cells it owns.
pub(crate) struct Invalidator {
    dirty: Cell<bool>,
    notify: Notify,
}

impl Invalidator {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            dirty: Cell::new(false),
            notify: Notify::new(),
        })
    }

    pub(crate) fn invalidate(&self) {
        self.dirty.set(true);
        self.notify.notify_one();
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Returns whether the flag was set, clearing it.
    pub(crate) fn take(&self) -> bool {
        self.dirty.replace(false)
    }

    pub(crate) async fn changed(&self) {
        self.notify.notified().await;
    }
}

// ============================================================================
// StateUpdate
// ============================================================================

/// A write to a [`StateCell`]: either a replacement value or a function of the
/// previous value.
pub enum StateUpdate<T> {
    /// Replace the value.
    Replace(T),
    /// Compute the next value from the latest one.
    Apply(Box<dyn FnOnce(&T) -> T>),
}

impl<T> StateUpdate<T> {
    /// Build an updater from a function of the previous value.
    pub fn with(f: impl FnOnce(&T) -> T + 'static) -> Self {
        StateUpdate::Apply(Box::new(f))
    }

    /// Apply this update to `previous`.
    pub fn apply(self, previous: &T) -> T {
        match self {
            StateUpdate::Replace(value) => value,
            StateUpdate::Apply(f) => f(previous),
        }
    }
}

impl<T> From<T> for StateUpdate<T> {
    fn from(value: T) -> Self {
        StateUpdate::Replace(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for StateUpdate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateUpdate::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            StateUpdate::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

// ============================================================================
// StateCell
// ============================================================================

/// A single mutable value owned by one primitive.
///
/// Cloning a cell yields another handle to the same value, which is how
/// setters are moved into event handlers and async tasks.
pub struct StateCell<T> {
    inner: Rc<CellInner<T>>,
}

struct CellInner<T> {
    latest: RefCell<T>,
    rendered: RefCell<T>,
    version: Cell<u64>,
    owner: Weak<Invalidator>,
    /// Detached cells have no render passes, so reads see the latest value.
    attached: bool,
}

impl<T: Clone> StateCell<T> {
    /// Create a detached cell that is not owned by any root.
    pub fn new(value: T) -> Self {
        Self::build(value, Weak::new(), false)
    }

    /// Create a detached cell, computing the initial value once.
    pub fn new_lazy(init: impl FnOnce() -> T) -> Self {
        Self::new(init())
    }

    pub(crate) fn owned(value: T, owner: &Rc<Invalidator>) -> Self {
        Self::build(value, Rc::downgrade(owner), true)
    }

    fn build(value: T, owner: Weak<Invalidator>, attached: bool) -> Self {
        Self {
            inner: Rc::new(CellInner {
                latest: RefCell::new(value.clone()),
                rendered: RefCell::new(value),
                version: Cell::new(0),
                owner,
                attached,
            }),
        }
    }

    /// The value as of the start of the current render pass.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// The value including every write made so far.
    ///
    /// Event handlers and async tasks should use this (or [`update`]) rather
    /// than a value captured during render.
    ///
    /// [`update`]: StateCell::update
    pub fn latest(&self) -> T {
        self.inner.latest.borrow().clone()
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        self.write(StateUpdate::Replace(value));
    }

    /// Compute the next value from the latest one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&*self.inner.latest.borrow());
        self.commit(next);
    }

    /// Apply a literal or functional update.
    pub fn write(&self, update: impl Into<StateUpdate<T>>) {
        match update.into() {
            StateUpdate::Replace(value) => self.commit(value),
            StateUpdate::Apply(f) => self.update(f),
        }
    }

    fn commit(&self, next: T) {
        if !self.inner.attached {
            *self.inner.rendered.borrow_mut() = next.clone();
        }
        *self.inner.latest.borrow_mut() = next;
        self.inner.version.set(self.inner.version.get() + 1);

        if let Some(owner) = self.inner.owner.upgrade() {
            owner.invalidate();
        }
    }

    /// Take the render-pass snapshot.
    pub(crate) fn snapshot(&self) {
        let latest = self.inner.latest.borrow().clone();
        *self.inner.rendered.borrow_mut() = latest;
    }
}

impl<T> StateCell<T> {
    /// Borrow the render-pass value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.rendered.borrow())
    }

    /// Number of writes applied to this cell.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }
}

impl<T: Clone + 'static> SlotHooks for StateCell<T> {
    fn begin_pass(&self) {
        self.snapshot();
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.inner.rendered.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_fold_left_over_latest_value() {
        let cell = StateCell::new(1);
        cell.write(5);
        cell.write(StateUpdate::with(|n| n + 1));
        cell.update(|n| n * 3);
        cell.write(StateUpdate::with(|n| n - 2));

        assert_eq!(cell.latest(), 16);
        assert_eq!(cell.version(), 4);
    }

    #[test]
    fn lazy_initializer_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let cell = StateCell::new_lazy(move || {
            calls_clone.set(calls_clone.get() + 1);
            "expensive".to_string()
        });

        cell.set("cheap".to_string());
        assert_eq!(cell.get(), "cheap");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn owned_cell_hides_writes_until_next_pass() {
        let owner = Invalidator::new();
        let cell = StateCell::owned(10, &owner);

        cell.update(|n| n + 1);
        assert_eq!(cell.get(), 10);
        assert_eq!(cell.latest(), 11);
        assert!(owner.is_dirty());

        cell.snapshot();
        assert_eq!(cell.get(), 11);
    }

    #[test]
    fn write_after_owner_dropped_is_harmless() {
        let owner = Invalidator::new();
        let cell = StateCell::owned(0, &owner);
        drop(owner);

        cell.set(3);
        assert_eq!(cell.latest(), 3);
    }

    #[test]
    fn invalidator_take_clears_flag() {
        let owner = Invalidator::new();
        owner.invalidate();
        assert!(owner.take());
        assert!(!owner.take());
    }
}
