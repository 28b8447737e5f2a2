//! Viewport size and resize notifications from the host environment.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Width and height of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Handle returned by [`Viewport::subscribe`]. Dropping it unsubscribes.
pub struct ResizeSubscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl ResizeSubscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

/// Source of viewport size changes.
pub trait Viewport {
    /// The current size.
    fn size(&self) -> WindowSize;

    /// Call `listener` with the new size on every change.
    fn subscribe(&self, listener: Box<dyn Fn(WindowSize)>) -> ResizeSubscription;
}

type Listeners = RefCell<HashMap<usize, Rc<dyn Fn(WindowSize)>>>;

/// Viewport whose size is changed programmatically.
pub struct SimulatedViewport {
    size: Cell<WindowSize>,
    listeners: Rc<Listeners>,
    next_id: Cell<usize>,
}

impl SimulatedViewport {
    pub fn new(size: WindowSize) -> Self {
        Self {
            size: Cell::new(size),
            listeners: Rc::new(RefCell::new(HashMap::new())),
            next_id: Cell::new(0),
        }
    }

    /// Change the size and notify every subscriber.
    pub fn resize(&self, width: u32, height: u32) {
        let size = WindowSize::new(width, height);
        self.size.set(size);
        let listeners: Vec<_> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(size);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Viewport for SimulatedViewport {
    fn size(&self) -> WindowSize {
        self.size.get()
    }

    fn subscribe(&self, listener: Box<dyn Fn(WindowSize)>) -> ResizeSubscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(id, Rc::from(listener));

        let listeners: Weak<Listeners> = Rc::downgrade(&self.listeners);
        ResizeSubscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().remove(&id);
            }
        })
    }
}
