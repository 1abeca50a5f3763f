//! An observable state container.
//!
//! [`Store`] is a small publish/subscribe cell: the search client writes the
//! latest request/response state into it, and subscribers (the aggregation
//! controller, the rendering layer) are notified synchronously, in
//! subscription order, on every change. Unsubscription is a disposer returned
//! from [`Store::subscribe`].
//!
//! The store is single-threaded by design. Handles are cheap clones sharing
//! the same cell, which is how a subscriber closure can read the store it is
//! subscribed to without aliasing trouble: listeners receive a snapshot of the
//! state, never a live borrow.

use std::{
    cell::RefCell,
    mem,
    rc::{Rc, Weak},
};

/// A listener callback paired with its registration id.
type ListenerEntry<S> = (u64, Box<dyn FnMut(&S)>);

/// Listener bookkeeping shared between a store and its subscriptions.
struct ListenerSet<S> {
    /// Next registration id to hand out.
    next_id: u64,
    /// Live listeners in subscription order.
    entries: Vec<ListenerEntry<S>>,
    /// Ids disposed while a dispatch was in flight; swept after dispatch.
    disposed: Vec<u64>,
}

/// A single-threaded observable state container.
///
/// Cloning a `Store` clones a handle to the same underlying cell.
pub struct Store<S> {
    /// The current state.
    state: Rc<RefCell<S>>,
    /// Registered listeners.
    listeners: Rc<RefCell<ListenerSet<S>>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<S: Clone> Store<S> {
    /// Creates a store holding `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            state: Rc::new(RefCell::new(initial)),
            listeners: Rc::new(RefCell::new(ListenerSet {
                next_id: 0,
                entries: Vec::new(),
                disposed: Vec::new(),
            })),
        }
    }

    /// Returns a clone of the current state.
    pub fn get(&self) -> S {
        self.state.borrow().clone()
    }

    /// Runs `f` against a borrow of the current state.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Replaces the state and notifies all listeners.
    pub fn set(&self, state: S) {
        *self.state.borrow_mut() = state;
        self.notify();
    }

    /// Mutates the state in place and notifies all listeners.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        f(&mut self.state.borrow_mut());
        self.notify();
    }

    /// Registers a listener, returning its disposer.
    ///
    /// Listeners run synchronously on every `set`/`update`, in subscription
    /// order. Dropping the returned [`Subscription`] (or calling
    /// [`Subscription::dispose`]) removes the listener; removal during a
    /// dispatch takes effect from the next notification.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl FnMut(&S) + 'static) -> Subscription<S> {
        let mut set = self.listeners.borrow_mut();
        let id = set.next_id;
        set.next_id += 1;
        set.entries.push((id, Box::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Dispatches the current state to every listener.
    ///
    /// Listeners are moved out of the cell for the duration of the dispatch so
    /// a callback may re-enter the store (read state, subscribe, dispose)
    /// without a borrow conflict.
    fn notify(&self) {
        let snapshot = self.state.borrow().clone();
        let mut entries = mem::take(&mut self.listeners.borrow_mut().entries);
        for (_, listener) in &mut entries {
            listener(&snapshot);
        }
        let mut set = self.listeners.borrow_mut();
        // Subscriptions added during dispatch landed in the cell; keep them
        // after the originals to preserve registration order.
        let added = mem::take(&mut set.entries);
        entries.extend(added);
        let disposed = mem::take(&mut set.disposed);
        entries.retain(|(id, _)| !disposed.contains(id));
        set.entries = entries;
    }
}

/// Disposer for a store listener.
///
/// Unsubscribes on [`Self::dispose`] or on drop. Outliving the store is fine;
/// disposing after the store is gone is a no-op.
pub struct Subscription<S> {
    /// Registration id of the listener this subscription controls.
    id: u64,
    /// Weak handle to the listener set, so a subscription never keeps a
    /// dropped store alive.
    listeners: Weak<RefCell<ListenerSet<S>>>,
}

impl<S> Subscription<S> {
    /// Removes the listener from the store.
    pub fn dispose(self) {
        // Drop does the work.
    }

    /// Shared removal logic for dispose-by-value and drop.
    fn remove(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut set = listeners.borrow_mut();
            set.entries.retain(|(id, _)| *id != self.id);
            // If a dispatch is in flight our entry is moved out; the sweep
            // after dispatch honors this marker.
            set.disposed.push(self.id);
        }
    }
}

impl<S> Drop for Subscription<S> {
    fn drop(&mut self) {
        self.remove();
    }
}
