//! Owned callback registry.
//!
//! Every notification in the crate goes through a `Listeners<E>`: callers
//! subscribe and get a [`ListenerId`] back, and must hand that id to
//! `unsubscribe` to release the callback. Nothing is weakly referenced.

use std::fmt;

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

type Callback<E> = Box<dyn FnMut(&E)>;

/// A list of callbacks receiving events of type `E`.
///
/// Callbacks run in subscription order.
///
/// # Examples
///
/// ```rust
/// use statforge::listeners::Listeners;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0.0));
/// let mut listeners: Listeners<f64> = Listeners::new();
///
/// let sink = Rc::clone(&seen);
/// let id = listeners.subscribe(move |value| sink.set(*value));
/// listeners.emit(&42.0);
/// assert_eq!(seen.get(), 42.0);
///
/// assert!(listeners.unsubscribe(id));
/// assert!(listeners.is_empty());
/// ```
pub struct Listeners<E> {
    next_id: u64,
    entries: Vec<(ListenerId, Callback<E>)>,
}

impl<E> Listeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register a callback and return its handle.
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Release a callback. Returns `false` if the handle was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Invoke every callback with `event`.
    pub fn emit(&mut self, event: &E) {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every callback.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
