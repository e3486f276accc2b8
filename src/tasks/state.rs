//! # Carry state for repeat/wait loops.
//!
//! [`StateSlot`] is a shared, optional value. The repeat and wait combinators
//! hand the same slot to every condition and task invocation, so a value written
//! by one iteration is what the next iteration reads.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared optional carry-state value.
///
/// Cloning the slot clones the handle, not the value.
pub struct StateSlot<S> {
    inner: Arc<Mutex<Option<S>>>,
}

impl<S> StateSlot<S> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a slot holding `value`.
    pub fn with(value: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(value))),
        }
    }

    /// Replaces the value.
    pub fn set(&self, value: S) {
        *self.inner.lock() = Some(value);
    }

    /// Removes and returns the value.
    pub fn take(&self) -> Option<S> {
        self.inner.lock().take()
    }

    /// True if a value is present.
    pub fn is_set(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Runs `f` with mutable access to the slot.
    pub fn update<R>(&self, f: impl FnOnce(&mut Option<S>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<S: Clone> StateSlot<S> {
    /// Returns a snapshot of the value.
    pub fn get(&self) -> Option<S> {
        self.inner.lock().clone()
    }
}

impl<S> Clone for StateSlot<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Default for StateSlot<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for StateSlot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateSlot").field(&*self.inner.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let a: StateSlot<i32> = StateSlot::new();
        let b = a.clone();
        assert!(!b.is_set());

        a.set(3);
        assert_eq!(b.get(), Some(3));

        let doubled = b.update(|v| {
            *v = v.map(|x| x * 2);
            *v
        });
        assert_eq!(doubled, Some(6));
        assert_eq!(a.take(), Some(6));
        assert!(!b.is_set());
    }
}
