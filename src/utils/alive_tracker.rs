//! Utilities to track object's life cycle

use std::cell::Cell;

/// Util to track protocol object's life time
///
/// Objects only live on the thread of their display, so the flag is a plain [`Cell`].
#[derive(Debug)]
pub struct AliveTracker {
    is_alive: Cell<bool>,
}

impl Default for AliveTracker {
    fn default() -> Self {
        Self {
            is_alive: Cell::new(true),
        }
    }
}

impl AliveTracker {
    /// Notify the tracker that object is dead
    ///
    /// Returns `true` if the object was alive until now.
    pub fn destroy_notify(&self) -> bool {
        self.is_alive.replace(false)
    }

    /// Check if object is alive
    #[inline]
    pub fn alive(&self) -> bool {
        self.is_alive.get()
    }
}

/// Trait that is implemented on protocol objects and handles tracked by this crate
pub trait IsAlive {
    /// Check if object is alive
    fn alive(&self) -> bool;
}

impl<T: IsAlive> IsAlive for &T {
    #[inline]
    fn alive(&self) -> bool {
        IsAlive::alive(*self)
    }
}

impl<T: IsAlive> IsAlive for Option<T> {
    #[inline]
    fn alive(&self) -> bool {
        self.as_ref().map(IsAlive::alive).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::AliveTracker;

    #[test]
    fn destroy_notify_once() {
        let tracker = AliveTracker::default();
        assert!(tracker.alive());
        assert!(tracker.destroy_notify());
        assert!(!tracker.destroy_notify());
        assert!(!tracker.alive());
    }
}
