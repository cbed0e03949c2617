//! Various utilities used for user data implementations

use std::any::Any;
use std::fmt;

use appendlist::AppendList;

/// A storage able to store several values of different types.
/// It behaves similarly to a `TypeMap`.
///
/// Values can only be appended, never removed, which is what allows handing out
/// plain references from a shared `&self`. Use interior mutability inside the stored
/// values to change them later.
pub struct UserDataMap {
    list: AppendList<Box<dyn Any>>,
}

impl fmt::Debug for UserDataMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDataMap")
            .field("len", &self.list.len())
            .finish_non_exhaustive()
    }
}

impl UserDataMap {
    /// Create a new map
    pub fn new() -> UserDataMap {
        UserDataMap {
            list: AppendList::new(),
        }
    }

    /// Attempt to access the wrapped user data of a given type
    ///
    /// Will return `None` if no value of type `T` is stored in this `UserDataMap`
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.list.iter().find_map(|data| data.downcast_ref::<T>())
    }

    /// Access the user data of a given type, initializing it if required.
    pub fn get_or_insert<T: 'static, F: FnOnce() -> T>(&self, init: F) -> &T {
        if let Some(index) = self.position::<T>() {
            return self.at(index);
        }
        self.list.push(Box::new(init()));
        self.at(self.list.len() - 1)
    }

    /// Insert a value in the map if it is not already there
    ///
    /// If the value does not already exists, the closure is called to create it and
    /// this function returns `true`. If the value already exists, the closure is not
    /// called, and this function returns `false`.
    pub fn insert_if_missing<T: 'static, F: FnOnce() -> T>(&self, init: F) -> bool {
        if self.get::<T>().is_some() {
            return false;
        }
        self.list.push(Box::new(init()));
        true
    }

    fn position<T: 'static>(&self) -> Option<usize> {
        self.list.iter().position(|data| data.is::<T>())
    }

    fn at<T: 'static>(&self, index: usize) -> &T {
        match self.list.get(index).and_then(|data| data.downcast_ref::<T>()) {
            Some(data) => data,
            None => unreachable!("user data at a known index changed type"),
        }
    }
}

impl Default for UserDataMap {
    fn default() -> UserDataMap {
        UserDataMap::new()
    }
}
