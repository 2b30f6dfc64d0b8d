//! Per-request attribute bag.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A string-keyed bag of shared values.
///
/// An app carries a prototype bag configured at build time; every dispatch
/// receives its own shallow copy, so insertions and removals made by one
/// request's hooks never leak into another request. The copy is shallow:
/// `Clone` duplicates the map, not the values, so nested mutable state (an
/// `Arc<Mutex<_>>`, say) is shared by reference across copies.
#[derive(Clone, Default)]
pub struct Attributes {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Attributes {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same key.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Insert an already-shared value under a key.
    pub fn set_shared(&mut self, key: impl Into<String>, value: Arc<dyn Any + Send + Sync>) {
        self.values.insert(key.into(), value);
    }

    /// Look up a value by key and concrete type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Look up a value by key, keeping the shared handle.
    pub fn get_shared<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.values
            .get(key)
            .and_then(|v| Arc::clone(v).downcast::<T>().ok())
    }

    /// Remove a value by key.
    pub fn remove(&mut self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.values.remove(key)
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries in the bag.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
