//! Present-or-absent capability lookup.
//!
//! Some host capabilities are tied to a context that can disappear while the
//! core keeps running (the application context is torn down, the foreground
//! window is detached for a configuration change, ...). Instead of chasing a
//! nullable back-reference at use time, the core holds a [`CapabilitySlot`]
//! and asks it for the capability on every call. The absent case is part of
//! the return type, so every call site has to decide how to degrade.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared, swappable handle to an optional capability.
///
/// Clones share the same slot: installing or clearing through one clone is
/// observed by all of them.
pub struct CapabilitySlot<T: ?Sized> {
    inner: Arc<RwLock<Option<Arc<T>>>>,
}

impl<T: ?Sized> CapabilitySlot<T> {
    /// Create an empty slot.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a slot that already holds `capability`.
    pub fn with(capability: Arc<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(capability))),
        }
    }

    /// Create a slot from an optional capability.
    pub fn from_option(capability: Option<Arc<T>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(capability)),
        }
    }

    /// Install (or replace) the capability.
    pub fn install(&self, capability: Arc<T>) {
        *self.inner.write() = Some(capability);
    }

    /// Remove the capability, returning the previous one if any.
    pub fn clear(&self) -> Option<Arc<T>> {
        self.inner.write().take()
    }

    /// Look the capability up. The returned handle stays valid even if the
    /// slot is cleared while it is in use.
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.read().clone()
    }

    pub fn is_available(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl<T: ?Sized> Clone for CapabilitySlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ?Sized> Default for CapabilitySlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> fmt::Debug for CapabilitySlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySlot")
            .field("available", &self.is_available())
            .finish()
    }
}
