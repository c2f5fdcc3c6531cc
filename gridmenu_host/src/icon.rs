// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque display values.

use alloc::rc::Rc;

/// An opaque display value placed into view cells.
///
/// Cloning an `Icon` is cheap and preserves identity: both handles point at the same value and
/// [`Icon::same`] returns `true`. Use [`Icon::deep_copy`] for an independent value with a new
/// identity.
///
/// Identity (not equality) is what the menu engine uses to decide whether a cell write is a
/// no-op, so two icons built from equal payloads are still written.
pub struct Icon<T>(Rc<T>);

impl<T> Icon<T> {
    /// Wrap a payload into a fresh icon identity.
    pub fn new(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrow the payload.
    pub fn get(&self) -> &T {
        &self.0
    }

    /// Whether both handles refer to the same icon.
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Clone the payload into a new, unrelated icon.
    pub fn deep_copy(&self) -> Self
    where
        T: Clone,
    {
        Self::new(T::clone(&self.0))
    }
}

impl<T> Clone for Icon<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> AsRef<T> for Icon<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Icon<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Icon").field(&*self.0).finish()
    }
}
