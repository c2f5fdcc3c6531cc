// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded slot-to-item mapping.

use alloc::collections::BTreeMap;

use crate::error::{MenuError, Result};
use crate::item::Item;

/// Items keyed by slot, bounded by the menu's slot count.
///
/// The store only maintains the mapping; propagating changes to views is the caller's job.
pub struct SlotStore<T: 'static> {
    slot_count: usize,
    items: BTreeMap<usize, Item<T>>,
}

impl<T: 'static> core::fmt::Debug for SlotStore<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotStore")
            .field("slot_count", &self.slot_count)
            .field("occupied", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> SlotStore<T> {
    /// An empty store with `slot_count` slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            items: BTreeMap::new(),
        }
    }

    /// Number of addressable slots.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Fail with [`MenuError::OutOfRange`] unless `slot` is addressable.
    pub fn check(&self, slot: usize) -> Result<()> {
        if slot < self.slot_count {
            Ok(())
        } else {
            Err(MenuError::OutOfRange {
                slot,
                slot_count: self.slot_count,
            })
        }
    }

    /// Place `item` at `slot`, returning the previous occupant.
    pub fn put(&mut self, slot: usize, item: Item<T>) -> Result<Option<Item<T>>> {
        self.check(slot)?;
        Ok(self.items.insert(slot, item))
    }

    /// Empty `slot`, returning its occupant.
    pub fn remove(&mut self, slot: usize) -> Result<Option<Item<T>>> {
        self.check(slot)?;
        Ok(self.items.remove(&slot))
    }

    /// The item at `slot`.
    pub fn get(&self, slot: usize) -> Option<&Item<T>> {
        self.items.get(&slot)
    }

    /// Mutable access to the item at `slot`.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Item<T>> {
        self.items.get_mut(&slot)
    }

    /// Whether `slot` holds an item.
    pub fn contains(&self, slot: usize) -> bool {
        self.items.contains_key(&slot)
    }

    /// Occupied slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Item<T>)> + '_ {
        self.items.iter().map(|(s, i)| (*s, i))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Item<T>)> + '_ {
        self.items.iter_mut().map(|(s, i)| (*s, i))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn copy(&self) -> Self
    where
        T: Clone,
    {
        Self {
            slot_count: self.slot_count,
            items: self.items.iter().map(|(s, i)| (*s, i.copy())).collect(),
        }
    }
}
