// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pagination overlay layout.
//!
//! ## Overview
//!
//! A [`PageLayout`] lays an ordered list of pageable items across a fixed list of reserved slots.
//! With `n` reserved slots, page `p` shows list indices `n*p .. n*p + n`, the `i`-th of them in
//! the `i`-th reserved slot.
//!
//! Two optional navigation items sit on non-reserved slots and are only visible when there is a
//! page to move to. Resolution of a slot on a given page follows a fixed priority:
//! next item, previous item, reserved slot, and finally the regular slot store.

use alloc::vec::Vec;

use crate::error::{ConfigurationError, MenuError, Result};
use crate::item::{Item, ItemId};

/// Direction of a page turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// One page forward.
    Next,
    /// One page back.
    Previous,
}

impl Step {
    /// Apply the step to `page`, staying inside `[0, page_count)`.
    pub fn apply(self, page: usize, page_count: usize) -> usize {
        match self {
            Self::Next => (page + 1).min(page_count.saturating_sub(1)),
            Self::Previous => page.saturating_sub(1),
        }
    }
}

pub(crate) struct NavItem<T: 'static> {
    pub(crate) slot: usize,
    pub(crate) item: Item<T>,
}

/// What a slot shows on a given page.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolved {
    Next,
    Previous,
    /// A pageable item, by list index.
    Pageable(usize),
    /// A reserved slot past the end of the list.
    Vacant,
    /// Not part of the overlay.
    Regular,
}

pub(crate) struct PageLayout<T: 'static> {
    reserved: Vec<usize>,
    pub(crate) items: Vec<Item<T>>,
    pub(crate) next: Option<NavItem<T>>,
    pub(crate) previous: Option<NavItem<T>>,
}

impl<T: 'static> PageLayout<T> {
    pub(crate) fn new(reserved: Vec<usize>, slot_count: usize) -> Result<Self> {
        if reserved.is_empty() {
            return Err(ConfigurationError::NoReservedSlots.into());
        }
        for (i, &slot) in reserved.iter().enumerate() {
            if slot >= slot_count {
                return Err(ConfigurationError::ReservedOutOfRange { slot, slot_count }.into());
            }
            if reserved[..i].contains(&slot) {
                return Err(ConfigurationError::DuplicateReservedSlot(slot).into());
            }
        }
        Ok(Self {
            reserved,
            items: Vec::new(),
            next: None,
            previous: None,
        })
    }

    pub(crate) fn reserved(&self) -> &[usize] {
        &self.reserved
    }

    pub(crate) fn is_reserved(&self, slot: usize) -> bool {
        self.reserved.contains(&slot)
    }

    /// Fail with [`MenuError::ReservedSlot`] if `slot` belongs to the overlay.
    pub(crate) fn check_unreserved(&self, slot: usize) -> Result<()> {
        if self.is_reserved(slot) {
            Err(MenuError::ReservedSlot { slot })
        } else {
            Ok(())
        }
    }

    pub(crate) fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.reserved.len()).max(1)
    }

    pub(crate) fn clamp(&self, page: usize) -> usize {
        page.min(self.page_count() - 1)
    }

    pub(crate) fn resolve(&self, slot: usize, page: usize) -> Resolved {
        if self.next.as_ref().is_some_and(|n| n.slot == slot) && self.page_count() > page + 1 {
            return Resolved::Next;
        }
        if self.previous.as_ref().is_some_and(|n| n.slot == slot) && page > 0 {
            return Resolved::Previous;
        }
        match self.reserved.iter().position(|s| *s == slot) {
            Some(i) => {
                let index = self.reserved.len() * page + i;
                if index < self.items.len() {
                    Resolved::Pageable(index)
                } else {
                    Resolved::Vacant
                }
            }
            None => Resolved::Regular,
        }
    }

    /// The page and slot at which list index `index` is shown.
    pub(crate) fn locate(&self, index: usize) -> (usize, usize) {
        let n = self.reserved.len();
        (index / n, self.reserved[index % n])
    }

    /// The slot where list index `index` appears when `page` is displayed.
    pub(crate) fn visible_slot(&self, index: usize, page: usize) -> Option<usize> {
        let (p, slot) = self.locate(index);
        (p == page).then_some(slot)
    }

    pub(crate) fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id() == id)
    }

    pub(crate) fn nav_mut(&mut self, step: Step) -> &mut Option<NavItem<T>> {
        match step {
            Step::Next => &mut self.next,
            Step::Previous => &mut self.previous,
        }
    }

    pub(crate) fn copy(&self) -> Self
    where
        T: Clone,
    {
        let copy_nav = |nav: &Option<NavItem<T>>| {
            nav.as_ref().map(|n| NavItem {
                slot: n.slot,
                item: n.item.copy(),
            })
        };
        Self {
            reserved: self.reserved.clone(),
            items: self.items.iter().map(Item::copy).collect(),
            next: copy_nav(&self.next),
            previous: copy_nav(&self.previous),
        }
    }
}
