// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-view instance state and its generational arena.
//!
//! A menu always has one root instance. Pageable menus add a mirror instance whenever an
//! observer opens the menu while the root is taken; each mirror has its own view, viewers and
//! page, and reads content from the shared menu state.
//!
//! ## Identity
//!
//! - [`InstanceId`] is `(index, generation)`.
//! - The generation increments when a freed entry is reused, so stale ids resolve to `None`.
//! - The root is stored outside the arena and is never freed.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use gridmenu_host::{View, ViewId, ViewerId};

use crate::pending::Pending;

/// Identifier of an instance (generational).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct InstanceId(usize, u32);

impl InstanceId {
    pub(crate) const ROOT: Self = Self(0, 0);

    /// Index into the mirror entries; `None` for the root.
    fn mirror_idx(self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

pub(crate) struct Instance<T: 'static> {
    mirror: bool,
    pub(crate) view: Option<Box<dyn View<T>>>,
    pub(crate) viewers: BTreeSet<ViewerId>,
    /// Viewers whose open is scheduled but has not run yet.
    pub(crate) opening: BTreeSet<ViewerId>,
    /// Changes recorded while nobody was looking.
    pub(crate) pending: Pending,
    /// Changes accepted for the next flush while somebody is looking.
    pub(crate) queued: Pending,
    pub(crate) flush_scheduled: bool,
    pub(crate) page: usize,
    pub(crate) nav_locked: bool,
}

impl<T: 'static> Instance<T> {
    fn new(mirror: bool, page: usize) -> Self {
        Self {
            mirror,
            view: None,
            viewers: BTreeSet::new(),
            opening: BTreeSet::new(),
            pending: Pending::Clean,
            queued: Pending::Clean,
            flush_scheduled: false,
            page,
            nav_locked: false,
        }
    }

    pub(crate) fn mirror(page: usize) -> Self {
        Self::new(true, page)
    }

    pub(crate) fn is_mirror(&self) -> bool {
        self.mirror
    }

    pub(crate) fn observed(&self) -> bool {
        !self.viewers.is_empty()
    }

    /// Taken from the moment an open is requested until the last viewer leaves.
    pub(crate) fn is_claimed(&self) -> bool {
        !self.viewers.is_empty() || !self.opening.is_empty()
    }

    pub(crate) fn knows(&self, viewer: ViewerId) -> bool {
        self.viewers.contains(&viewer) || self.opening.contains(&viewer)
    }

    pub(crate) fn view_id(&self) -> Option<ViewId> {
        self.view.as_ref().map(|v| v.id())
    }
}

/// The root instance plus a generational arena of mirrors.
pub(crate) struct Arena<T: 'static> {
    root: Instance<T>,
    entries: Vec<Option<(u32, Instance<T>)>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// Live mirrors in creation order.
    mirrors: Vec<InstanceId>,
}

impl<T: 'static> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            root: Instance::new(false, 0),
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            mirrors: Vec::new(),
        }
    }

    pub(crate) fn root(&self) -> &Instance<T> {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Instance<T> {
        &mut self.root
    }

    pub(crate) fn insert(&mut self, instance: Instance<T>) -> InstanceId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some((generation, instance));
            (idx, generation)
        } else {
            self.entries.push(Some((1, instance)));
            self.generations.push(1);
            (self.entries.len() - 1, 1)
        };
        let id = InstanceId(idx + 1, generation);
        self.mirrors.push(id);
        id
    }

    /// Free a mirror. The root cannot be removed.
    pub(crate) fn remove(&mut self, id: InstanceId) -> Option<Instance<T>> {
        let idx = id.mirror_idx()?;
        match self.entries.get(idx) {
            Some(Some((generation, _))) if *generation == id.1 => {}
            _ => return None,
        }
        let (_, instance) = self.entries[idx].take()?;
        self.free_list.push(idx);
        self.mirrors.retain(|m| *m != id);
        Some(instance)
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&Instance<T>> {
        let Some(idx) = id.mirror_idx() else {
            return Some(&self.root);
        };
        match self.entries.get(idx) {
            Some(Some((generation, instance))) if *generation == id.1 => Some(instance),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance<T>> {
        let Some(idx) = id.mirror_idx() else {
            return Some(&mut self.root);
        };
        match self.entries.get_mut(idx) {
            Some(Some((generation, instance))) if *generation == id.1 => Some(instance),
            _ => None,
        }
    }

    /// Root first, then mirrors in creation order.
    pub(crate) fn ids(&self) -> Vec<InstanceId> {
        let mut ids = alloc::vec![InstanceId::ROOT];
        ids.extend_from_slice(&self.mirrors);
        ids
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (InstanceId, &Instance<T>)> + '_ {
        core::iter::once((InstanceId::ROOT, &self.root)).chain(
            self.mirrors
                .iter()
                .filter_map(|id| self.get(*id).map(|inst| (*id, inst))),
        )
    }

    pub(crate) fn mirror_count(&self) -> usize {
        self.mirrors.len()
    }

    /// The instance a viewer is on, or about to be on.
    pub(crate) fn find_viewer(&self, viewer: ViewerId) -> Option<InstanceId> {
        self.iter().find(|(_, i)| i.knows(viewer)).map(|(id, _)| id)
    }

    pub(crate) fn find_view(&self, view: ViewId) -> Option<InstanceId> {
        self.iter()
            .find(|(_, i)| i.view_id() == Some(view))
            .map(|(id, _)| id)
    }

    pub(crate) fn has_viewers(&self) -> bool {
        self.iter().any(|(_, i)| i.observed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_fixed() {
        let mut arena: Arena<u8> = Arena::new();
        assert!(arena.get(InstanceId::ROOT).is_some());
        assert!(arena.remove(InstanceId::ROOT).is_none());
        assert_eq!(arena.ids(), alloc::vec![InstanceId::ROOT]);
    }

    #[test]
    fn mirrors_are_tracked_by_the_root() {
        let mut arena: Arena<u8> = Arena::new();
        let a = arena.insert(Instance::mirror(1));
        let b = arena.insert(Instance::mirror(2));
        assert_eq!(arena.mirror_count(), 2);
        assert_eq!(arena.ids(), alloc::vec![InstanceId::ROOT, a, b]);
        assert!(arena.remove(a).is_some_and(|m| m.is_mirror() && m.page == 1));
        assert_eq!(arena.ids(), alloc::vec![InstanceId::ROOT, b]);
    }

    #[test]
    fn stale_ids_do_not_resolve_after_reuse() {
        let mut arena: Arena<u8> = Arena::new();
        let a = arena.insert(Instance::mirror(0));
        arena.remove(a);
        let b = arena.insert(Instance::mirror(3));
        assert_eq!(a.0, b.0);
        assert!(b.1 > a.1, "generation must increase on reuse");
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.get(b).map(|m| m.page), Some(3));
    }

    #[test]
    fn viewers_are_found_while_opening() {
        let mut arena: Arena<u8> = Arena::new();
        let m = arena.insert(Instance::mirror(0));
        arena.get_mut(m).unwrap().opening.insert(ViewerId(4));
        assert_eq!(arena.find_viewer(ViewerId(4)), Some(m));
        assert!(arena.get(m).unwrap().is_claimed());
        assert!(!arena.has_viewers(), "pending opens are not viewers yet");
    }
}
