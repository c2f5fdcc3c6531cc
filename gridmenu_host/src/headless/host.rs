// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless views with a write log.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::host::{Host, View};
use crate::icon::Icon;
use crate::types::{ViewId, ViewerId};

/// One recorded write against a headless view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewWrite {
    /// A cell received an icon.
    Set {
        /// Target view.
        view: ViewId,
        /// Target cell.
        slot: usize,
    },
    /// A cell was emptied.
    Clear {
        /// Target view.
        view: ViewId,
        /// Target cell.
        slot: usize,
    },
}

impl ViewWrite {
    /// The view this write touched.
    pub fn view(&self) -> ViewId {
        match *self {
            Self::Set { view, .. } | Self::Clear { view, .. } => view,
        }
    }

    /// The cell this write touched.
    pub fn slot(&self) -> usize {
        match *self {
            Self::Set { slot, .. } | Self::Clear { slot, .. } => slot,
        }
    }
}

struct ViewRecord<T> {
    title: String,
    cells: Vec<Option<Icon<T>>>,
}

struct HostState<T> {
    next_view: u64,
    views: BTreeMap<ViewId, ViewRecord<T>>,
    writes: Vec<ViewWrite>,
    shown: Vec<(ViewerId, ViewId)>,
}

/// An in-memory [`Host`].
///
/// Every view it creates shares the host's state, so the host can be inspected after the views
/// have been handed to a menu.
pub struct HeadlessHost<T> {
    state: Rc<RefCell<HostState<T>>>,
}

impl<T> core::fmt::Debug for HeadlessHost<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessHost")
            .field("views", &state.views.len())
            .field("writes", &state.writes.len())
            .field("shown", &state.shown.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for HeadlessHost<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HeadlessHost<T> {
    /// Create a host with no views.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                next_view: 1,
                views: BTreeMap::new(),
                writes: Vec::new(),
                shown: Vec::new(),
            })),
        }
    }

    /// Number of views created so far.
    pub fn view_count(&self) -> usize {
        self.state.borrow().views.len()
    }

    /// Title the view was created with.
    pub fn title(&self, view: ViewId) -> Option<String> {
        self.state.borrow().views.get(&view).map(|v| v.title.clone())
    }

    /// Icon currently in a cell.
    pub fn cell(&self, view: ViewId, slot: usize) -> Option<Icon<T>> {
        self.state
            .borrow()
            .views
            .get(&view)
            .and_then(|v| v.cells.get(slot).cloned().flatten())
    }

    /// Slots of `view` that currently hold an icon, ascending.
    pub fn occupied(&self, view: ViewId) -> Vec<usize> {
        self.state
            .borrow()
            .views
            .get(&view)
            .map(|v| {
                v.cells
                    .iter()
                    .enumerate()
                    .filter_map(|(i, c)| c.as_ref().map(|_| i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All writes recorded since creation or the last [`take_writes`](Self::take_writes).
    pub fn writes(&self) -> Vec<ViewWrite> {
        self.state.borrow().writes.clone()
    }

    /// Drain the write log.
    pub fn take_writes(&self) -> Vec<ViewWrite> {
        core::mem::take(&mut self.state.borrow_mut().writes)
    }

    /// Number of writes recorded against `view`.
    pub fn write_count(&self, view: ViewId) -> usize {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|w| w.view() == view)
            .count()
    }

    /// Every `show` call in order.
    pub fn shown(&self) -> Vec<(ViewerId, ViewId)> {
        self.state.borrow().shown.clone()
    }

    /// The view most recently shown to `viewer`.
    pub fn showing(&self, viewer: ViewerId) -> Option<ViewId> {
        self.state
            .borrow()
            .shown
            .iter()
            .rev()
            .find(|(v, _)| *v == viewer)
            .map(|(_, view)| *view)
    }
}

impl<T: 'static> Host<T> for HeadlessHost<T> {
    fn create_view(&self, rows: u8, title: &str) -> Box<dyn View<T>> {
        let mut state = self.state.borrow_mut();
        let id = ViewId(state.next_view);
        state.next_view += 1;
        let size = usize::from(rows) * 9;
        state.views.insert(
            id,
            ViewRecord {
                title: title.to_string(),
                cells: vec![None; size],
            },
        );
        Box::new(HeadlessView {
            id,
            size,
            state: Rc::clone(&self.state),
        })
    }

    fn show(&self, viewer: ViewerId, view: ViewId) {
        self.state.borrow_mut().shown.push((viewer, view));
    }
}

/// A view created by [`HeadlessHost`].
pub struct HeadlessView<T> {
    id: ViewId,
    size: usize,
    state: Rc<RefCell<HostState<T>>>,
}

impl<T> core::fmt::Debug for HeadlessView<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeadlessView")
            .field("id", &self.id)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<T> View<T> for HeadlessView<T> {
    fn id(&self) -> ViewId {
        self.id
    }

    fn size(&self) -> usize {
        self.size
    }

    fn set_cell(&mut self, slot: usize, icon: Icon<T>) {
        if slot >= self.size {
            return;
        }
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.views.get_mut(&self.id) {
            record.cells[slot] = Some(icon);
        }
        state.writes.push(ViewWrite::Set {
            view: self.id,
            slot,
        });
    }

    fn clear_cell(&mut self, slot: usize) {
        if slot >= self.size {
            return;
        }
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.views.get_mut(&self.id) {
            record.cells[slot] = None;
        }
        state.writes.push(ViewWrite::Clear {
            view: self.id,
            slot,
        });
    }

    fn cell(&self, slot: usize) -> Option<Icon<T>> {
        self.state
            .borrow()
            .views
            .get(&self.id)
            .and_then(|v| v.cells.get(slot).cloned().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_get_distinct_ids_and_sizes() {
        let host: HeadlessHost<u8> = HeadlessHost::new();
        let a = host.create_view(1, "a");
        let b = host.create_view(6, "b");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.size(), 9);
        assert_eq!(b.size(), 54);
        assert_eq!(host.view_count(), 2);
        assert_eq!(host.title(b.id()).as_deref(), Some("b"));
    }

    #[test]
    fn writes_are_logged_and_visible_through_host() {
        let host: HeadlessHost<u8> = HeadlessHost::new();
        let mut view = host.create_view(1, "t");
        let icon = Icon::new(9);
        view.set_cell(2, icon.clone());
        assert!(host.cell(view.id(), 2).is_some_and(|i| i.same(&icon)));
        assert_eq!(host.occupied(view.id()), vec![2]);
        view.clear_cell(2);
        assert!(view.cell(2).is_none());
        assert_eq!(
            host.take_writes(),
            vec![
                ViewWrite::Set {
                    view: view.id(),
                    slot: 2
                },
                ViewWrite::Clear {
                    view: view.id(),
                    slot: 2
                },
            ]
        );
        assert!(host.writes().is_empty());
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let host: HeadlessHost<u8> = HeadlessHost::new();
        let mut view = host.create_view(1, "t");
        view.set_cell(9, Icon::new(1));
        assert_eq!(host.write_count(view.id()), 0);
    }

    #[test]
    fn showing_reports_latest_view() {
        let host: HeadlessHost<u8> = HeadlessHost::new();
        let a = host.create_view(1, "a");
        let b = host.create_view(1, "b");
        host.show(ViewerId(1), a.id());
        host.show(ViewerId(1), b.id());
        assert_eq!(host.showing(ViewerId(1)), Some(b.id()));
        assert_eq!(host.showing(ViewerId(2)), None);
    }
}
