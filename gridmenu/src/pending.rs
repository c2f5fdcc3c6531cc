// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred update bookkeeping.
//!
//! ## Overview
//!
//! A content change only reaches a view when somebody is looking at it.
//! [`decide`] makes that call for one view; the menu then either records the change in a
//! [`Pending`] set (nobody looking) or queues it for the next-tick flush (somebody looking).
//!
//! [`materialize`] performs the flush: for every slot it compares the effective icon against the
//! icon already in the cell by identity and skips writes that would change nothing.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use gridmenu_host::{Icon, View};

/// What needs refreshing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A single slot.
    Slot(usize),
    /// Every slot.
    All,
}

/// A set of slots awaiting a write. [`Pending::All`] supersedes any individual slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Pending {
    #[default]
    Clean,
    Slots(BTreeSet<usize>),
    All,
}

impl Pending {
    pub(crate) fn insert(&mut self, target: Target) {
        match target {
            Target::All => *self = Self::All,
            Target::Slot(slot) => match self {
                Self::All => {}
                Self::Slots(set) => {
                    set.insert(slot);
                }
                Self::Clean => *self = Self::Slots(BTreeSet::from([slot])),
            },
        }
    }

    pub(crate) fn merge(&mut self, other: Self) {
        match other {
            Self::Clean => {}
            Self::All => *self = Self::All,
            Self::Slots(set) => {
                for slot in set {
                    self.insert(Target::Slot(slot));
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    pub(crate) fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// The concrete slots to write, restricted to `[0, slot_count)`.
    pub(crate) fn slots(&self, slot_count: usize) -> Vec<usize> {
        match self {
            Self::Clean => Vec::new(),
            Self::All => (0..slot_count).collect(),
            Self::Slots(set) => set.iter().copied().filter(|s| *s < slot_count).collect(),
        }
    }
}

/// How a change to one view is handled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    /// No view yet; it starts fully pending once it exists.
    Ignore,
    /// Nobody is looking; remember the slot.
    Defer,
    /// Somebody is looking; write on the next tick.
    Apply,
}

pub(crate) fn decide(has_view: bool, observed: bool) -> Decision {
    match (has_view, observed) {
        (false, _) => Decision::Ignore,
        (true, false) => Decision::Defer,
        (true, true) => Decision::Apply,
    }
}

/// Outcome of bringing a view up to date.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FlushReport {
    /// Cells that received a different icon.
    pub(crate) written: usize,
    /// Cells that were emptied.
    pub(crate) cleared: usize,
    /// Cells that already showed the right thing.
    pub(crate) unchanged: usize,
}

impl FlushReport {
    /// Number of writes that reached the view.
    #[cfg(test)]
    pub(crate) fn writes(&self) -> usize {
        self.written + self.cleared
    }
}

/// Write the effective icon of each of `slots` into `view`, skipping identical cells.
pub(crate) fn materialize<T>(
    view: &mut dyn View<T>,
    slots: &[usize],
    mut effective: impl FnMut(usize) -> Option<Icon<T>>,
) -> FlushReport {
    let mut report = FlushReport::default();
    let size = view.size();
    for &slot in slots.iter().filter(|s| **s < size) {
        match (effective(slot), view.cell(slot)) {
            (Some(want), Some(have)) if want.same(&have) => report.unchanged += 1,
            (Some(want), _) => {
                view.set_cell(slot, want);
                report.written += 1;
            }
            (None, Some(_)) => {
                view.clear_cell(slot);
                report.cleared += 1;
            }
            (None, None) => report.unchanged += 1,
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use gridmenu_host::Host;
    use gridmenu_host::headless::HeadlessHost;

    #[test]
    fn all_supersedes_slots() {
        let mut p = Pending::default();
        assert!(p.is_clean());
        p.insert(Target::Slot(4));
        p.insert(Target::Slot(2));
        assert_eq!(p.slots(9), vec![2, 4]);
        p.insert(Target::All);
        p.insert(Target::Slot(7));
        assert_eq!(p, Pending::All);
        assert_eq!(p.slots(3), vec![0, 1, 2]);
        assert_eq!(p.take(), Pending::All);
        assert!(p.is_clean());
    }

    #[test]
    fn merge_keeps_the_wider_set() {
        let mut a = Pending::default();
        a.insert(Target::Slot(1));
        let mut b = Pending::default();
        b.insert(Target::Slot(5));
        a.merge(b);
        assert_eq!(a.slots(9), vec![1, 5]);
        a.merge(Pending::All);
        assert_eq!(a, Pending::All);
    }

    #[test]
    fn decisions() {
        assert_eq!(decide(false, true), Decision::Ignore);
        assert_eq!(decide(true, false), Decision::Defer);
        assert_eq!(decide(true, true), Decision::Apply);
    }

    #[test]
    fn identical_cells_are_skipped() {
        let host: HeadlessHost<u8> = HeadlessHost::new();
        let mut view = host.create_view(1, "t");
        let icon = Icon::new(3);
        let lookup = |slot: usize| (slot == 4).then(|| icon.clone());

        let first = materialize(view.as_mut(), &[3, 4, 5], lookup);
        assert_eq!(
            first,
            FlushReport {
                written: 1,
                cleared: 0,
                unchanged: 2
            }
        );
        let again = materialize(view.as_mut(), &[3, 4, 5], lookup);
        assert_eq!(again.writes(), 0, "a second flush must not touch the view");
        assert_eq!(host.write_count(view.id()), 1);
    }

    #[test]
    fn equal_but_distinct_icons_are_written() {
        let host: HeadlessHost<u8> = HeadlessHost::new();
        let mut view = host.create_view(1, "t");
        materialize(view.as_mut(), &[0], |_| Some(Icon::new(1)));
        let report = materialize(view.as_mut(), &[0], |_| Some(Icon::new(1)));
        assert_eq!(report.written, 1);
    }

    #[test]
    fn vacated_cells_are_cleared() {
        let host: HeadlessHost<u8> = HeadlessHost::new();
        let mut view = host.create_view(1, "t");
        materialize(view.as_mut(), &[0, 1], |_| Some(Icon::new(1)));
        let report = materialize(view.as_mut(), &[0, 1, 40], |s| {
            (s == 0).then(|| Icon::new(2))
        });
        assert_eq!(report.written, 1);
        assert_eq!(report.cleared, 1);
        assert_eq!(host.occupied(view.id()), vec![0]);
    }
}
