// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click classification and the dispatch sequence.
//!
//! ## Overview
//!
//! A raw [`Interaction`] from the host is first routed against the menu's slot range:
//!
//! - Outside the range it is left to the host unless its kind is in the always-intercepted mask.
//! - Inside the range it is always intercepted and dispatched.
//!
//! Dispatch fires handlers in three [`Phase`]s: the menu's any-kind handler, then the menu's
//! handler for the click kind, then the effective item's handler for the click kind.
//! Missing handlers are skipped.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;

use bitflags::bitflags;
use gridmenu_host::ViewerId;

use crate::item::Item;
use crate::menu::Menu;

/// The kind of click an observer performed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClickKind {
    /// Plain primary (left) click.
    Primary,
    /// Plain secondary (right) click.
    Secondary,
    /// Middle click.
    Middle,
    /// Primary click with shift held.
    ShiftPrimary,
    /// Secondary click with shift held.
    ShiftSecondary,
    /// Double click (collect).
    Double,
    /// Drop one.
    Drop,
    /// Drop the whole stack.
    DropAll,
    /// Number key swap.
    NumberKey,
}

impl ClickKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Primary,
        Self::Secondary,
        Self::Middle,
        Self::ShiftPrimary,
        Self::ShiftSecondary,
        Self::Double,
        Self::Drop,
        Self::DropAll,
        Self::NumberKey,
    ];

    /// The mask flag for this kind.
    pub const fn mask(self) -> ClickMask {
        match self {
            Self::Primary => ClickMask::PRIMARY,
            Self::Secondary => ClickMask::SECONDARY,
            Self::Middle => ClickMask::MIDDLE,
            Self::ShiftPrimary => ClickMask::SHIFT_PRIMARY,
            Self::ShiftSecondary => ClickMask::SHIFT_SECONDARY,
            Self::Double => ClickMask::DOUBLE,
            Self::Drop => ClickMask::DROP,
            Self::DropAll => ClickMask::DROP_ALL,
            Self::NumberKey => ClickMask::NUMBER_KEY,
        }
    }

    /// Whether this kind moves items between containers on its own (double or shift clicks).
    pub fn is_structural(self) -> bool {
        ClickMask::STRUCTURAL.contains(self.mask())
    }
}

bitflags! {
    /// A set of [`ClickKind`]s.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClickMask: u16 {
        /// [`ClickKind::Primary`].
        const PRIMARY = 1 << 0;
        /// [`ClickKind::Secondary`].
        const SECONDARY = 1 << 1;
        /// [`ClickKind::Middle`].
        const MIDDLE = 1 << 2;
        /// [`ClickKind::ShiftPrimary`].
        const SHIFT_PRIMARY = 1 << 3;
        /// [`ClickKind::ShiftSecondary`].
        const SHIFT_SECONDARY = 1 << 4;
        /// [`ClickKind::Double`].
        const DOUBLE = 1 << 5;
        /// [`ClickKind::Drop`].
        const DROP = 1 << 6;
        /// [`ClickKind::DropAll`].
        const DROP_ALL = 1 << 7;
        /// [`ClickKind::NumberKey`].
        const NUMBER_KEY = 1 << 8;
        /// Kinds that can pull items out of a menu from anywhere in the window.
        const STRUCTURAL =
            Self::DOUBLE.bits() | Self::SHIFT_PRIMARY.bits() | Self::SHIFT_SECONDARY.bits();
    }
}

impl ClickMask {
    /// Whether `kind` is in the set.
    pub fn has(self, kind: ClickKind) -> bool {
        self.contains(kind.mask())
    }
}

/// A raw interaction delivered by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Interaction {
    /// Who clicked.
    pub viewer: ViewerId,
    /// Raw slot index; may lie outside the menu (the observer's own inventory).
    pub slot: usize,
    /// What kind of click it was.
    pub kind: ClickKind,
}

impl Interaction {
    /// Convenience constructor.
    pub fn new(viewer: ViewerId, slot: usize, kind: ClickKind) -> Self {
        Self { viewer, slot, kind }
    }
}

/// What the host should do with its default handling of an interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The menu did not claim the interaction; apply host defaults.
    Passed,
    /// The menu claimed the interaction; suppress host defaults.
    Intercepted,
}

impl Verdict {
    /// `true` for [`Verdict::Intercepted`].
    pub fn is_intercepted(self) -> bool {
        matches!(self, Self::Intercepted)
    }
}

/// Context handed to click handlers.
///
/// Handlers receive a handle to the menu that was clicked so they can mutate it without capturing
/// one (capturing a [`Menu`] inside one of its own handlers keeps the menu alive forever).
pub struct Click<T: 'static> {
    pub(crate) viewer: ViewerId,
    pub(crate) slot: usize,
    pub(crate) kind: ClickKind,
    pub(crate) page: usize,
    pub(crate) menu: Menu<T>,
}

impl<T: 'static> Click<T> {
    /// Who clicked.
    pub fn viewer(&self) -> ViewerId {
        self.viewer
    }

    /// The clicked slot, always inside the menu.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The kind of click.
    pub fn kind(&self) -> ClickKind {
        self.kind
    }

    /// The page the viewer was looking at (`0` for menus without pages).
    pub fn page(&self) -> usize {
        self.page
    }

    /// The menu that was clicked.
    pub fn menu(&self) -> &Menu<T> {
        &self.menu
    }
}

impl<T: 'static> core::fmt::Debug for Click<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Click")
            .field("viewer", &self.viewer)
            .field("slot", &self.slot)
            .field("kind", &self.kind)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

/// A click callback.
pub type ClickHandler<T> = Rc<dyn Fn(&Click<T>)>;

/// A per-kind table of click callbacks.
pub struct HandlerTable<T: 'static> {
    map: BTreeMap<ClickKind, ClickHandler<T>>,
}

impl<T: 'static> Default for HandlerTable<T> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<T: 'static> Clone for HandlerTable<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: 'static> core::fmt::Debug for HandlerTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

impl<T: 'static> HandlerTable<T> {
    /// Install `handler` for `kind`, replacing any previous one.
    pub fn set(&mut self, kind: ClickKind, handler: ClickHandler<T>) {
        self.map.insert(kind, handler);
    }

    /// Remove the handler for `kind`.
    pub fn remove(&mut self, kind: ClickKind) -> Option<ClickHandler<T>> {
        self.map.remove(&kind)
    }

    /// The handler for `kind`, if any.
    pub fn get(&self, kind: ClickKind) -> Option<&ClickHandler<T>> {
        self.map.get(&kind)
    }

    /// Kinds that have a handler.
    pub fn kinds(&self) -> impl Iterator<Item = ClickKind> + '_ {
        self.map.keys().copied()
    }

    /// Number of installed handlers.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no handler is installed.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Dispatch phase of a handler in the sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Phase {
    /// The menu's handler for every kind.
    Any,
    /// The menu's handler for this kind.
    Kind,
    /// The effective item's handler for this kind.
    Item,
}

/// One step of a dispatch sequence.
pub(crate) struct Dispatch<T: 'static> {
    pub(crate) phase: Phase,
    pub(crate) handler: ClickHandler<T>,
}

/// Where an interaction goes before any handler is looked up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    /// Outside the menu and not a protected kind.
    Pass,
    /// Outside the menu but a protected kind: intercept without dispatch.
    Intercept,
    /// Inside the menu: intercept and dispatch.
    Dispatch,
}

pub(crate) fn route(slot_count: usize, always_intercept: ClickMask, ix: &Interaction) -> Route {
    if ix.slot < slot_count {
        Route::Dispatch
    } else if always_intercept.has(ix.kind) {
        Route::Intercept
    } else {
        Route::Pass
    }
}

/// Build the ordered handler sequence for a click of `kind` on `item`.
///
/// The handlers are cloned out so they can run after the menu state is released.
pub(crate) fn sequence<T: 'static>(
    any: Option<&ClickHandler<T>>,
    by_kind: &HandlerTable<T>,
    item: Option<&Item<T>>,
    kind: ClickKind,
) -> Vec<Dispatch<T>> {
    let mut out = Vec::with_capacity(3);
    if let Some(h) = any {
        out.push(Dispatch {
            phase: Phase::Any,
            handler: h.clone(),
        });
    }
    if let Some(h) = by_kind.get(kind) {
        out.push(Dispatch {
            phase: Phase::Kind,
            handler: h.clone(),
        });
    }
    if let Some(h) = item.and_then(|i| i.handler(kind)) {
        out.push(Dispatch {
            phase: Phase::Item,
            handler: h.clone(),
        });
    }
    out
}
