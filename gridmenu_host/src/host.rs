// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering surface contract: hosts create views, views hold cells.

use alloc::boxed::Box;

use crate::icon::Icon;
use crate::types::{ViewId, ViewerId};

/// A live grid of addressable cells owned by the host.
///
/// Cells are addressed by slot index in `[0, size())`. Writes outside that range are ignored by
/// well-behaved implementations; the menu engine never issues them.
///
/// The engine calls these methods while its own state is borrowed; they must not call back into it.
pub trait View<T> {
    /// Identity of this view, stable for its whole lifetime.
    fn id(&self) -> ViewId;

    /// Number of addressable cells.
    fn size(&self) -> usize;

    /// Place `icon` into `slot`, replacing whatever was there.
    fn set_cell(&mut self, slot: usize, icon: Icon<T>);

    /// Empty `slot`.
    fn clear_cell(&mut self, slot: usize);

    /// The icon currently in `slot`, if any.
    fn cell(&self, slot: usize) -> Option<Icon<T>>;
}

/// Factory for views and the hand-off of a view to an observer.
pub trait Host<T> {
    /// Create a new, empty view with `rows × 9` cells.
    ///
    /// Called while the engine's state is borrowed; must not call back into it.
    fn create_view(&self, rows: u8, title: &str) -> Box<dyn View<T>>;

    /// Present the view identified by `view` to `viewer`.
    ///
    /// Called on the tick, after the view content has been brought up to date and before the
    /// viewer is registered. Implementations may report the viewer's previous view as closed from
    /// here.
    fn show(&self, viewer: ViewerId, view: ViewId);
}
