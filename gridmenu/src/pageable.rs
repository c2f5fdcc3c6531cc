// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pageable menus.
//!
//! ## Overview
//!
//! A [`PageableMenu`] is a [`Menu`] with a pagination overlay: an ordered list of pageable items
//! spread over a fixed set of reserved slots, plus optional next/previous navigation items.
//!
//! Each observer pages independently. The first observer gets the menu's root view; an observer
//! arriving while the root view is taken gets a mirror: a separate view with its own page that
//! reads the same content. Content changes reach every view; page turns stay on the view of the
//! viewer that asked for them. A mirror disappears when its last viewer leaves.
//!
//! Page turns are deferred to the next tick and followed by a short lock (see
//! [`MenuOptions::nav_debounce`](crate::MenuOptions::nav_debounce)) so a burst of clicks turns a
//! single page.

use alloc::vec::Vec;
use core::ops::Deref;

use gridmenu_host::{Icon, ViewerId};

use crate::click::ClickKind;
use crate::error::Result;
use crate::item::{Item, ItemId};
use crate::menu::{Effect, Menu, MenuCore};
use crate::pages::{NavItem, Step};
use crate::pending::Target;

impl<T: 'static> MenuCore<T> {
    /// Re-clamp (or reset) every instance's page and refresh all views.
    fn pages_changed(&mut self, reset: bool, effects: &mut Vec<Effect>) {
        let Some(count) = self.pages.as_ref().map(|l| l.page_count()) else {
            return;
        };
        for id in self.instances.ids() {
            if let Some(inst) = self.instances.get_mut(id) {
                inst.page = if reset { 0 } else { inst.page.min(count - 1) };
            }
        }
        self.require(Target::All, effects);
    }

    fn set_nav(
        &mut self,
        step: Step,
        icon: Icon<T>,
        slot: usize,
        effects: &mut Vec<Effect>,
    ) -> Result<()> {
        self.slots.check(slot)?;
        let Some(layout) = self.pages.as_mut() else {
            return Ok(());
        };
        layout.check_unreserved(slot)?;
        let item = Item::new(icon).on(ClickKind::Primary, move |click| {
            click.menu().navigate(click.viewer(), step);
        });
        let previous = layout.nav_mut(step).replace(NavItem { slot, item });
        if let Some(previous) = previous
            && previous.slot != slot
        {
            self.require(Target::Slot(previous.slot), effects);
        }
        self.require(Target::Slot(slot), effects);
        Ok(())
    }
}

impl<T: 'static> Menu<T> {
    /// Ask for a page turn on the view `viewer` is looking at.
    ///
    /// Returns `false` if the viewer is not on this menu or a turn is still locked.
    pub(crate) fn navigate(&self, viewer: ViewerId, step: Step) -> bool {
        let effects = self.core.borrow_mut().request_turn(viewer, step);
        let accepted = !effects.is_empty();
        self.submit(effects);
        accepted
    }
}

/// A [`Menu`] with a pagination overlay.
///
/// Dereferences to [`Menu`] for the regular-item API. Create with
/// [`Menus::create_pageable_menu`](crate::Menus::create_pageable_menu).
///
/// ```
/// use std::rc::Rc;
///
/// use gridmenu::{Item, Menus, Step};
/// use gridmenu_host::headless::{HeadlessHost, TickScheduler};
/// use gridmenu_host::{Icon, ViewerId};
///
/// let host = Rc::new(HeadlessHost::<String>::new());
/// let ticks = Rc::new(TickScheduler::new());
/// let menus = Menus::new(host.clone(), ticks.clone());
///
/// let menu = menus.create_pageable_menu("Warps", 1, 0..5).unwrap();
/// menu.set_next_page_item(Icon::new("next".into()), 8).unwrap();
/// for i in 0..12 {
///     menu.add_pageable_item(Item::new(Icon::new(format!("warp {i}"))));
/// }
/// assert_eq!(menu.page_count(), 3);
///
/// let alice = ViewerId(1);
/// menu.open(alice, 1);
/// ticks.tick();
/// assert_eq!(menu.current_page(alice), 1);
/// let shown = menu.displayed_for(alice, 2).unwrap();
/// assert_eq!(shown.get(), "warp 7");
///
/// assert!(menu.navigate(alice, Step::Next));
/// ticks.run_until_idle(10);
/// assert_eq!(menu.current_page(alice), 2);
/// ```
pub struct PageableMenu<T: 'static> {
    menu: Menu<T>,
}

impl<T: 'static> Clone for PageableMenu<T> {
    fn clone(&self) -> Self {
        Self {
            menu: self.menu.clone(),
        }
    }
}

impl<T: 'static> core::fmt::Debug for PageableMenu<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("PageableMenu").field(&self.menu).finish()
    }
}

impl<T: 'static> Deref for PageableMenu<T> {
    type Target = Menu<T>;

    fn deref(&self) -> &Menu<T> {
        &self.menu
    }
}

impl<T: 'static> PageableMenu<T> {
    pub(crate) fn new(menu: Menu<T>) -> Self {
        Self { menu }
    }

    /// The underlying menu handle.
    pub fn as_menu(&self) -> &Menu<T> {
        &self.menu
    }

    /// Show the menu to `viewer` at `page` (clamped to the last page).
    ///
    /// Reuses the root view if nobody holds it, otherwise creates a mirror for this viewer.
    pub fn open(&self, viewer: ViewerId, page: usize) {
        self.menu.open_at(viewer, page);
    }

    /// Turn the page of the view `viewer` is looking at.
    ///
    /// The turn happens on the next tick. Returns `false` if the viewer is not on this menu or a
    /// previous turn is still locked.
    pub fn navigate(&self, viewer: ViewerId, step: Step) -> bool {
        self.menu.navigate(viewer, step)
    }

    /// Append a pageable item.
    pub fn add_pageable_item(&self, item: Item<T>) {
        self.menu.mutate(|core, effects| {
            if let Some(layout) = core.pages.as_mut() {
                layout.items.push(item);
            }
            core.pages_changed(false, effects);
        });
    }

    /// Insert a pageable item at `index` (clamped to the list length).
    pub fn insert_pageable_item(&self, index: usize, item: Item<T>) {
        self.menu.mutate(|core, effects| {
            if let Some(layout) = core.pages.as_mut() {
                let index = index.min(layout.items.len());
                layout.items.insert(index, item);
            }
            core.pages_changed(false, effects);
        });
    }

    /// Remove the pageable item with identity `id`.
    pub fn remove_pageable_item(&self, id: ItemId) -> Option<Item<T>> {
        self.menu.mutate(|core, effects| {
            let layout = core.pages.as_mut()?;
            let index = layout.index_of(id)?;
            let removed = layout.items.remove(index);
            core.pages_changed(false, effects);
            Some(removed)
        })
    }

    /// Replace the pageable items. Every view goes back to the first page.
    pub fn set_pageable_items(&self, items: impl IntoIterator<Item = Item<T>>) {
        let items: Vec<_> = items.into_iter().collect();
        self.menu.mutate(|core, effects| {
            if let Some(layout) = core.pages.as_mut() {
                layout.items = items;
            }
            core.pages_changed(true, effects);
        });
    }

    /// Remove every pageable item.
    pub fn clear_pageable_items(&self) {
        self.menu.mutate(|core, effects| {
            if let Some(layout) = core.pages.as_mut() {
                layout.items.clear();
            }
            core.pages_changed(false, effects);
        });
    }

    /// Mutate a pageable item in place and refresh the views showing it.
    ///
    /// `f` runs while the menu is borrowed and must not call back into it.
    pub fn modify_pageable_item<R>(
        &self,
        id: ItemId,
        f: impl FnOnce(&mut Item<T>) -> R,
    ) -> Option<R> {
        self.menu.mutate(|core, effects| {
            let layout = core.pages.as_mut()?;
            let index = layout.index_of(id)?;
            let out = f(&mut layout.items[index]);
            let (page, slot) = layout.locate(index);
            let showing: Vec<_> = core
                .instances
                .iter()
                .filter(|(_, inst)| inst.page == page)
                .map(|(id, _)| id)
                .collect();
            for instance in showing {
                core.require_on(instance, Target::Slot(slot), effects);
            }
            Some(out)
        })
    }

    /// Number of pageable items.
    pub fn pageable_len(&self) -> usize {
        self.menu.core.borrow().pages.as_ref().map_or(0, |l| l.items.len())
    }

    /// Identities of the pageable items in list order.
    pub fn pageable_ids(&self) -> Vec<ItemId> {
        self.menu
            .core
            .borrow()
            .pages
            .as_ref()
            .map(|l| l.items.iter().map(Item::id).collect())
            .unwrap_or_default()
    }

    /// Where the pageable item `id` is shown: `(page, slot)`.
    pub fn pageable_item_slot(&self, id: ItemId) -> Option<(usize, usize)> {
        let core = self.menu.core.borrow();
        let layout = core.pages.as_ref()?;
        layout.index_of(id).map(|index| layout.locate(index))
    }

    /// Reserved slots in layout order.
    pub fn reserved_slots(&self) -> Vec<usize> {
        self.menu
            .core
            .borrow()
            .pages
            .as_ref()
            .map(|l| l.reserved().to_vec())
            .unwrap_or_default()
    }

    /// `max(1, ceil(items / reserved slots))`.
    pub fn page_count(&self) -> usize {
        self.menu
            .core
            .borrow()
            .pages
            .as_ref()
            .map_or(1, |l| l.page_count())
    }

    /// The page `viewer` is looking at, `0` if the viewer is not on this menu.
    pub fn current_page(&self, viewer: ViewerId) -> usize {
        let core = self.menu.core.borrow();
        core.instances
            .find_viewer(viewer)
            .and_then(|id| core.instances.get(id))
            .map_or(0, |inst| inst.page)
    }

    /// Place the next-page item at `slot`. It is shown only when there is a next page.
    pub fn set_next_page_item(&self, icon: Icon<T>, slot: usize) -> Result<()> {
        self.menu
            .mutate(|core, effects| core.set_nav(Step::Next, icon, slot, effects))
    }

    /// Place the previous-page item at `slot`. It is shown only when there is a previous page.
    pub fn set_previous_page_item(&self, icon: Icon<T>, slot: usize) -> Result<()> {
        self.menu
            .mutate(|core, effects| core.set_nav(Step::Previous, icon, slot, effects))
    }

    /// Number of live mirrors.
    pub fn mirror_count(&self) -> usize {
        self.menu.core.borrow().instances.mirror_count()
    }

    /// The icon in `slot` of the view `viewer` is looking at.
    pub fn displayed_for(&self, viewer: ViewerId, slot: usize) -> Option<Icon<T>> {
        let core = self.menu.core.borrow();
        let id = core.instances.find_viewer(viewer)?;
        core.instances.get(id)?.view.as_ref()?.cell(slot)
    }

    /// An independent pageable menu; see [`Menu::copy`].
    pub fn copy(&self) -> Self
    where
        T: Clone,
    {
        Self::new(self.menu.copy())
    }
}
