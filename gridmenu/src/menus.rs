// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The menu factory and the view registry.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use gridmenu_host::{Host, Scheduler, ViewId, ViewerId};
use tracing::trace;

use crate::click::{Interaction, Verdict};
use crate::error::Result;
use crate::menu::{Env, Menu, MenuCore};
use crate::options::MenuOptions;
use crate::pageable::PageableMenu;

/// Maps live views back to the menu that owns them.
///
/// Holds weak references only; entries of dropped menus are pruned on lookup.
pub(crate) struct ViewRegistry<T: 'static> {
    views: Rc<RefCell<BTreeMap<ViewId, Weak<RefCell<MenuCore<T>>>>>>,
}

impl<T: 'static> Clone for ViewRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            views: self.views.clone(),
        }
    }
}

impl<T: 'static> ViewRegistry<T> {
    fn new() -> Self {
        Self {
            views: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    pub(crate) fn register(&self, view: ViewId, menu: Weak<RefCell<MenuCore<T>>>) {
        self.views.borrow_mut().insert(view, menu);
    }

    pub(crate) fn unregister(&self, view: ViewId) {
        self.views.borrow_mut().remove(&view);
    }

    /// Used while a menu is dropped, which may happen during a lookup.
    pub(crate) fn unregister_all(&self, views: &[ViewId]) {
        if let Ok(mut map) = self.views.try_borrow_mut() {
            for view in views {
                map.remove(view);
            }
        }
    }

    fn lookup(&self, view: ViewId) -> Option<Menu<T>> {
        let mut map = self.views.borrow_mut();
        map.retain(|_, menu| menu.strong_count() > 0);
        map.get(&view).and_then(Menu::upgrade)
    }

    fn len(&self) -> usize {
        self.views.borrow().len()
    }
}

/// Creates menus bound to one host and scheduler, and routes host notifications to them.
///
/// ```
/// use std::rc::Rc;
///
/// use gridmenu::{ClickKind, Interaction, Item, Menus, Verdict};
/// use gridmenu_host::headless::{HeadlessHost, TickScheduler};
/// use gridmenu_host::{Icon, ViewerId};
///
/// let host = Rc::new(HeadlessHost::<&'static str>::new());
/// let ticks = Rc::new(TickScheduler::new());
/// let menus = Menus::new(host.clone(), ticks.clone());
///
/// let menu = menus.create_menu("Shop", 3).unwrap();
/// menu.add_item(13, Item::new(Icon::new("apple"))).unwrap();
/// menu.open(ViewerId(1));
/// ticks.tick();
///
/// let view = host.showing(ViewerId(1)).unwrap();
/// let click = Interaction::new(ViewerId(1), 13, ClickKind::Primary);
/// assert_eq!(menus.handle_click(view, click), Verdict::Intercepted);
/// ```
pub struct Menus<T: 'static> {
    env: Env<T>,
}

impl<T: 'static> core::fmt::Debug for Menus<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Menus")
            .field("options", &self.env.options)
            .field("views", &self.env.registry.len())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Menus<T> {
    /// A factory using default [`MenuOptions`].
    pub fn new(host: Rc<dyn Host<T>>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            env: Env {
                host,
                scheduler,
                options: MenuOptions::default(),
                registry: ViewRegistry::new(),
            },
        }
    }

    /// Use `options` for menus created from now on.
    #[must_use]
    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.env.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> MenuOptions {
        self.env.options
    }

    /// A menu with `rows` rows (1 to 6) of nine slots.
    pub fn create_menu(&self, title: impl Into<String>, rows: u8) -> Result<Menu<T>> {
        Menu::create(self.env.clone(), title.into(), rows, None)
    }

    /// A pageable menu laying its pageable items over `reserved` slots, in the given order.
    pub fn create_pageable_menu(
        &self,
        title: impl Into<String>,
        rows: u8,
        reserved: impl IntoIterator<Item = usize>,
    ) -> Result<PageableMenu<T>> {
        let reserved: Vec<usize> = reserved.into_iter().collect();
        Menu::create(self.env.clone(), title.into(), rows, Some(reserved)).map(PageableMenu::new)
    }

    /// The menu owning `view`, if it is still alive.
    pub fn menu_for(&self, view: ViewId) -> Option<Menu<T>> {
        self.env.registry.lookup(view)
    }

    /// Host notification: a click on `view`. Views not created by this factory pass through.
    pub fn handle_click(&self, view: ViewId, interaction: Interaction) -> Verdict {
        match self.menu_for(view) {
            Some(menu) => menu.click_on(Some(view), interaction),
            None => {
                trace!(view = %view, "click on an unknown view");
                Verdict::Passed
            }
        }
    }

    /// Host notification: `viewer` closed `view`.
    ///
    /// Ignored unless `viewer` is on `view`, so a late close for a view the viewer already left
    /// does not detach them from their current one.
    pub fn handle_close(&self, view: ViewId, viewer: ViewerId) {
        if let Some(menu) = self.menu_for(view) {
            menu.close_on(Some(view), viewer);
        }
    }
}
