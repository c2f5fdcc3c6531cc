// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gridmenu: slot-addressable grid menus on top of a host-owned rendering surface.
//!
//! A [`Menu`] is a grid of `rows × 9` slots holding [`Item`]s.
//! Each item carries an icon, optional per-kind click handlers, and an optional animation.
//!
//! - Content changes reach a view only when somebody is looking at it; otherwise they are
//!   remembered and applied in one pass when the next observer opens the menu.
//! - Flushes happen on the host's next tick and skip cells that already show the right icon.
//! - Clicks inside the grid are always intercepted and dispatched to the menu's any-kind handler,
//!   then its per-kind handler, then the clicked item's handler.
//! - Animated items are polled by a periodic driver that runs only while the menu is observed.
//!
//! A [`PageableMenu`] additionally lays an ordered list of pageable items over a fixed set of
//! reserved slots, one page at a time.
//! Every viewer gets their own page: the first viewer uses the menu's own view and later viewers
//! get a private mirror that shares the menu's content.
//!
//! The crate owns no clock and no window.
//! Both come from the [`gridmenu_host`] contract; its headless implementation drives everything
//! below deterministically.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use gridmenu::{ClickKind, Interaction, Item, Menus, Verdict};
//! use gridmenu_host::headless::{HeadlessHost, TickScheduler};
//! use gridmenu_host::{Icon, ViewerId};
//!
//! let host = Rc::new(HeadlessHost::<&'static str>::new());
//! let ticks = Rc::new(TickScheduler::new());
//! let menus = Menus::new(host.clone(), ticks.clone());
//!
//! let shop = menus.create_menu("Shop", 1).unwrap();
//! shop.add_item(
//!     4,
//!     Item::new(Icon::new("apple")).on(ClickKind::Primary, |click| {
//!         click.menu().remove_item(click.slot()).unwrap();
//!     }),
//! )
//! .unwrap();
//!
//! // Opening takes effect on the next tick.
//! shop.open(ViewerId(1));
//! assert!(!shop.has_viewers());
//! ticks.tick();
//! assert_eq!(shop.viewers(), vec![ViewerId(1)]);
//!
//! let view = shop.view().unwrap();
//! assert_eq!(host.cell(view, 4).map(|i| *i.get()), Some("apple"));
//!
//! // The click is claimed right away, the cell is cleared on the following tick.
//! let verdict = menus.handle_click(view, Interaction::new(ViewerId(1), 4, ClickKind::Primary));
//! assert_eq!(verdict, Verdict::Intercepted);
//! ticks.tick();
//! assert!(host.cell(view, 4).is_none());
//! ```
//!
//! Pages work the same way, with one mirror per extra viewer:
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use gridmenu::{Item, Menus, Step};
//! use gridmenu_host::headless::{HeadlessHost, TickScheduler};
//! use gridmenu_host::{Icon, ViewerId};
//!
//! let host = Rc::new(HeadlessHost::<u32>::new());
//! let ticks = Rc::new(TickScheduler::new());
//! let menus = Menus::new(host.clone(), ticks.clone());
//!
//! let list = menus.create_pageable_menu("List", 1, 0..7).unwrap();
//! list.set_pageable_items((0..20).map(|n| Item::new(Icon::new(n))));
//! list.set_next_page_item(Icon::new(100), 8).unwrap();
//! assert_eq!(list.page_count(), 3);
//!
//! list.open(ViewerId(1), 0);
//! list.open(ViewerId(2), 2);
//! ticks.tick();
//! assert_eq!(list.mirror_count(), 1);
//! assert_eq!(list.displayed_for(ViewerId(2), 0).map(|i| *i.get()), Some(14));
//!
//! assert!(list.navigate(ViewerId(1), Step::Next));
//! ticks.tick();
//! assert_eq!(list.current_page(ViewerId(1)), 1);
//! assert_eq!(list.current_page(ViewerId(2)), 2);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod click;
pub mod error;
pub mod item;
pub mod menu;
pub mod menus;
pub mod options;
pub mod pageable;
pub mod pending;
pub mod slots;

mod instance;
mod pages;
mod ticker;

pub use gridmenu_host;

pub use click::{Click, ClickHandler, ClickKind, ClickMask, HandlerTable, Interaction, Verdict};
pub use error::{ConfigurationError, MenuError, Result};
pub use item::{Item, ItemId, TickHook};
pub use menu::{Menu, ViewerHandler};
pub use menus::Menus;
pub use options::MenuOptions;
pub use pageable::PageableMenu;
pub use pages::Step;
pub use pending::Target;
pub use slots::SlotStore;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use gridmenu_host::headless::{HeadlessHost, TickScheduler};
    use gridmenu_host::{Icon, ViewerId};

    #[test]
    fn closed_menu_catches_up_in_one_pass() {
        let host = Rc::new(HeadlessHost::<u8>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host.clone(), ticks.clone());
        let menu = menus.create_menu("m", 2).unwrap();

        menu.open(ViewerId(1));
        ticks.tick();
        menu.handle_close(ViewerId(1));
        let view = menu.view().unwrap();
        host.take_writes();

        for slot in [0, 3, 3, 17] {
            menu.add_item(slot, Item::new(Icon::new(1))).unwrap();
        }
        ticks.run_until_idle(10);
        assert_eq!(host.write_count(view), 0, "nobody is looking");

        menu.open(ViewerId(2));
        ticks.tick();
        assert_eq!(host.occupied(view), vec![0, 3, 17]);
        assert_eq!(host.write_count(view), 3);
    }

    #[test]
    fn handlers_can_mutate_their_own_menu() {
        let host = Rc::new(HeadlessHost::<u8>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host.clone(), ticks.clone());
        let menu = menus.create_menu("m", 1).unwrap();
        let clicks = Rc::new(Cell::new(0_u8));
        let c = clicks.clone();
        menu.on_any_click(move |click| {
            c.set(c.get() + 1);
            let next = Item::new(Icon::new(c.get()));
            click.menu().add_item(click.slot(), next).unwrap();
        });
        menu.open(ViewerId(1));
        ticks.tick();

        let view = menu.view().unwrap();
        let verdict = menus.handle_click(view, Interaction::new(ViewerId(1), 5, ClickKind::Middle));
        assert!(verdict.is_intercepted());
        ticks.tick();
        assert_eq!(host.cell(view, 5).map(|i| *i.get()), Some(1));
        assert_eq!(clicks.get(), 1);
    }
}
