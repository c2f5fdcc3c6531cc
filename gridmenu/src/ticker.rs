// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic polling of animated items.
//!
//! One repeating task per menu, started when the first viewer is attached and cancelled by the
//! first poll that finds no viewer on any instance. Mirrors never start their own task; the
//! menu's single task polls shared content once and routes changes to every instance.
//!
//! A poll runs in three steps: built-in animations advance under the menu borrow, user tick hooks
//! run with the borrow released, and their results are applied under a fresh borrow. Items are
//! found again by identity, so a hook may move or remove items without confusing the poll.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use gridmenu_host::Icon;
use tracing::debug;

use crate::item::{ItemId, TickHook};
use crate::menu::{Effect, Menu, MenuCore};
use crate::pages::Step;
use crate::pending::Target;

/// Where a polled item lives.
#[derive(Copy, Clone, Debug)]
enum Origin {
    Slot(usize),
    Nav(Step),
    Pageable,
}

/// A tick hook taken out of the menu, to be run unborrowed.
struct HookCall<T: 'static> {
    origin: Origin,
    item: ItemId,
    hook: TickHook<T>,
    icon: Icon<T>,
}

/// What changed during a poll.
#[derive(Default)]
struct Changed {
    slots: Vec<usize>,
    pageable: Vec<ItemId>,
}

impl<T: 'static> MenuCore<T> {
    /// Advance built-in animations and collect the tick hooks that still have to run.
    fn poll_items(&mut self) -> (Changed, Vec<HookCall<T>>) {
        let mut changed = Changed::default();
        let mut hooks = Vec::new();
        for (slot, item) in self.slots.iter_mut() {
            let (moved, hook) = item.poll_builtin();
            if moved {
                changed.slots.push(slot);
            }
            if let Some((hook, icon)) = hook {
                hooks.push(HookCall {
                    origin: Origin::Slot(slot),
                    item: item.id(),
                    hook,
                    icon,
                });
            }
        }
        if let Some(layout) = &mut self.pages {
            for step in [Step::Next, Step::Previous] {
                let Some(nav) = layout.nav_mut(step).as_mut() else {
                    continue;
                };
                let (moved, hook) = nav.item.poll_builtin();
                if moved {
                    changed.slots.push(nav.slot);
                }
                if let Some((hook, icon)) = hook {
                    hooks.push(HookCall {
                        origin: Origin::Nav(step),
                        item: nav.item.id(),
                        hook,
                        icon,
                    });
                }
            }
            for item in &mut layout.items {
                let (moved, hook) = item.poll_builtin();
                if moved {
                    changed.pageable.push(item.id());
                }
                if let Some((hook, icon)) = hook {
                    hooks.push(HookCall {
                        origin: Origin::Pageable,
                        item: item.id(),
                        hook,
                        icon,
                    });
                }
            }
        }
        (changed, hooks)
    }

    /// Apply hook results and require updates where something changed.
    fn settle(
        &mut self,
        mut changed: Changed,
        results: Vec<(Origin, ItemId, Icon<T>)>,
    ) -> Vec<Effect> {
        for (origin, id, icon) in results {
            match origin {
                Origin::Slot(slot) => {
                    if let Some(item) = self.slots.get_mut(slot).filter(|i| i.id() == id) {
                        item.apply_hooked(icon);
                        changed.slots.push(slot);
                    }
                }
                Origin::Nav(step) => {
                    let nav = self.pages.as_mut().and_then(|l| l.nav_mut(step).as_mut());
                    if let Some(nav) = nav.filter(|n| n.item.id() == id) {
                        nav.item.apply_hooked(icon);
                        changed.slots.push(nav.slot);
                    }
                }
                Origin::Pageable => {
                    let Some(layout) = self.pages.as_mut() else {
                        continue;
                    };
                    if let Some(index) = layout.index_of(id) {
                        layout.items[index].apply_hooked(icon);
                        changed.pageable.push(id);
                    }
                }
            }
        }

        let mut effects = Vec::new();
        for slot in changed.slots {
            self.require(Target::Slot(slot), &mut effects);
        }
        // A pageable item only has a slot on instances showing its page.
        let mut targeted = Vec::new();
        if let Some(layout) = &self.pages {
            for id in changed.pageable {
                let Some(index) = layout.index_of(id) else {
                    continue;
                };
                for (instance, inst) in self.instances.iter() {
                    if let Some(slot) = layout.visible_slot(index, inst.page) {
                        targeted.push((instance, slot));
                    }
                }
            }
        }
        for (instance, slot) in targeted {
            self.require_on(instance, Target::Slot(slot), &mut effects);
        }
        effects
    }
}

impl<T: 'static> Menu<T> {
    /// Start the polling task unless it is already running or nobody is looking.
    pub(crate) fn ensure_ticker(&self) {
        let (scheduler, interval) = {
            let core = self.core.borrow();
            let running = core.ticker.as_ref().is_some_and(|t| !t.is_cancelled());
            if running || !core.instances.has_viewers() {
                return;
            }
            (core.env.scheduler.clone(), core.env.options.tick_interval)
        };
        let weak = Rc::downgrade(&self.core);
        let handle = scheduler.run_every(
            interval,
            Box::new(move || {
                if let Some(menu) = Self::upgrade(&weak) {
                    menu.poll_tick();
                }
            }),
        );
        let mut core = self.core.borrow_mut();
        debug!(title = %core.title, interval, "tick driver started");
        core.ticker = Some(handle);
    }

    fn poll_tick(&self) {
        let (changed, hooks) = self.core.borrow_mut().poll_items();
        let results: Vec<_> = hooks
            .into_iter()
            .filter_map(|call| {
                let next = (call.hook)(&call.icon)?;
                Some((call.origin, call.item, next))
            })
            .collect();
        let effects = {
            let mut core = self.core.borrow_mut();
            let effects = core.settle(changed, results);
            if !core.instances.has_viewers()
                && let Some(ticker) = core.ticker.take()
            {
                ticker.cancel();
                debug!(title = %core.title, "tick driver stopped");
            }
            effects
        };
        self.submit(effects);
    }

    /// Whether the polling task is running.
    pub fn is_ticking(&self) -> bool {
        self.core
            .borrow()
            .ticker
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;

    use gridmenu_host::headless::{HeadlessHost, TickScheduler};
    use gridmenu_host::{Icon, ViewerId};

    use crate::{Item, Menus};

    #[test]
    fn driver_runs_only_while_observed() {
        let host = Rc::new(HeadlessHost::<u8>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host, ticks.clone());
        let menu = menus.create_menu("m", 1).unwrap();
        assert!(!menu.is_ticking());
        menu.open(ViewerId(1));
        ticks.tick();
        assert!(menu.is_ticking());
        assert_eq!(ticks.active_repeating(), 1);

        menu.open(ViewerId(2));
        ticks.tick();
        assert_eq!(ticks.active_repeating(), 1, "one task per menu");

        menu.handle_close(ViewerId(1));
        menu.handle_close(ViewerId(2));
        ticks.advance(2);
        assert!(!menu.is_ticking());
        assert_eq!(ticks.active_repeating(), 0);
    }

    #[test]
    fn cycling_item_is_redrawn_every_period() {
        let host = Rc::new(HeadlessHost::<u8>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host.clone(), ticks.clone());
        let menu = menus.create_menu("m", 1).unwrap();
        let frames: Vec<_> = (0..3_u8).map(Icon::new).collect();
        menu.add_item(0, Item::cycling(frames.clone(), 2).unwrap()).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        let view = menu.view().unwrap();
        assert!(host.cell(view, 0).is_some_and(|i| i.same(&frames[0])));

        let mut seen = Vec::new();
        for _ in 0..8 {
            ticks.tick();
            seen.push(*host.cell(view, 0).unwrap().get());
        }
        assert_eq!(seen, vec![0, 0, 1, 1, 2, 2, 0, 0]);
    }

    #[test]
    fn dropping_the_menu_stops_the_driver() {
        let host = Rc::new(HeadlessHost::<u8>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host, ticks.clone());
        let menu = menus.create_menu("m", 1).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        assert_eq!(ticks.active_repeating(), 1);
        drop(menu);
        ticks.tick();
        assert_eq!(ticks.active_repeating(), 0);
    }

    #[test]
    fn tick_hooks_may_use_their_own_menu() {
        let host = Rc::new(HeadlessHost::<u8>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host.clone(), ticks.clone());
        let menu = menus.create_menu("m", 1).unwrap();
        let seen = Rc::new(Cell::new(0_usize));
        let (m, s) = (menu.clone(), seen.clone());
        let counter = Item::with_tick_hook(Icon::new(0), move |icon| {
            s.set(m.viewers().len());
            (*icon.get() < 3).then(|| Icon::new(icon.get() + 1))
        });
        menu.add_item(4, counter).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        ticks.advance(2);
        assert_eq!(seen.get(), 1, "the hook sees the attached viewer");

        ticks.advance(4);
        let view = menu.view().unwrap();
        assert_eq!(host.cell(view, 4).map(|i| *i.get()), Some(3));
        // The hook holds a handle to the menu; removing the item breaks the cycle.
        menu.remove_item(4).unwrap();
    }

    #[test]
    fn a_hook_can_remove_its_own_item() {
        let host = Rc::new(HeadlessHost::<u8>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host.clone(), ticks.clone());
        let menu = menus.create_menu("m", 1).unwrap();
        let m = menu.clone();
        let fleeting = Item::with_tick_hook(Icon::new(7), move |_| {
            m.remove_item(0).unwrap();
            Some(Icon::new(8))
        });
        menu.add_item(0, fleeting).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        let view = menu.view().unwrap();
        assert_eq!(host.cell(view, 0).map(|i| *i.get()), Some(7));

        ticks.advance(3);
        assert!(!menu.contains_item(0));
        assert!(host.cell(view, 0).is_none(), "the result of a removed item is dropped");
    }
}
