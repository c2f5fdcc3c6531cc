// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Menus: slot contents, viewers, and the path from a content change to a cell write.
//!
//! ## Overview
//!
//! A [`Menu`] is a cheap, cloneable handle to shared menu state. All state lives behind one
//! `RefCell`. Click handlers, open and close callbacks, tick hooks, `Host::show`, and the
//! scheduler always run with the state released. View creation and cell writes run under the
//! borrow, as do the closures given to [`Menu::modify_item`] and
//! [`PageableMenu::modify_pageable_item`](crate::PageableMenu::modify_pageable_item); none of
//! those may call back into the menu.
//!
//! Operations first decide what has to happen and collect it as effects, then release the state
//! and hand the effects to the scheduler:
//!
//! - a flush of queued slots on one instance (next tick),
//! - completing an open: flush pending slots, register the viewer, show the view (next tick),
//! - a page turn (next tick) and its delayed navigation unlock.
//!
//! ## Update path
//!
//! Every content change calls `require_update` for each instance (root and mirrors):
//!
//! - without a view nothing happens; the view starts fully pending when it is created,
//! - without viewers the slot is recorded as pending,
//! - with viewers the slot is queued and a single flush is scheduled for the next tick.
//!
//! Flushes compare icons by identity and skip cells that already show the right thing, so
//! requesting the same update twice costs at most one write.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};

use gridmenu_host::{Host, Icon, Scheduler, Task, TaskHandle, ViewId, ViewerId};
use tracing::{debug, trace, warn};

use crate::click::{self, Click, ClickHandler, ClickKind, HandlerTable, Interaction, Route, Verdict};
use crate::error::{ConfigurationError, Result};
use crate::instance::{Arena, Instance, InstanceId};
use crate::item::Item;
use crate::menus::ViewRegistry;
use crate::options::MenuOptions;
use crate::pages::{PageLayout, Resolved, Step};
use crate::pending::{self, Decision, FlushReport, Pending, Target};
use crate::slots::SlotStore;

/// A callback receiving the menu and a viewer (open and close notifications).
pub type ViewerHandler<T> = Rc<dyn Fn(&Menu<T>, ViewerId)>;

/// Collaborators and options a menu is bound to.
pub(crate) struct Env<T: 'static> {
    pub(crate) host: Rc<dyn Host<T>>,
    pub(crate) scheduler: Rc<dyn Scheduler>,
    pub(crate) options: MenuOptions,
    pub(crate) registry: ViewRegistry<T>,
}

impl<T: 'static> Clone for Env<T> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            scheduler: self.scheduler.clone(),
            options: self.options,
            registry: self.registry.clone(),
        }
    }
}

struct Callbacks<T: 'static> {
    any: Option<ClickHandler<T>>,
    by_kind: HandlerTable<T>,
    open: Option<ViewerHandler<T>>,
    close: Option<ViewerHandler<T>>,
}

impl<T: 'static> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            any: None,
            by_kind: HandlerTable::default(),
            open: None,
            close: None,
        }
    }
}

impl<T: 'static> Clone for Callbacks<T> {
    fn clone(&self) -> Self {
        Self {
            any: self.any.clone(),
            by_kind: self.by_kind.clone(),
            open: self.open.clone(),
            close: self.close.clone(),
        }
    }
}

/// Deferred work produced by a state change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    Flush(InstanceId),
    Open(InstanceId, ViewerId),
    Navigate(InstanceId, Step),
    Unlock(InstanceId),
}

pub(crate) struct MenuCore<T: 'static> {
    this: Weak<RefCell<Self>>,
    pub(crate) title: String,
    pub(crate) rows: u8,
    pub(crate) slots: SlotStore<T>,
    pub(crate) pages: Option<PageLayout<T>>,
    callbacks: Callbacks<T>,
    pub(crate) instances: Arena<T>,
    pub(crate) ticker: Option<TaskHandle>,
    pub(crate) env: Env<T>,
}

impl<T: 'static> Drop for MenuCore<T> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        let views: Vec<ViewId> = self.instances.iter().filter_map(|(_, i)| i.view_id()).collect();
        self.env.registry.unregister_all(&views);
    }
}

/// The item shown in `slot` on `page`, taking the pagination overlay into account.
pub(crate) fn effective<'a, T: 'static>(
    slots: &'a SlotStore<T>,
    pages: Option<&'a PageLayout<T>>,
    page: usize,
    slot: usize,
) -> Option<&'a Item<T>> {
    let Some(layout) = pages else {
        return slots.get(slot);
    };
    match layout.resolve(slot, page) {
        Resolved::Next => layout.next.as_ref().map(|n| &n.item),
        Resolved::Previous => layout.previous.as_ref().map(|n| &n.item),
        Resolved::Pageable(index) => layout.items.get(index),
        Resolved::Vacant => None,
        Resolved::Regular => slots.get(slot),
    }
}

impl<T: 'static> MenuCore<T> {
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.slot_count()
    }

    /// Fail unless `slot` can hold a regular item.
    pub(crate) fn check_regular(&self, slot: usize) -> Result<()> {
        self.slots.check(slot)?;
        if let Some(layout) = &self.pages {
            layout.check_unreserved(slot)?;
        }
        Ok(())
    }

    pub(crate) fn require(&mut self, target: Target, effects: &mut Vec<Effect>) {
        for id in self.instances.ids() {
            self.require_on(id, target, effects);
        }
    }

    pub(crate) fn require_on(&mut self, id: InstanceId, target: Target, effects: &mut Vec<Effect>) {
        let Some(inst) = self.instances.get_mut(id) else {
            return;
        };
        match pending::decide(inst.view.is_some(), inst.observed()) {
            Decision::Ignore => {}
            Decision::Defer => inst.pending.insert(target),
            Decision::Apply => {
                inst.queued.insert(target);
                if !inst.flush_scheduled {
                    inst.flush_scheduled = true;
                    effects.push(Effect::Flush(id));
                }
            }
        }
    }

    /// Write queued slots of one instance. Runs on the tick.
    fn flush(&mut self, id: InstanceId) -> Option<FlushReport> {
        let Self {
            slots,
            pages,
            instances,
            ..
        } = self;
        let inst = instances.get_mut(id)?;
        inst.flush_scheduled = false;
        let queued = inst.queued.take();
        if !inst.observed() {
            // Everyone left before the tick; keep it for the next open.
            inst.pending.merge(queued);
            return None;
        }
        let page = inst.page;
        let view = inst.view.as_mut()?;
        Some(pending::materialize(
            &mut **view,
            &queued.slots(slots.slot_count()),
            |slot| effective(slots, pages.as_ref(), page, slot).map(|i| i.icon().clone()),
        ))
    }

    fn ensure_view(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(id) else {
            return;
        };
        if inst.view.is_some() {
            return;
        }
        let view = self.env.host.create_view(self.rows, &self.title);
        let view_id = view.id();
        inst.view = Some(view);
        inst.pending = Pending::All;
        self.env.registry.register(view_id, self.this.clone());
        debug!(
            title = %self.title,
            view = %view_id,
            mirror = inst.is_mirror(),
            "view materialised"
        );
    }

    /// Remove `viewer` from whichever instance knows it. Returns whether it was viewing.
    ///
    /// With `view` set, only a viewer of that view is detached.
    fn detach_viewer(&mut self, viewer: ViewerId, view: Option<ViewId>) -> bool {
        let Some(id) = self.instances.find_viewer(viewer) else {
            return false;
        };
        let Some(inst) = self.instances.get_mut(id) else {
            return false;
        };
        if view.is_some_and(|v| inst.view_id() != Some(v)) {
            return false;
        }
        let was_viewing = inst.viewers.remove(&viewer);
        inst.opening.remove(&viewer);
        if inst.is_mirror() && !inst.is_claimed() {
            self.drop_mirror(id);
        }
        was_viewing
    }

    fn drop_mirror(&mut self, id: InstanceId) {
        if let Some(mirror) = self.instances.remove(id) {
            if let Some(view) = mirror.view_id() {
                self.env.registry.unregister(view);
            }
            debug!(
                title = %self.title,
                mirrors = self.instances.mirror_count(),
                "mirror detached"
            );
        }
    }

    /// Pick the instance for `viewer`, make sure it has a view, and mark the open as pending.
    ///
    /// Returns the effects and whether the viewer left another instance of this menu.
    fn begin_open(&mut self, viewer: ViewerId, page: usize) -> (Vec<Effect>, bool) {
        let mut effects = Vec::new();
        let left = self.detach_viewer(viewer, None);
        let id = match self.pages.as_ref().map(|l| l.clamp(page)) {
            None => InstanceId::ROOT,
            Some(page) if !self.instances.root().is_claimed() => {
                let root = self.instances.root_mut();
                if root.page != page {
                    root.page = page;
                    self.require_on(InstanceId::ROOT, Target::All, &mut effects);
                }
                InstanceId::ROOT
            }
            Some(page) => {
                let id = self.instances.insert(Instance::mirror(page));
                debug!(
                    title = %self.title,
                    viewer = %viewer,
                    page,
                    mirrors = self.instances.mirror_count(),
                    "mirror created"
                );
                id
            }
        };
        self.ensure_view(id);
        if let Some(inst) = self.instances.get_mut(id) {
            inst.opening.insert(viewer);
        }
        effects.push(Effect::Open(id, viewer));
        (effects, left)
    }

    /// Bring the view up to date for an open completing on this tick.
    ///
    /// The viewer leaves the opening set here and is registered by [`register`](Self::register)
    /// once the host has shown the view.
    fn prepare_attach(
        &mut self,
        id: InstanceId,
        viewer: ViewerId,
    ) -> Option<(ViewId, FlushReport)> {
        let Self {
            slots,
            pages,
            instances,
            ..
        } = self;
        let inst = instances.get_mut(id)?;
        if !inst.opening.remove(&viewer) {
            // Closed or reopened elsewhere before the tick.
            return None;
        }
        let dirty = inst.pending.take();
        let page = inst.page;
        let view = inst.view.as_mut()?;
        let report = pending::materialize(
            &mut **view,
            &dirty.slots(slots.slot_count()),
            |slot| effective(slots, pages.as_ref(), page, slot).map(|i| i.icon().clone()),
        );
        Some((view.id(), report))
    }

    /// Add `viewer` to the instance whose view the host just showed.
    fn register(&mut self, id: InstanceId, viewer: ViewerId) -> bool {
        if self.instances.find_viewer(viewer).is_some() {
            // Reopened while the host was showing the view.
            return false;
        }
        match self.instances.get_mut(id) {
            Some(inst) => inst.viewers.insert(viewer),
            None => false,
        }
    }

    pub(crate) fn request_turn(&mut self, viewer: ViewerId, step: Step) -> Vec<Effect> {
        if self.pages.is_none() {
            return Vec::new();
        }
        let Some(id) = self.instances.find_viewer(viewer) else {
            warn!(
                title = %self.title,
                viewer = %viewer,
                "navigation requested by a viewer not on this menu"
            );
            return Vec::new();
        };
        let Some(inst) = self.instances.get_mut(id) else {
            return Vec::new();
        };
        if inst.nav_locked {
            trace!(viewer = %viewer, "navigation locked");
            return Vec::new();
        }
        inst.nav_locked = true;
        alloc::vec![Effect::Navigate(id, step)]
    }

    fn turn_page(&mut self, id: InstanceId, step: Step) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(count) = self.pages.as_ref().map(PageLayout::page_count) else {
            return effects;
        };
        let Some(inst) = self.instances.get_mut(id) else {
            return effects;
        };
        let from = inst.page;
        inst.page = step.apply(from, count);
        debug!(title = %self.title, from, to = inst.page, "page turned");
        self.require_on(id, Target::All, &mut effects);
        effects.push(Effect::Unlock(id));
        effects
    }

    fn unlock(&mut self, id: InstanceId) {
        if let Some(inst) = self.instances.get_mut(id) {
            inst.nav_locked = false;
        }
    }
}

/// A slot-addressable grid menu.
///
/// Handles are cheap to clone and all refer to the same menu. Create menus with
/// [`Menus::create_menu`](crate::Menus::create_menu).
///
/// ## Borrowing
///
/// [`item`](Self::item) and [`items`](Self::items) return guards into the menu state; drop them
/// before mutating the menu. Closures passed to [`modify_item`](Self::modify_item) must not call
/// back into the menu.
pub struct Menu<T: 'static> {
    pub(crate) core: Rc<RefCell<MenuCore<T>>>,
}

impl<T: 'static> Clone for Menu<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T: 'static> core::fmt::Debug for Menu<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.core.try_borrow() {
            Ok(core) => f
                .debug_struct("Menu")
                .field("title", &core.title)
                .field("rows", &core.rows)
                .field("items", &core.slots.len())
                .field("pageable", &core.pages.is_some())
                .field("mirrors", &core.instances.mirror_count())
                .finish_non_exhaustive(),
            Err(_) => f.debug_struct("Menu").finish_non_exhaustive(),
        }
    }
}

impl<T: 'static> Menu<T> {
    pub(crate) fn create(
        env: Env<T>,
        title: String,
        rows: u8,
        reserved: Option<Vec<usize>>,
    ) -> Result<Self> {
        if !(1..=6).contains(&rows) {
            return Err(ConfigurationError::Rows(rows).into());
        }
        let slot_count = usize::from(rows) * 9;
        let pages = reserved
            .map(|reserved| PageLayout::new(reserved, slot_count))
            .transpose()?;
        debug!(title = %title, rows, pageable = pages.is_some(), "menu created");
        let core = Rc::new_cyclic(|this| {
            RefCell::new(MenuCore {
                this: this.clone(),
                title,
                rows,
                slots: SlotStore::new(slot_count),
                pages,
                callbacks: Callbacks::default(),
                instances: Arena::new(),
                ticker: None,
                env,
            })
        });
        Ok(Self { core })
    }

    pub(crate) fn upgrade(weak: &Weak<RefCell<MenuCore<T>>>) -> Option<Self> {
        weak.upgrade().map(|core| Self { core })
    }

    /// Whether both handles refer to the same menu.
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    /// Run `f` against the state, then schedule whatever it decided.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut MenuCore<T>, &mut Vec<Effect>) -> R) -> R {
        let mut effects = Vec::new();
        let out = f(&mut self.core.borrow_mut(), &mut effects);
        self.submit(effects);
        out
    }

    pub(crate) fn submit(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        let (scheduler, debounce) = {
            let core = self.core.borrow();
            (core.env.scheduler.clone(), core.env.options.nav_debounce)
        };
        for effect in effects {
            let weak = Rc::downgrade(&self.core);
            let task: Task = match effect {
                Effect::Flush(id) => Box::new(move || {
                    if let Some(menu) = Self::upgrade(&weak) {
                        menu.run_flush(id);
                    }
                }),
                Effect::Open(id, viewer) => Box::new(move || {
                    if let Some(menu) = Self::upgrade(&weak) {
                        menu.finish_open(id, viewer);
                    }
                }),
                Effect::Navigate(id, step) => Box::new(move || {
                    if let Some(menu) = Self::upgrade(&weak) {
                        let effects = menu.core.borrow_mut().turn_page(id, step);
                        menu.submit(effects);
                    }
                }),
                Effect::Unlock(id) => {
                    scheduler.run_after(
                        debounce,
                        Box::new(move || {
                            if let Some(menu) = Self::upgrade(&weak) {
                                menu.core.borrow_mut().unlock(id);
                            }
                        }),
                    );
                    continue;
                }
            };
            scheduler.run_next_tick(task);
        }
    }

    fn run_flush(&self, id: InstanceId) {
        let report = self.core.borrow_mut().flush(id);
        if let Some(report) = report {
            trace!(
                written = report.written,
                cleared = report.cleared,
                unchanged = report.unchanged,
                "flushed"
            );
        }
    }

    fn finish_open(&self, id: InstanceId, viewer: ViewerId) {
        let prepared = self.core.borrow_mut().prepare_attach(id, viewer);
        let Some((view, report)) = prepared else {
            trace!(viewer = %viewer, "open superseded before the tick");
            return;
        };
        let host = self.core.borrow().env.host.clone();
        host.show(viewer, view);
        if !self.core.borrow_mut().register(id, viewer) {
            trace!(viewer = %viewer, view = %view, "open superseded while showing");
            return;
        }
        debug!(
            viewer = %viewer,
            view = %view,
            written = report.written,
            cleared = report.cleared,
            "viewer attached"
        );
        self.ensure_ticker();
        let on_open = self.core.borrow().callbacks.open.clone();
        if let Some(on_open) = on_open {
            on_open(self, viewer);
        }
    }

    pub(crate) fn open_at(&self, viewer: ViewerId, page: usize) {
        let (effects, left) = self.core.borrow_mut().begin_open(viewer, page);
        if left {
            self.fire_close(viewer);
        }
        self.submit(effects);
    }

    fn fire_close(&self, viewer: ViewerId) {
        let on_close = self.core.borrow().callbacks.close.clone();
        if let Some(on_close) = on_close {
            on_close(self, viewer);
        }
    }

    /// Show the menu to `viewer`.
    ///
    /// The view is created now if needed; the pending content is written and the view is shown
    /// on the next tick. A viewer already looking at this menu is moved, not duplicated.
    /// Pageable menus open on their first page.
    pub fn open(&self, viewer: ViewerId) {
        self.open_at(viewer, 0);
    }

    /// Host notification: `viewer` closed the menu.
    pub fn handle_close(&self, viewer: ViewerId) {
        self.close_on(None, viewer);
    }

    pub(crate) fn close_on(&self, view: Option<ViewId>, viewer: ViewerId) {
        let left = self.core.borrow_mut().detach_viewer(viewer, view);
        if left {
            debug!(viewer = %viewer, "viewer left");
            self.fire_close(viewer);
        }
    }

    /// Host notification: `interaction` happened on the view the viewer is looking at.
    pub fn handle_click(&self, interaction: Interaction) -> Verdict {
        self.click_on(None, interaction)
    }

    pub(crate) fn click_on(&self, view: Option<ViewId>, ix: Interaction) -> Verdict {
        let (sequence, page) = {
            let core = self.core.borrow();
            match click::route(core.slot_count(), core.env.options.always_intercept, &ix) {
                Route::Pass => return Verdict::Passed,
                Route::Intercept => return Verdict::Intercepted,
                Route::Dispatch => {}
            }
            let id = view
                .and_then(|v| core.instances.find_view(v))
                .or_else(|| core.instances.find_viewer(ix.viewer))
                .unwrap_or(InstanceId::ROOT);
            let page = core.instances.get(id).map_or(0, |i| i.page);
            let item = effective(&core.slots, core.pages.as_ref(), page, ix.slot);
            let sequence = click::sequence(
                core.callbacks.any.as_ref(),
                &core.callbacks.by_kind,
                item,
                ix.kind,
            );
            (sequence, page)
        };
        let click = Click {
            viewer: ix.viewer,
            slot: ix.slot,
            kind: ix.kind,
            page,
            menu: self.clone(),
        };
        for step in sequence {
            trace!(phase = ?step.phase, slot = ix.slot, kind = ?ix.kind, "click handler");
            (step.handler)(&click);
        }
        Verdict::Intercepted
    }

    /// Title given at creation.
    pub fn title(&self) -> String {
        self.core.borrow().title.clone()
    }

    /// Number of rows.
    pub fn rows(&self) -> u8 {
        self.core.borrow().rows
    }

    /// Number of slots (`rows × 9`).
    pub fn slot_count(&self) -> usize {
        self.core.borrow().slot_count()
    }

    /// Whether the menu has a pagination overlay.
    pub fn is_pageable(&self) -> bool {
        self.core.borrow().pages.is_some()
    }

    /// Place `item` at `slot`, returning the previous occupant.
    ///
    /// Fails if the slot is outside the menu or reserved for pageable items.
    pub fn add_item(&self, slot: usize, item: Item<T>) -> Result<Option<Item<T>>> {
        self.mutate(|core, effects| {
            core.check_regular(slot)?;
            let previous = core.slots.put(slot, item)?;
            core.require(Target::Slot(slot), effects);
            Ok(previous)
        })
    }

    /// Empty `slot`, returning its occupant.
    pub fn remove_item(&self, slot: usize) -> Result<Option<Item<T>>> {
        self.mutate(|core, effects| {
            let removed = core.slots.remove(slot)?;
            if removed.is_some() {
                core.require(Target::Slot(slot), effects);
            }
            Ok(removed)
        })
    }

    /// Replace every regular item. Nothing changes if any slot is rejected.
    pub fn set_items(&self, items: impl IntoIterator<Item = (usize, Item<T>)>) -> Result<()> {
        let items: Vec<_> = items.into_iter().collect();
        self.mutate(|core, effects| {
            for (slot, _) in &items {
                core.check_regular(*slot)?;
            }
            core.slots.clear();
            for (slot, item) in items {
                core.slots.put(slot, item)?;
            }
            core.require(Target::All, effects);
            Ok(())
        })
    }

    /// Remove every regular item.
    pub fn clear_items(&self) {
        self.mutate(|core, effects| {
            core.slots.clear();
            core.require(Target::All, effects);
        });
    }

    /// The item shown in `slot` on the root view (regular, pageable, or navigation).
    pub fn item(&self, slot: usize) -> Option<Ref<'_, Item<T>>> {
        Ref::filter_map(self.core.borrow(), |core| {
            let page = core.instances.root().page;
            effective(&core.slots, core.pages.as_ref(), page, slot)
        })
        .ok()
    }

    /// Read-only access to the regular items.
    pub fn items(&self) -> Ref<'_, SlotStore<T>> {
        Ref::map(self.core.borrow(), |core| &core.slots)
    }

    /// Whether [`item`](Self::item) would return something.
    pub fn contains_item(&self, slot: usize) -> bool {
        self.item(slot).is_some()
    }

    /// Mutate the regular item at `slot` in place and refresh the slot.
    ///
    /// `f` runs while the menu is borrowed and must not call back into it.
    pub fn modify_item<R>(&self, slot: usize, f: impl FnOnce(&mut Item<T>) -> R) -> Option<R> {
        self.mutate(|core, effects| {
            let out = f(core.slots.get_mut(slot)?);
            core.require(Target::Slot(slot), effects);
            Some(out)
        })
    }

    /// Refresh `target` on every view of this menu.
    pub fn require_update(&self, target: Target) {
        self.mutate(|core, effects| core.require(target, effects));
    }

    /// Install a handler called for every click inside the menu, before any other handler.
    pub fn on_any_click(&self, handler: impl Fn(&Click<T>) + 'static) {
        self.core.borrow_mut().callbacks.any = Some(Rc::new(handler));
    }

    /// Install a handler for clicks of `kind`, called after the any-kind handler and before the
    /// item's own handler.
    pub fn on_click(&self, kind: ClickKind, handler: impl Fn(&Click<T>) + 'static) {
        self.core
            .borrow_mut()
            .callbacks
            .by_kind
            .set(kind, Rc::new(handler));
    }

    /// Install a handler called after a viewer has been shown the menu.
    pub fn on_open(&self, handler: impl Fn(&Self, ViewerId) + 'static) {
        self.core.borrow_mut().callbacks.open = Some(Rc::new(handler));
    }

    /// Install a handler called after a viewer has left the menu.
    pub fn on_close(&self, handler: impl Fn(&Self, ViewerId) + 'static) {
        self.core.borrow_mut().callbacks.close = Some(Rc::new(handler));
    }

    /// Whether anyone is looking at any view of this menu.
    pub fn has_viewers(&self) -> bool {
        self.core.borrow().instances.has_viewers()
    }

    /// Everyone looking at any view of this menu, ascending.
    pub fn viewers(&self) -> Vec<ViewerId> {
        let core = self.core.borrow();
        let all: BTreeSet<ViewerId> = core
            .instances
            .iter()
            .flat_map(|(_, i)| i.viewers.iter().copied())
            .collect();
        all.into_iter().collect()
    }

    /// The root view, once it exists.
    pub fn view(&self) -> Option<ViewId> {
        self.core.borrow().instances.root().view_id()
    }

    /// The icon currently written into `slot` of the root view.
    pub fn displayed(&self, slot: usize) -> Option<Icon<T>> {
        let core = self.core.borrow();
        core.instances.root().view.as_ref()?.cell(slot)
    }

    /// An independent menu with the same title, rows, callbacks, and deep-copied items.
    ///
    /// The copy has no view and no viewers.
    pub fn copy(&self) -> Self
    where
        T: Clone,
    {
        let core = self.core.borrow();
        let copy = Rc::new_cyclic(|this| {
            RefCell::new(MenuCore {
                this: this.clone(),
                title: core.title.clone(),
                rows: core.rows,
                slots: core.slots.copy(),
                pages: core.pages.as_ref().map(PageLayout::copy),
                callbacks: core.callbacks.clone(),
                instances: Arena::new(),
                ticker: None,
                env: core.env.clone(),
            })
        });
        Self { core: copy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;
    use gridmenu_host::headless::{HeadlessHost, TickScheduler, ViewWrite};

    use crate::Menus;
    use crate::error::MenuError;

    type Fixture = (
        Rc<HeadlessHost<&'static str>>,
        Rc<TickScheduler>,
        Menus<&'static str>,
    );

    fn fixture() -> Fixture {
        let host = Rc::new(HeadlessHost::<&'static str>::new());
        let ticks = Rc::new(TickScheduler::new());
        let menus = Menus::new(host.clone(), ticks.clone());
        (host, ticks, menus)
    }

    #[test]
    fn rows_are_validated() {
        let (_, _, menus) = fixture();
        for rows in 1..=6 {
            let menu = menus.create_menu("m", rows).unwrap();
            assert_eq!(menu.slot_count(), usize::from(rows) * 9);
        }
        for rows in [0, 7] {
            assert_eq!(
                menus.create_menu("m", rows).unwrap_err(),
                MenuError::Configuration(ConfigurationError::Rows(rows))
            );
        }
    }

    #[test]
    fn add_item_is_bounds_checked() {
        let (_, _, menus) = fixture();
        let menu = menus.create_menu("m", 3).unwrap();
        assert!(matches!(
            menu.add_item(27, Item::new(Icon::new("x"))),
            Err(MenuError::OutOfRange { slot: 27, .. })
        ));
        let item = Item::new(Icon::new("x"));
        let id = item.id();
        menu.add_item(0, item).unwrap();
        assert_eq!(menu.item(0).map(|i| i.id()), Some(id));
        assert!(menu.contains_item(0));
        assert!(!menu.contains_item(1));
    }

    #[test]
    fn pending_slot_is_flushed_on_open_and_nowhere_else() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("shop", 3).unwrap();
        let icon = Icon::new("apple");
        menu.add_item(4, Item::new(icon.clone())).unwrap();
        menu.require_update(Target::Slot(4));
        assert!(host.writes().is_empty(), "nobody is looking yet");

        menu.open(ViewerId(1));
        assert!(host.writes().is_empty(), "writes happen on the tick");
        ticks.tick();
        let view = menu.view().unwrap();
        assert_eq!(host.occupied(view), vec![4]);
        assert!(host.cell(view, 4).is_some_and(|i| i.same(&icon)));
        assert_eq!(host.writes(), vec![ViewWrite::Set { view, slot: 4 }]);
        assert_eq!(host.showing(ViewerId(1)), Some(view));
        assert_eq!(menu.viewers(), vec![ViewerId(1)]);
    }

    #[test]
    fn repeated_update_requests_write_once() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        host.take_writes();

        menu.add_item(2, Item::new(Icon::new("a"))).unwrap();
        menu.require_update(Target::Slot(2));
        menu.require_update(Target::Slot(2));
        assert_eq!(ticks.pending(), 1, "a single flush is scheduled");
        ticks.tick();
        assert_eq!(host.take_writes().len(), 1);

        menu.require_update(Target::Slot(2));
        menu.require_update(Target::All);
        ticks.tick();
        assert!(host.writes().is_empty(), "unchanged cells are not rewritten");
    }

    #[test]
    fn changes_while_closed_are_applied_once_on_reopen() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        menu.handle_close(ViewerId(1));
        assert!(!menu.has_viewers());
        let view = menu.view().unwrap();

        menu.add_item(3, Item::new(Icon::new("a"))).unwrap();
        menu.add_item(5, Item::new(Icon::new("b"))).unwrap();
        menu.remove_item(5).unwrap();
        ticks.advance(3);
        assert_eq!(host.write_count(view), 0);

        menu.open(ViewerId(2));
        ticks.tick();
        assert_eq!(host.write_count(view), 1);
        assert_eq!(host.occupied(view), vec![3]);
        assert_eq!(menu.view(), Some(view), "the view is reused");
    }

    #[test]
    fn closing_keeps_view_content() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        menu.add_item(0, Item::new(Icon::new("a"))).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        menu.handle_close(ViewerId(1));
        assert!(menu.displayed(0).is_some());
        assert_eq!(host.occupied(menu.view().unwrap()), vec![0]);
    }

    #[test]
    fn click_handlers_run_in_order() {
        let (_, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        menu.on_any_click(move |_| l.borrow_mut().push("any"));
        let l = log.clone();
        menu.on_click(ClickKind::Primary, move |_| l.borrow_mut().push("kind"));
        let l = log.clone();
        menu.on_click(ClickKind::Secondary, move |_| l.borrow_mut().push("other"));
        let l = log.clone();
        let item = Item::new(Icon::new("a")).on(ClickKind::Primary, move |c| {
            assert_eq!(c.slot(), 4);
            l.borrow_mut().push("item");
        });
        menu.add_item(4, item).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();

        let verdict = menu.handle_click(Interaction::new(ViewerId(1), 4, ClickKind::Primary));
        assert_eq!(verdict, Verdict::Intercepted);
        assert_eq!(*log.borrow(), vec!["any", "kind", "item"]);
    }

    #[test]
    fn clicks_on_empty_slots_are_intercepted_and_reach_global_handlers() {
        let (_, _, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        menu.on_any_click(move |_| h.set(h.get() + 1));
        let verdict = menu.handle_click(Interaction::new(ViewerId(1), 8, ClickKind::Middle));
        assert!(verdict.is_intercepted());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn outside_clicks_pass_unless_structural() {
        let (_, _, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        menu.on_any_click(move |_| h.set(h.get() + 1));
        let v = ViewerId(1);
        assert_eq!(
            menu.handle_click(Interaction::new(v, 20, ClickKind::Primary)),
            Verdict::Passed
        );
        for kind in [
            ClickKind::Double,
            ClickKind::ShiftPrimary,
            ClickKind::ShiftSecondary,
        ] {
            assert_eq!(
                menu.handle_click(Interaction::new(v, 20, kind)),
                Verdict::Intercepted
            );
            assert_eq!(
                menu.handle_click(Interaction::new(v, 3, kind)),
                Verdict::Intercepted
            );
        }
        assert_eq!(hits.get(), 3, "only in-range clicks are dispatched");
    }

    #[test]
    fn handlers_can_mutate_the_menu() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        let item = Item::new(Icon::new("off")).on(ClickKind::Primary, |c| {
            c.menu()
                .modify_item(c.slot(), |item| item.set_icon(Icon::new("on")));
        });
        menu.add_item(1, item).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        menu.handle_click(Interaction::new(ViewerId(1), 1, ClickKind::Primary));
        ticks.tick();
        let view = menu.view().unwrap();
        assert_eq!(host.cell(view, 1).map(|i| *i.get()), Some("on"));
    }

    #[test]
    fn open_and_close_callbacks() {
        let (_, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        menu.on_open(move |m, v| {
            assert!(m.viewers().contains(&v));
            l.borrow_mut().push(("open", v));
        });
        let l = log.clone();
        menu.on_close(move |m, v| {
            assert!(!m.viewers().contains(&v));
            l.borrow_mut().push(("close", v));
        });
        menu.open(ViewerId(1));
        assert!(log.borrow().is_empty());
        ticks.tick();
        menu.handle_close(ViewerId(1));
        menu.handle_close(ViewerId(1));
        assert_eq!(
            *log.borrow(),
            vec![("open", ViewerId(1)), ("close", ViewerId(1))]
        );
    }

    #[test]
    fn close_before_tick_cancels_the_open() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        menu.open(ViewerId(1));
        menu.handle_close(ViewerId(1));
        ticks.tick();
        assert!(host.shown().is_empty());
        assert!(!menu.has_viewers());
    }

    #[test]
    fn reopening_does_not_duplicate_the_viewer() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        menu.open(ViewerId(1));
        ticks.tick();
        assert_eq!(menu.viewers(), vec![ViewerId(1)]);
        assert_eq!(host.shown().len(), 2);
        assert_eq!(host.view_count(), 1);
    }

    #[test]
    fn set_items_is_all_or_nothing() {
        let (_, _, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        menu.add_item(0, Item::new(Icon::new("keep"))).unwrap();
        let err = menu.set_items([
            (1, Item::new(Icon::new("a"))),
            (9, Item::new(Icon::new("b"))),
        ]);
        assert!(err.is_err());
        assert_eq!(menu.items().len(), 1);
        menu.set_items([(5, Item::new(Icon::new("a")))]).unwrap();
        let slots: Vec<_> = menu.items().iter().map(|(s, _)| s).collect();
        assert_eq!(slots, vec![5]);
        menu.clear_items();
        assert!(menu.items().is_empty());
    }

    #[test]
    fn copy_is_detached() {
        let (host, ticks, menus) = fixture();
        let menu = menus.create_menu("m", 1).unwrap();
        menu.add_item(0, Item::new(Icon::new("a"))).unwrap();
        menu.open(ViewerId(1));
        ticks.tick();
        let copy = menu.copy();
        assert!(!copy.same(&menu));
        assert!(!copy.has_viewers());
        assert!(copy.view().is_none());
        copy.remove_item(0).unwrap();
        assert!(menu.contains_item(0));
        ticks.tick();
        assert_eq!(host.occupied(menu.view().unwrap()), vec![0]);
    }
}
