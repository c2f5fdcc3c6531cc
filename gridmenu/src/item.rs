// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Displayable items.
//!
//! An [`Item`] pairs an [`Icon`] with per-kind click handlers and an optional animation.
//! The menu polls every item once per tick; [`Item::poll`] reports whether the icon changed since
//! the previous poll, either because [`Item::set_icon`] was called or because the animation moved.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use gridmenu_host::Icon;

use crate::click::{Click, ClickHandler, ClickKind, HandlerTable};
use crate::error::{ConfigurationError, Result};

static NEXT_ITEM_ID: AtomicUsize = AtomicUsize::new(1);

/// Stable identity of an item, unique for the lifetime of the process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(usize);

impl ItemId {
    fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A per-tick hook: return a new icon to replace the current one.
pub type TickHook<T> = Rc<dyn Fn(&Icon<T>) -> Option<Icon<T>>>;

enum Animation<T> {
    Still,
    Cycle {
        frames: Vec<Icon<T>>,
        period: u32,
        countdown: u32,
        index: usize,
    },
    Hook(TickHook<T>),
}

/// A displayable unit with click handlers.
pub struct Item<T: 'static> {
    id: ItemId,
    icon: Icon<T>,
    handlers: HandlerTable<T>,
    animation: Animation<T>,
    changed: bool,
}

impl<T: 'static> core::fmt::Debug for Item<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let animation = match &self.animation {
            Animation::Still => "still",
            Animation::Cycle { .. } => "cycle",
            Animation::Hook(_) => "hook",
        };
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("handlers", &self.handlers)
            .field("animation", &animation)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Item<T> {
    /// A static item.
    pub fn new(icon: Icon<T>) -> Self {
        Self::with_animation(icon, Animation::Still)
    }

    /// An item that advances through `frames`, one step every `period` ticks, wrapping around.
    ///
    /// Starts on the first frame.
    pub fn cycling(frames: Vec<Icon<T>>, period: u32) -> Result<Self> {
        if period == 0 {
            return Err(ConfigurationError::ZeroPeriod.into());
        }
        let Some(first) = frames.first().cloned() else {
            return Err(ConfigurationError::NoFrames.into());
        };
        Ok(Self::with_animation(
            first,
            Animation::Cycle {
                frames,
                period,
                countdown: period,
                index: 0,
            },
        ))
    }

    /// An item whose icon is replaced whenever `hook` returns `Some` during a poll.
    ///
    /// When the item sits in a menu, the hook runs on the menu's tick with the menu unborrowed, so
    /// it may read or change the menu.
    pub fn with_tick_hook(
        icon: Icon<T>,
        hook: impl Fn(&Icon<T>) -> Option<Icon<T>> + 'static,
    ) -> Self {
        Self::with_animation(icon, Animation::Hook(Rc::new(hook)))
    }

    fn with_animation(icon: Icon<T>, animation: Animation<T>) -> Self {
        Self {
            id: ItemId::next(),
            icon,
            handlers: HandlerTable::default(),
            animation,
            changed: false,
        }
    }

    /// Builder form of [`set_handler`](Self::set_handler).
    #[must_use]
    pub fn on(mut self, kind: ClickKind, handler: impl Fn(&Click<T>) + 'static) -> Self {
        self.handlers.set(kind, Rc::new(handler));
        self
    }

    /// Install `handler` for clicks of `kind`.
    pub fn set_handler(&mut self, kind: ClickKind, handler: ClickHandler<T>) {
        self.handlers.set(kind, handler);
    }

    /// Remove the handler for `kind`.
    pub fn remove_handler(&mut self, kind: ClickKind) -> Option<ClickHandler<T>> {
        self.handlers.remove(kind)
    }

    /// The handler for `kind`, if any.
    pub fn handler(&self, kind: ClickKind) -> Option<&ClickHandler<T>> {
        self.handlers.get(kind)
    }

    /// All handlers.
    pub fn handlers(&self) -> &HandlerTable<T> {
        &self.handlers
    }

    /// Identity of this item.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Current icon.
    pub fn icon(&self) -> &Icon<T> {
        &self.icon
    }

    /// Replace the icon. The next [`poll`](Self::poll) reports a change.
    pub fn set_icon(&mut self, icon: Icon<T>) {
        self.icon = icon;
        self.changed = true;
    }

    /// Whether the item changes on its own over time.
    pub fn is_animated(&self) -> bool {
        !matches!(self.animation, Animation::Still)
    }

    /// Advance the animation by one tick and report whether the icon changed since the last poll.
    pub fn poll(&mut self) -> bool {
        let (mut changed, hook) = self.poll_builtin();
        if let Some((hook, icon)) = hook
            && let Some(next) = hook(&icon)
        {
            self.icon = next;
            changed = true;
        }
        changed
    }

    /// The part of [`poll`](Self::poll) that runs no user code.
    ///
    /// A tick hook is handed back together with the icon it should see, so the caller can run it
    /// later and apply the result with [`apply_hooked`](Self::apply_hooked).
    pub(crate) fn poll_builtin(&mut self) -> (bool, Option<(TickHook<T>, Icon<T>)>) {
        let mut changed = core::mem::take(&mut self.changed);
        let mut hook = None;
        match &mut self.animation {
            Animation::Still => {}
            Animation::Cycle {
                frames,
                period,
                countdown,
                index,
            } => {
                *countdown -= 1;
                if *countdown == 0 {
                    *countdown = *period;
                    *index = (*index + 1) % frames.len();
                    self.icon = frames[*index].clone();
                    changed = true;
                }
            }
            Animation::Hook(h) => hook = Some((h.clone(), self.icon.clone())),
        }
        (changed, hook)
    }

    /// Show the icon a tick hook returned.
    pub(crate) fn apply_hooked(&mut self, icon: Icon<T>) {
        self.icon = icon;
    }

    /// An independent item: icons are deep-copied, handlers are shared, the id is new.
    pub fn copy(&self) -> Self
    where
        T: Clone,
    {
        let (icon, animation) = match &self.animation {
            Animation::Still => (self.icon.deep_copy(), Animation::Still),
            Animation::Cycle {
                frames,
                period,
                countdown,
                index,
            } => {
                let on_frame = self.icon.same(&frames[*index]);
                let frames: Vec<_> = frames.iter().map(Icon::deep_copy).collect();
                let icon = if on_frame {
                    frames[*index].clone()
                } else {
                    self.icon.deep_copy()
                };
                (
                    icon,
                    Animation::Cycle {
                        frames,
                        period: *period,
                        countdown: *countdown,
                        index: *index,
                    },
                )
            }
            Animation::Hook(hook) => (self.icon.deep_copy(), Animation::Hook(hook.clone())),
        };
        Self {
            id: ItemId::next(),
            icon,
            handlers: self.handlers.clone(),
            animation,
            changed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;

    #[test]
    fn ids_are_unique() {
        let a = Item::new(Icon::new(1_u8));
        let b = Item::new(Icon::new(1_u8));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn set_icon_reports_once() {
        let mut item = Item::new(Icon::new(1_u8));
        assert!(!item.poll());
        let next = Icon::new(2);
        item.set_icon(next.clone());
        assert!(item.poll());
        assert!(!item.poll(), "the change flag clears after a poll");
        assert!(item.icon().same(&next));
    }

    #[test]
    fn cycling_advances_every_period() {
        let frames = vec![Icon::new('a'), Icon::new('b'), Icon::new('c')];
        let mut item = Item::cycling(frames.clone(), 2).unwrap();
        assert!(item.is_animated());
        assert!(item.icon().same(&frames[0]));
        let changes: Vec<bool> = (0..6).map(|_| item.poll()).collect();
        assert_eq!(changes, vec![false, true, false, true, false, true]);
        assert!(item.icon().same(&frames[0]), "wraps back to the first frame");
    }

    #[test]
    fn cycling_rejects_bad_input() {
        assert_eq!(
            Item::<u8>::cycling(Vec::new(), 1).unwrap_err(),
            ConfigurationError::NoFrames.into()
        );
        assert_eq!(
            Item::cycling(vec![Icon::new(1_u8)], 0).unwrap_err(),
            ConfigurationError::ZeroPeriod.into()
        );
    }

    #[test]
    fn hook_replaces_icon_when_it_returns_some() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let mut item = Item::with_tick_hook(Icon::new(0_u32), move |icon| {
            c.set(c.get() + 1);
            (*icon.get() < 2).then(|| Icon::new(icon.get() + 1))
        });
        assert!(item.poll());
        assert!(item.poll());
        assert!(!item.poll());
        assert_eq!(*item.icon().get(), 2);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn copy_is_independent_but_shares_handlers() {
        let item = Item::new(Icon::new(5_u8)).on(ClickKind::Primary, |_| {});
        let copy = item.copy();
        assert_ne!(copy.id(), item.id());
        assert!(!copy.icon().same(item.icon()));
        assert_eq!(copy.icon().get(), item.icon().get());
        let (a, b) = (
            item.handler(ClickKind::Primary).unwrap(),
            copy.handler(ClickKind::Primary).unwrap(),
        );
        assert!(Rc::ptr_eq(a, b));
    }

    #[test]
    fn copied_cycle_keeps_its_position() {
        let frames = vec![Icon::new(1_u8), Icon::new(2), Icon::new(3)];
        let mut item = Item::cycling(frames, 1).unwrap();
        item.poll();
        let mut copy = item.copy();
        assert_eq!(*copy.icon().get(), 2);
        assert!(copy.poll());
        assert_eq!(*copy.icon().get(), 3);
        assert_eq!(*item.icon().get(), 2);
    }
}
