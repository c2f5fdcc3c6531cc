// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables shared by every menu a [`Menus`](crate::Menus) factory creates.

use crate::click::ClickMask;

/// Menu behaviour knobs.
///
/// ```
/// use gridmenu::{ClickMask, MenuOptions};
///
/// let opts = MenuOptions::default()
///     .with_nav_debounce(2)
///     .with_always_intercept(ClickMask::STRUCTURAL | ClickMask::DROP_ALL);
/// assert_eq!(opts.tick_interval, 1);
/// assert_eq!(opts.nav_debounce, 2);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MenuOptions {
    /// Ticks between two polls of animated items.
    pub tick_interval: u32,
    /// Ticks a navigation lock is held after a page turn.
    pub nav_debounce: u32,
    /// Kinds intercepted even when the click lands outside the menu.
    pub always_intercept: ClickMask,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            tick_interval: 1,
            nav_debounce: 5,
            always_intercept: ClickMask::STRUCTURAL,
        }
    }
}

impl MenuOptions {
    /// Set [`tick_interval`](Self::tick_interval). Zero is treated as one.
    #[must_use]
    pub fn with_tick_interval(mut self, ticks: u32) -> Self {
        self.tick_interval = ticks.max(1);
        self
    }

    /// Set [`nav_debounce`](Self::nav_debounce).
    #[must_use]
    pub fn with_nav_debounce(mut self, ticks: u32) -> Self {
        self.nav_debounce = ticks;
        self
    }

    /// Set [`always_intercept`](Self::always_intercept).
    #[must_use]
    pub fn with_always_intercept(mut self, mask: ClickMask) -> Self {
        self.always_intercept = mask;
        self
    }
}
