// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identities handed out by the host.

/// Identity of an observer (a player, a client connection, a test actor).
///
/// The host chooses the values; the menu engine only compares them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewerId(pub u64);

/// Identity of a view created by a [`Host`](crate::Host).
///
/// Used to route interaction and close notifications back to the menu that owns the view.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u64);

impl core::fmt::Display for ViewerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "viewer#{}", self.0)
    }
}

impl core::fmt::Display for ViewId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}
