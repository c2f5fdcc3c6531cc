// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Every error is a synchronous precondition failure reported at configuration time.
//! A failed call leaves the menu exactly as it was.

use thiserror::Error;

/// Invalid construction parameters.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Menus have between one and six rows.
    #[error("row count must be between 1 and 6, got {0}")]
    Rows(u8),
    /// A pageable menu without reserved slots could never show a pageable item.
    #[error("a pageable menu needs at least one reserved slot")]
    NoReservedSlots,
    /// A reserved slot lies outside the grid.
    #[error("reserved slot {slot} is outside the menu ({slot_count} slots)")]
    ReservedOutOfRange {
        /// The offending slot.
        slot: usize,
        /// Number of slots in the menu.
        slot_count: usize,
    },
    /// A reserved slot appears twice.
    #[error("reserved slot {0} is listed more than once")]
    DuplicateReservedSlot(usize),
    /// A cycling item was created without frames.
    #[error("a cycling item needs at least one frame")]
    NoFrames,
    /// A cycling item was created with a zero period.
    #[error("a cycling item needs a period of at least one tick")]
    ZeroPeriod,
}

/// Errors returned by menu operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MenuError {
    /// Construction parameters were rejected.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The slot is not inside `[0, slot_count)`.
    #[error("slot {slot} is outside the menu ({slot_count} slots)")]
    OutOfRange {
        /// The offending slot.
        slot: usize,
        /// Number of slots in the menu.
        slot_count: usize,
    },
    /// The slot belongs to the pagination overlay and cannot hold a regular or navigation item.
    #[error("slot {slot} is reserved for pageable items")]
    ReservedSlot {
        /// The offending slot.
        slot: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = MenuError> = core::result::Result<T, E>;
