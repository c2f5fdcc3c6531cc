// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick scheduling contract.
//!
//! ## Model
//!
//! The host runs a single cooperative tick loop. Everything that touches a live view is handed
//! to the [`Scheduler`] and executed on that loop, never synchronously from the caller.
//!
//! - Tasks submitted from the same caller run in submission order (FIFO).
//! - A task submitted while a tick is running is never run during that same tick.
//! - Repeating tasks run every `interval` ticks until their [`TaskHandle`] is cancelled.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

/// A one-shot unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// A unit of work run once per interval until cancelled.
pub type RepeatingTask = Box<dyn FnMut()>;

/// Cancellation handle for a repeating task.
///
/// Clones share the same flag: cancelling any clone cancels the task.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    /// Create a live (not cancelled) handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the task; it will not run again.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// The host's tick scheduler.
pub trait Scheduler {
    /// Run `task` at the start of the next tick.
    fn run_next_tick(&self, task: Task);

    /// Run `task` once, `delay_ticks` ticks from now (a delay of `0` behaves like `1`).
    fn run_after(&self, delay_ticks: u32, task: Task);

    /// Run `task` every `interval_ticks` ticks (an interval of `0` behaves like `1`), first
    /// after one interval, until the returned handle is cancelled.
    fn run_every(&self, interval_ticks: u32, task: RepeatingTask) -> TaskHandle;
}
