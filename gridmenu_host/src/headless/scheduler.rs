// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic, manually advanced tick loop.

use alloc::vec::Vec;
use core::cell::RefCell;

use crate::scheduler::{RepeatingTask, Scheduler, Task, TaskHandle};

struct Once {
    due: u64,
    seq: u64,
    task: Task,
}

struct Repeating {
    handle: TaskHandle,
    interval: u64,
    due: u64,
    // Taken out while the task runs so it can schedule more work.
    task: Option<RepeatingTask>,
}

#[derive(Default)]
struct Queue {
    now: u64,
    next_seq: u64,
    once: Vec<Once>,
    repeating: Vec<Repeating>,
}

/// A [`Scheduler`] whose clock only moves when [`tick`](Self::tick) is called.
///
/// ## Ordering
///
/// Within a tick, due one-shot tasks run first in submission order, then due repeating tasks in
/// registration order. Work submitted while a tick runs is due on a later tick.
#[derive(Default)]
pub struct TickScheduler {
    queue: RefCell<Queue>,
}

impl core::fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let q = self.queue.borrow();
        f.debug_struct("TickScheduler")
            .field("now", &q.now)
            .field("once", &q.once.len())
            .field("repeating", &q.repeating.len())
            .finish_non_exhaustive()
    }
}

impl TickScheduler {
    /// Create a scheduler at tick `0` with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick.
    pub fn now(&self) -> u64 {
        self.queue.borrow().now
    }

    /// Number of one-shot tasks not yet run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().once.len()
    }

    /// Number of repeating tasks that have not been cancelled.
    pub fn active_repeating(&self) -> usize {
        self.queue
            .borrow()
            .repeating
            .iter()
            .filter(|r| !r.handle.is_cancelled())
            .count()
    }

    /// Advance the clock by one tick and run everything that became due.
    ///
    /// Returns the number of task invocations.
    pub fn tick(&self) -> usize {
        let (now, mut due) = {
            let mut q = self.queue.borrow_mut();
            q.now += 1;
            let now = q.now;
            let (due, rest): (Vec<Once>, Vec<Once>) =
                core::mem::take(&mut q.once).into_iter().partition(|t| t.due <= now);
            q.once = rest;
            (now, due)
        };
        due.sort_by_key(|t| (t.due, t.seq));
        let mut ran = due.len();
        for t in due {
            (t.task)();
        }

        self.queue
            .borrow_mut()
            .repeating
            .retain(|r| !r.handle.is_cancelled());
        let count = self.queue.borrow().repeating.len();
        for i in 0..count {
            let task = {
                let mut q = self.queue.borrow_mut();
                let r = &mut q.repeating[i];
                if r.due > now || r.handle.is_cancelled() {
                    continue;
                }
                r.due = now + r.interval;
                r.task.take()
            };
            if let Some(mut task) = task {
                task();
                ran += 1;
                self.queue.borrow_mut().repeating[i].task = Some(task);
            }
        }
        self.queue
            .borrow_mut()
            .repeating
            .retain(|r| !r.handle.is_cancelled());
        ran
    }

    /// Run `ticks` ticks. Returns the total number of task invocations.
    pub fn advance(&self, ticks: u32) -> usize {
        (0..ticks).map(|_| self.tick()).sum()
    }

    /// Tick until no one-shot work is queued, or `max_ticks` have elapsed.
    ///
    /// Repeating tasks keep running while this drains but do not keep it alive.
    /// Returns the number of ticks taken.
    pub fn run_until_idle(&self, max_ticks: u32) -> u32 {
        let mut ticks = 0;
        while ticks < max_ticks && self.pending() > 0 {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn push_once(&self, delay: u64, task: Task) {
        let mut q = self.queue.borrow_mut();
        let due = q.now + delay.max(1);
        let seq = q.next_seq;
        q.next_seq += 1;
        q.once.push(Once { due, seq, task });
    }
}

impl Scheduler for TickScheduler {
    fn run_next_tick(&self, task: Task) {
        self.push_once(1, task);
    }

    fn run_after(&self, delay_ticks: u32, task: Task) {
        self.push_once(u64::from(delay_ticks), task);
    }

    fn run_every(&self, interval_ticks: u32, task: RepeatingTask) -> TaskHandle {
        let handle = TaskHandle::new();
        let interval = u64::from(interval_ticks.max(1));
        let mut q = self.queue.borrow_mut();
        let due = q.now + interval;
        q.repeating.push(Repeating {
            handle: handle.clone(),
            interval,
            due,
            task: Some(task),
        });
        handle
    }
}
