// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gridmenu Host: the collaborator contract between a menu engine and the environment that owns
//! the rendering surface, the interaction feed, and the tick loop.
//!
//! ## Overview
//!
//! The menu engine never renders anything and never runs its own clock.
//! It asks a [`Host`] for a [`View`] with `rows × 9` addressable cells, writes [`Icon`]s into
//! those cells, and hands deferred work to a [`Scheduler`] that runs it on the host's tick.
//!
//! - [`Icon`]: an opaque, cheaply cloned display value compared by identity.
//! - [`ViewerId`] / [`ViewId`]: identities supplied by the host for observers and views.
//! - [`Host`] / [`View`]: create views, write and read cells, show a view to a viewer.
//! - [`Scheduler`] / [`TaskHandle`]: next-tick, delayed, and repeating tasks.
//!
//! ## Headless host
//!
//! The [`headless`] module implements the whole contract in memory.
//! [`HeadlessHost`](headless::HeadlessHost) records every cell write so callers can assert on
//! exactly what reached the surface, and [`TickScheduler`](headless::TickScheduler) is a
//! deterministic tick loop driven by explicit [`tick`](headless::TickScheduler::tick) calls.
//!
//! ```
//! use gridmenu_host::headless::{HeadlessHost, TickScheduler};
//! use gridmenu_host::{Host, Icon, Scheduler, ViewerId};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let host: HeadlessHost<&'static str> = HeadlessHost::new();
//! let mut view = host.create_view(1, "Shop");
//! view.set_cell(4, Icon::new("apple"));
//! host.show(ViewerId(7), view.id());
//! assert_eq!(host.cell(view.id(), 4).map(|i| *i.get()), Some("apple"));
//!
//! let ticks = TickScheduler::new();
//! let ran = Rc::new(Cell::new(false));
//! let flag = ran.clone();
//! ticks.run_next_tick(Box::new(move || flag.set(true)));
//! assert!(!ran.get());
//! ticks.tick();
//! assert!(ran.get());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod headless;
pub mod host;
pub mod icon;
pub mod scheduler;
pub mod types;

pub use host::{Host, View};
pub use icon::Icon;
pub use scheduler::{RepeatingTask, Scheduler, Task, TaskHandle};
pub use types::{ViewId, ViewerId};
