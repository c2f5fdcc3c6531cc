// Copyright 2025 the Gridmenu Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory implementation of the host contract.
//!
//! - [`HeadlessHost`]: views backed by plain cell vectors, with a write log.
//! - [`TickScheduler`]: a deterministic tick loop advanced by hand.
//!
//! Both are single-threaded and never sleep, which makes them suitable for tests and benchmarks.

pub mod host;
pub mod scheduler;

pub use host::{HeadlessHost, HeadlessView, ViewWrite};
pub use scheduler::TickScheduler;
