// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gf-storage: SQLite persistence for jobs, schedulers, and the per-queue
//! durable task queues.
//!
//! Everything here is synchronous; async callers hop to a blocking pool.

mod db;
mod error;
mod jobs;
mod schedulers;
mod task_queue;

pub use db::Database;
pub use error::StorageError;
pub use jobs::{JobFilter, JobStore};
pub use schedulers::SchedulerStore;
pub use task_queue::{Task, TaskQueue};
