// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Named queue configuration and per-queue file locations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Queue every job lands on unless told otherwise.
pub const DEFAULT_QUEUE: &str = "default";

/// Second stock queue, kept free for work that must not wait behind the
/// default queue's backlog.
pub const RESERVED_QUEUE: &str = "reserved";

/// A named queue. One consumer process serves each configured queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub name: String,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Durable task queue database for this queue.
    pub fn task_db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("consumer__{}.db", self.name))
    }

    /// Consumer process stdout/stderr log.
    pub fn log_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("logs").join(format!("consumer__{}.log", self.name))
    }

    /// Consumer pid file: the log path with a `.pid` suffix.
    pub fn pid_path(&self, data_dir: &Path) -> PathBuf {
        self.log_path(data_dir).with_extension("pid")
    }
}

/// The stock two-queue configuration.
pub fn default_queues() -> Vec<QueueConfig> {
    vec![QueueConfig::new(DEFAULT_QUEUE), QueueConfig::new(RESERVED_QUEUE)]
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
