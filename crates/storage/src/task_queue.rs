// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Durable per-queue task queue.
//!
//! One SQLite file per named queue, written by that queue's consumer and by
//! the server's enqueue path. Tasks are handed off at-most-once: `pop`
//! removes the oldest row inside an immediate transaction. Cross-consumer
//! double execution is guarded one level up by the job claim.

use crate::db::configure;
use crate::error::StorageError;
use gf_core::JobId;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A unit of work for a consumer's worker runtime.
///
/// Periodic maintenance is scheduled in code, not persisted; the queue only
/// carries dispatchable work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    ExecuteJob { job_id: JobId },
}

impl Task {
    pub fn kind(&self) -> &'static str {
        match self {
            Task::ExecuteJob { .. } => "execute_job",
        }
    }
}

/// FIFO over one queue's SQLite file.
#[derive(Clone)]
pub struct TaskQueue {
    conn: Arc<Mutex<Connection>>,
}

impl TaskQueue {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Corrupt(format!("create queue dir: {e}")))?;
        }
        let conn = Connection::open(path)?;
        configure(&conn)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS task (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                kind       TEXT NOT NULL,
                payload    TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn push(&self, task: &Task) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO task (kind, payload) VALUES (?1, ?2)",
            params![task.kind(), serde_json::to_string(task)?],
        )?;
        Ok(())
    }

    /// Remove and return the oldest task, if any.
    pub fn pop(&self) -> Result<Option<Task>, StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let head: Option<(i64, String)> = tx
            .query_row("SELECT id, payload FROM task ORDER BY id ASC LIMIT 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;
        let Some((id, payload)) = head else {
            return Ok(None);
        };
        tx.execute("DELETE FROM task WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(Some(serde_json::from_str(&payload)?))
    }

    pub fn len(&self) -> Result<u64, StorageError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM task", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
#[path = "task_queue_tests.rs"]
mod tests;
