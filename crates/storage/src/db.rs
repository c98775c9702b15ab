// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Connection handling and schema bootstrap for the relational store.

use crate::error::StorageError;
use crate::jobs::JobStore;
use crate::schedulers::SchedulerStore;
use gf_core::NoticeSink;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// How long a writer waits on a locked database before giving up.
/// Covers the transient lock contention between the server process and the
/// consumers, which share this file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS job (
    id           TEXT PRIMARY KEY,
    env_name     TEXT NOT NULL,
    queue_name   TEXT NOT NULL,
    name         TEXT NOT NULL,
    kind         TEXT NOT NULL,
    command      TEXT NOT NULL,
    meta         TEXT NOT NULL,
    priority     TEXT NOT NULL,
    status       TEXT NOT NULL,
    pid          INTEGER,
    retry_count  INTEGER NOT NULL,
    created_at   TEXT NOT NULL,
    recurrence   TEXT,
    archived     INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_job_env_queue ON job (env_name, queue_name, status);

CREATE TABLE IF NOT EXISTS jobscheduler (
    id                   TEXT PRIMARY KEY,
    env_name             TEXT NOT NULL,
    name                 TEXT NOT NULL,
    description          TEXT NOT NULL,
    trigger_type         TEXT NOT NULL,
    repeat_every_seconds INTEGER,
    job_template         TEXT NOT NULL,
    enabled              INTEGER NOT NULL DEFAULT 1,
    last_run             INTEGER
);
CREATE INDEX IF NOT EXISTS idx_jobscheduler_env ON jobscheduler (env_name, trigger_type);
";

/// Handle on the relational database holding the `job` and `jobscheduler`
/// tables. Hands out store views sharing one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and ensure the schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Corrupt(format!("create db dir: {e}")))?;
        }
        let conn = Connection::open(path)?;
        configure(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Job store view. Mutations report `jobs_changed` to `sink`.
    pub fn jobs(&self, sink: Arc<dyn NoticeSink>) -> JobStore {
        JobStore::new(Arc::clone(&self.conn), sink)
    }

    /// Scheduler store view.
    pub fn schedulers(&self) -> SchedulerStore {
        SchedulerStore::new(Arc::clone(&self.conn))
    }
}

pub(crate) fn configure(conn: &Connection) -> Result<(), StorageError> {
    // journal_mode returns a row, so pragma_update would error on it
    conn.query_row("PRAGMA journal_mode = WAL", [], |_row| Ok(()))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}
