// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Durable job table: CRUD with atomic status transitions.
//!
//! Every mutator runs inside a short `BEGIN IMMEDIATE` transaction so that
//! the server process and the consumers can write concurrently; SQLite's
//! busy timeout absorbs transient lock contention. After a successful
//! mutation the store fires a `jobs_changed` notice; delivery is
//! best-effort and never fails the mutation.

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use gf_core::{
    Job, JobDraft, JobId, JobKind, JobPatch, JobStatus, Notice, NoticeSink, Priority, Recurrence,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::sync::Arc;

const JOB_COLUMNS: &str = "id, env_name, queue_name, name, kind, command, meta, priority, \
                           status, pid, retry_count, created_at, recurrence, archived";

/// Filter for [`JobStore::count`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub env_name: Option<String>,
    pub queue_name: Option<String>,
    pub status: Option<JobStatus>,
    pub include_archived: bool,
}

/// Store view over the `job` table.
#[derive(Clone)]
pub struct JobStore {
    conn: Arc<Mutex<Connection>>,
    sink: Arc<dyn NoticeSink>,
}

impl JobStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, sink: Arc<dyn NoticeSink>) -> Self {
        Self { conn, sink }
    }

    /// Insert a new job built from `draft`, timestamped `now`.
    pub fn create(&self, draft: JobDraft, now: DateTime<Utc>) -> Result<Job, StorageError> {
        let job = draft.into_job(now);
        self.insert(&job)?;
        Ok(job)
    }

    /// Insert a fully-formed row (recurring spawns, tests).
    pub fn insert(&self, job: &Job) -> Result<(), StorageError> {
        {
            let conn = self.conn.lock();
            conn.execute(
                &format!("INSERT INTO job ({JOB_COLUMNS}) \
                          VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"),
                params![
                    job.id.to_string(),
                    job.env_name,
                    job.queue_name,
                    job.name,
                    job.kind.as_str(),
                    job.command,
                    serde_json::to_string(&job.meta)?,
                    job.priority.as_str(),
                    job.status.as_str(),
                    job.pid,
                    job.retry_count,
                    job.created_at.to_rfc3339(),
                    job.recurrence.map(|r| r.as_str()),
                    job.archived,
                ],
            )?;
        }
        self.notify(&job.env_name);
        Ok(())
    }

    pub fn get(&self, id: &JobId) -> Result<Job, StorageError> {
        let conn = self.conn.lock();
        let raw = conn
            .query_row(
                &format!("SELECT {JOB_COLUMNS} FROM job WHERE id = ?1"),
                params![id.to_string()],
                read_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::job_not_found(id))?;
        job_from_raw(raw)
    }

    /// Jobs for an env, optionally narrowed to one queue. Archived jobs are
    /// hidden unless asked for; ordering is stable (creation order).
    pub fn list(
        &self,
        env_name: &str,
        queue_name: Option<&str>,
        include_archived: bool,
    ) -> Result<Vec<Job>, StorageError> {
        let mut sql = format!("SELECT {JOB_COLUMNS} FROM job WHERE env_name = ?1");
        let mut args: Vec<String> = vec![env_name.to_string()];
        if let Some(queue) = queue_name {
            args.push(queue.to_string());
            sql.push_str(&format!(" AND queue_name = ?{}", args.len()));
        }
        if !include_archived {
            sql.push_str(" AND archived = 0");
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");
        self.query_jobs(&sql, &args)
    }

    /// Dispatchable backlog for a queue: queued, non-archived, and not a
    /// recurrence template (templates are never executed directly).
    pub fn queued_for_queue(
        &self,
        env_name: &str,
        queue_name: &str,
    ) -> Result<Vec<Job>, StorageError> {
        self.query_jobs(
            &format!(
                "SELECT {JOB_COLUMNS} FROM job \
                 WHERE env_name = ?1 AND queue_name = ?2 AND status = 'queued' \
                   AND recurrence IS NULL AND archived = 0 \
                 ORDER BY created_at ASC, id ASC"
            ),
            &[env_name.to_string(), queue_name.to_string()],
        )
    }

    pub fn running_for_queue(
        &self,
        env_name: &str,
        queue_name: &str,
    ) -> Result<Vec<Job>, StorageError> {
        self.query_jobs(
            &format!(
                "SELECT {JOB_COLUMNS} FROM job \
                 WHERE env_name = ?1 AND queue_name = ?2 AND status = 'running' \
                   AND archived = 0 \
                 ORDER BY created_at ASC, id ASC"
            ),
            &[env_name.to_string(), queue_name.to_string()],
        )
    }

    /// Non-archived recurrence templates for a queue.
    pub fn templates_for_queue(
        &self,
        env_name: &str,
        queue_name: &str,
    ) -> Result<Vec<Job>, StorageError> {
        self.query_jobs(
            &format!(
                "SELECT {JOB_COLUMNS} FROM job \
                 WHERE env_name = ?1 AND queue_name = ?2 AND recurrence IS NOT NULL \
                   AND archived = 0 \
                 ORDER BY created_at ASC, id ASC"
            ),
            &[env_name.to_string(), queue_name.to_string()],
        )
    }

    /// Apply a partial update. A status change is validated against the
    /// transition graph inside the transaction, so concurrent writers cannot
    /// interleave an illegal hop.
    pub fn update(&self, id: &JobId, patch: &JobPatch) -> Result<Job, StorageError> {
        let job = {
            let mut conn = self.conn.lock();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let raw = tx
                .query_row(
                    &format!("SELECT {JOB_COLUMNS} FROM job WHERE id = ?1"),
                    params![id.to_string()],
                    read_row,
                )
                .optional()?
                .ok_or_else(|| StorageError::job_not_found(id))?;
            let mut job = job_from_raw(raw)?;

            if let Some(next) = patch.status {
                if !job.status.can_transition_to(next) {
                    return Err(StorageError::IllegalTransition { from: job.status, to: next });
                }
            }
            patch.apply(&mut job);
            write_row(&tx, &job)?;
            tx.commit()?;
            job
        };
        self.notify(&job.env_name);
        Ok(job)
    }

    /// Atomic claim: the conditional `queued → running` transition.
    ///
    /// Exactly one concurrent claimer can win; the rest observe
    /// [`StorageError::StaleTransition`] and re-select.
    pub fn claim(&self, id: &JobId) -> Result<Job, StorageError> {
        let job = {
            let mut conn = self.conn.lock();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let changed = tx.execute(
                "UPDATE job SET status = 'running' WHERE id = ?1 AND status = 'queued'",
                params![id.to_string()],
            )?;
            if changed == 0 {
                let status: Option<String> = tx
                    .query_row(
                        "SELECT status FROM job WHERE id = ?1",
                        params![id.to_string()],
                        |row| row.get(0),
                    )
                    .optional()?;
                return Err(match status {
                    None => StorageError::job_not_found(id),
                    Some(s) => StorageError::StaleTransition {
                        id: *id,
                        actual: JobStatus::parse(&s)
                            .ok_or_else(|| StorageError::Corrupt(format!("job status {s:?}")))?,
                    },
                });
            }
            let raw = tx.query_row(
                &format!("SELECT {JOB_COLUMNS} FROM job WHERE id = ?1"),
                params![id.to_string()],
                read_row,
            )?;
            tx.commit()?;
            job_from_raw(raw)?
        };
        tracing::debug!(job_id = %job.id, queue = %job.queue_name, "claimed job");
        self.notify(&job.env_name);
        Ok(job)
    }

    pub fn delete(&self, id: &JobId) -> Result<(), StorageError> {
        let env_name = {
            let mut conn = self.conn.lock();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let env: Option<String> = tx
                .query_row(
                    "SELECT env_name FROM job WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            let env = env.ok_or_else(|| StorageError::job_not_found(id))?;
            tx.execute("DELETE FROM job WHERE id = ?1", params![id.to_string()])?;
            tx.commit()?;
            env
        };
        self.notify(&env_name);
        Ok(())
    }

    pub fn count(&self, filter: &JobFilter) -> Result<u64, StorageError> {
        let mut sql = "SELECT COUNT(*) FROM job WHERE 1 = 1".to_string();
        let mut args: Vec<String> = Vec::new();
        if let Some(env) = &filter.env_name {
            args.push(env.clone());
            sql.push_str(&format!(" AND env_name = ?{}", args.len()));
        }
        if let Some(queue) = &filter.queue_name {
            args.push(queue.clone());
            sql.push_str(&format!(" AND queue_name = ?{}", args.len()));
        }
        if let Some(status) = filter.status {
            args.push(status.as_str().to_string());
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if !filter.include_archived {
            sql.push_str(" AND archived = 0");
        }
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row(&sql, rusqlite::params_from_iter(args.iter()), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn query_jobs(&self, sql: &str, args: &[String]) -> Result<Vec<Job>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let raws = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(job_from_raw).collect()
    }

    fn notify(&self, env_name: &str) {
        self.sink.notify(Notice::JobsChanged { env_name: env_name.to_string() });
    }
}

struct RawJob {
    id: String,
    env_name: String,
    queue_name: String,
    name: String,
    kind: String,
    command: String,
    meta: String,
    priority: String,
    status: String,
    pid: Option<i32>,
    retry_count: u32,
    created_at: String,
    recurrence: Option<String>,
    archived: bool,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawJob> {
    Ok(RawJob {
        id: row.get(0)?,
        env_name: row.get(1)?,
        queue_name: row.get(2)?,
        name: row.get(3)?,
        kind: row.get(4)?,
        command: row.get(5)?,
        meta: row.get(6)?,
        priority: row.get(7)?,
        status: row.get(8)?,
        pid: row.get(9)?,
        retry_count: row.get(10)?,
        created_at: row.get(11)?,
        recurrence: row.get(12)?,
        archived: row.get(13)?,
    })
}

fn job_from_raw(raw: RawJob) -> Result<Job, StorageError> {
    let corrupt = |field: &str, value: &str| {
        StorageError::Corrupt(format!("job {field} {value:?}"))
    };
    Ok(Job {
        id: JobId::parse(&raw.id).ok_or_else(|| corrupt("id", &raw.id))?,
        env_name: raw.env_name,
        queue_name: raw.queue_name,
        name: raw.name,
        kind: JobKind::parse(&raw.kind).ok_or_else(|| corrupt("kind", &raw.kind))?,
        command: raw.command,
        meta: serde_json::from_str(&raw.meta)?,
        priority: Priority::parse(&raw.priority)
            .ok_or_else(|| corrupt("priority", &raw.priority))?,
        status: JobStatus::parse(&raw.status).ok_or_else(|| corrupt("status", &raw.status))?,
        pid: raw.pid,
        retry_count: raw.retry_count,
        created_at: DateTime::parse_from_rfc3339(&raw.created_at)
            .map_err(|_| corrupt("created_at", &raw.created_at))?
            .with_timezone(&Utc),
        recurrence: match raw.recurrence {
            None => None,
            Some(r) => Some(Recurrence::parse(&r).ok_or_else(|| corrupt("recurrence", &r))?),
        },
        archived: raw.archived,
    })
}

fn write_row(tx: &Transaction<'_>, job: &Job) -> Result<(), StorageError> {
    tx.execute(
        "UPDATE job SET env_name = ?2, queue_name = ?3, name = ?4, kind = ?5, command = ?6, \
         meta = ?7, priority = ?8, status = ?9, pid = ?10, retry_count = ?11, \
         created_at = ?12, recurrence = ?13, archived = ?14 WHERE id = ?1",
        params![
            job.id.to_string(),
            job.env_name,
            job.queue_name,
            job.name,
            job.kind.as_str(),
            job.command,
            serde_json::to_string(&job.meta)?,
            job.priority.as_str(),
            job.status.as_str(),
            job.pid,
            job.retry_count,
            job.created_at.to_rfc3339(),
            job.recurrence.map(|r| r.as_str()),
            job.archived,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
