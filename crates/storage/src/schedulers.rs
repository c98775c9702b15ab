// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Durable scheduler table: persistent triggers that produce jobs.

use crate::error::StorageError;
use gf_core::{JobScheduler, SchedulerDraft, SchedulerId, SchedulerPatch, TriggerType};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::Arc;

const SCHEDULER_COLUMNS: &str = "id, env_name, name, description, trigger_type, \
                                 repeat_every_seconds, job_template, enabled, last_run";

/// Store view over the `jobscheduler` table.
#[derive(Clone)]
pub struct SchedulerStore {
    conn: Arc<Mutex<Connection>>,
}

impl SchedulerStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn create(&self, draft: SchedulerDraft) -> Result<JobScheduler, StorageError> {
        let scheduler = draft.into_scheduler();
        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "INSERT INTO jobscheduler ({SCHEDULER_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                scheduler.id.to_string(),
                scheduler.env_name,
                scheduler.name,
                scheduler.description,
                scheduler.trigger_type.as_str(),
                scheduler.repeat_every_seconds,
                serde_json::to_string(&scheduler.job_template)?,
                scheduler.enabled,
                scheduler.last_run,
            ],
        )?;
        Ok(scheduler)
    }

    pub fn get(&self, id: &SchedulerId) -> Result<JobScheduler, StorageError> {
        let conn = self.conn.lock();
        let raw = conn
            .query_row(
                &format!("SELECT {SCHEDULER_COLUMNS} FROM jobscheduler WHERE id = ?1"),
                params![id.to_string()],
                read_row,
            )
            .optional()?
            .ok_or_else(|| not_found(id))?;
        from_raw(raw)
    }

    pub fn list(&self, env_name: &str) -> Result<Vec<JobScheduler>, StorageError> {
        self.query(
            &format!(
                "SELECT {SCHEDULER_COLUMNS} FROM jobscheduler WHERE env_name = ?1 \
                 ORDER BY name ASC, id ASC"
            ),
            &[env_name.to_string()],
        )
    }

    pub fn update(
        &self,
        id: &SchedulerId,
        patch: &SchedulerPatch,
    ) -> Result<JobScheduler, StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let raw = tx
            .query_row(
                &format!("SELECT {SCHEDULER_COLUMNS} FROM jobscheduler WHERE id = ?1"),
                params![id.to_string()],
                read_row,
            )
            .optional()?
            .ok_or_else(|| not_found(id))?;
        let mut scheduler = from_raw(raw)?;
        patch.apply(&mut scheduler);
        tx.execute(
            "UPDATE jobscheduler SET env_name = ?2, name = ?3, description = ?4, \
             trigger_type = ?5, repeat_every_seconds = ?6, job_template = ?7, \
             enabled = ?8, last_run = ?9 WHERE id = ?1",
            params![
                scheduler.id.to_string(),
                scheduler.env_name,
                scheduler.name,
                scheduler.description,
                scheduler.trigger_type.as_str(),
                scheduler.repeat_every_seconds,
                serde_json::to_string(&scheduler.job_template)?,
                scheduler.enabled,
                scheduler.last_run,
            ],
        )?;
        tx.commit()?;
        Ok(scheduler)
    }

    pub fn delete(&self, id: &SchedulerId) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        let changed =
            conn.execute("DELETE FROM jobscheduler WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Flip `enabled`, returning the updated row.
    pub fn toggle(&self, id: &SchedulerId) -> Result<JobScheduler, StorageError> {
        let current = self.get(id)?;
        self.update(id, &SchedulerPatch { enabled: Some(!current.enabled), ..Default::default() })
    }

    /// Enabled `on_start` schedulers for an env.
    pub fn list_on_start(&self, env_name: &str) -> Result<Vec<JobScheduler>, StorageError> {
        self.query(
            &format!(
                "SELECT {SCHEDULER_COLUMNS} FROM jobscheduler \
                 WHERE env_name = ?1 AND trigger_type = 'on_start' AND enabled = 1 \
                 ORDER BY name ASC, id ASC"
            ),
            &[env_name.to_string()],
        )
    }

    /// Enabled repeat schedulers whose interval has elapsed at `now`.
    pub fn list_due_repeat(
        &self,
        env_name: &str,
        now: i64,
    ) -> Result<Vec<JobScheduler>, StorageError> {
        let repeats = self.query(
            &format!(
                "SELECT {SCHEDULER_COLUMNS} FROM jobscheduler \
                 WHERE env_name = ?1 AND trigger_type = 'repeat' AND enabled = 1 \
                 ORDER BY name ASC, id ASC"
            ),
            &[env_name.to_string()],
        )?;
        Ok(repeats.into_iter().filter(|s| s.is_due(now)).collect())
    }

    /// Stamp `last_run`. Called before the spawned job is enqueued so a slow
    /// spawn cannot re-fire on the next tick.
    pub fn mark_fired(&self, id: &SchedulerId, now: i64) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE jobscheduler SET last_run = ?2 WHERE id = ?1",
            params![id.to_string(), now],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn query(&self, sql: &str, args: &[String]) -> Result<Vec<JobScheduler>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let raws = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(from_raw).collect()
    }
}

fn not_found(id: &SchedulerId) -> StorageError {
    StorageError::NotFound { what: "scheduler", id: id.to_string() }
}

struct RawScheduler {
    id: String,
    env_name: String,
    name: String,
    description: String,
    trigger_type: String,
    repeat_every_seconds: Option<u32>,
    job_template: String,
    enabled: bool,
    last_run: Option<i64>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawScheduler> {
    Ok(RawScheduler {
        id: row.get(0)?,
        env_name: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        trigger_type: row.get(4)?,
        repeat_every_seconds: row.get(5)?,
        job_template: row.get(6)?,
        enabled: row.get(7)?,
        last_run: row.get(8)?,
    })
}

fn from_raw(raw: RawScheduler) -> Result<JobScheduler, StorageError> {
    Ok(JobScheduler {
        id: SchedulerId::parse(&raw.id)
            .ok_or_else(|| StorageError::Corrupt(format!("scheduler id {:?}", raw.id)))?,
        env_name: raw.env_name,
        name: raw.name,
        description: raw.description,
        trigger_type: TriggerType::parse(&raw.trigger_type)
            .ok_or_else(|| StorageError::Corrupt(format!("trigger_type {:?}", raw.trigger_type)))?,
        repeat_every_seconds: raw.repeat_every_seconds,
        job_template: serde_json::from_str(&raw.job_template)?,
        enabled: raw.enabled,
        last_run: raw.last_run,
    })
}

#[cfg(test)]
#[path = "schedulers_tests.rs"]
mod tests;
