// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Priority-ordered job dispatch.
//!
//! Selection is priority-first with creation time breaking ties. This is
//! deliberately unfair: a steady stream of `highest` work starves `lowest`.

use crate::error::EngineError;
use gf_core::JobId;
use gf_storage::{JobStore, Task, TaskQueue};

/// Select the highest-priority queued job for the queue and hand it to the
/// worker's task queue. Returns the dispatched id, or `None` when the
/// backlog is empty.
pub fn trigger_next(
    jobs: &JobStore,
    tasks: &TaskQueue,
    env_name: &str,
    queue_name: &str,
) -> Result<Option<JobId>, EngineError> {
    let mut queued = jobs.queued_for_queue(env_name, queue_name)?;
    if queued.is_empty() {
        tracing::debug!(queue = queue_name, "no queued jobs");
        return Ok(None);
    }
    // queued arrives in created_at order; the stable sort keeps that as the
    // tie-break within a priority level
    queued.sort_by(|a, b| a.priority.cmp(&b.priority));
    let next = &queued[0];

    tasks.push(&Task::ExecuteJob { job_id: next.id })?;
    tracing::info!(
        job_id = %next.id.short(),
        name = %next.name,
        priority = %next.priority,
        queue = queue_name,
        "dispatched next queued job"
    );
    Ok(Some(next.id))
}

/// Safety net run on a periodic tick: dispatch only when the queue has no
/// running job and at least one queued job. Keeps the at-most-one-running
/// invariant while recovering from lost completion triggers.
pub fn check_and_process(
    jobs: &JobStore,
    tasks: &TaskQueue,
    env_name: &str,
    queue_name: &str,
) -> Result<Option<JobId>, EngineError> {
    let running = jobs.running_for_queue(env_name, queue_name)?;
    if !running.is_empty() {
        tracing::debug!(
            queue = queue_name,
            running = running.len(),
            "running job present, skipping queued check"
        );
        return Ok(None);
    }
    trigger_next(jobs, tasks, env_name, queue_name)
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
