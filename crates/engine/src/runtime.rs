// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! The consumer's worker runtime: a single-threaded cooperative loop over
//! one queue's durable task queue.
//!
//! One job executes at a time; periodic maintenance runs between tasks.
//! Cross-queue parallelism comes from running one consumer process per
//! configured queue, never from concurrency inside a consumer.

use crate::error::EngineError;
use crate::periodic::{PeriodicKind, PeriodicSchedule};
use gf_core::{Clock, QueueConfig, ScriptRegistry};
use gf_storage::{JobStore, SchedulerStore, Task, TaskQueue};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleep between polls of an empty task queue.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Ceiling on a single `api_post` request. Commands get no wall-clock
/// timeout (the command itself is responsible); HTTP requests need one so a
/// dead endpoint classifies as a transport error instead of wedging the
/// worker.
const HTTP_TIMEOUT: Duration = Duration::from_secs(600);

/// Everything a worker runtime needs to operate one queue.
pub struct RuntimeDeps<C: Clock> {
    pub jobs: JobStore,
    pub schedulers: SchedulerStore,
    pub tasks: TaskQueue,
    pub scripts: Arc<ScriptRegistry>,
    pub clock: C,
    pub env_name: String,
    pub queue: QueueConfig,
    pub data_dir: PathBuf,
}

/// Worker runtime for one named queue.
pub struct Runtime<C: Clock> {
    pub(crate) jobs: JobStore,
    pub(crate) schedulers: SchedulerStore,
    pub(crate) tasks: TaskQueue,
    pub(crate) scripts: Arc<ScriptRegistry>,
    pub(crate) http: reqwest::Client,
    pub(crate) clock: C,
    pub(crate) env_name: String,
    pub(crate) queue: QueueConfig,
    pub(crate) data_dir: PathBuf,
    periodic: Mutex<PeriodicSchedule>,
}

impl<C: Clock> Runtime<C> {
    pub fn new(deps: RuntimeDeps<C>) -> Self {
        let periodic = Mutex::new(PeriodicSchedule::for_queue(&deps.queue.name));
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            jobs: deps.jobs,
            schedulers: deps.schedulers,
            tasks: deps.tasks,
            scripts: deps.scripts,
            http,
            clock: deps.clock,
            env_name: deps.env_name,
            queue: deps.queue,
            data_dir: deps.data_dir,
            periodic,
        }
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    pub fn queue_name(&self) -> &str {
        &self.queue.name
    }

    /// Main loop: run until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(queue = %self.queue.name, env = %self.env_name, "worker runtime started");
        loop {
            if shutdown.is_cancelled() {
                break;
            }
            self.run_due_periodic().await;
            match self.tasks.pop() {
                Ok(Some(task)) => self.handle_task(task).await,
                Ok(None) => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(POLL_INTERVAL) => {}
                    }
                }
                Err(e) => {
                    tracing::error!(queue = %self.queue.name, error = %e, "task queue read failed");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(POLL_INTERVAL) => {}
                    }
                }
            }
        }
        tracing::info!(queue = %self.queue.name, "worker runtime stopped");
    }

    /// Process tasks until the queue is empty. Completions re-fill the queue
    /// through `trigger_next`, so this drains a whole backlog.
    pub async fn drain(&self) {
        loop {
            match self.tasks.pop() {
                Ok(Some(task)) => self.handle_task(task).await,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(queue = %self.queue.name, error = %e, "task queue read failed");
                    break;
                }
            }
        }
    }

    async fn handle_task(&self, task: Task) {
        match task {
            Task::ExecuteJob { job_id } => {
                if let Err(e) = self.execute_job(job_id).await {
                    tracing::error!(job_id = %job_id.short(), error = %e, "execute_job failed");
                }
            }
        }
    }

    async fn run_due_periodic(&self) {
        let due = { self.periodic.lock().due(self.clock.now_utc()) };
        for kind in due {
            let result: Result<(), EngineError> = match kind {
                PeriodicKind::CheckQueued => self.check_and_process().map(|_| ()),
                PeriodicKind::CleanupStuck => self.cleanup_stuck().map(|_| ()),
                PeriodicKind::SpawnRecurring => self.spawn_recurring().map(|_| ()),
                PeriodicKind::SchedulerTick => self.scheduler_tick().map(|_| ()),
            };
            if let Err(e) = result {
                tracing::error!(queue = %self.queue.name, task = ?kind, error = %e, "periodic task failed");
            }
        }
    }
}
