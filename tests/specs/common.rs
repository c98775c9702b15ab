// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Shared fixtures: a full engine stack over a temporary data directory.

use gf_core::{paths, FakeClock, JobBuilder, NullSink, Priority, QueueConfig, ScriptRegistry};
use gf_core::{Job, JobStatus};
use gf_engine::{Runtime, RuntimeDeps};
use gf_storage::{Database, JobStore, SchedulerStore, TaskQueue};
use std::sync::Arc;
use tempfile::TempDir;

pub struct Ctx {
    pub dir: TempDir,
    pub clock: FakeClock,
    pub jobs: JobStore,
    pub schedulers: SchedulerStore,
    pub tasks: TaskQueue,
    pub runtime: Arc<Runtime<FakeClock>>,
}

/// File-backed stores and a worker runtime for one queue, all rooted in a
/// scratch data directory.
pub fn engine(queue_name: &str) -> Ctx {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&paths::store_db_path(dir.path())).unwrap();
    let jobs = db.jobs(Arc::new(NullSink));
    let schedulers = db.schedulers();
    let queue = QueueConfig::new(queue_name);
    let tasks = TaskQueue::open(&queue.task_db_path(dir.path())).unwrap();
    let clock = FakeClock::new();

    let runtime = Arc::new(Runtime::new(RuntimeDeps {
        jobs: jobs.clone(),
        schedulers: schedulers.clone(),
        tasks: tasks.clone(),
        scripts: Arc::new(ScriptRegistry::new()),
        clock: clock.clone(),
        env_name: "dev".to_string(),
        queue,
        data_dir: dir.path().to_path_buf(),
    }));

    Ctx { dir, clock, jobs, schedulers, tasks, runtime }
}

/// A queued shell job on the given queue.
pub fn queued_command(queue: &str, name: &str, priority: Priority, command: &str) -> Job {
    JobBuilder::default()
        .queue_name(queue)
        .name(name)
        .priority(priority)
        .status(JobStatus::Queued)
        .command(command)
        .build()
}
