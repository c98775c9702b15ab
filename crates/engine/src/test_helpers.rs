// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

//! Shared fixtures for engine unit tests.

use crate::runtime::{Runtime, RuntimeDeps};
use gf_core::{FakeClock, QueueConfig, ScriptRegistry, NullSink, DEFAULT_QUEUE};
use gf_storage::{Database, JobStore, SchedulerStore, TaskQueue};
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) struct TestContext {
    pub dir: TempDir,
    pub clock: FakeClock,
    pub jobs: JobStore,
    pub schedulers: SchedulerStore,
    pub tasks: TaskQueue,
    pub runtime: Runtime<FakeClock>,
}

pub(crate) fn context() -> TestContext {
    context_with(DEFAULT_QUEUE, ScriptRegistry::new())
}

pub(crate) fn context_with(queue_name: &str, scripts: ScriptRegistry) -> TestContext {
    let dir = TempDir::new().unwrap();
    let db = Database::open_in_memory().unwrap();
    let jobs = db.jobs(Arc::new(NullSink));
    let schedulers = db.schedulers();
    let tasks =
        TaskQueue::open(&dir.path().join(format!("consumer__{queue_name}.db"))).unwrap();
    let clock = FakeClock::new();
    let runtime = Runtime::new(RuntimeDeps {
        jobs: jobs.clone(),
        schedulers: schedulers.clone(),
        tasks: tasks.clone(),
        scripts: Arc::new(scripts),
        clock: clock.clone(),
        env_name: "dev".to_string(),
        queue: QueueConfig::new(queue_name),
        data_dir: dir.path().to_path_buf(),
    });
    TestContext { dir, clock, jobs, schedulers, tasks, runtime }
}
