// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

use super::*;
use chrono::{TimeDelta, Utc};
use gf_core::{JobBuilder, JobStatus, NullSink, Priority, Recurrence};
use gf_storage::Database;
use std::sync::Arc;
use tempfile::TempDir;

fn fixture() -> (TempDir, JobStore, TaskQueue) {
    let dir = TempDir::new().unwrap();
    let db = Database::open_in_memory().unwrap();
    let tasks = TaskQueue::open(&dir.path().join("consumer__default.db")).unwrap();
    (dir, db.jobs(Arc::new(NullSink)), tasks)
}

#[test]
fn empty_backlog_dispatches_nothing() {
    let (_dir, jobs, tasks) = fixture();
    assert_eq!(trigger_next(&jobs, &tasks, "dev", "default").unwrap(), None);
    assert!(tasks.is_empty().unwrap());
}

#[test]
fn highest_priority_wins() {
    let (_dir, jobs, tasks) = fixture();
    let low = JobBuilder::default().priority(Priority::Low).build();
    let highest = JobBuilder::default().priority(Priority::Highest).build();
    let normal = JobBuilder::default().priority(Priority::Normal).build();
    for job in [&low, &highest, &normal] {
        jobs.insert(job).unwrap();
    }

    let picked = trigger_next(&jobs, &tasks, "dev", "default").unwrap();
    assert_eq!(picked, Some(highest.id));
    assert_eq!(tasks.pop().unwrap(), Some(Task::ExecuteJob { job_id: highest.id }));
}

#[test]
fn created_at_breaks_priority_ties() {
    let (_dir, jobs, tasks) = fixture();
    let now = Utc::now();
    let older = JobBuilder::default().created_at(now - TimeDelta::seconds(10)).build();
    let newer = JobBuilder::default().created_at(now).build();
    jobs.insert(&newer).unwrap();
    jobs.insert(&older).unwrap();

    assert_eq!(trigger_next(&jobs, &tasks, "dev", "default").unwrap(), Some(older.id));
}

#[test]
fn only_queued_jobs_are_considered() {
    let (_dir, jobs, tasks) = fixture();
    for status in [JobStatus::Pending, JobStatus::Running, JobStatus::Done, JobStatus::Failed] {
        jobs.insert(&JobBuilder::default().status(status).build()).unwrap();
    }
    assert_eq!(trigger_next(&jobs, &tasks, "dev", "default").unwrap(), None);
}

#[test]
fn templates_are_never_dispatched() {
    let (_dir, jobs, tasks) = fixture();
    jobs.insert(&JobBuilder::default().recurrence(Recurrence::Hourly).build()).unwrap();
    assert_eq!(trigger_next(&jobs, &tasks, "dev", "default").unwrap(), None);
}

#[test]
fn other_queues_are_invisible() {
    let (_dir, jobs, tasks) = fixture();
    jobs.insert(&JobBuilder::default().queue_name("reserved").build()).unwrap();
    assert_eq!(trigger_next(&jobs, &tasks, "dev", "default").unwrap(), None);
}

#[test]
fn check_and_process_skips_when_running() {
    let (_dir, jobs, tasks) = fixture();
    jobs.insert(&JobBuilder::default().status(JobStatus::Running).build()).unwrap();
    jobs.insert(&JobBuilder::default().status(JobStatus::Queued).build()).unwrap();

    assert_eq!(check_and_process(&jobs, &tasks, "dev", "default").unwrap(), None);
    assert!(tasks.is_empty().unwrap());
}

#[test]
fn check_and_process_dispatches_when_idle() {
    let (_dir, jobs, tasks) = fixture();
    let queued = JobBuilder::default().status(JobStatus::Queued).build();
    jobs.insert(&queued).unwrap();

    assert_eq!(check_and_process(&jobs, &tasks, "dev", "default").unwrap(), Some(queued.id));
    assert_eq!(tasks.len().unwrap(), 1);
}
