// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gaffer Contributors

use super::*;
use tempfile::TempDir;

fn queue(dir: &TempDir) -> TaskQueue {
    TaskQueue::open(&dir.path().join("consumer__default.db")).unwrap()
}

#[test]
fn pop_returns_tasks_in_fifo_order() {
    let dir = TempDir::new().unwrap();
    let q = queue(&dir);

    let first = JobId::new();
    let second = JobId::new();
    q.push(&Task::ExecuteJob { job_id: first }).unwrap();
    q.push(&Task::ExecuteJob { job_id: second }).unwrap();

    assert_eq!(q.len().unwrap(), 2);
    assert_eq!(q.pop().unwrap(), Some(Task::ExecuteJob { job_id: first }));
    assert_eq!(q.pop().unwrap(), Some(Task::ExecuteJob { job_id: second }));
    assert_eq!(q.pop().unwrap(), None);
}

#[test]
fn empty_queue_pops_none() {
    let dir = TempDir::new().unwrap();
    let q = queue(&dir);
    assert!(q.is_empty().unwrap());
    assert_eq!(q.pop().unwrap(), None);
}

#[test]
fn tasks_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let id = JobId::new();
    {
        let q = queue(&dir);
        q.push(&Task::ExecuteJob { job_id: id }).unwrap();
    }
    let q = queue(&dir);
    assert_eq!(q.pop().unwrap(), Some(Task::ExecuteJob { job_id: id }));
}

#[test]
fn queues_are_isolated_per_file() {
    let dir = TempDir::new().unwrap();
    let default = TaskQueue::open(&dir.path().join("consumer__default.db")).unwrap();
    let reserved = TaskQueue::open(&dir.path().join("consumer__reserved.db")).unwrap();

    default.push(&Task::ExecuteJob { job_id: JobId::new() }).unwrap();
    assert_eq!(default.len().unwrap(), 1);
    assert!(reserved.is_empty().unwrap());
}
